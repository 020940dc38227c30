//! # Connection Monitor
//!
//! Single source of truth for "can we reach the backend right now".
//!
//! ## Architecture
//!
//! - **Probe**: one bounded-duration request to the health endpoint
//! - **Status**: in-memory state plus the persisted copy in the local store
//! - **Subscribers**: callbacks that receive every status broadcast
//! - **Scheduler**: a fixed-period background probe
//! - **Backoff**: delay calculation for callers that retry by hand
//! - **Metrics**: probe counters and latency
//!
//! ## Behaviour
//!
//! - A failed probe increments `retry_count`, saturating at `max_retries`;
//!   a successful one resets it to zero.
//! - A non-forced check while a probe is in flight returns the cached
//!   `is_online` without touching the network.
//! - Every probe broadcasts when it starts and when it ends. Delivery to
//!   each subscriber is isolated; a panicking subscriber does not stop the
//!   others.
//! - Probes carry a sequence number. A result that lands after a newer
//!   probe's result has been applied is discarded.
//! - Probe failures never reach the caller as errors.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use studymate::client::connection::{ConnectionMonitor, HttpHealthProbe, MonitorConfig};
//! use studymate::client::offline::{LocalFallbackStore, MemoryBackend};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let probe = HttpHealthProbe::new("http://127.0.0.1:5000/api/health", Duration::from_secs(5))?;
//! let store = LocalFallbackStore::new(Arc::new(MemoryBackend::new()));
//! let monitor = ConnectionMonitor::new(MonitorConfig::default(), Arc::new(probe), store);
//!
//! monitor.subscribe(|status| println!("online: {}", status.is_online));
//! monitor.initialize();
//!
//! let online = monitor.check_connection(true).await;
//! # let _ = online;
//! monitor.cleanup();
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod metrics;
pub mod probe;
pub mod scheduler;
pub mod status;

pub use backoff::BackoffPolicy;
pub use metrics::ProbeMetrics;
pub use probe::{HealthProbe, HttpHealthProbe};
pub use scheduler::PeriodicSchedule;
pub use status::{ConnectionStatus, StatusSnapshot};

use crate::client::offline::{LocalFallbackStore, PersistedServerStatus};
use crate::shared::config::{
    AppConfig, DEFAULT_CHECK_INTERVAL_MS, DEFAULT_MAX_RETRIES, DEFAULT_PROBE_TIMEOUT_MS,
};
use crate::shared::error::ProbeError;
use chrono::{DateTime, Utc};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Monitor tuning
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Hard deadline for a single probe
    pub probe_timeout: Duration,
    /// Period used by `initialize`
    pub check_interval: Duration,
    /// Retry ceiling
    pub max_retries: u32,
    /// Backoff for manual retries
    pub backoff: BackoffPolicy,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
            check_interval: Duration::from_millis(DEFAULT_CHECK_INTERVAL_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: BackoffPolicy::default(),
        }
    }
}

impl From<&AppConfig> for MonitorConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            probe_timeout: config.probe_timeout(),
            check_interval: config.check_interval(),
            max_retries: config.max_retries,
            backoff: BackoffPolicy::from_config(config),
        }
    }
}

/// Handle returned by [`ConnectionMonitor::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type StatusHandler = Arc<dyn Fn(&ConnectionStatus) + Send + Sync>;

/// Mutable probe state. Only the monitor's own methods touch it.
#[derive(Debug, Default)]
struct ProbeState {
    is_online: bool,
    retry_count: u32,
    last_check: Option<DateTime<Utc>>,
    in_flight: usize,
    next_seq: u64,
    applied_seq: u64,
}

impl ProbeState {
    fn status(&self) -> ConnectionStatus {
        ConnectionStatus {
            is_online: self.is_online,
            is_checking: self.in_flight > 0,
            retry_count: self.retry_count,
            last_check: self.last_check,
        }
    }

    fn persisted(&self) -> PersistedServerStatus {
        PersistedServerStatus {
            is_online: self.is_online,
            retry_count: self.retry_count,
            last_check: self.last_check,
        }
    }
}

struct Inner {
    config: MonitorConfig,
    probe: Arc<dyn HealthProbe>,
    store: LocalFallbackStore,
    state: Mutex<ProbeState>,
    subscribers: Mutex<Vec<(SubscriptionId, StatusHandler)>>,
    next_subscription: AtomicU64,
    schedule: Mutex<Option<PeriodicSchedule>>,
    metrics: Mutex<ProbeMetrics>,
    watch_tx: watch::Sender<ConnectionStatus>,
}

/// Poison-tolerant lock; every guarded value stays consistent between
/// statements, so a panic elsewhere does not invalidate it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl Inner {
    fn status(&self) -> ConnectionStatus {
        lock(&self.state).status()
    }

    /// Deliver the current status to every subscriber in registration order
    fn broadcast(&self) {
        let status = self.status();
        self.watch_tx.send_replace(status.clone());

        // Snapshot so handlers may (un)subscribe without deadlocking
        let handlers: Vec<(SubscriptionId, StatusHandler)> = lock(&self.subscribers).clone();
        for (id, handler) in handlers {
            deliver(id, &handler, &status);
        }
    }
}

fn deliver(id: SubscriptionId, handler: &StatusHandler, status: &ConnectionStatus) {
    if catch_unwind(AssertUnwindSafe(|| handler(status))).is_err() {
        tracing::error!("Connection status subscriber {:?} panicked; skipped", id);
    }
}

/// Releases a probe's in-flight slot even if the probe future is dropped
/// before completion.
struct InFlight<'a> {
    inner: &'a Inner,
    released: bool,
}

impl InFlight<'_> {
    fn release(mut self) {
        self.released = true;
        let mut state = lock(&self.inner.state);
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.released {
            {
                let mut state = lock(&self.inner.state);
                state.in_flight = state.in_flight.saturating_sub(1);
            }
            self.inner.broadcast();
        }
    }
}

/// Backend availability monitor
///
/// Cheap to clone; clones share state. Construct one per process, call
/// [`initialize`](Self::initialize) at startup and
/// [`cleanup`](Self::cleanup) at shutdown.
#[derive(Clone)]
pub struct ConnectionMonitor {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ConnectionMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionMonitor")
            .field("config", &self.inner.config)
            .field("status", &self.inner.status())
            .finish_non_exhaustive()
    }
}

impl ConnectionMonitor {
    /// Create a monitor. Starts offline with no retries and no probe run.
    pub fn new(config: MonitorConfig, probe: Arc<dyn HealthProbe>, store: LocalFallbackStore) -> Self {
        let (watch_tx, _) = watch::channel(ConnectionStatus::default());
        Self {
            inner: Arc::new(Inner {
                config,
                probe,
                store,
                state: Mutex::new(ProbeState::default()),
                subscribers: Mutex::new(Vec::new()),
                next_subscription: AtomicU64::new(1),
                schedule: Mutex::new(None),
                metrics: Mutex::new(ProbeMetrics::new()),
                watch_tx,
            }),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &LocalFallbackStore {
        &self.inner.store
    }

    /// Register `handler` for every future broadcast.
    ///
    /// The handler is also called once, right away, with the current status.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&ConnectionStatus) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_subscription.fetch_add(1, Ordering::Relaxed));
        let handler: StatusHandler = Arc::new(handler);
        lock(&self.inner.subscribers).push((id, handler.clone()));
        deliver(id, &handler, &self.inner.status());
        id
    }

    /// Remove a subscription. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = lock(&self.inner.subscribers);
        let before = subscribers.len();
        subscribers.retain(|(sub, _)| *sub != id);
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.subscribers).len()
    }

    /// Receiver that always holds the latest broadcast
    pub fn watch(&self) -> watch::Receiver<ConnectionStatus> {
        self.inner.watch_tx.subscribe()
    }

    /// Run one probe and return the resulting `is_online`.
    ///
    /// Without `force`, a call made while another probe is in flight returns
    /// the cached value immediately and issues no request. Failures of any
    /// kind, including the deadline, count as offline.
    pub async fn check_connection(&self, force: bool) -> bool {
        let inner = &*self.inner;
        let seq = {
            let mut state = lock(&inner.state);
            if !force && state.in_flight > 0 {
                tracing::debug!("Health probe already in flight; using cached status");
                return state.is_online;
            }
            state.in_flight += 1;
            state.last_check = Some(Utc::now());
            state.next_seq += 1;
            state.next_seq
        };
        let slot = InFlight {
            inner,
            released: false,
        };
        inner.broadcast();

        let started = Instant::now();
        let outcome = match tokio::time::timeout(inner.config.probe_timeout, inner.probe.probe()).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout {
                timeout_ms: inner.config.probe_timeout.as_millis() as u64,
            }),
        };
        self.record_metrics(&outcome, started.elapsed());

        let persisted = {
            let mut state = lock(&inner.state);
            if seq > state.applied_seq {
                state.applied_seq = seq;
                self.apply_outcome(&mut state, &outcome);
            } else {
                tracing::debug!(
                    "Discarding result of probe #{} superseded by probe #{}",
                    seq,
                    state.applied_seq
                );
            }
            state.persisted()
        };
        inner.store.set_server_status(&persisted);

        slot.release();
        inner.broadcast();
        persisted.is_online
    }

    fn apply_outcome(&self, state: &mut ProbeState, outcome: &Result<(), ProbeError>) {
        let was_online = state.is_online;
        let max_retries = self.inner.config.max_retries;
        match outcome {
            Ok(()) => {
                state.is_online = true;
                state.retry_count = 0;
                if !was_online {
                    tracing::info!("Server connection established");
                }
            }
            Err(e) => {
                let previous = state.retry_count;
                state.is_online = false;
                state.retry_count = (previous + 1).min(max_retries);
                if was_online {
                    tracing::warn!("Server connection lost: {}", e);
                } else {
                    tracing::debug!(
                        "Health probe failed (attempt {}/{}): {}",
                        state.retry_count,
                        max_retries,
                        e
                    );
                }
                if previous < max_retries && state.retry_count == max_retries {
                    tracing::warn!(
                        "Server unreachable after {} attempts; demo mode can be offered",
                        max_retries
                    );
                }
            }
        }
    }

    fn record_metrics(&self, outcome: &Result<(), ProbeError>, latency: Duration) {
        let mut metrics = lock(&self.inner.metrics);
        match outcome {
            Ok(()) => metrics.record_success(latency),
            Err(e) => metrics.record_failure(latency, e.is_timeout()),
        }
    }

    /// Start (or restart) the fixed-period background probe.
    ///
    /// Any existing schedule is cancelled first. One probe is triggered
    /// immediately. Must be called from within a tokio runtime.
    pub fn start_periodic_checks(&self, interval: Duration) {
        let mut schedule = lock(&self.inner.schedule);
        if let Some(existing) = schedule.take() {
            existing.cancel();
        }

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        *schedule = Some(PeriodicSchedule::spawn(interval, move || {
            let Some(inner) = weak.upgrade() else {
                return false;
            };
            let monitor = ConnectionMonitor { inner };
            // Own task, so cancelling the schedule never cancels a probe
            tokio::spawn(async move {
                monitor.check_connection(false).await;
            });
            true
        }));
        tracing::debug!("Periodic health checks every {:?}", interval);
    }

    /// Cancel the background probe. A probe already in flight still
    /// completes and broadcasts. Idempotent.
    pub fn stop_periodic_checks(&self) {
        if let Some(schedule) = lock(&self.inner.schedule).take() {
            schedule.cancel();
            tracing::debug!("Periodic health checks stopped");
        }
    }

    pub fn is_periodic_running(&self) -> bool {
        lock(&self.inner.schedule)
            .as_ref()
            .is_some_and(|s| !s.is_finished())
    }

    /// Turn demo mode on. Probing is left as it is.
    pub fn enable_demo_mode(&self) -> bool {
        let saved = self.inner.store.set_demo_mode(true);
        tracing::info!("Demo mode enabled");
        saved
    }

    /// Turn demo mode off. Probing is left as it is.
    pub fn disable_demo_mode(&self) -> bool {
        let saved = self.inner.store.set_demo_mode(false);
        tracing::info!("Demo mode disabled");
        saved
    }

    /// Copy of the current state for display
    pub fn status(&self) -> StatusSnapshot {
        let status = self.inner.status();
        status.snapshot(self.inner.config.max_retries, self.inner.store.is_demo_mode())
    }

    /// True once the retry counter has hit the ceiling and demo mode is
    /// still off. The monitor never switches modes on its own.
    pub fn retries_exhausted(&self) -> bool {
        let exhausted = lock(&self.inner.state).retry_count >= self.inner.config.max_retries;
        exhausted && !self.inner.store.is_demo_mode()
    }

    /// Suggested wait before a manual retry, from the current retry count
    pub fn backoff_delay(&self) -> Duration {
        let retry_count = lock(&self.inner.state).retry_count;
        self.inner.config.backoff.delay_for(retry_count)
    }

    pub fn metrics(&self) -> ProbeMetrics {
        lock(&self.inner.metrics).clone()
    }

    /// Seed state from the persisted status and start periodic checks at
    /// the configured interval. Call once per process.
    pub fn initialize(&self) {
        if let Some(saved) = self.inner.store.server_status() {
            let mut state = lock(&self.inner.state);
            state.is_online = saved.is_online;
            state.retry_count = saved.retry_count.min(self.inner.config.max_retries);
            state.last_check = saved.last_check;
            tracing::debug!(
                "Restored server status: online={}, retries={}",
                state.is_online,
                state.retry_count
            );
        }
        self.inner.broadcast();
        self.start_periodic_checks(self.inner.config.check_interval);
    }

    /// Stop periodic checks and drop every subscriber
    pub fn cleanup(&self) {
        self.stop_periodic_checks();
        lock(&self.inner.subscribers).clear();
    }
}
