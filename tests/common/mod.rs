//! Common test utilities and helpers
//!
//! - `ScriptedProbe`: a health probe whose outcomes are queued up front
//! - store and monitor builders over an in-memory backend
//! - `wait_until_checking` / `wait_until_idle`: yield until the monitor's
//!   in-flight state changes

#![allow(dead_code)]

use futures_util::future::BoxFuture;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use studymate::client::{
    ConnectionMonitor, HealthProbe, LocalFallbackStore, MemoryBackend, MonitorConfig,
};
use studymate::shared::ProbeError;
use tokio::sync::Notify;

/// One scripted probe outcome
pub enum Step {
    /// Resolve immediately
    Now(bool),
    /// Resolve once the gate is notified
    After(Arc<Notify>, bool),
    /// Never resolve
    Hang,
}

/// Probe that plays back a script, then falls back to a fixed outcome
pub struct ScriptedProbe {
    calls: AtomicUsize,
    script: Mutex<VecDeque<Step>>,
    fallback_ok: AtomicBool,
}

impl ScriptedProbe {
    pub fn always(ok: bool) -> Arc<Self> {
        Self::with_script(ok, Vec::new())
    }

    pub fn with_script(fallback_ok: bool, steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            script: Mutex::new(steps.into()),
            fallback_ok: AtomicBool::new(fallback_ok),
        })
    }

    pub fn set_healthy(&self, ok: bool) {
        self.fallback_ok.store(ok, Ordering::SeqCst);
    }

    pub fn push(&self, step: Step) {
        self.script.lock().unwrap().push_back(step);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn outcome(ok: bool) -> Result<(), ProbeError> {
    if ok {
        Ok(())
    } else {
        Err(ProbeError::network("connection refused"))
    }
}

impl HealthProbe for ScriptedProbe {
    fn probe(&self) -> BoxFuture<'_, Result<(), ProbeError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.script.lock().unwrap().pop_front();
        let fallback = self.fallback_ok.load(Ordering::SeqCst);
        Box::pin(async move {
            match step {
                None => outcome(fallback),
                Some(Step::Now(ok)) => outcome(ok),
                Some(Step::After(gate, ok)) => {
                    gate.notified().await;
                    outcome(ok)
                }
                Some(Step::Hang) => std::future::pending().await,
            }
        })
    }
}

pub fn memory_store() -> LocalFallbackStore {
    LocalFallbackStore::new(Arc::new(MemoryBackend::new()))
}

pub fn monitor(probe: Arc<ScriptedProbe>) -> ConnectionMonitor {
    ConnectionMonitor::new(MonitorConfig::default(), probe, memory_store())
}

pub fn monitor_with_timeout(probe: Arc<ScriptedProbe>, timeout: Duration) -> ConnectionMonitor {
    let config = MonitorConfig {
        probe_timeout: timeout,
        ..MonitorConfig::default()
    };
    ConnectionMonitor::new(config, probe, memory_store())
}

/// Yield to the runtime until a probe is in flight
pub async fn wait_until_checking(monitor: &ConnectionMonitor) {
    for _ in 0..1_000 {
        if monitor.status().is_checking {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("probe never started");
}

/// Yield to the runtime until no probe is in flight
pub async fn wait_until_idle(monitor: &ConnectionMonitor) {
    for _ in 0..1_000 {
        if !monitor.status().is_checking {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("probe never finished");
}

/// Yield until the probe has been called `n` times
pub async fn wait_for_calls(probe: &ScriptedProbe, n: usize) {
    for _ in 0..1_000 {
        if probe.calls() >= n {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("expected {} probe calls, saw {}", n, probe.calls());
}
