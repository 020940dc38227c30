//! # Periodic Scheduler
//!
//! A cancellable repeating task on the tokio timer. The first tick fires
//! immediately; later ticks follow the fixed period. A tick that returns
//! `false` ends the schedule.
//!
//! Cancelling aborts the timer task only. Work that a tick has already
//! spawned keeps running.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Debug)]
pub struct PeriodicSchedule {
    period: Duration,
    handle: JoinHandle<()>,
}

impl PeriodicSchedule {
    /// Spawn the timer on the current tokio runtime
    pub fn spawn<F>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !tick() {
                    tracing::debug!("Periodic schedule owner dropped, stopping");
                    break;
                }
            }
        });
        Self { period, handle }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop future ticks. Safe to call more than once.
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for PeriodicSchedule {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_immediately_then_on_period() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let schedule = PeriodicSchedule::spawn(Duration::from_secs(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);

        schedule.cancel();
        schedule.cancel();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_returning_false_stops() {
        let schedule = PeriodicSchedule::spawn(Duration::from_secs(1), || false);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(schedule.is_finished());
    }
}
