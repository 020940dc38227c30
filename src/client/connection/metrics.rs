//! # Probe Metrics
//!
//! Counters and latency for health probes, exposed through
//! `ConnectionMonitor::metrics` for diagnostics screens.

use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeMetrics {
    pub total_probes: u64,
    pub successful_probes: u64,
    pub failed_probes: u64,
    pub timeouts: u64,
    pub average_latency: Duration,
    pub last_latency: Option<Duration>,
}

impl ProbeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, latency: Duration) {
        self.total_probes += 1;
        self.successful_probes += 1;
        self.last_latency = Some(latency);

        // Rolling average over successful probes
        let total = self.average_latency * (self.successful_probes - 1) as u32 + latency;
        self.average_latency = total / self.successful_probes as u32;
    }

    pub fn record_failure(&mut self, latency: Duration, timed_out: bool) {
        self.total_probes += 1;
        self.failed_probes += 1;
        self.last_latency = Some(latency);
        if timed_out {
            self.timeouts += 1;
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_probes == 0 {
            0.0
        } else {
            self.successful_probes as f64 / self.total_probes as f64
        }
    }
}
