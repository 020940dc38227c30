//! # Backoff
//!
//! Exponential backoff with additive jitter for callers that schedule
//! manual retries. The periodic scheduler does not use it; it runs on a
//! fixed interval.
//!
//! `delay = min(base * 2^retry_count, max) + uniform(0, jitter * that)`

use crate::shared::config::{AppConfig, DEFAULT_BACKOFF_BASE_MS, DEFAULT_BACKOFF_MAX_MS};
use std::time::Duration;

/// Default jitter fraction
pub const DEFAULT_JITTER: f64 = 0.1;

/// Exponential backoff configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    /// First step
    pub base: Duration,
    /// Cap applied before jitter
    pub max: Duration,
    /// Jitter as a fraction of the capped delay (0.0 to 1.0)
    pub jitter: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(DEFAULT_BACKOFF_BASE_MS),
            max: Duration::from_millis(DEFAULT_BACKOFF_MAX_MS),
            jitter: DEFAULT_JITTER,
        }
    }
}

impl BackoffPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            base: Duration::from_millis(config.backoff_base_ms),
            max: Duration::from_millis(config.backoff_max_ms),
            jitter: DEFAULT_JITTER,
        }
    }

    /// Delay before the next retry, with a fresh random jitter
    pub fn delay_for(&self, retry_count: u32) -> Duration {
        self.delay_with_jitter(retry_count, rand::random::<f64>())
    }

    /// Deterministic form of [`delay_for`](Self::delay_for); `sample` is the
    /// jitter draw in `[0, 1]`.
    pub fn delay_with_jitter(&self, retry_count: u32, sample: f64) -> Duration {
        let exponential = self.base.saturating_mul(2u32.saturating_pow(retry_count));
        let delay = exponential.min(self.max);
        delay + delay.mul_f64(self.jitter * sample.clamp(0.0, 1.0))
    }

    /// Largest delay the policy can produce
    pub fn ceiling(&self) -> Duration {
        self.max + self.max.mul_f64(self.jitter)
    }
}
