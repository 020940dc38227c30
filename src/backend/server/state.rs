//! Shared server state

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// State handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub started_at: Arc<DateTime<Utc>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            started_at: Arc::new(Utc::now()),
        }
    }

    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - *self.started_at).num_seconds()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
