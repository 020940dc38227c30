//! # Connection Status
//!
//! Values published by `ConnectionMonitor`.
//!
//! - `ConnectionStatus`: what every subscriber receives on each broadcast
//! - `StatusSnapshot`: the UI-facing view, which adds the retry ceiling and
//!   the demo-mode flag (e.g. "Attempt 3/5")

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Broadcast payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    /// Outcome of the last applied probe
    pub is_online: bool,
    /// True while at least one probe is in flight
    pub is_checking: bool,
    /// Consecutive failed probes, saturating at the retry ceiling
    pub retry_count: u32,
    /// Start time of the most recent probe
    pub last_check: Option<DateTime<Utc>>,
}

impl ConnectionStatus {
    /// Combine with the retry ceiling and demo flag for display
    pub fn snapshot(&self, max_retries: u32, is_demo_mode: bool) -> StatusSnapshot {
        StatusSnapshot {
            is_online: self.is_online,
            is_checking: self.is_checking,
            retry_count: self.retry_count,
            max_retries,
            last_check: self.last_check,
            is_demo_mode,
        }
    }
}

/// Full status as returned by `ConnectionMonitor::status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub is_online: bool,
    pub is_checking: bool,
    pub retry_count: u32,
    pub max_retries: u32,
    pub last_check: Option<DateTime<Utc>>,
    pub is_demo_mode: bool,
}

impl StatusSnapshot {
    /// The subscriber-facing subset
    pub fn connection(&self) -> ConnectionStatus {
        ConnectionStatus {
            is_online: self.is_online,
            is_checking: self.is_checking,
            retry_count: self.retry_count,
            last_check: self.last_check,
        }
    }

    /// Short banner text
    pub fn describe(&self) -> String {
        if self.is_demo_mode {
            "Demo mode: working from local data".to_string()
        } else if self.is_checking {
            "Checking connection...".to_string()
        } else if self.is_online {
            "Connected".to_string()
        } else if self.retry_count >= self.max_retries {
            format!(
                "Server unreachable after {} attempts; demo mode available",
                self.max_retries
            )
        } else {
            format!("Offline (attempt {}/{})", self.retry_count, self.max_retries)
        }
    }
}
