//! Health endpoint wire format
//!
//! The server answers `GET /api/health` with `{"status":"ok", ...}`. Only the
//! `status` field is significant; anything else is carried along untouched.

use serde::{Deserialize, Serialize};

/// The value of `status` that marks a healthy server
pub const HEALTHY_STATUS: &str = "ok";

/// Body of a health response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl HealthResponse {
    /// A healthy response stamped with the current time
    pub fn ok() -> Self {
        Self {
            status: HEALTHY_STATUS.to_string(),
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
            extra: serde_json::Map::new(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HEALTHY_STATUS
    }
}
