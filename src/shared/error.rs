//! Shared Error Types
//!
//! Error types used by the client runtime and the dev server.
//!
//! # Error Categories
//!
//! - `ProbeError` - health probe failures (timeout, network, unhealthy body)
//! - `StorageError` - durable storage failures (I/O, serialization, quota)
//! - `ApiError` - task API request failures
//! - `SyncError` - reconciliation preconditions and API failures
//!
//! Configuration errors live next to the config types in `shared::config`.
//!
//! # Usage
//!
//! ```rust
//! use studymate::shared::error::ProbeError;
//!
//! let error = ProbeError::unhealthy("degraded");
//! assert!(error.to_string().contains("degraded"));
//! ```
//!
//! # Thread Safety
//!
//! All error types are `Send + Sync` and can be safely shared across thread boundaries.
use thiserror::Error;

/// Failure of a single health probe
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The probe did not complete within its deadline
    #[error("Health probe timed out after {timeout_ms} ms")]
    Timeout {
        /// Deadline that was exceeded
        timeout_ms: u64,
    },

    /// The request could not be sent or the connection dropped
    #[error("Network error: {message}")]
    Network {
        /// Human-readable error message
        message: String,
    },

    /// The server answered with a non-2xx status
    #[error("Health endpoint returned HTTP {status}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
    },

    /// The server answered but reported a status other than `ok`
    #[error("Health endpoint reported status '{status}'")]
    Unhealthy {
        /// Reported status field
        status: String,
    },

    /// The body could not be decoded as a health response
    #[error("Invalid health response: {message}")]
    InvalidBody {
        /// Human-readable error message
        message: String,
    },
}

impl ProbeError {
    /// Create a new network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new unhealthy-status error
    pub fn unhealthy(status: impl Into<String>) -> Self {
        Self::Unhealthy {
            status: status.into(),
        }
    }

    /// Whether the failure was a deadline overrun
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { timeout_ms: 0 }
        } else if err.is_decode() {
            Self::InvalidBody {
                message: err.to_string(),
            }
        } else {
            Self::network(err.to_string())
        }
    }
}

/// Durable storage failures
///
/// These never escape `LocalFallbackStore`; they are logged and folded into
/// boolean or default-value results there.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The stored bytes are not a readable value (e.g. invalid UTF-8)
    #[error("Corrupt storage entry {key}: {message}")]
    Corrupt {
        /// Backend key of the entry
        key: String,
        /// Human-readable error message
        message: String,
    },

    /// The backend refused the write because it would exceed its quota
    #[error("Storage quota exceeded: {needed} bytes needed, {available} available")]
    QuotaExceeded {
        /// Bytes the write would have required
        needed: usize,
        /// Bytes left in the quota
        available: usize,
    },
}

/// Task API failures
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("Request failed: {status} - {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, or the canonical reason when it could not be read
        body: String,
    },

    /// Response body did not match the expected shape
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// No auth token is cached
    #[error("Not authenticated")]
    Unauthenticated,
}

/// Reconciliation failures
#[derive(Debug, Error)]
pub enum SyncError {
    /// The monitor last saw the server as unreachable
    #[error("Cannot sync while offline")]
    Offline,

    /// Demo mode keeps all data local
    #[error("Cannot sync while demo mode is enabled")]
    DemoMode,

    /// The local store refused to save the synced data
    #[error("Failed to save synced tasks to local storage")]
    LocalWrite,

    /// The remote rejected the request
    #[error(transparent)]
    Api(#[from] ApiError),
}
