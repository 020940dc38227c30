//! Client Runtime Module
//!
//! The connection-resilience core of the StudyMate client: it watches the
//! backend, keeps a durable local copy of the user's data, and pushes local
//! changes back once the server is reachable.
//!
//! # Architecture
//!
//! - **`config`** - Environment-driven configuration
//! - **`connection`** - `ConnectionMonitor`: probing, retry counting,
//!   backoff and status broadcasts
//! - **`offline`** - `LocalFallbackStore`: cached tasks, session data, the
//!   demo-mode flag and reconciliation
//! - **`api`** - Task API client used by reconciliation
//! - **`main`** - `studymate-monitor` binary
//!
//! # Example
//!
//! ```rust,no_run
//! // Run the monitor against a local server:
//! // STUDYMATE_API_URL=http://127.0.0.1:5000 cargo run --bin studymate-monitor
//! ```

pub mod api;
pub mod config;
pub mod connection;
pub mod offline;

// Re-export commonly used types
pub use api::{HttpTaskRemote, RemoteTask, TaskRemote};
pub use config::Config;
pub use connection::{
    BackoffPolicy, ConnectionMonitor, ConnectionStatus, HealthProbe, HttpHealthProbe,
    MonitorConfig, StatusSnapshot, SubscriptionId,
};
pub use offline::{FileBackend, LocalFallbackStore, MemoryBackend, Reconciler, StorageBackend};
