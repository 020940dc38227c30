//! StudyMate - Client Connection Resilience
//!
//! StudyMate is a task manager for students. This library is the part of
//! its client that keeps working when the server does not: it detects
//! whether the backend is reachable, retries with backoff, tells the UI
//! about every change, and serves tasks from a durable local cache in demo
//! mode or while offline.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between client and server
//!   - Task domain types, health response, configuration
//!   - Error types
//!
//! - **`client`** - Client-side core
//!   - `ConnectionMonitor`: probing, retry counting, subscriber broadcasts
//!   - `LocalFallbackStore`: cached tasks, session data, demo-mode flag
//!   - Reconciliation of offline edits with the task API
//!
//! - **`backend`** - Dev server answering the health probe (only compiled
//!   with the `ssr` feature)
//!
//! # Feature Flags
//!
//! - **`ssr`** - Enables the Axum dev server (`studymate-server` binary)
//!
//! # Usage
//!
//! ```rust,no_run
//! use studymate::client::{Config, ConnectionMonitor, FileBackend, HttpHealthProbe, LocalFallbackStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let store = LocalFallbackStore::new(Arc::new(FileBackend::open(config.storage_dir())?));
//! let probe = HttpHealthProbe::new(config.health_url(), config.monitor_config().probe_timeout)?;
//! let monitor = ConnectionMonitor::new(config.monitor_config(), Arc::new(probe), store);
//!
//! monitor.subscribe(|status| println!("{:?}", status));
//! monitor.initialize();
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! The monitor runs on tokio. Probes are the only suspension point; status
//! updates, broadcasts and storage access are synchronous. State sits behind
//! `std::sync::Mutex` and is never held across an `.await`.
//!
//! # Error Handling
//!
//! - `Result<T, E>` with `thiserror` enums for internal fallible operations
//! - The public monitor and store contracts do not fail: errors become
//!   `false`, `None` or a default value and are logged with `tracing`

/// Shared types and data structures
pub mod shared;

/// Client-side connection monitor and local store
pub mod client;

/// Dev server (only with the `ssr` feature)
#[cfg(feature = "ssr")]
pub mod backend;
