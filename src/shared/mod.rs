//! Shared Module
//!
//! Types shared between the client runtime and the dev server. They are
//! platform-agnostic and designed for JSON serialization, both on the wire
//! and in the local cache.

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Task domain types and cache bookkeeping
pub mod task;

/// Health endpoint wire format
pub mod health;

/// Re-export commonly used types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use error::{ApiError, ProbeError, StorageError, SyncError};
pub use health::HealthResponse;
pub use task::{CachedTask, Priority, Task, TaskDraft, TaskPatch, UserInfo};
