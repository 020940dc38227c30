//! # Local Fallback Store
//!
//! Durable key-value persistence for data the app needs when the server is
//! unreachable or demo mode is on: cached tasks, the user profile, the auth
//! token, the last known server status, the last sync time and the demo flag.
//!
//! ## Contract
//!
//! Nothing in here returns an error to the caller. Storage failures are
//! logged and folded into the return value:
//!
//! - reads return the supplied default when the key is missing or corrupt,
//!   and a corrupt entry is deleted on the way out
//! - writes return `false` when the backend refuses them (quota, I/O)
//! - removals are best-effort
//!
//! Every list mutation rewrites the whole list in one backend write.
//!
//! ## Key Components
//!
//! - `backend.rs`: `StorageBackend` trait with memory and file implementations
//! - `tasks.rs`: task CRUD and sync bookkeeping
//! - `session.rs`: user, token, server status, last sync, demo flag
//! - `reconciliation.rs`: pushes unsynced tasks once the server is back
//!
//! ## Usage
//!
//! ```rust,no_run
//! use studymate::client::offline::{LocalFallbackStore, MemoryBackend};
//! use studymate::shared::Task;
//! use std::sync::Arc;
//!
//! let store = LocalFallbackStore::new(Arc::new(MemoryBackend::new()));
//! let cached = store.add_task(Task::new("Revise calculus").into());
//! assert!(cached.map(|t| t.is_local).unwrap_or(false));
//! ```

pub mod backend;
pub mod reconciliation;
pub mod session;
pub mod tasks;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use reconciliation::{ReconciliationReport, Reconciler};
pub use session::PersistedServerStatus;

use crate::shared::config::DEFAULT_STORAGE_PREFIX;
use crate::shared::error::StorageError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Unprefixed key names
pub mod keys {
    pub const TASKS: &str = "tasks";
    pub const USER: &str = "user";
    pub const TOKEN: &str = "token";
    pub const SERVER_STATUS: &str = "server_status";
    pub const LAST_SYNC: &str = "last_sync";
    pub const DEMO_MODE: &str = "demo_mode";

    pub const ALL: [&str; 6] = [TASKS, USER, TOKEN, SERVER_STATUS, LAST_SYNC, DEMO_MODE];
}

/// JSON-over-`StorageBackend` store with a namespaced key space
#[derive(Clone)]
pub struct LocalFallbackStore {
    backend: Arc<dyn StorageBackend>,
    prefix: String,
}

impl std::fmt::Debug for LocalFallbackStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalFallbackStore")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl LocalFallbackStore {
    /// Store using the default `studymate_` prefix
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_prefix(backend, DEFAULT_STORAGE_PREFIX)
    }

    pub fn with_prefix(backend: Arc<dyn StorageBackend>, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Read and decode `key`.
    ///
    /// Returns `default` when the key is absent or unreadable. An entry that
    /// fails to decode is removed so the next read starts clean.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get_opt(key).unwrap_or(default)
    }

    /// Like [`get`](Self::get) with `None` as the default
    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let full_key = self.full_key(key);
        let raw = match self.backend.get_raw(&full_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e @ StorageError::Corrupt { .. }) => {
                tracing::warn!("Discarding corrupt local storage entry {}: {}", full_key, e);
                self.remove(key);
                return None;
            }
            Err(e) => {
                tracing::warn!("Failed to read {} from local storage: {}", full_key, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Discarding corrupt local storage entry {}: {}", full_key, e);
                self.remove(key);
                None
            }
        }
    }

    /// Encode and write `value`. Returns `false` if the write was refused.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let full_key = self.full_key(key);
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to serialize {} for local storage: {}", full_key, e);
                return false;
            }
        };
        match self.backend.set_raw(&full_key, &raw) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to write {} to local storage: {}", full_key, e);
                false
            }
        }
    }

    /// Best-effort delete
    pub fn remove(&self, key: &str) {
        let full_key = self.full_key(key);
        if let Err(e) = self.backend.remove(&full_key) {
            tracing::warn!("Failed to remove {} from local storage: {}", full_key, e);
        }
    }

    /// Remove every key carrying this store's prefix (logout / reset)
    pub fn clear_all(&self) {
        let owned: Vec<String> = match self.backend.keys() {
            Ok(all) => all
                .into_iter()
                .filter(|k| k.starts_with(&self.prefix))
                .collect(),
            Err(e) => {
                tracing::warn!("Failed to list local storage keys, clearing known keys only: {}", e);
                keys::ALL.iter().map(|k| self.full_key(k)).collect()
            }
        };
        for key in owned {
            if let Err(e) = self.backend.remove(&key) {
                tracing::warn!("Failed to remove {} from local storage: {}", key, e);
            }
        }
        tracing::debug!("Cleared local storage under prefix {}", self.prefix);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (Arc<MemoryBackend>, LocalFallbackStore) {
        let backend = Arc::new(MemoryBackend::new());
        let store = LocalFallbackStore::new(backend.clone());
        (backend, store)
    }

    #[test]
    fn test_get_missing_returns_default() {
        let (_, store) = store();
        assert_eq!(store.get("missing", 7u32), 7);
        assert_eq!(store.get_opt::<String>("missing"), None);
    }

    #[test]
    fn test_set_then_get() {
        let (backend, store) = store();
        assert!(store.set("answer", &42u32));
        assert_eq!(store.get("answer", 0u32), 42);
        assert_eq!(
            backend.get_raw("studymate_answer").unwrap(),
            Some("42".to_string())
        );
    }

    #[test]
    fn test_corrupt_entry_is_dropped() {
        let (backend, store) = store();
        backend.set_raw("studymate_tasks", "{not json").unwrap();

        let tasks: Vec<u32> = store.get(keys::TASKS, Vec::new());
        assert!(tasks.is_empty());
        assert_eq!(backend.get_raw("studymate_tasks").unwrap(), None);

        // Second read has nothing left to clean up
        let tasks: Vec<u32> = store.get(keys::TASKS, Vec::new());
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_type_mismatch_counts_as_corrupt() {
        let (backend, store) = store();
        assert!(store.set("flag", "yes"));
        assert!(!store.get("flag", false));
        assert_eq!(backend.get_raw("studymate_flag").unwrap(), None);
    }

    #[test]
    fn test_set_returns_false_on_quota() {
        let backend = Arc::new(MemoryBackend::with_quota(16));
        let store = LocalFallbackStore::new(backend);
        assert!(!store.set("tasks", &vec!["a long enough value"; 4]));
        assert_eq!(store.get_opt::<Vec<String>>("tasks"), None);
    }

    #[test]
    fn test_clear_all_keeps_foreign_keys() {
        let (backend, store) = store();
        store.set(keys::TOKEN, "abc");
        store.set(keys::DEMO_MODE, &true);
        backend.set_raw("other_app_key", "1").unwrap();

        store.clear_all();

        assert_eq!(store.get_opt::<String>(keys::TOKEN), None);
        assert!(!store.get(keys::DEMO_MODE, false));
        assert_eq!(backend.get_raw("other_app_key").unwrap(), Some("1".to_string()));
    }
}
