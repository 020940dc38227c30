//! # Reconciliation
//!
//! Pushes tasks changed on this device back to the server once it is
//! reachable, and refreshes the cache from the server.
//!
//! - Records with `is_local` are created remotely; the local id is replaced
//!   by the id the server assigns.
//! - Records with `needs_sync` are updated remotely.
//! - A failed record stays unsynced and is retried on the next run.
//!
//! Deletions are not pushed. A task deleted offline that the server already
//! knows about comes back on the next refresh.

use super::LocalFallbackStore;
use crate::client::api::TaskRemote;
use crate::client::connection::StatusSnapshot;
use crate::shared::error::{ApiError, SyncError};
use chrono::Utc;
use std::sync::Arc;

/// Outcome of one push
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationReport {
    /// Records the server accepted
    pub pushed: usize,
    /// Records left unsynced
    pub failed: usize,
}

impl ReconciliationReport {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// Drives sync between the local store and a [`TaskRemote`]
#[derive(Clone)]
pub struct Reconciler {
    remote: Arc<dyn TaskRemote>,
}

impl Reconciler {
    pub fn new(remote: Arc<dyn TaskRemote>) -> Self {
        Self { remote }
    }

    fn ensure_reachable(status: &StatusSnapshot) -> Result<(), SyncError> {
        if status.is_demo_mode {
            return Err(SyncError::DemoMode);
        }
        if !status.is_online {
            return Err(SyncError::Offline);
        }
        Ok(())
    }

    /// Push every unsynced record. Stamps the last-sync time when done.
    pub async fn push_unsynced(
        &self,
        store: &LocalFallbackStore,
        status: &StatusSnapshot,
    ) -> Result<ReconciliationReport, SyncError> {
        Self::ensure_reachable(status)?;
        let token = store.auth_token().ok_or(ApiError::Unauthenticated)?;

        let mut report = ReconciliationReport::default();
        for record in store.list_unsynced() {
            let result = if record.is_local {
                self.remote
                    .create_task(&token, &record.task)
                    .await
                    .map(|created| store.confirm_local_task(&record.id, &created.id))
            } else {
                self.remote
                    .update_task(&token, &record.id, &record.task)
                    .await
                    .map(|_| store.mark_synced(&record.id))
            };

            match result {
                Ok(true) => report.pushed += 1,
                Ok(false) => {
                    // Server has it, but the local flags could not be cleared
                    tracing::warn!("Task {} pushed but local record was not updated", record.id);
                    report.failed += 1;
                }
                Err(ApiError::Status { status: 401, .. }) => {
                    tracing::warn!("Auth token rejected during sync; stopping");
                    return Err(ApiError::Unauthenticated.into());
                }
                Err(e) => {
                    tracing::warn!("Failed to sync task {}: {}", record.id, e);
                    report.failed += 1;
                }
            }
        }

        store.set_last_sync(Utc::now());
        tracing::info!(
            "Sync finished: {} pushed, {} failed",
            report.pushed,
            report.failed
        );
        Ok(report)
    }

    /// Replace the cache with the server's list, keeping unsynced records.
    /// Returns the number of server tasks cached, or `LocalWrite` if the
    /// store refused the write.
    pub async fn refresh_from_server(
        &self,
        store: &LocalFallbackStore,
        status: &StatusSnapshot,
    ) -> Result<usize, SyncError> {
        Self::ensure_reachable(status)?;
        let token = store.auth_token().ok_or(ApiError::Unauthenticated)?;

        let remote = self.remote.fetch_tasks(&token).await?;
        let count = remote.len();
        if !store.cache_server_tasks(remote.into_iter().map(Into::into).collect()) {
            tracing::warn!("Fetched {} tasks but could not cache them", count);
            return Err(SyncError::LocalWrite);
        }
        Ok(count)
    }
}
