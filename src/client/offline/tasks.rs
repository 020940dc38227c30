//! Task cache and sync bookkeeping
//!
//! Every mutation loads the full list, changes it in memory and writes the
//! whole list back in a single backend write.

use super::{keys, LocalFallbackStore};
use crate::shared::task::{generate_local_id, CachedTask, TaskDraft, TaskPatch};
use chrono::Utc;

impl LocalFallbackStore {
    /// All cached tasks in insertion order
    pub fn list_tasks(&self) -> Vec<CachedTask> {
        self.get(keys::TASKS, Vec::new())
    }

    /// Replace the cached list
    pub fn save_tasks(&self, tasks: &[CachedTask]) -> bool {
        self.set(keys::TASKS, tasks)
    }

    /// Cache a fresh copy of the server's task list.
    ///
    /// Unsynced records win: a server copy of a record edited here is
    /// dropped in favour of the local one, and unsynced records the server
    /// does not list are appended.
    pub fn cache_server_tasks(&self, server_tasks: Vec<CachedTask>) -> bool {
        let mut pending: Vec<CachedTask> = self
            .list_tasks()
            .into_iter()
            .filter(CachedTask::is_unsynced)
            .collect();

        let mut merged = Vec::with_capacity(server_tasks.len() + pending.len());
        for server in server_tasks {
            match pending.iter().position(|t| t.id == server.id) {
                Some(i) => merged.push(pending.remove(i)),
                None => merged.push(server),
            }
        }
        merged.extend(pending);
        self.save_tasks(&merged)
    }

    /// Append a task created on this device.
    ///
    /// Mints a local id when the draft has none and stamps both timestamps.
    /// A draft whose id is already cached replaces that record in place,
    /// keeping its `created_at`. Returns `None` if the list could not be
    /// persisted.
    pub fn add_task(&self, draft: TaskDraft) -> Option<CachedTask> {
        let now = Utc::now();
        let mut record = CachedTask {
            id: draft.id.unwrap_or_else(generate_local_id),
            task: draft.task,
            is_local: true,
            needs_sync: false,
            created_at: now,
            updated_at: now,
        };

        let mut tasks = self.list_tasks();
        match tasks.iter().position(|t| t.id == record.id) {
            Some(i) => {
                record.created_at = tasks[i].created_at;
                record.updated_at = tasks[i].updated_at;
                record.touch();
                tasks[i] = record.clone();
            }
            None => tasks.push(record.clone()),
        }
        if self.save_tasks(&tasks) {
            tracing::debug!("Cached new local task {}", record.id);
            Some(record)
        } else {
            None
        }
    }

    /// Apply `patch` to the task with `id`.
    ///
    /// Refreshes `updated_at` and flags the record for sync. Returns `None`
    /// if no such task exists or the write was refused.
    pub fn update_task(&self, id: &str, patch: &TaskPatch) -> Option<CachedTask> {
        self.modify_task(id, |record| {
            patch.apply(&mut record.task);
            record.needs_sync = true;
            record.touch();
        })
    }

    /// Remove the task with `id`. Returns whether a record was removed.
    pub fn delete_task(&self, id: &str) -> bool {
        let mut tasks = self.list_tasks();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return false;
        }
        self.save_tasks(&tasks)
    }

    /// Records the server has not confirmed yet
    pub fn list_unsynced(&self) -> Vec<CachedTask> {
        self.list_tasks()
            .into_iter()
            .filter(CachedTask::is_unsynced)
            .collect()
    }

    /// Clear both sync flags on `id`
    pub fn mark_synced(&self, id: &str) -> bool {
        self.modify_task(id, |record| {
            record.is_local = false;
            record.needs_sync = false;
        })
        .is_some()
    }

    /// Flag `id` as changed since the last sync
    pub fn mark_for_sync(&self, id: &str) -> bool {
        self.modify_task(id, |record| {
            record.needs_sync = true;
            record.touch();
        })
        .is_some()
    }

    /// Swap a local id for the id the server assigned, clearing sync flags.
    pub fn confirm_local_task(&self, local_id: &str, server_id: &str) -> bool {
        self.modify_task(local_id, |record| {
            record.id = server_id.to_string();
            record.is_local = false;
            record.needs_sync = false;
        })
        .is_some()
    }

    fn modify_task(&self, id: &str, change: impl FnOnce(&mut CachedTask)) -> Option<CachedTask> {
        let mut tasks = self.list_tasks();
        let record = tasks.iter_mut().find(|t| t.id == id)?;
        change(record);
        let updated = record.clone();
        self.save_tasks(&tasks).then_some(updated)
    }
}
