//! Task domain types
//!
//! `Task` holds the user-facing fields. `CachedTask` wraps it with the
//! bookkeeping the local store needs to reconcile with the server later.
//! All types serialize in camelCase so the cached JSON matches the API.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Prefix of ids minted on the client. Server ids never start with it.
pub const LOCAL_ID_PREFIX: &str = "local_";

/// Task priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// User-owned task fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Input to `LocalFallbackStore::add_task`.
///
/// `id` is set when caching a record that already has a server id; a local
/// id is minted otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub task: Task,
}

impl From<Task> for TaskDraft {
    fn from(task: Task) -> Self {
        Self { id: None, task }
    }
}

/// Partial update. `None` leaves a field untouched; for nullable fields
/// `Some(None)` clears the value. In JSON, an absent key leaves the field
/// alone and `null` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub subject: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Any key that is present, `null` included, becomes `Some`. Absent keys
/// fall back to `default`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl TaskPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Apply every set field to `task`
    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(subject) = &self.subject {
            task.subject = subject.clone();
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

/// A task as held in the local cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedTask {
    pub id: String,
    #[serde(flatten)]
    pub task: Task,
    /// Created offline and never confirmed by the server
    #[serde(default)]
    pub is_local: bool,
    /// Modified locally since the last successful sync
    #[serde(default)]
    pub needs_sync: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CachedTask {
    /// Wrap a task returned by the server. The record starts out synced.
    pub fn from_server(id: impl Into<String>, task: Task) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            task,
            is_local: false,
            needs_sync: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the record still has changes the server has not seen
    pub fn is_unsynced(&self) -> bool {
        self.is_local || self.needs_sync
    }

    /// Refresh `updated_at`. The new value is always strictly later than
    /// the previous one, even on a coarse clock.
    pub fn touch(&mut self) {
        let floor = self.updated_at + Duration::milliseconds(1);
        self.updated_at = Utc::now().max(floor);
    }
}

/// Mint a client-side id: prefix, millisecond timestamp, random suffix
pub fn generate_local_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}{}_{}",
        LOCAL_ID_PREFIX,
        Utc::now().timestamp_millis(),
        &suffix[..9]
    )
}

/// Whether `id` was minted by [`generate_local_id`]
pub fn is_local_id(id: &str) -> bool {
    id.starts_with(LOCAL_ID_PREFIX)
}

/// Cached profile of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_local_ids_are_distinct_and_prefixed() {
        let a = generate_local_id();
        let b = generate_local_id();
        assert_ne!(a, b);
        assert!(is_local_id(&a));
        assert!(!is_local_id("clx0abc123"));
    }

    #[test]
    fn test_patch_applies_only_set_fields() {
        let mut task = Task {
            title: "Read chapter 3".to_string(),
            description: Some("Biology".to_string()),
            priority: Priority::Low,
            ..Task::default()
        };
        let patch = TaskPatch {
            title: Some("Read chapter 4".to_string()),
            description: Some(None),
            ..TaskPatch::default()
        };
        patch.apply(&mut task);

        assert_eq!(task.title, "Read chapter 4");
        assert_eq!(task.description, None);
        assert_eq!(task.priority, Priority::Low);
    }

    #[test]
    fn test_patch_json_null_clears_and_absent_keeps() {
        let patch: TaskPatch =
            serde_json::from_str(r#"{"description":null,"subject":"Physics"}"#).unwrap();
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.subject, Some(Some("Physics".to_string())));
        assert_eq!(patch.due_date, None);

        let mut task = Task {
            description: Some("old".to_string()),
            due_date: Some(Utc::now()),
            ..Task::new("Essay")
        };
        let due = task.due_date;
        patch.apply(&mut task);
        assert_eq!(task.description, None);
        assert_eq!(task.subject.as_deref(), Some("Physics"));
        assert_eq!(task.due_date, due);

        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json["description"], serde_json::Value::Null);
        assert!(json.get("dueDate").is_none());
    }

    #[test]
    fn test_cached_task_json_shape() {
        let cached = CachedTask::from_server("42", Task::new("Essay draft"));
        let value = serde_json::to_value(&cached).unwrap();

        assert_eq!(value["id"], "42");
        assert_eq!(value["title"], "Essay draft");
        assert_eq!(value["isLocal"], false);
        assert_eq!(value["needsSync"], false);
        assert_eq!(value["priority"], "medium");
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_touch_is_strictly_monotonic() {
        let mut cached = CachedTask::from_server("1", Task::new("x"));
        let before = cached.updated_at;
        cached.touch();
        assert!(cached.updated_at > before);
        assert!(cached.updated_at > cached.created_at);
    }

    #[test]
    fn test_draft_deserializes_without_id() {
        let draft: TaskDraft = serde_json::from_str(r#"{"title":"Flashcards"}"#).unwrap();
        assert_eq!(draft.id, None);
        assert_eq!(draft.task.title, "Flashcards");
        assert!(!draft.task.completed);
    }
}
