//! The task record and its field types.
//!
//! A [`Task`] is one document in a user's remote task collection. The id
//! and both timestamps are assigned by the store; everything else comes
//! from user input. Remote documents written by older clients may lack
//! optional fields, so those deserialize leniently via serde defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a task document, assigned by the store.
///
/// Opaque: creation order lives in [`Task::created_at`], not in the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a fresh random task identifier (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `TaskId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task priority as chosen in the task form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Urgent work.
    High,
    /// The form default.
    Medium,
    /// Can wait.
    Low,
}

impl Priority {
    /// All priorities in display order, highest first.
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Returns the lowercase name used in stored documents and filters.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Parses the lowercase document form. Returns `None` for anything else.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One task document as delivered by the store subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier, unique within the user's collection.
    pub id: TaskId,
    /// Non-empty after trimming; enforced before any write.
    pub title: String,
    /// Optional free-text body. Empty strings are normalized to `None`.
    #[serde(default)]
    pub description: Option<String>,
    /// When the task is due. `None` keeps the task off the calendar.
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// Calendar end. The effective end falls back to `due_date`.
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    /// `None` means the document predates the priority field.
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Free-text label. Empty strings are normalized to `None`.
    #[serde(default)]
    pub tag: Option<String>,
    /// Display-only marker; no recurrence expansion happens anywhere.
    #[serde(default)]
    pub repeating: bool,
    /// Toggled from the list view.
    #[serde(default)]
    pub completed: bool,
    /// Store-assigned at creation, never rewritten afterwards.
    pub created_at: DateTime<Utc>,
    /// Store-assigned on every write, creation included.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// True when the task is past due and still open.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < now)
    }

    /// Calendar end instant: the explicit end date, else the due date.
    ///
    /// `None` when the task has no due date at all, in which case it is
    /// not a calendar event to begin with.
    #[must_use]
    pub fn effective_end(&self) -> Option<DateTime<Utc>> {
        self.end_date.or(self.due_date)
    }
}
