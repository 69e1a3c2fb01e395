//! Form payload for creating or editing a task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::Priority;

/// The user-editable task fields, exactly as a form submits them.
///
/// Drafts are raw input: the title may be padded or blank, text fields
/// may hold empty strings, and the priority may be missing. The mutation
/// gateway validates and normalizes a draft before anything is written;
/// a `Default` draft is an empty form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Task title as typed.
    pub title: String,
    /// Free-text body.
    #[serde(default)]
    pub description: Option<String>,
    /// Due date chosen in the form or prefilled from a calendar slot.
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// Explicit calendar end.
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    /// `None` means the form left the selector untouched.
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Free-text label.
    #[serde(default)]
    pub tag: Option<String>,
    /// Display-only repeat marker.
    #[serde(default)]
    pub repeating: bool,
}

impl TaskDraft {
    /// Convenience constructor for the common title-only case.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Draft prefilled for a calendar slot selection.
    #[must_use]
    pub fn for_slot(due: DateTime<Utc>) -> Self {
        Self {
            due_date: Some(due),
            ..Self::default()
        }
    }
}
