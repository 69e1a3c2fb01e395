//! Partial task updates.
//!
//! A [`TaskPatch`] carries only the fields a write wants to change.
//! Present fields overwrite the stored value, including overwriting an
//! optional field to `None`; absent fields are left untouched. The store
//! applies the patch and rewrites `updated_at` itself.

use chrono::{DateTime, Utc};

use crate::draft::TaskDraft;
use crate::task::{Priority, Task};

/// A partial update to one task document.
///
/// Nullable fields use a nested `Option`: the outer level is presence in
/// the patch, the inner level is the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// Replacement title. Validated before the patch is built.
    pub title: Option<String>,
    /// Replacement description, possibly clearing it.
    pub description: Option<Option<String>>,
    /// Replacement due date, possibly clearing it.
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// Replacement end date, possibly clearing it.
    pub end_date: Option<Option<DateTime<Utc>>>,
    /// Replacement priority, possibly clearing it.
    pub priority: Option<Option<Priority>>,
    /// Replacement tag, possibly clearing it.
    pub tag: Option<Option<String>>,
    /// Replacement repeat marker.
    pub repeating: Option<bool>,
    /// Replacement completion state.
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Full-form edit: every user-editable field from a normalized draft.
    ///
    /// Completion is not a form field, so it stays untouched.
    #[must_use]
    pub fn from_draft(draft: TaskDraft) -> Self {
        Self {
            title: Some(draft.title),
            description: Some(draft.description),
            due_date: Some(draft.due_date),
            end_date: Some(draft.end_date),
            priority: Some(draft.priority),
            tag: Some(draft.tag),
            repeating: Some(draft.repeating),
            completed: None,
        }
    }

    /// Calendar drag: move the task to a new start, touching nothing else.
    #[must_use]
    pub fn move_to(start: DateTime<Utc>) -> Self {
        Self {
            due_date: Some(Some(start)),
            ..Self::default()
        }
    }

    /// Calendar resize: set a new end, touching nothing else.
    #[must_use]
    pub fn resize_to(end: DateTime<Utc>) -> Self {
        Self {
            end_date: Some(Some(end)),
            ..Self::default()
        }
    }

    /// Completion toggle target state.
    #[must_use]
    pub fn completion(done: bool) -> Self {
        Self {
            completed: Some(done),
            ..Self::default()
        }
    }

    /// True when the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.end_date.is_none()
            && self.priority.is_none()
            && self.tag.is_none()
            && self.repeating.is_none()
            && self.completed.is_none()
    }

    /// Applies the patch to a stored task, consuming the patch.
    ///
    /// Timestamp stamping is the store's job and happens outside.
    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(end_date) = self.end_date {
            task.end_date = end_date;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(tag) = self.tag {
            task.tag = tag;
        }
        if let Some(repeating) = self.repeating {
            task.repeating = repeating;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}
