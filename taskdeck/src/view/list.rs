//! List projection of the filtered mirror.
//!
//! Builds a [`ListView`]: one row per task that passes the current
//! filter, in mirror order, plus the summary line. Rows carry display
//! state only; the widget decides how strike-through, badges, and
//! overdue emphasis actually look.

use chrono::{DateTime, Utc};
use taskdeck_model::{Priority, Task, TaskId};

use crate::filter::{TaskFilter, filter_tasks};

/// Named per-row interactions a list widget can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    /// Flip the completion state.
    ToggleCompleted(TaskId),
    /// Open the edit form.
    OpenForEdit(TaskId),
    /// Start the delete-with-confirmation flow.
    RequestDelete(TaskId),
}

/// Three-way priority indicator. Documents without a priority fold into
/// `Low` so every row gets a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityClass {
    /// High priority marker.
    High,
    /// Medium priority marker.
    Medium,
    /// Low priority marker; also the unset fallback.
    Low,
}

impl PriorityClass {
    /// Indicator for a task's stored priority.
    #[must_use]
    pub const fn of(priority: Option<Priority>) -> Self {
        match priority {
            Some(Priority::High) => Self::High,
            Some(Priority::Medium) => Self::Medium,
            Some(Priority::Low) | None => Self::Low,
        }
    }

    /// Stable name for widget styling hooks.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Badge tone for well-known tag names; anything else renders neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagTone {
    /// Tags mentioning "work".
    Work,
    /// Tags mentioning "personal".
    Personal,
    /// Tags mentioning "health".
    Health,
    /// Any other tag value.
    Other,
}

impl TagTone {
    /// Tone for a tag value, case-insensitive and by substring, so
    /// "workout" and "Remote-Work" both carry the work tone. Work wins
    /// over personal, personal over health, when a tag mentions more
    /// than one.
    #[must_use]
    pub fn of(tag: &str) -> Self {
        let tag = tag.to_lowercase();
        if tag.contains("work") {
            Self::Work
        } else if tag.contains("personal") {
            Self::Personal
        } else if tag.contains("health") {
            Self::Health
        } else {
            Self::Other
        }
    }
}

/// A tag badge on a list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagBadge {
    /// The tag text as stored.
    pub name: String,
    /// Styling tone.
    pub tone: TagTone,
}

/// One rendered list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// Task identity, used to dispatch [`ListAction`]s.
    pub id: TaskId,
    /// Task title.
    pub title: String,
    /// Optional body text.
    pub description: Option<String>,
    /// Relative due label; `None` when the task has no due date.
    pub due_label: Option<String>,
    /// Past due and still open.
    pub overdue: bool,
    /// Priority indicator.
    pub priority: PriorityClass,
    /// Tag badge, if tagged.
    pub tag: Option<TagBadge>,
    /// Repeat marker.
    pub repeating: bool,
    /// Completion state.
    pub completed: bool,
}

/// The full list render model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    /// Rows in mirror order.
    pub items: Vec<ListItem>,
    /// Count line over the filtered set, e.g. `3 tasks (1 completed)`.
    pub summary: String,
}

/// Builds [`ListView`]s from the mirror and the filter selection.
#[derive(Debug, Clone)]
pub struct ListProjector {
    date_format: String,
}

impl ListProjector {
    /// Creates a projector using the given chrono format for dates that
    /// fall outside the relative-label window.
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
        }
    }

    /// Projects the mirror through the filter at the given instant.
    #[must_use]
    pub fn project(&self, tasks: &[Task], filter: &TaskFilter, now: DateTime<Utc>) -> ListView {
        let filtered = filter_tasks(tasks, filter);
        let completed = filtered.iter().filter(|task| task.completed).count();
        let summary = format!("{} tasks ({completed} completed)", filtered.len());

        let items = filtered
            .into_iter()
            .map(|task| ListItem {
                id: task.id,
                title: task.title.clone(),
                description: task.description.clone(),
                due_label: task
                    .due_date
                    .map(|due| due_label(due, now, &self.date_format)),
                overdue: task.is_overdue(now),
                priority: PriorityClass::of(task.priority),
                tag: task
                    .tag
                    .as_deref()
                    .filter(|tag| !tag.is_empty())
                    .map(|tag| TagBadge {
                        name: tag.to_string(),
                        tone: TagTone::of(tag),
                    }),
                repeating: task.repeating,
                completed: task.completed,
            })
            .collect();

        ListView { items, summary }
    }
}

/// Relative label for a due date, by calendar-day difference from now.
///
/// Within a week either way the label is relative (`Today`, `Tomorrow`,
/// `3 days`, `7 days ago`, ...); anything further renders through the
/// configured date format.
#[must_use]
pub fn due_label(due: DateTime<Utc>, now: DateTime<Utc>, date_format: &str) -> String {
    let days = due
        .date_naive()
        .signed_duration_since(now.date_naive())
        .num_days();

    match days {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        2..=7 => format!("{days} days"),
        -7..=-2 => format!("{} days ago", -days),
        _ => due.format(date_format).to_string(),
    }
}
