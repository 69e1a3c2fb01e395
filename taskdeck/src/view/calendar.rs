//! Calendar projection and interaction handling.
//!
//! Produces one [`CalendarEvent`] per dated task for an external
//! calendar widget, and translates the widget's interactions into
//! gateway writes or edit-form requests. The form opener is an injected
//! channel handle, passed at construction; the projector has no global
//! way to reach the form.
//!
//! The projection reads the whole mirror, not the filtered list: a drag
//! must never move a task the list happens to be hiding.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use taskdeck_model::{Priority, Task, TaskDraft, TaskId};
use tokio::sync::mpsc;

use crate::gateway::{MutationError, MutationGateway};
use crate::session::SessionContext;
use crate::store::StoreClient;

/// Event color for high priority.
pub const HIGH_COLOR: &str = "#dc2626";
/// Event color for medium priority.
pub const MEDIUM_COLOR: &str = "#f59e0b";
/// Event color for low priority.
pub const LOW_COLOR: &str = "#10b981";
/// Event color for documents without a priority.
pub const UNSET_COLOR: &str = "#6b7280";

/// Opacity for events whose task is completed.
pub const COMPLETED_OPACITY: f32 = 0.6;

/// Palette lookup, covering documents that predate the priority field.
#[must_use]
pub const fn priority_color(priority: Option<Priority>) -> &'static str {
    match priority {
        Some(Priority::High) => HIGH_COLOR,
        Some(Priority::Medium) => MEDIUM_COLOR,
        Some(Priority::Low) => LOW_COLOR,
        None => UNSET_COLOR,
    }
}

/// One event handed to the calendar widget.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    /// Task identity, echoed back by widget interactions.
    pub id: TaskId,
    /// Event caption.
    pub title: String,
    /// Due date of the task.
    pub start: DateTime<Utc>,
    /// End date, falling back to the due date.
    pub end: DateTime<Utc>,
    /// Set when the start has no time-of-day (exact midnight).
    pub all_day: bool,
    /// Palette color for the task's priority.
    pub color: &'static str,
    /// Completion state; completed events render dimmed.
    pub completed: bool,
    /// Tag, carried for widget grouping.
    pub tag: Option<String>,
    /// Stored priority, carried for widget sorting.
    pub priority: Option<Priority>,
    /// Repeat marker.
    pub repeating: bool,
    /// Hover text: title, optional description, priority line.
    pub tooltip: String,
}

impl CalendarEvent {
    /// Render opacity for the event.
    #[must_use]
    pub const fn opacity(&self) -> f32 {
        if self.completed { COMPLETED_OPACITY } else { 1.0 }
    }
}

/// Requests routed to the task form widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditRequest {
    /// Open the create form with a prefilled draft.
    Create(TaskDraft),
    /// Open the edit form for an existing task.
    Edit(Task),
}

/// Sending half of the form-request channel.
pub type EditorHandle = mpsc::UnboundedSender<EditRequest>;

/// Projects tasks into calendar events and handles widget interactions.
pub struct CalendarProjector<S> {
    gateway: Arc<MutationGateway<S>>,
    editor: EditorHandle,
    default_due_time: NaiveTime,
}

impl<S: StoreClient> CalendarProjector<S> {
    /// Creates a projector. `editor` is where form-open requests go;
    /// `default_due_time` is the time-of-day given to slot selections.
    pub const fn new(
        gateway: Arc<MutationGateway<S>>,
        editor: EditorHandle,
        default_due_time: NaiveTime,
    ) -> Self {
        Self {
            gateway,
            editor,
            default_due_time,
        }
    }

    /// Builds the event list from the full mirror. Tasks without a due
    /// date have no event; completed tasks stay, dimmed by the widget.
    #[must_use]
    pub fn events(&self, tasks: &[Task]) -> Vec<CalendarEvent> {
        tasks
            .iter()
            .filter_map(|task| {
                let start = task.due_date?;
                Some(CalendarEvent {
                    id: task.id,
                    title: task.title.clone(),
                    start,
                    end: task.effective_end().unwrap_or(start),
                    all_day: start.time() == NaiveTime::MIN,
                    color: priority_color(task.priority),
                    completed: task.completed,
                    tag: task.tag.clone(),
                    priority: task.priority,
                    repeating: task.repeating,
                    tooltip: tooltip(task),
                })
            })
            .collect()
    }

    /// Slot selection: opens the create form prefilled with the chosen
    /// day at the default time-of-day.
    pub fn select_slot(&self, day: NaiveDate) {
        let due = day.and_time(self.default_due_time).and_utc();
        tracing::debug!(%due, "calendar slot selected");
        let _ = self.editor.send(EditRequest::Create(TaskDraft::for_slot(due)));
    }

    /// Event click: opens the edit form for the clicked task.
    pub fn open_event(&self, tasks: &[Task], id: TaskId) {
        if let Some(task) = tasks.iter().find(|task| task.id == id) {
            let _ = self.editor.send(EditRequest::Edit(task.clone()));
        } else {
            tracing::warn!(task = %id, "clicked event no longer in the mirror");
        }
    }

    /// Event drop on a new day: writes the due date and nothing else.
    ///
    /// # Errors
    ///
    /// Store rejections from the underlying update.
    pub async fn move_event(
        &self,
        context: &SessionContext,
        id: TaskId,
        start: DateTime<Utc>,
    ) -> Result<(), MutationError> {
        self.gateway.move_task(context, id, start).await
    }

    /// Event resize: writes the end date and nothing else.
    ///
    /// # Errors
    ///
    /// Store rejections from the underlying update.
    pub async fn resize_event(
        &self,
        context: &SessionContext,
        id: TaskId,
        end: DateTime<Utc>,
    ) -> Result<(), MutationError> {
        self.gateway.resize_task(context, id, end).await
    }
}

fn tooltip(task: &Task) -> String {
    let mut text = task.title.clone();
    if let Some(description) = task.description.as_deref()
        && !description.is_empty()
    {
        text.push('\n');
        text.push_str(description);
    }
    text.push_str("\nPriority: ");
    text.push_str(task.priority.map_or("none", Priority::as_str));
    text
}
