//! Validate-then-write mutation path.
//!
//! Every write goes through the [`MutationGateway`]: drafts are
//! validated and normalized first, and only clean input reaches the
//! store. Writes are fire-and-report: the gateway never touches the
//! mirror; the new state arrives through the subscription echo.
//!
//! Deletes are two-phase: [`MutationGateway::begin_delete`] hands back a
//! [`PendingDelete`] token, and only confirming that token issues the
//! remote delete. Dropping the token cancels.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use taskdeck_model::{Priority, TaskDraft, TaskId, TaskPatch};

use crate::session::{Mirror, SessionContext};
use crate::store::{StoreClient, StoreError};

/// Field-level draft validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    /// The title is empty once trimmed.
    #[error("title is required")]
    EmptyTitle,
}

/// Errors from issuing a mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    /// The draft failed validation; nothing was written.
    #[error(transparent)]
    Invalid(#[from] DraftError),

    /// The task is not in the mirror anymore.
    #[error("task {0} is no longer present")]
    UnknownTask(TaskId),

    /// The store rejected the write.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Checks and normalizes a draft before it is written.
///
/// Trims the title, collapses empty description and tag to `None`, and
/// fills the priority default.
///
/// # Errors
///
/// Returns [`DraftError::EmptyTitle`] when the trimmed title is empty.
pub fn normalize_draft(draft: TaskDraft) -> Result<TaskDraft, DraftError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(DraftError::EmptyTitle);
    }

    Ok(TaskDraft {
        title: title.to_string(),
        description: draft
            .description
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty()),
        due_date: draft.due_date,
        end_date: draft.end_date,
        priority: draft.priority.or(Some(Priority::Medium)),
        tag: draft
            .tag
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty()),
        repeating: draft.repeating,
    })
}

/// A delete that has been requested but not yet confirmed.
///
/// Nothing is written until the token is confirmed; dropping it is the
/// cancel path.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a delete only happens once the token is confirmed"]
pub struct PendingDelete {
    id: TaskId,
}

impl PendingDelete {
    /// The task this token would delete.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }
}

/// Issues validated writes against the store.
pub struct MutationGateway<S> {
    store: Arc<S>,
}

impl<S: StoreClient> MutationGateway<S> {
    /// Creates a gateway over the given store.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Validates a draft and creates the task. The store assigns the id
    /// and stamps both timestamps.
    ///
    /// # Errors
    ///
    /// Validation failures surface as [`MutationError::Invalid`] with no
    /// write issued; store rejections as [`MutationError::Store`].
    pub async fn create(
        &self,
        context: &SessionContext,
        draft: TaskDraft,
    ) -> Result<TaskId, MutationError> {
        let draft = normalize_draft(draft)?;
        let id = self.store.create(&context.user, draft).await?;
        tracing::info!(user = %context.user, task = %id, "created task");
        Ok(id)
    }

    /// Validates a draft and rewrites every form field of an existing
    /// task. Completion state and `created_at` are untouched; the store
    /// stamps `updated_at`.
    ///
    /// # Errors
    ///
    /// Same split as [`MutationGateway::create`].
    pub async fn update(
        &self,
        context: &SessionContext,
        id: TaskId,
        draft: TaskDraft,
    ) -> Result<(), MutationError> {
        let draft = normalize_draft(draft)?;
        self.store
            .update(&context.user, id, TaskPatch::from_draft(draft))
            .await?;
        tracing::info!(user = %context.user, task = %id, "updated task");
        Ok(())
    }

    /// Writes the negation of the task's current completion state.
    ///
    /// Returns the state that was written, for logging; the visible flip
    /// still comes from the subscription echo.
    ///
    /// # Errors
    ///
    /// [`MutationError::UnknownTask`] when the mirror no longer holds the
    /// task, otherwise store rejections.
    pub async fn toggle_completed(
        &self,
        context: &SessionContext,
        mirror: &Mirror,
        id: TaskId,
    ) -> Result<bool, MutationError> {
        let task = mirror.task(id).ok_or(MutationError::UnknownTask(id))?;
        let target = !task.completed;
        self.store
            .update(&context.user, id, TaskPatch::completion(target))
            .await?;
        tracing::debug!(user = %context.user, task = %id, completed = target, "toggled task");
        Ok(target)
    }

    /// Calendar drop: rewrites the due date and nothing else.
    ///
    /// # Errors
    ///
    /// Store rejections only; there is no draft to validate.
    pub async fn move_task(
        &self,
        context: &SessionContext,
        id: TaskId,
        start: DateTime<Utc>,
    ) -> Result<(), MutationError> {
        self.store
            .update(&context.user, id, TaskPatch::move_to(start))
            .await?;
        tracing::debug!(user = %context.user, task = %id, start = %start, "moved task");
        Ok(())
    }

    /// Calendar resize: rewrites the end date and nothing else.
    ///
    /// # Errors
    ///
    /// Store rejections only.
    pub async fn resize_task(
        &self,
        context: &SessionContext,
        id: TaskId,
        end: DateTime<Utc>,
    ) -> Result<(), MutationError> {
        self.store
            .update(&context.user, id, TaskPatch::resize_to(end))
            .await?;
        tracing::debug!(user = %context.user, task = %id, end = %end, "resized task");
        Ok(())
    }

    /// Starts the delete flow. No write happens here.
    pub const fn begin_delete(&self, id: TaskId) -> PendingDelete {
        PendingDelete { id }
    }

    /// Confirms a pending delete and issues the remote write.
    ///
    /// # Errors
    ///
    /// Store rejections, including not-found for an id that is already
    /// gone.
    pub async fn confirm_delete(
        &self,
        context: &SessionContext,
        pending: PendingDelete,
    ) -> Result<(), MutationError> {
        self.store.delete(&context.user, pending.id).await?;
        tracing::info!(user = %context.user, task = %pending.id, "deleted task");
        Ok(())
    }
}
