//! Remote document store abstraction.
//!
//! Defines the [`StoreClient`] trait the sync engine is written against.
//! The hosted backend keeps one task collection per user and pushes the
//! full collection to every subscriber after each write. Concrete
//! implementations:
//! - [`memory::MemoryStore`], an in-process store for tests and the
//!   demo binary.

pub mod memory;

use taskdeck_model::{TaskDraft, TaskId, TaskPatch, TaskSnapshot, UserId};
use tokio::sync::mpsc;

/// One subscription delivery: a full snapshot, or the error that ended
/// the subscription.
pub type StorePush = Result<TaskSnapshot, StoreError>;

/// Receiving end of a subscription. The store pushes the current
/// snapshot immediately on subscribe, then once per observed write.
/// The channel closing means the subscription is over.
pub type SnapshotFeed = mpsc::UnboundedReceiver<StorePush>;

/// Errors surfaced by store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No task with this id exists in the user's collection.
    #[error("task {0} not found")]
    NotFound(TaskId),

    /// The user may not read or write this collection.
    #[error("permission denied for user {0}")]
    PermissionDenied(UserId),

    /// The backend could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Async client for the per-user task collection.
///
/// Writes are observed only through the subscription echo: a successful
/// `create`/`update`/`delete` means the store accepted the write, and
/// the resulting state arrives as the next snapshot push. Callers never
/// patch local state from the return value.
///
/// Subscriptions deliver the collection ordered newest-creation-first
/// (ties by id); consumers keep that order as-is.
pub trait StoreClient: Send + Sync {
    /// Opens a snapshot subscription for the user's task collection.
    ///
    /// The current snapshot is pushed immediately, so a fresh subscriber
    /// never waits for a write to see state.
    fn subscribe(
        &self,
        user: &UserId,
    ) -> impl std::future::Future<Output = Result<SnapshotFeed, StoreError>> + Send;

    /// Creates a task from a draft that has already been validated and
    /// normalized. The store assigns the id and both timestamps.
    fn create(
        &self,
        user: &UserId,
        draft: TaskDraft,
    ) -> impl std::future::Future<Output = Result<TaskId, StoreError>> + Send;

    /// Applies a partial update. The store rewrites `updated_at` and
    /// leaves `created_at` untouched.
    fn update(
        &self,
        user: &UserId,
        id: TaskId,
        patch: TaskPatch,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Removes a task document.
    fn delete(
        &self,
        user: &UserId,
        id: TaskId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
