//! In-process task store for tests and the demo binary.
//!
//! Keeps one document table per user behind a [`tokio::sync::RwLock`]
//! and fans full snapshots out to subscribers over unbounded channels,
//! mimicking the hosted store's push behavior: an immediate snapshot on
//! subscribe, then one per write. Dead subscriber channels are pruned on
//! the next broadcast.

use std::collections::HashMap;

use chrono::Utc;
use taskdeck_model::{Task, TaskDraft, TaskId, TaskPatch, TaskSnapshot, UserId};
use tokio::sync::{RwLock, mpsc};

use super::{SnapshotFeed, StoreClient, StoreError, StorePush};

/// In-memory store double with per-user collections.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<UserId, UserCollection>>,
}

#[derive(Default)]
struct UserCollection {
    docs: HashMap<TaskId, Task>,
    revision: u64,
    watchers: Vec<mpsc::UnboundedSender<StorePush>>,
}

impl UserCollection {
    fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot::ordered(self.revision, self.docs.values().cloned().collect())
    }

    /// Pushes the current snapshot to every live watcher, dropping any
    /// whose receiving end has gone away.
    fn broadcast(&mut self) {
        let snapshot = self.snapshot();
        self.watchers
            .retain(|watcher| watcher.send(Ok(snapshot.clone())).is_ok());
    }
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot of a user's collection, without subscribing.
    ///
    /// Read-back hook for tests and the demo's dump command.
    pub async fn current_snapshot(&self, user: &UserId) -> TaskSnapshot {
        let collections = self.collections.read().await;
        collections
            .get(user)
            .map(UserCollection::snapshot)
            .unwrap_or_default()
    }

    /// Ends every subscription the user holds with a permission error.
    ///
    /// Drives the subscription-failure path: each watcher receives one
    /// `Err` push and then its feed closes.
    pub async fn revoke(&self, user: &UserId) {
        let mut collections = self.collections.write().await;
        if let Some(collection) = collections.get_mut(user) {
            for watcher in collection.watchers.drain(..) {
                let _ = watcher.send(Err(StoreError::PermissionDenied(user.clone())));
            }
            tracing::debug!(user = %user, "revoked store subscriptions");
        }
    }
}

impl StoreClient for MemoryStore {
    async fn subscribe(&self, user: &UserId) -> Result<SnapshotFeed, StoreError> {
        let mut collections = self.collections.write().await;
        let collection = collections.entry(user.clone()).or_default();

        let (tx, rx) = mpsc::unbounded_channel();
        // The initial push cannot fail: we still hold the receiver.
        let _ = tx.send(Ok(collection.snapshot()));
        collection.watchers.push(tx);

        tracing::debug!(user = %user, watchers = collection.watchers.len(), "subscribed");
        Ok(rx)
    }

    async fn create(&self, user: &UserId, draft: TaskDraft) -> Result<TaskId, StoreError> {
        let mut collections = self.collections.write().await;
        let collection = collections.entry(user.clone()).or_default();

        let now = Utc::now();
        let task = Task {
            id: TaskId::new(),
            title: draft.title,
            description: draft.description,
            due_date: draft.due_date,
            end_date: draft.end_date,
            priority: draft.priority,
            tag: draft.tag,
            repeating: draft.repeating,
            completed: false,
            created_at: now,
            updated_at: now,
        };
        let id = task.id;

        collection.docs.insert(id, task);
        collection.revision += 1;
        collection.broadcast();

        tracing::debug!(user = %user, task = %id, revision = collection.revision, "created task");
        Ok(id)
    }

    async fn update(&self, user: &UserId, id: TaskId, patch: TaskPatch) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let collection = collections
            .get_mut(user)
            .ok_or(StoreError::NotFound(id))?;
        let task = collection
            .docs
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;

        patch.apply(task);
        task.updated_at = Utc::now();
        collection.revision += 1;
        collection.broadcast();

        tracing::debug!(user = %user, task = %id, revision = collection.revision, "updated task");
        Ok(())
    }

    async fn delete(&self, user: &UserId, id: TaskId) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let collection = collections
            .get_mut(user)
            .ok_or(StoreError::NotFound(id))?;

        if collection.docs.remove(&id).is_none() {
            return Err(StoreError::NotFound(id));
        }
        collection.revision += 1;
        collection.broadcast();

        tracing::debug!(user = %user, task = %id, revision = collection.revision, "deleted task");
        Ok(())
    }
}
