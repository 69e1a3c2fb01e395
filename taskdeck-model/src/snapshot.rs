//! Full-collection snapshots as pushed by the store subscription.

use serde::{Deserialize, Serialize};

use crate::task::Task;

/// One subscription push: the complete ordered task collection.
///
/// Snapshots replace the client mirror wholesale; there is no diffing.
/// The revision counts writes observed by the store and strictly
/// increases within one subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    /// Store write counter at the time of the push.
    pub revision: u64,
    /// Every task in the collection, newest creation first.
    pub tasks: Vec<Task>,
}

impl TaskSnapshot {
    /// Builds a snapshot, imposing the collection order.
    #[must_use]
    pub fn ordered(revision: u64, mut tasks: Vec<Task>) -> Self {
        sort_newest_first(&mut tasks);
        Self { revision, tasks }
    }

    /// Number of tasks in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Sorts a collection into delivery order: `created_at` descending, with
/// ties broken by id ascending so equal-instant creations order
/// deterministically.
pub fn sort_newest_first(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
