//! Shared task data model for `Taskdeck`.
//!
//! Defines the task record as stored in the per-user remote collection,
//! the form payloads that feed writes ([`draft::TaskDraft`],
//! [`patch::TaskPatch`]), and the full-snapshot unit delivered by the
//! store subscription ([`snapshot::TaskSnapshot`]).

pub mod draft;
pub mod patch;
pub mod snapshot;
pub mod task;
pub mod user;

pub use draft::TaskDraft;
pub use patch::TaskPatch;
pub use snapshot::TaskSnapshot;
pub use task::{Priority, Task, TaskId};
pub use user::{UserId, UserProfile};
