//! Session-scoped task mirror.
//!
//! One [`Session`] ties the signed-in user to a store subscription and
//! keeps the in-memory mirror of their task collection. Every push
//! replaces the mirror wholesale; projections only ever read the mirror,
//! never the store.
//!
//! ```text
//!   store pushes ──► pump task ──► mirror (watch) ──► projections
//!                      │ stale generation? discard
//!                      └► session events (errors) ──► dashboard
//! ```
//!
//! Each attach bumps a generation counter. The pump task carries the
//! generation it was spawned under and a push only applies while that
//! generation is still current, so a push that lands after detach or
//! re-attach dies quietly instead of leaking into the next session.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use taskdeck_model::{Task, TaskId, UserId};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::store::{SnapshotFeed, StoreClient, StoreError, StorePush};

/// Scope of one attached session.
///
/// Captured when a mutation is issued and compared against the current
/// session before any completion effect (like a notice) is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// The attached user.
    pub user: UserId,
    /// Generation counter value at capture time.
    pub generation: u64,
}

/// Observable mirror state.
///
/// `tasks` keeps the store's delivery order (newest creation first) and
/// is shared, not copied, between observers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mirror {
    /// User the mirror belongs to; `None` while detached.
    pub user: Option<UserId>,
    /// The full task collection from the latest applied snapshot.
    pub tasks: Arc<[Task]>,
    /// Store revision of the latest applied snapshot.
    pub revision: u64,
    /// Set when the subscription failed; the tasks shown are the last
    /// good snapshot and will not change until re-attach.
    pub frozen: bool,
}

impl Mirror {
    /// Looks a task up by id in the current snapshot.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }
}

/// Lifecycle events the dashboard turns into notices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The subscription reported an error; the mirror is frozen at the
    /// last good snapshot.
    SubscriptionFailed {
        /// User whose subscription failed.
        user: UserId,
        /// The error the store pushed.
        error: StoreError,
    },
    /// The push feed ended without a detach (store side went away).
    SubscriptionClosed {
        /// User whose feed closed.
        user: UserId,
    },
}

struct SessionState {
    generation: u64,
    user: Option<UserId>,
}

struct Shared {
    state: RwLock<SessionState>,
    mirror_tx: watch::Sender<Mirror>,
}

/// The attach/detach lifecycle around the task mirror.
pub struct Session<S> {
    store: Arc<S>,
    shared: Arc<Shared>,
    pump: Mutex<Option<JoinHandle<()>>>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl<S: StoreClient> Session<S> {
    /// Creates a detached session over the given store. Lifecycle events
    /// are delivered on `events`.
    #[must_use]
    pub fn new(store: Arc<S>, events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        let (mirror_tx, _rx) = watch::channel(Mirror::default());
        Self {
            store,
            shared: Arc::new(Shared {
                state: RwLock::new(SessionState {
                    generation: 0,
                    user: None,
                }),
                mirror_tx,
            }),
            pump: Mutex::new(None),
            events,
        }
    }

    /// Attaches the session to a user's collection.
    ///
    /// An already-attached session detaches first, so the previous
    /// user's mirror is gone before the new subscription starts.
    ///
    /// # Errors
    ///
    /// Returns the store error when the subscription cannot be opened;
    /// the session stays detached in that case.
    pub async fn attach(&self, user: UserId) -> Result<(), StoreError> {
        self.detach();

        let feed = self.store.subscribe(&user).await?;
        let generation = {
            let mut state = self.shared.state.write();
            state.generation += 1;
            state.user = Some(user.clone());
            self.shared.mirror_tx.send_modify(|mirror| {
                *mirror = Mirror {
                    user: Some(user.clone()),
                    ..Mirror::default()
                };
            });
            state.generation
        };

        tracing::info!(user = %user, generation, "session attached");
        let handle = tokio::spawn(run_pump(
            Arc::clone(&self.shared),
            generation,
            feed,
            self.events.clone(),
        ));
        *self.pump.lock() = Some(handle);
        Ok(())
    }

    /// Detaches: stops the pump, clears the mirror, and bumps the
    /// generation so anything still in flight is discarded on arrival.
    pub fn detach(&self) {
        if let Some(handle) = self.pump.lock().take() {
            handle.abort();
        }

        let mut state = self.shared.state.write();
        if let Some(user) = state.user.take() {
            tracing::info!(user = %user, "session detached");
        }
        state.generation += 1;
        self.shared.mirror_tx.send_modify(|mirror| *mirror = Mirror::default());
    }

    /// Watch handle over the mirror; the receiver always holds the
    /// latest state.
    #[must_use]
    pub fn mirror(&self) -> watch::Receiver<Mirror> {
        self.shared.mirror_tx.subscribe()
    }

    /// The mirror as of now.
    #[must_use]
    pub fn current(&self) -> Mirror {
        self.shared.mirror_tx.borrow().clone()
    }

    /// Context for issuing a mutation, or `None` while detached.
    #[must_use]
    pub fn context(&self) -> Option<SessionContext> {
        let state = self.shared.state.read();
        state.user.clone().map(|user| SessionContext {
            user,
            generation: state.generation,
        })
    }

    /// True when a context matches the session as it is right now.
    #[must_use]
    pub fn is_current(&self, context: &SessionContext) -> bool {
        let state = self.shared.state.read();
        state.generation == context.generation && state.user.as_ref() == Some(&context.user)
    }
}

impl<S> Drop for Session<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.pump.get_mut().take() {
            handle.abort();
        }
    }
}

async fn run_pump(
    shared: Arc<Shared>,
    generation: u64,
    mut feed: SnapshotFeed,
    events: mpsc::UnboundedSender<SessionEvent>,
) {
    while let Some(push) = feed.recv().await {
        if !apply(&shared, generation, push, &events) {
            return;
        }
    }

    // Feed ended without a detach: the store side went away. Freeze so
    // the views keep showing the last good snapshot. The guard spans
    // the freeze; attach and detach reset the mirror under the write
    // lock, so the mirror cannot change hands between check and effect.
    let state = shared.state.read();
    if state.generation == generation
        && let Some(user) = state.user.clone()
    {
        shared.mirror_tx.send_modify(|mirror| mirror.frozen = true);
        tracing::warn!(user = %user, "subscription feed closed");
        let _ = events.send(SessionEvent::SubscriptionClosed { user });
    }
}

/// Applies one push under the generation guard. The guard is held
/// across the mirror effect in both arms; attach and detach reset the
/// mirror under the write lock, so a push that passed the check can
/// never land on a session it was not checked against. Returns `false`
/// when the pump should stop (stale generation or a failed
/// subscription).
fn apply(
    shared: &Shared,
    generation: u64,
    push: StorePush,
    events: &mpsc::UnboundedSender<SessionEvent>,
) -> bool {
    let state = shared.state.read();
    if state.generation != generation {
        tracing::debug!(
            generation,
            current = state.generation,
            "discarding push for stale session"
        );
        return false;
    }

    match push {
        Ok(snapshot) => {
            tracing::debug!(
                revision = snapshot.revision,
                tasks = snapshot.len(),
                "mirror replaced"
            );
            shared.mirror_tx.send_modify(|mirror| {
                mirror.tasks = snapshot.tasks.into();
                mirror.revision = snapshot.revision;
            });
            true
        }
        Err(error) => {
            shared.mirror_tx.send_modify(|mirror| mirror.frozen = true);
            tracing::warn!(error = %error, "subscription failed; mirror frozen");
            if let Some(user) = state.user.clone() {
                let _ = events.send(SessionEvent::SubscriptionFailed { user, error });
            }
            false
        }
    }
}
