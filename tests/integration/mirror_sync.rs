//! Integration tests for session attach/detach and mirror sync.
//!
//! Covers immediate snapshot delivery, write echo, per-user isolation,
//! user switching, and the frozen mirror left behind by a dead
//! subscription.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use taskdeck::session::{Mirror, Session, SessionEvent};
use taskdeck::store::memory::MemoryStore;
use taskdeck::store::{StoreClient, StoreError};
use taskdeck_model::{TaskDraft, UserId};
use tokio::sync::{mpsc, watch};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn fixture() -> (
    Arc<MemoryStore>,
    Session<MemoryStore>,
    mpsc::UnboundedReceiver<SessionEvent>,
) {
    let store = Arc::new(MemoryStore::new());
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let session = Session::new(Arc::clone(&store), events_tx);
    (store, session, events_rx)
}

async fn mirror_where(
    mut rx: watch::Receiver<Mirror>,
    pred: impl Fn(&Mirror) -> bool,
) -> Mirror {
    loop {
        let current = rx.borrow_and_update().clone();
        if pred(&current) {
            return current;
        }
        rx.changed().await.expect("mirror channel open");
    }
}

// --- snapshot delivery ---

#[tokio::test]
async fn attach_delivers_the_current_snapshot_immediately() {
    let (store, session, _events) = fixture();
    let alice = UserId::new("alice");
    store
        .create(&alice, TaskDraft::titled("First"))
        .await
        .expect("create");
    store
        .create(&alice, TaskDraft::titled("Second"))
        .await
        .expect("create");

    session.attach(alice.clone()).await.expect("attach");

    let mirror = mirror_where(session.mirror(), |m| m.tasks.len() == 2).await;
    assert_eq!(mirror.user, Some(alice));
    assert_eq!(mirror.tasks[0].title, "Second", "newest creation first");
    assert_eq!(mirror.tasks[1].title, "First");
}

#[tokio::test]
async fn writes_echo_into_the_mirror() {
    let (store, session, _events) = fixture();
    let alice = UserId::new("alice");
    session.attach(alice.clone()).await.expect("attach");
    let before = session.current().revision;

    store
        .create(&alice, TaskDraft::titled("Echoed"))
        .await
        .expect("create");

    let mirror = mirror_where(session.mirror(), move |m| m.revision > before).await;
    assert_eq!(mirror.tasks.len(), 1);
    assert_eq!(mirror.tasks[0].title, "Echoed");
    assert!(!mirror.tasks[0].completed);
    assert_eq!(mirror.tasks[0].created_at, mirror.tasks[0].updated_at);
}

// --- isolation and switching ---

#[tokio::test]
async fn collections_are_isolated_per_user() {
    let (store, session, _events) = fixture();
    let alice = UserId::new("alice");
    let bob = UserId::new("bob");
    store
        .create(&alice, TaskDraft::titled("Alice chore"))
        .await
        .expect("create");
    store
        .create(&bob, TaskDraft::titled("Bob chore"))
        .await
        .expect("create");

    session.attach(alice).await.expect("attach");

    let mirror = mirror_where(session.mirror(), |m| !m.tasks.is_empty()).await;
    assert_eq!(mirror.tasks.len(), 1);
    assert_eq!(mirror.tasks[0].title, "Alice chore");
}

#[tokio::test]
async fn reattach_switches_to_the_new_users_collection() {
    let (store, session, _events) = fixture();
    let alice = UserId::new("alice");
    let bob = UserId::new("bob");
    store
        .create(&alice, TaskDraft::titled("Alice chore"))
        .await
        .expect("create");
    store
        .create(&bob, TaskDraft::titled("Bob chore"))
        .await
        .expect("create");

    session.attach(alice).await.expect("attach alice");
    mirror_where(session.mirror(), |m| !m.tasks.is_empty()).await;

    session.attach(bob.clone()).await.expect("attach bob");

    let mirror = mirror_where(session.mirror(), move |m| {
        m.user.as_ref() == Some(&bob) && !m.tasks.is_empty()
    })
    .await;
    assert_eq!(mirror.tasks.len(), 1);
    assert_eq!(mirror.tasks[0].title, "Bob chore");
}

#[tokio::test]
async fn detach_clears_the_mirror_and_ignores_later_writes() {
    let (store, session, _events) = fixture();
    let alice = UserId::new("alice");
    session.attach(alice.clone()).await.expect("attach");
    store
        .create(&alice, TaskDraft::titled("Visible while attached"))
        .await
        .expect("create");
    mirror_where(session.mirror(), |m| !m.tasks.is_empty()).await;

    session.detach();

    let mirror = session.current();
    assert_eq!(mirror.user, None);
    assert!(mirror.tasks.is_empty());

    // A write after detach must not resurrect anything.
    store
        .create(&alice, TaskDraft::titled("Written after detach"))
        .await
        .expect("create");
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(session.current().tasks.is_empty());
    assert_eq!(session.current().user, None);
}

// --- subscription failure ---

#[tokio::test]
async fn a_dead_subscription_freezes_the_last_snapshot() {
    let (store, session, mut events) = fixture();
    let alice = UserId::new("alice");
    session.attach(alice.clone()).await.expect("attach");
    store
        .create(&alice, TaskDraft::titled("Keep me visible"))
        .await
        .expect("create");
    mirror_where(session.mirror(), |m| !m.tasks.is_empty()).await;

    store.revoke(&alice).await;

    let mirror = mirror_where(session.mirror(), |m| m.frozen).await;
    assert_eq!(mirror.tasks.len(), 1, "last good snapshot stays visible");
    assert_eq!(mirror.tasks[0].title, "Keep me visible");

    let event = events.recv().await.expect("lifecycle event");
    assert_eq!(
        event,
        SessionEvent::SubscriptionFailed {
            user: alice.clone(),
            error: StoreError::PermissionDenied(alice),
        }
    );
}

#[tokio::test]
async fn reattach_after_a_failure_resumes_syncing() {
    let (store, session, _events) = fixture();
    let alice = UserId::new("alice");
    session.attach(alice.clone()).await.expect("attach");
    store
        .create(&alice, TaskDraft::titled("Before the outage"))
        .await
        .expect("create");
    mirror_where(session.mirror(), |m| !m.tasks.is_empty()).await;

    store.revoke(&alice).await;
    mirror_where(session.mirror(), |m| m.frozen).await;

    session.attach(alice.clone()).await.expect("reattach");
    let mirror = mirror_where(session.mirror(), |m| !m.frozen && !m.tasks.is_empty()).await;
    assert_eq!(mirror.tasks.len(), 1);

    store
        .create(&alice, TaskDraft::titled("After the outage"))
        .await
        .expect("create");
    let mirror = mirror_where(session.mirror(), |m| m.tasks.len() == 2).await;
    assert!(!mirror.frozen);
}
