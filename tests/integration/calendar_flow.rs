//! Integration tests for the calendar projection: which tasks become
//! events, how drag interactions write back, and the deliberate gap
//! between list filtering and the calendar.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, TimeZone, Utc};
use taskdeck::auth::{AuthClient, MemoryAuth};
use taskdeck::config::ClientConfig;
use taskdeck::dashboard::Dashboard;
use taskdeck::filter::{StatusFilter, TaskFilter};
use taskdeck::notify::Notifier;
use taskdeck::session::Mirror;
use taskdeck::store::memory::MemoryStore;
use taskdeck::view::calendar::{CalendarEvent, EditRequest};
use taskdeck::view::list::ListAction;
use taskdeck_model::{TaskDraft, TaskId, UserProfile};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

const SETTLE: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

struct Deck {
    store: Arc<MemoryStore>,
    auth: MemoryAuth,
    dashboard: Arc<Dashboard<MemoryStore>>,
    requests: mpsc::UnboundedReceiver<EditRequest>,
    engine: JoinHandle<()>,
}

impl Deck {
    fn start() -> Self {
        let store = Arc::new(MemoryStore::new());
        let auth = MemoryAuth::new();
        let notifier = Arc::new(Notifier::default());
        let (editor, requests) = mpsc::unbounded_channel();
        let config = ClientConfig::default();
        let dashboard = Arc::new(Dashboard::new(
            Arc::clone(&store),
            notifier,
            editor,
            &config,
        ));
        let engine = {
            let dashboard = Arc::clone(&dashboard);
            let state = auth.state();
            tokio::spawn(async move { dashboard.run(state).await })
        };
        Self {
            store,
            auth,
            dashboard,
            requests,
            engine,
        }
    }

    async fn sign_in(&self, email: &str) {
        self.auth.sign_in(UserProfile::with_generated_id(email));
        self.mirror_where(|m| m.user.is_some()).await;
    }

    async fn mirror_where(&self, pred: impl Fn(&Mirror) -> bool) -> Mirror {
        let mut rx = self.dashboard.mirror();
        timeout(SETTLE, async {
            loop {
                let current = rx.borrow_and_update().clone();
                if pred(&current) {
                    return current;
                }
                rx.changed().await.expect("mirror channel open");
            }
        })
        .await
        .expect("mirror settled in time")
    }

    async fn create(&self, draft: TaskDraft) -> TaskId {
        let before = self.dashboard.mirror().borrow().revision;
        self.dashboard.submit_create(draft).await;
        let mirror = self.mirror_where(move |m| m.revision > before).await;
        mirror.tasks[0].id
    }

    fn event(&self, id: &TaskId) -> Option<CalendarEvent> {
        self.dashboard
            .calendar_events()
            .into_iter()
            .find(|e| e.id == *id)
    }
}

impl Drop for Deck {
    fn drop(&mut self) {
        self.engine.abort();
    }
}

// --- projection membership ---

#[tokio::test]
async fn undated_tasks_stay_off_the_calendar_but_in_the_list() {
    let deck = Deck::start();
    deck.sign_in("alice@example.com").await;
    deck.create(TaskDraft::titled("Someday")).await;
    let dated = deck
        .create(TaskDraft {
            due_date: Some(Utc.with_ymd_and_hms(2026, 3, 14, 13, 0, 0).unwrap()),
            ..TaskDraft::titled("Dentist")
        })
        .await;

    let events = deck.dashboard.calendar_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, dated);

    let list = deck.dashboard.list_view(Utc::now());
    assert_eq!(list.items.len(), 2, "the list keeps dateless tasks");
}

#[tokio::test]
async fn completed_tasks_appear_in_both_projections() {
    let deck = Deck::start();
    deck.sign_in("alice@example.com").await;
    let id = deck
        .create(TaskDraft {
            due_date: Some(Utc.with_ymd_and_hms(2026, 3, 14, 13, 0, 0).unwrap()),
            ..TaskDraft::titled("Dentist")
        })
        .await;

    deck.dashboard
        .dispatch_list_action(ListAction::ToggleCompleted(id))
        .await;
    deck.mirror_where(|m| m.tasks.iter().any(|t| t.completed))
        .await;

    let event = deck.event(&id).expect("completed tasks stay on the calendar");
    assert!(event.completed);
    assert!((event.opacity() - 0.6).abs() < f32::EPSILON);

    let list = deck.dashboard.list_view(Utc::now());
    assert!(list.items[0].completed);
}

#[tokio::test]
async fn list_filters_do_not_touch_the_calendar() {
    let deck = Deck::start();
    deck.sign_in("alice@example.com").await;
    let id = deck
        .create(TaskDraft {
            due_date: Some(Utc.with_ymd_and_hms(2026, 3, 14, 13, 0, 0).unwrap()),
            ..TaskDraft::titled("Dentist")
        })
        .await;
    deck.dashboard
        .dispatch_list_action(ListAction::ToggleCompleted(id))
        .await;
    deck.mirror_where(|m| m.tasks.iter().any(|t| t.completed))
        .await;

    deck.dashboard
        .set_filters(TaskFilter::default().with_status(StatusFilter::Pending));

    let list = deck.dashboard.list_view(Utc::now());
    assert!(list.items.is_empty(), "the pending filter hides the row");
    assert!(
        deck.event(&id).is_some(),
        "the calendar ignores list filters"
    );
}

// --- drag interactions ---

#[tokio::test]
async fn dropping_an_event_moves_only_the_due_date() {
    let deck = Deck::start();
    deck.sign_in("alice@example.com").await;
    let start = Utc.with_ymd_and_hms(2026, 3, 14, 13, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 3, 14, 14, 30, 0).unwrap();
    let id = deck
        .create(TaskDraft {
            due_date: Some(start),
            end_date: Some(end),
            ..TaskDraft::titled("Dentist")
        })
        .await;

    let dropped_at = Utc.with_ymd_and_hms(2026, 3, 16, 9, 0, 0).unwrap();
    deck.dashboard.move_event(id, dropped_at).await;

    let mirror = deck
        .mirror_where(move |m| m.tasks[0].due_date == Some(dropped_at))
        .await;
    assert_eq!(mirror.tasks[0].end_date, Some(end), "the end date survives");

    let user = mirror.user.expect("signed in");
    let snapshot = deck.store.current_snapshot(&user).await;
    assert_eq!(snapshot.tasks[0].due_date, Some(dropped_at));
}

#[tokio::test]
async fn resizing_touches_only_the_end_date() {
    let deck = Deck::start();
    deck.sign_in("alice@example.com").await;
    let start = Utc.with_ymd_and_hms(2026, 3, 14, 13, 0, 0).unwrap();
    let id = deck
        .create(TaskDraft {
            due_date: Some(start),
            ..TaskDraft::titled("Dentist")
        })
        .await;

    let stretched_to = Utc.with_ymd_and_hms(2026, 3, 14, 16, 0, 0).unwrap();
    deck.dashboard.resize_event(id, stretched_to).await;

    let mirror = deck
        .mirror_where(move |m| m.tasks[0].end_date == Some(stretched_to))
        .await;
    assert_eq!(mirror.tasks[0].due_date, Some(start), "the start survives");

    let event = deck.event(&id).expect("still projected");
    assert_eq!(event.start, start);
    assert_eq!(event.end, stretched_to);
}

// --- editor hand-off ---

#[tokio::test]
async fn slot_selection_prefills_the_default_morning_slot() {
    let mut deck = Deck::start();
    deck.sign_in("alice@example.com").await;

    deck.dashboard
        .select_slot(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());

    match deck.requests.recv().await.expect("form request") {
        EditRequest::Create(draft) => {
            assert_eq!(
                draft.due_date,
                Some(Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap())
            );
            assert!(draft.title.is_empty());
        }
        EditRequest::Edit(task) => panic!("unexpected edit of {}", task.title),
    }
}

#[tokio::test]
async fn clicking_an_event_opens_it_for_editing() {
    let mut deck = Deck::start();
    deck.sign_in("alice@example.com").await;
    let id = deck
        .create(TaskDraft {
            due_date: Some(Utc.with_ymd_and_hms(2026, 3, 14, 13, 0, 0).unwrap()),
            ..TaskDraft::titled("Dentist")
        })
        .await;

    deck.dashboard.open_calendar_event(id);

    match deck.requests.recv().await.expect("form request") {
        EditRequest::Edit(task) => {
            assert_eq!(task.id, id);
            assert_eq!(task.title, "Dentist");
        }
        EditRequest::Create(_) => panic!("expected an edit request"),
    }

    // Clicking an id that is no longer mirrored opens nothing.
    deck.dashboard
        .open_calendar_event(TaskId::from_uuid(uuid::Uuid::nil()));
    assert!(deck.requests.try_recv().is_err());
}
