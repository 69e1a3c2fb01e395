//! Dashboard engine: wires auth state, the task session, projections,
//! and the mutation gateway into one surface the frontend drives.
//!
//! The dashboard owns the session and reacts to two inbound streams:
//! auth-state changes (attach or detach the task session) and session
//! lifecycle events (surface sync failures as notices). Mutations are
//! fire-and-report: each captures the session context first and drops
//! its completion notice if the session changed while the write was in
//! flight.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use taskdeck_model::{Priority, Task, TaskDraft, TaskId};
use tokio::sync::{mpsc, watch};

use crate::auth::AuthState;
use crate::config::ClientConfig;
use crate::filter::{self, TaskFilter};
use crate::gateway::{MutationError, MutationGateway, PendingDelete};
use crate::notify::Notifier;
use crate::session::{Mirror, Session, SessionContext, SessionEvent};
use crate::store::StoreClient;
use crate::view::calendar::{CalendarEvent, CalendarProjector, EditRequest, EditorHandle};
use crate::view::list::{ListAction, ListProjector, ListView};

/// Headline numbers for the stats cards, always over the full mirror.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// High-priority tasks still open; completed ones don't count.
    pub high_priority: usize,
}

impl DashboardStats {
    /// Computes the stats for a task collection.
    #[must_use]
    pub fn of(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|task| task.completed).count();
        let high_priority = tasks
            .iter()
            .filter(|task| !task.completed && task.priority == Some(Priority::High))
            .count();
        Self {
            total,
            completed,
            pending: total - completed,
            high_priority,
        }
    }
}

/// The engine behind the signed-in screen.
pub struct Dashboard<S: StoreClient> {
    session: Arc<Session<S>>,
    gateway: Arc<MutationGateway<S>>,
    notifier: Arc<Notifier>,
    filters: RwLock<TaskFilter>,
    list: ListProjector,
    calendar: CalendarProjector<S>,
    editor: EditorHandle,
    events: tokio::sync::Mutex<Option<mpsc::UnboundedReceiver<SessionEvent>>>,
}

impl<S: StoreClient> Dashboard<S> {
    /// Builds the engine around a store client. `editor` receives the
    /// form-open requests produced by list and calendar interactions.
    pub fn new(
        store: Arc<S>,
        notifier: Arc<Notifier>,
        editor: EditorHandle,
        config: &ClientConfig,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let session = Arc::new(Session::new(Arc::clone(&store), events_tx));
        let gateway = Arc::new(MutationGateway::new(store));
        let calendar = CalendarProjector::new(
            Arc::clone(&gateway),
            editor.clone(),
            config.default_due_time(),
        );
        Self {
            session,
            gateway,
            notifier,
            filters: RwLock::new(TaskFilter::default()),
            list: ListProjector::new(config.date_format.clone()),
            calendar,
            editor,
            events: tokio::sync::Mutex::new(Some(events_rx)),
        }
    }

    /// Drives the dashboard until the auth provider goes away.
    ///
    /// Reacts to the auth state present at startup, then follows every
    /// change. Runs at most once; a second call returns immediately.
    pub async fn run(&self, mut auth: watch::Receiver<AuthState>) {
        let Some(mut events) = self.events.lock().await.take() else {
            tracing::warn!("dashboard loop started twice");
            return;
        };

        let initial = auth.borrow_and_update().clone();
        self.handle_auth_state(initial).await;

        loop {
            tokio::select! {
                changed = auth.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = auth.borrow_and_update().clone();
                    self.handle_auth_state(state).await;
                }
                event = events.recv() => {
                    match event {
                        Some(event) => self.handle_session_event(&event),
                        None => break,
                    }
                }
            }
        }
    }

    async fn handle_auth_state(&self, state: AuthState) {
        match state {
            AuthState::SignedIn(profile) => {
                match self.session.attach(profile.id.clone()).await {
                    Ok(()) => {
                        self.notifier
                            .success(format!("Welcome back, {}!", profile.email));
                    }
                    Err(error) => {
                        tracing::error!(user = %profile.id, %error, "could not attach session");
                        self.notifier.error(format!("Task sync failed: {error}"));
                    }
                }
            }
            AuthState::SignedOut => self.session.detach(),
        }
    }

    fn handle_session_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::SubscriptionFailed { user, error } => {
                tracing::error!(%user, %error, "task subscription failed");
                self.notifier.error(format!("Task sync failed: {error}"));
            }
            SessionEvent::SubscriptionClosed { user } => {
                tracing::warn!(%user, "task subscription closed");
                self.notifier.error("Task sync ended unexpectedly");
            }
        }
    }

    // -- Projections --------------------------------------------------

    /// Watch handle on the mirror, for frontends that re-render on push.
    #[must_use]
    pub fn mirror(&self) -> watch::Receiver<Mirror> {
        self.session.mirror()
    }

    /// Current filtered list projection.
    #[must_use]
    pub fn list_view(&self, now: DateTime<Utc>) -> ListView {
        let mirror = self.session.current();
        self.list.project(&mirror.tasks, &self.filters.read(), now)
    }

    /// Current calendar projection. List filters are deliberately not
    /// applied here.
    #[must_use]
    pub fn calendar_events(&self) -> Vec<CalendarEvent> {
        self.calendar.events(&self.session.current().tasks)
    }

    /// Distinct tags in the mirror, first appearance first.
    #[must_use]
    pub fn tag_options(&self) -> Vec<String> {
        filter::tag_options(&self.session.current().tasks)
    }

    /// Stats over the full mirror, ignoring list filters.
    #[must_use]
    pub fn stats(&self) -> DashboardStats {
        DashboardStats::of(&self.session.current().tasks)
    }

    // -- Filters ------------------------------------------------------

    /// Current list filter selection.
    #[must_use]
    pub fn filters(&self) -> TaskFilter {
        self.filters.read().clone()
    }

    /// Replaces the list filter selection.
    pub fn set_filters(&self, filters: TaskFilter) {
        *self.filters.write() = filters;
    }

    /// Drops every list filter.
    pub fn clear_filters(&self) {
        *self.filters.write() = TaskFilter::default();
    }

    // -- Mutations ----------------------------------------------------

    /// Submits the create form.
    pub async fn submit_create(&self, draft: TaskDraft) {
        let Some(context) = self.signed_in_context("create") else {
            return;
        };
        let outcome = self.gateway.create(&context, draft).await;
        if !self.still_current(&context, "create") {
            return;
        }
        match outcome {
            Ok(_) => {
                self.notifier.success("Task created successfully");
            }
            Err(MutationError::Invalid(_)) => {
                self.notifier.error("Please enter a task title");
            }
            Err(error) => {
                tracing::error!(%error, "create failed");
                self.notifier.error("Failed to save task");
            }
        }
    }

    /// Submits the edit form for an existing task.
    pub async fn submit_update(&self, id: TaskId, draft: TaskDraft) {
        let Some(context) = self.signed_in_context("update") else {
            return;
        };
        let outcome = self.gateway.update(&context, id, draft).await;
        if !self.still_current(&context, "update") {
            return;
        }
        match outcome {
            Ok(()) => {
                self.notifier.success("Task updated successfully");
            }
            Err(MutationError::Invalid(_)) => {
                self.notifier.error("Please enter a task title");
            }
            Err(error) => {
                tracing::error!(task = %id, %error, "update failed");
                self.notifier.error("Failed to save task");
            }
        }
    }

    /// Routes a list row interaction. Delete requests come back as a
    /// pending token the frontend must confirm.
    pub async fn dispatch_list_action(&self, action: ListAction) -> Option<PendingDelete> {
        match action {
            ListAction::ToggleCompleted(id) => {
                let context = self.signed_in_context("toggle")?;
                let mirror = self.session.current();
                let outcome = self.gateway.toggle_completed(&context, &mirror, id).await;
                if let Err(error) = outcome
                    && self.still_current(&context, "toggle")
                {
                    tracing::error!(task = %id, %error, "toggle failed");
                    self.notifier.error("Failed to update task");
                }
                None
            }
            ListAction::OpenForEdit(id) => {
                if let Some(task) = self.session.current().task(id).cloned() {
                    let _ = self.editor.send(EditRequest::Edit(task));
                } else {
                    tracing::warn!(task = %id, "edit request for a task no longer mirrored");
                }
                None
            }
            ListAction::RequestDelete(id) => Some(self.gateway.begin_delete(id)),
        }
    }

    /// Confirms a pending delete.
    pub async fn confirm_delete(&self, pending: PendingDelete) {
        let Some(context) = self.signed_in_context("delete") else {
            return;
        };
        let id = pending.id();
        let outcome = self.gateway.confirm_delete(&context, pending).await;
        if !self.still_current(&context, "delete") {
            return;
        }
        match outcome {
            Ok(()) => {
                self.notifier.success("Task deleted successfully");
            }
            Err(error) => {
                tracing::error!(task = %id, %error, "delete failed");
                self.notifier.error("Failed to delete task");
            }
        }
    }

    /// Calendar slot selection; opens a prefilled create form.
    pub fn select_slot(&self, day: NaiveDate) {
        self.calendar.select_slot(day);
    }

    /// Calendar event click; opens the edit form.
    pub fn open_calendar_event(&self, id: TaskId) {
        self.calendar.open_event(&self.session.current().tasks, id);
    }

    /// Calendar drop onto a new day. Only failures produce a notice.
    pub async fn move_event(&self, id: TaskId, start: DateTime<Utc>) {
        let Some(context) = self.signed_in_context("move") else {
            return;
        };
        if let Err(error) = self.calendar.move_event(&context, id, start).await
            && self.still_current(&context, "move")
        {
            tracing::error!(task = %id, %error, "move failed");
            self.notifier.error("Failed to update task date");
        }
    }

    /// Calendar resize. Only failures produce a notice.
    pub async fn resize_event(&self, id: TaskId, end: DateTime<Utc>) {
        let Some(context) = self.signed_in_context("resize") else {
            return;
        };
        if let Err(error) = self.calendar.resize_event(&context, id, end).await
            && self.still_current(&context, "resize")
        {
            tracing::error!(task = %id, %error, "resize failed");
            self.notifier.error("Failed to update task end date");
        }
    }

    // -- Helpers ------------------------------------------------------

    fn signed_in_context(&self, what: &str) -> Option<SessionContext> {
        let context = self.session.context();
        if context.is_none() {
            tracing::warn!(what, "mutation without an attached session");
            self.notifier.error("Please log in to manage tasks");
        }
        context
    }

    fn still_current(&self, context: &SessionContext, what: &str) -> bool {
        let current = self.session.is_current(context);
        if !current {
            tracing::debug!(what, "session changed mid-flight, dropping the outcome");
        }
        current
    }
}
