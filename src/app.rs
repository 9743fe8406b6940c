//! The tracker service: command surface and published state.
//!
//! Presentation issues fire-and-forget commands and observes results through
//! watch-channel snapshots; commands never return values. All ledger
//! mutations funnel through the single `TicketLedger`, whose locking keeps
//! each logical operation atomic, and network results are applied here after
//! the call completes, never from inside the transport layer.

use crate::auth::{AuthSession, TokenAcquirer};
use crate::error::ErrorKind;
use crate::ledger::TicketLedger;
use crate::source::{looks_like_project_id, RemoteTicketSource};
use crate::store::SessionStore;
use crate::ticket::Ticket;
use log::{info, warn};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;

/// Display name shown until the configured project resolves.
pub const PROJECT_NAME_PLACEHOLDER: &str = "Tickets";

/// Everything presentation needs to render, published on every change.
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub authenticated: bool,
    pub loading: bool,
    pub showing_completed: bool,
    pub project_name: String,
    pub tickets: Vec<Ticket>,
    pub completed_tickets: Vec<Ticket>,
    pub last_error: Option<ErrorKind>,
}

struct UiFlags {
    loading: bool,
    showing_completed: bool,
    project_name: String,
    last_error: Option<ErrorKind>,
}

/// Owns the auth session, remote source and ticket ledger, and exposes the
/// command surface presentation drives.
pub struct TicketTracker {
    store: SessionStore,
    auth: AuthSession,
    source: RemoteTicketSource,
    ledger: TicketLedger,
    flags: Mutex<UiFlags>,
    state_tx: watch::Sender<StateSnapshot>,
}

/// Handle for the recurring accrual task. Stopping it (or dropping the
/// handle) cancels the task so a shut-down tracker is never ticked.
pub struct TickerHandle {
    handle: JoinHandle<()>,
}

impl TickerHandle {
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl TicketTracker {
    pub fn new(store: SessionStore) -> Self {
        Self::with_base_url(store, asana_api::config::DEFAULT_API_BASE)
    }

    pub fn with_base_url(store: SessionStore, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let auth = AuthSession::with_base_url(store.clone(), base_url);
        let ledger = TicketLedger::new(store.clone());
        let flags = UiFlags {
            loading: false,
            showing_completed: false,
            project_name: PROJECT_NAME_PLACEHOLDER.to_string(),
            last_error: None,
        };

        let snapshot = ledger.snapshot();
        let initial = StateSnapshot {
            authenticated: auth.is_authenticated(),
            loading: false,
            showing_completed: false,
            project_name: flags.project_name.clone(),
            tickets: snapshot.active,
            completed_tickets: snapshot.completed,
            last_error: None,
        };
        let (state_tx, _) = watch::channel(initial);

        Self {
            store,
            auth,
            source: RemoteTicketSource::new(),
            ledger,
            flags: Mutex::new(flags),
            state_tx,
        }
    }

    /// Subscribes to published state. The receiver immediately holds the
    /// current snapshot.
    pub fn subscribe(&self) -> watch::Receiver<StateSnapshot> {
        self.state_tx.subscribe()
    }

    pub fn current_state(&self) -> StateSnapshot {
        self.state_tx.borrow().clone()
    }

    /// Runs the interactive authentication flow and, on success, refreshes
    /// the ticket list.
    pub async fn authenticate(&self, acquirer: &dyn TokenAcquirer) {
        if self.auth.authenticate(acquirer).await {
            self.set_error(None);
            self.publish();
            self.refresh(false).await;
        } else {
            self.set_error(Some(ErrorKind::Unauthenticated));
            self.publish();
        }
    }

    /// Signs out: discards the credential and all tracked tickets.
    pub fn clear_authentication(&self) {
        self.auth.clear();
        self.ledger.clear();
        self.set_error(None);
        self.publish();
    }

    /// Fetches the remote ticket list and merges it into the ledger.
    ///
    /// On a credential rejection the stored token is discarded and the
    /// authenticated flag flips so presentation can offer re-authentication;
    /// there is no silent retry. On a missing project the existing ticket
    /// state is left untouched. A refresh racing another refresh is not
    /// fenced: a late stale response may overwrite a newer one.
    pub async fn refresh(&self, force_reset: bool) {
        if !self.auth.is_authenticated() {
            self.set_error(Some(ErrorKind::Unauthenticated));
            self.publish();
            return;
        }
        let Some(project_id) = self.store.load_project_id() else {
            warn!("Refresh requested with no project configured");
            self.set_error(Some(ErrorKind::InvalidInput));
            self.publish();
            return;
        };

        self.set_loading(true);
        self.publish();

        let client = match self.auth.client() {
            Ok(client) => client,
            Err(kind) => {
                self.set_error(Some(kind));
                self.set_loading(false);
                self.publish();
                return;
            }
        };

        self.resolve_project_name_if_needed(&client, &project_id)
            .await;

        match self.source.fetch_tickets(&client, &project_id).await {
            Ok(remote) => {
                self.ledger.merge(remote, force_reset);
                self.set_error(None);
            }
            Err(ErrorKind::Unauthenticated) => {
                self.auth.invalidate();
                self.set_error(Some(ErrorKind::Unauthenticated));
            }
            Err(kind) => {
                warn!("Refresh failed: {}", kind);
                self.set_error(Some(kind));
            }
        }

        self.set_loading(false);
        self.publish();
    }

    pub fn toggle_tracking(&self, ticket_id: &str) {
        self.ledger.toggle_tracking(ticket_id);
        self.publish();
    }

    pub fn complete(&self, ticket_id: &str) {
        self.ledger.complete(ticket_id);
        self.publish();
    }

    pub fn toggle_completed_visibility(&self) {
        {
            let mut flags = self.flags.lock().unwrap();
            flags.showing_completed = !flags.showing_completed;
        }
        self.publish();
    }

    /// Stores a new project selection. The id must be a non-empty digit
    /// string; when a session is available the id is probed remotely and the
    /// display name re-resolved.
    pub async fn save_project_selection(&self, project_id: &str) {
        let trimmed = project_id.trim();
        if !looks_like_project_id(trimmed) {
            self.set_error(Some(ErrorKind::InvalidInput));
            self.publish();
            return;
        }

        self.store.save_project_id(trimmed);
        self.set_project_name(PROJECT_NAME_PLACEHOLDER.to_string());
        self.set_error(None);
        info!("Project selection saved: {}", trimmed);

        if let Ok(client) = self.auth.client() {
            match self.source.validate_project_id(&client, trimmed).await {
                Ok(true) => {
                    if let Some(name) = self.source.project_name(&client, trimmed).await {
                        self.set_project_name(name);
                    }
                }
                Ok(false) => self.set_error(Some(ErrorKind::NotFound)),
                Err(ErrorKind::Unauthenticated) => {
                    self.auth.invalidate();
                    self.set_error(Some(ErrorKind::Unauthenticated));
                }
                Err(kind) => self.set_error(Some(kind)),
            }
        }
        self.publish();
    }

    /// One accrual tick across the active set.
    pub fn tick(&self) {
        self.ledger.tick();
        self.publish();
    }

    /// Spawns the recurring accrual task. Must run inside a tokio runtime.
    pub fn start_ticker(self: &Arc<Self>, period: Duration) -> TickerHandle {
        let tracker = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut timer = time::interval(period);
            // The first interval tick completes immediately; skip it so a
            // fresh ticker never accrues time at startup.
            timer.tick().await;
            loop {
                timer.tick().await;
                tracker.tick();
            }
        });
        TickerHandle { handle }
    }

    async fn resolve_project_name_if_needed(
        &self,
        client: &asana_api::AsanaClient,
        project_id: &str,
    ) {
        let unresolved = {
            let flags = self.flags.lock().unwrap();
            flags.project_name == PROJECT_NAME_PLACEHOLDER
        };
        if !unresolved {
            return;
        }
        if let Some(name) = self.source.project_name(client, project_id).await {
            self.set_project_name(name);
        }
    }

    fn set_loading(&self, loading: bool) {
        self.flags.lock().unwrap().loading = loading;
    }

    fn set_error(&self, error: Option<ErrorKind>) {
        self.flags.lock().unwrap().last_error = error;
    }

    fn set_project_name(&self, name: String) {
        self.flags.lock().unwrap().project_name = name;
    }

    fn publish(&self) {
        let ledger = self.ledger.snapshot();
        let flags = self.flags.lock().unwrap();
        let snapshot = StateSnapshot {
            authenticated: self.auth.is_authenticated(),
            loading: flags.loading,
            showing_completed: flags.showing_completed,
            project_name: flags.project_name.clone(),
            tickets: ledger.active,
            completed_tickets: ledger.completed,
            last_error: flags.last_error,
        };
        self.state_tx.send_replace(snapshot);
    }
}
