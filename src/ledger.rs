//! The ticket ledger: authoritative in-memory record of tracked tickets.
//!
//! Active and completed tickets live behind one mutex, so merge, toggle,
//! complete and tick are atomic with respect to each other; a tick pass
//! never observes a half-applied merge. Every mutation persists the full
//! combined snapshot before the lock is released.

use crate::store::SessionStore;
use crate::ticket::{Ticket, TrackingEvent, TrackingStatus};
use log::{debug, info};
use std::sync::Mutex;

#[derive(Default)]
struct LedgerState {
    active: Vec<Ticket>,
    completed: Vec<Ticket>,
}

/// Owns the active and completed ticket sets and the status state machine.
/// Operations are total: unknown ids are ignored, never errors.
pub struct TicketLedger {
    state: Mutex<LedgerState>,
    store: SessionStore,
}

/// Point-in-time copy of both sets, for publication to the presentation.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    pub active: Vec<Ticket>,
    pub completed: Vec<Ticket>,
}

impl TicketLedger {
    /// Restores the ledger from the persisted snapshot, splitting it into
    /// active and completed sets by status.
    pub fn new(store: SessionStore) -> Self {
        let saved = store.load_tickets();
        let (completed, active): (Vec<_>, Vec<_>) = saved
            .into_iter()
            .partition(|ticket| ticket.status == TrackingStatus::Completed);
        Self {
            state: Mutex::new(LedgerState { active, completed }),
            store,
        }
    }

    /// Reconciles a freshly fetched remote list against local tracking state.
    ///
    /// Remote section membership is the source of truth for which tickets
    /// are active: actives missing from `remote` are pruned. Local
    /// completion is a sticky override: a completed id reappearing upstream
    /// is dropped rather than resurrected. Status and elapsed time carry
    /// forward for surviving actives. `force_reset` wipes both sets first so
    /// the fetch becomes the entire truth.
    pub fn merge(&self, remote: Vec<Ticket>, force_reset: bool) {
        let mut state = self.state.lock().unwrap();
        if force_reset {
            info!("Force reset: discarding all local tracking state");
            state.active.clear();
            state.completed.clear();
        }

        let mut next_active = Vec::with_capacity(remote.len());
        for mut ticket in remote {
            if state.completed.iter().any(|c| c.id == ticket.id) {
                debug!("Skipping ticket {} - completed locally", ticket.id);
                continue;
            }
            if let Some(existing) = state.active.iter().find(|a| a.id == ticket.id) {
                ticket.status = existing.status;
                ticket.time_spent = existing.time_spent;
            }
            next_active.push(ticket);
        }
        state.active = next_active;
        self.persist(&state);
    }

    /// Starts, pauses or resumes tracking for a ticket; reactivates it when
    /// it sits in the completed set. Unknown ids are a no-op.
    pub fn toggle_tracking(&self, ticket_id: &str) {
        let mut state = self.state.lock().unwrap();

        if let Some(index) = state.completed.iter().position(|t| t.id == ticket_id) {
            let mut ticket = state.completed.remove(index);
            ticket.status = ticket.status.apply(TrackingEvent::Reactivate);
            info!("Reactivated ticket {}", ticket.id);
            state.active.push(ticket);
            self.persist(&state);
            return;
        }

        let Some(ticket) = state.active.iter_mut().find(|t| t.id == ticket_id) else {
            return;
        };
        let event = match ticket.status {
            TrackingStatus::Active => TrackingEvent::Pause,
            TrackingStatus::Paused => TrackingEvent::Resume,
            TrackingStatus::NotStarted => TrackingEvent::Start,
            // Completed tickets never sit in the active set.
            TrackingStatus::Completed => return,
        };
        ticket.status = ticket.status.apply(event);
        debug!(
            "Ticket {} now {} at {}",
            ticket.id,
            ticket.status.label(),
            ticket.formatted_time()
        );
        self.persist(&state);
    }

    /// Moves a ticket from the active set into the completed set. A no-op
    /// when the id is not active.
    pub fn complete(&self, ticket_id: &str) {
        let mut state = self.state.lock().unwrap();
        let Some(index) = state.active.iter().position(|t| t.id == ticket_id) else {
            return;
        };
        let mut ticket = state.active.remove(index);
        ticket.status = ticket.status.apply(TrackingEvent::Complete);
        info!(
            "Completed ticket {} with time spent {}",
            ticket.id,
            ticket.formatted_time()
        );
        state.completed.push(ticket);
        self.persist(&state);
    }

    /// One clock tick: every active-status ticket accrues one second.
    /// Paused, not-started and completed tickets never accrue.
    pub fn tick(&self) {
        let mut state = self.state.lock().unwrap();
        let mut accrued = false;
        for ticket in state.active.iter_mut() {
            if ticket.status == TrackingStatus::Active {
                ticket.time_spent += 1;
                accrued = true;
            }
        }
        if accrued {
            self.persist(&state);
        }
    }

    /// Drops all tickets, persisting the emptied state. Used when the user
    /// signs out.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        state.active.clear();
        state.completed.clear();
        self.persist(&state);
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.lock().unwrap();
        LedgerSnapshot {
            active: state.active.clone(),
            completed: state.completed.clone(),
        }
    }

    fn persist(&self, state: &LedgerState) {
        let mut combined = state.active.clone();
        combined.extend(state.completed.iter().cloned());
        self.store.save_tickets(&combined);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn test_store(name: &str) -> SessionStore {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        let path: PathBuf =
            env::temp_dir().join(format!("tickbar-ledger-{name}-{nanos}/state.json"));
        SessionStore::with_path(path)
    }

    fn ledger(name: &str) -> TicketLedger {
        TicketLedger::new(test_store(name))
    }

    fn remote(ids: &[(&str, &str)]) -> Vec<Ticket> {
        ids.iter().map(|(id, name)| Ticket::new(*id, *name)).collect()
    }

    fn assert_exclusive(snapshot: &LedgerSnapshot) {
        for ticket in &snapshot.active {
            assert!(
                !snapshot.completed.iter().any(|c| c.id == ticket.id),
                "id {} present in both sets",
                ticket.id
            );
        }
    }

    #[test]
    fn merge_keeps_new_tickets_untracked() {
        let ledger = ledger("merge-new");
        ledger.merge(remote(&[("1", "Fix bug"), ("2", "Write docs")]), false);

        let snapshot = ledger.snapshot();
        assert_eq!(snapshot.active.len(), 2);
        assert!(snapshot
            .active
            .iter()
            .all(|t| t.status == TrackingStatus::NotStarted && t.time_spent == 0));
    }

    #[test]
    fn merge_carries_forward_status_and_time() {
        let ledger = ledger("merge-carry");
        ledger.merge(remote(&[("1", "Fix bug")]), false);
        ledger.toggle_tracking("1");
        for _ in 0..42 {
            ledger.tick();
        }

        ledger.merge(remote(&[("1", "Fix bug")]), false);

        let snapshot = ledger.snapshot();
        assert_eq!(snapshot.active[0].status, TrackingStatus::Active);
        assert_eq!(snapshot.active[0].time_spent, 42);
    }

    #[test]
    fn merge_prunes_actives_missing_from_remote() {
        let ledger = ledger("merge-prune");
        ledger.merge(remote(&[("1", "Fix bug"), ("2", "Write docs")]), false);
        ledger.toggle_tracking("2");

        ledger.merge(remote(&[("1", "Fix bug")]), false);

        let snapshot = ledger.snapshot();
        assert_eq!(snapshot.active.len(), 1);
        assert_eq!(snapshot.active[0].id, "1");
    }

    #[test]
    fn merge_preserves_remote_order() {
        let ledger = ledger("merge-order");
        ledger.merge(remote(&[("1", "a"), ("2", "b")]), false);
        ledger.merge(remote(&[("3", "c"), ("1", "a"), ("2", "b")]), false);

        let ids: Vec<_> = ledger
            .snapshot()
            .active
            .iter()
            .map(|t| t.id.clone())
            .collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }

    #[test]
    fn completion_is_sticky_across_merges() {
        let ledger = ledger("sticky");
        ledger.merge(remote(&[("1", "Fix bug")]), false);
        ledger.complete("1");

        for _ in 0..3 {
            ledger.merge(remote(&[("1", "Fix bug")]), false);
            let snapshot = ledger.snapshot();
            assert!(snapshot.active.is_empty());
            assert_eq!(snapshot.completed.len(), 1);
            assert_exclusive(&snapshot);
        }
    }

    #[test]
    fn force_reset_makes_remote_the_entire_truth() {
        let ledger = ledger("force-reset");
        ledger.merge(remote(&[("1", "Fix bug"), ("2", "Write docs")]), false);
        ledger.toggle_tracking("1");
        ledger.tick();
        ledger.complete("2");

        ledger.merge(remote(&[("1", "Fix bug"), ("2", "Write docs")]), true);

        let snapshot = ledger.snapshot();
        assert!(snapshot.completed.is_empty());
        assert_eq!(snapshot.active.len(), 2);
        assert!(snapshot
            .active
            .iter()
            .all(|t| t.status == TrackingStatus::NotStarted && t.time_spent == 0));
    }

    #[test]
    fn tick_accrues_only_active_status() {
        let ledger = ledger("tick");
        ledger.merge(remote(&[("a", "one"), ("b", "two")]), false);
        ledger.toggle_tracking("a"); // a: Active
        ledger.toggle_tracking("b"); // b: Active
        ledger.toggle_tracking("b"); // b: Paused
        for _ in 0..5 {
            ledger.tick();
        }

        let snapshot = ledger.snapshot();
        let a = snapshot.active.iter().find(|t| t.id == "a").unwrap();
        let b = snapshot.active.iter().find(|t| t.id == "b").unwrap();
        assert_eq!(a.time_spent, 5);
        assert_eq!(b.time_spent, 0);

        ledger.tick();
        let snapshot = ledger.snapshot();
        let a = snapshot.active.iter().find(|t| t.id == "a").unwrap();
        let b = snapshot.active.iter().find(|t| t.id == "b").unwrap();
        assert_eq!(a.time_spent, 6);
        assert_eq!(b.time_spent, 0);
    }

    #[test]
    fn toggle_reactivates_completed_tickets() {
        let ledger = ledger("reactivate");
        ledger.merge(remote(&[("1", "Fix bug")]), false);
        ledger.toggle_tracking("1");
        ledger.tick();
        ledger.complete("1");

        ledger.toggle_tracking("1");

        let snapshot = ledger.snapshot();
        assert!(snapshot.completed.is_empty());
        assert_eq!(snapshot.active.len(), 1);
        assert_eq!(snapshot.active[0].status, TrackingStatus::Active);
        assert_eq!(snapshot.active[0].time_spent, 1);
        assert_exclusive(&snapshot);
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let ledger = ledger("unknown");
        ledger.merge(remote(&[("1", "Fix bug")]), false);

        ledger.toggle_tracking("missing");
        ledger.complete("missing");

        let snapshot = ledger.snapshot();
        assert_eq!(snapshot.active.len(), 1);
        assert_eq!(snapshot.active[0].status, TrackingStatus::NotStarted);
        assert!(snapshot.completed.is_empty());
    }

    #[test]
    fn state_survives_reload_from_store() {
        let store = test_store("reload");
        {
            let ledger = TicketLedger::new(store.clone());
            ledger.merge(remote(&[("1", "Fix bug"), ("2", "Write docs")]), false);
            ledger.toggle_tracking("1");
            ledger.tick();
            ledger.complete("2");
        }

        let reloaded = TicketLedger::new(store);
        let snapshot = reloaded.snapshot();
        assert_eq!(snapshot.active.len(), 1);
        assert_eq!(snapshot.active[0].id, "1");
        assert_eq!(snapshot.active[0].time_spent, 1);
        assert_eq!(snapshot.completed.len(), 1);
        assert_eq!(snapshot.completed[0].id, "2");
        assert_exclusive(&snapshot);
    }

    #[test]
    fn end_to_end_tracking_scenario() {
        let ledger = ledger("scenario");

        ledger.merge(remote(&[("1", "Fix bug")]), false);
        let snapshot = ledger.snapshot();
        assert_eq!(snapshot.active.len(), 1);
        assert_eq!(snapshot.active[0].status, TrackingStatus::NotStarted);
        assert_eq!(snapshot.active[0].time_spent, 0);

        ledger.toggle_tracking("1");
        assert_eq!(ledger.snapshot().active[0].status, TrackingStatus::Active);

        for _ in 0..3 {
            ledger.tick();
        }
        assert_eq!(ledger.snapshot().active[0].time_spent, 3);

        ledger.complete("1");
        let snapshot = ledger.snapshot();
        assert!(snapshot.active.is_empty());
        assert_eq!(snapshot.completed.len(), 1);
        assert_eq!(snapshot.completed[0].status, TrackingStatus::Completed);
        assert_eq!(snapshot.completed[0].time_spent, 3);

        ledger.merge(remote(&[("1", "Fix bug")]), false);
        let snapshot = ledger.snapshot();
        assert!(snapshot.active.is_empty());
        assert_eq!(snapshot.completed.len(), 1);
        assert_exclusive(&snapshot);
    }
}
