//! File-backed key-value persistence for session and tracking state.
//!
//! Mirrors the upstream storage contract: three keys (`savedTickets`,
//! `asanaCookie`, `projectId`) in one JSON document, last write wins. Reads
//! never fail (a missing or unreadable value is simply "unset") and write
//! failures are logged, not surfaced, because every caller treats
//! persistence as best effort.

use crate::ticket::Ticket;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct StoredState {
    saved_tickets: Vec<Ticket>,
    asana_cookie: Option<String>,
    project_id: Option<String>,
}

/// Load/save access to the persisted snapshot. Cloning is cheap; all clones
/// point at the same file.
#[derive(Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Binds the store to the platform-specific app config directory.
    pub fn new() -> Self {
        let dirs = directories::ProjectDirs::from("com", "tickbar", "tickbar")
            .expect("could not determine config directory");
        Self {
            path: dirs.config_dir().join("state.json"),
        }
    }

    /// Binds the store to an explicit file, used by tests.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load_tickets(&self) -> Vec<Ticket> {
        self.read_state().saved_tickets
    }

    pub fn save_tickets(&self, tickets: &[Ticket]) {
        let mut state = self.read_state();
        state.saved_tickets = tickets.to_vec();
        self.write_state(&state);
    }

    pub fn load_cookie(&self) -> Option<String> {
        self.read_state()
            .asana_cookie
            .filter(|cookie| !cookie.trim().is_empty())
    }

    pub fn save_cookie(&self, cookie: &str) {
        let mut state = self.read_state();
        state.asana_cookie = Some(cookie.to_string());
        self.write_state(&state);
    }

    pub fn clear_cookie(&self) {
        let mut state = self.read_state();
        state.asana_cookie = None;
        self.write_state(&state);
    }

    pub fn load_project_id(&self) -> Option<String> {
        self.read_state()
            .project_id
            .filter(|id| !id.trim().is_empty())
    }

    pub fn save_project_id(&self, project_id: &str) {
        let mut state = self.read_state();
        state.project_id = Some(project_id.to_string());
        self.write_state(&state);
    }

    fn read_state(&self) -> StoredState {
        if !self.path.exists() {
            return StoredState::default();
        }
        let content = fs::read_to_string(&self.path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    }

    fn write_state(&self, state: &StoredState) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!("Failed to create state directory: {}", err);
                return;
            }
        }
        match serde_json::to_string_pretty(state) {
            Ok(content) => {
                if let Err(err) = fs::write(&self.path, content) {
                    warn!("Failed to write state file: {}", err);
                }
            }
            Err(err) => warn!("Failed to serialize state: {}", err),
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::TrackingStatus;
    use std::env;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        env::temp_dir().join(format!("tickbar-tests-{name}-{nanos}/state.json"))
    }

    #[test]
    fn missing_file_reads_as_unset() {
        let store = SessionStore::with_path(unique_path("missing"));
        assert!(store.load_tickets().is_empty());
        assert!(store.load_cookie().is_none());
        assert!(store.load_project_id().is_none());
    }

    #[test]
    fn corrupt_file_reads_as_unset() {
        let path = unique_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();

        let store = SessionStore::with_path(path.clone());
        assert!(store.load_tickets().is_empty());
        assert!(store.load_cookie().is_none());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn tickets_round_trip_preserves_status_and_time() {
        let path = unique_path("tickets");
        let store = SessionStore::with_path(path.clone());

        let mut ticket = Ticket::new("1", "Fix bug");
        ticket.status = TrackingStatus::Paused;
        ticket.time_spent = 42;
        store.save_tickets(&[ticket]);

        let loaded = store.load_tickets();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "1");
        assert_eq!(loaded[0].status, TrackingStatus::Paused);
        assert_eq!(loaded[0].time_spent, 42);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn keys_are_independent() {
        let path = unique_path("keys");
        let store = SessionStore::with_path(path.clone());

        store.save_cookie("a-long-enough-session-cookie");
        store.save_project_id("12345");
        store.save_tickets(&[Ticket::new("1", "Fix bug")]);

        store.clear_cookie();
        assert!(store.load_cookie().is_none());
        assert_eq!(store.load_project_id().as_deref(), Some("12345"));
        assert_eq!(store.load_tickets().len(), 1);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn persisted_document_uses_upstream_key_names() {
        let path = unique_path("keynames");
        let store = SessionStore::with_path(path.clone());
        store.save_project_id("12345");

        let raw = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.get("projectId").is_some());
        assert!(value.get("savedTickets").is_some());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn blank_cookie_counts_as_unset() {
        let path = unique_path("blank");
        let store = SessionStore::with_path(path.clone());
        store.save_cookie("   ");
        assert!(store.load_cookie().is_none());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
