//! Ticket domain model and the per-ticket tracking status machine.

use serde::{Deserialize, Serialize};

/// Tracking status of a ticket. Serialized with the plain-text labels the
/// persisted snapshot has always used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    Active,
    Paused,
    Completed,
}

/// User-driven events a ticket's status can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingEvent {
    Start,
    Pause,
    Resume,
    Complete,
    Reactivate,
}

impl TrackingStatus {
    /// Applies one event. Total over all (state, event) pairs: transitions
    /// outside the table leave the status unchanged rather than failing.
    pub fn apply(self, event: TrackingEvent) -> TrackingStatus {
        use TrackingEvent::*;
        use TrackingStatus::*;
        match (self, event) {
            (NotStarted, Start) => Active,
            (Active, Pause) => Paused,
            (Paused, Resume) => Active,
            (Active, Complete) | (Paused, Complete) => Completed,
            (Completed, Reactivate) => Active,
            (state, _) => state,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrackingStatus::NotStarted => "Not Started",
            TrackingStatus::Active => "Active",
            TrackingStatus::Paused => "Paused",
            TrackingStatus::Completed => "Completed",
        }
    }
}

/// A unit of trackable work mirrored from a remote Asana task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub name: String,
    #[serde(default = "default_status")]
    pub status: TrackingStatus,
    #[serde(default)]
    pub time_spent: u64,
}

fn default_status() -> TrackingStatus {
    TrackingStatus::NotStarted
}

impl Ticket {
    /// Creates a fresh, untracked ticket as the remote source produces them.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: TrackingStatus::NotStarted,
            time_spent: 0,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.status == TrackingStatus::Active
    }

    /// Elapsed time as `h:mm:ss`, or `mm:ss` under an hour.
    pub fn formatted_time(&self) -> String {
        let hours = self.time_spent / 3600;
        let minutes = (self.time_spent % 3600) / 60;
        let seconds = self.time_spent % 60;

        if hours > 0 {
            format!("{}:{:02}:{:02}", hours, minutes, seconds)
        } else {
            format!("{:02}:{:02}", minutes, seconds)
        }
    }
}
