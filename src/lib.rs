//! Core of a menu-bar Asana ticket time tracker.
//!
//! The graphical shell is a separate concern: it drives the
//! [`app::TicketTracker`] command surface and renders the state snapshots it
//! publishes. Everything here is the headless core: session lifecycle,
//! remote fetch and filter, and the ticket ledger.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod ledger;
pub mod source;
pub mod store;
pub mod ticket;

pub use app::{StateSnapshot, TicketTracker, TickerHandle};
pub use auth::{AuthSession, TokenAcquirer, MIN_TOKEN_LENGTH};
pub use config::{Config, ConfigManager};
pub use error::ErrorKind;
pub use ledger::{LedgerSnapshot, TicketLedger};
pub use source::RemoteTicketSource;
pub use store::SessionStore;
pub use ticket::{Ticket, TrackingEvent, TrackingStatus};

/// Initializes stderr logging; call once from the embedding shell.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .try_init();
}
