//! Session-token lifecycle: acquisition, validation, expiry handling.
//!
//! The credential is an opaque browser cookie blob. Having one stored means
//! "probably authenticated"; only a live `/users/me` probe proves freshness.

use crate::error::ErrorKind;
use crate::store::SessionStore;
use asana_api::{AsanaClient, AsanaConfig};
use log::{info, warn};

/// Cheap sanity filter: real Asana session cookies are far longer than this,
/// so anything shorter is rejected before a validation round-trip.
pub const MIN_TOKEN_LENGTH: usize = 20;

/// The interactive token-acquisition collaborator. The real implementation
/// lives in the presentation layer (open browser, solicit a pasted cookie);
/// the core only sees "a token or nothing".
pub trait TokenAcquirer: Send + Sync {
    fn acquire(&self) -> Option<String>;
}

/// Owns the stored credential and its lifecycle transitions.
pub struct AuthSession {
    store: SessionStore,
    base_url: String,
}

impl AuthSession {
    pub fn new(store: SessionStore) -> Self {
        Self::with_base_url(store, asana_api::config::DEFAULT_API_BASE)
    }

    pub fn with_base_url(store: SessionStore, base_url: impl Into<String>) -> Self {
        Self {
            store,
            base_url: base_url.into(),
        }
    }

    /// Local check only: a non-empty stored cookie. Not a freshness
    /// guarantee, which takes a remote probe.
    pub fn is_authenticated(&self) -> bool {
        self.store.load_cookie().is_some()
    }

    /// Builds an API client from the stored cookie.
    pub fn client(&self) -> Result<AsanaClient, ErrorKind> {
        let cookie = self.store.load_cookie().ok_or(ErrorKind::Unauthenticated)?;
        self.client_for(&cookie)
    }

    fn client_for(&self, cookie: &str) -> Result<AsanaClient, ErrorKind> {
        let config = AsanaConfig::new(cookie).with_base_url(self.base_url.clone());
        AsanaClient::new(config).map_err(|err| {
            warn!("Failed to build API client: {}", err);
            ErrorKind::Transport
        })
    }

    /// Runs the interactive acquisition flow, validates the result against
    /// the remote API and persists it only when valid. Invalid or cancelled
    /// acquisitions leave the stored credential untouched.
    pub async fn authenticate(&self, acquirer: &dyn TokenAcquirer) -> bool {
        let Some(token) = acquirer.acquire() else {
            info!("Authentication cancelled");
            return false;
        };
        let token = token.trim().to_string();
        if token.len() < MIN_TOKEN_LENGTH {
            warn!("Rejected token: too short to be a session cookie");
            return false;
        }

        if self.validate(&token).await {
            self.store.save_cookie(&token);
            info!("Authentication succeeded");
            true
        } else {
            warn!("Acquired token failed validation; discarding");
            false
        }
    }

    /// Probes `/users/me` with the given token. Only a 200 with a
    /// well-formed identity payload counts; every other outcome, including
    /// network failure, is treated as invalid (fail closed).
    pub async fn validate(&self, token: &str) -> bool {
        let client = match self.client_for(token) {
            Ok(client) => client,
            Err(_) => return false,
        };
        match client.get_me().await {
            Ok(user) => user.has_identity(),
            Err(err) => {
                warn!("Token validation failed: {}", err);
                false
            }
        }
    }

    /// Discards the stored credential unconditionally.
    pub fn clear(&self) {
        self.store.clear_cookie();
    }

    /// Expiry transition: a 401/403 was observed, so the token is dead.
    pub fn invalidate(&self) {
        info!("Session rejected by remote; discarding stored token");
        self.store.clear_cookie();
    }
}
