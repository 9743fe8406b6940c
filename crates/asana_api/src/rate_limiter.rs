//! Async pacing for outbound Asana requests.
//!
//! The web API is queried with a borrowed browser session, so requests are
//! spaced out with a minimum cooldown instead of a token bucket.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep;

/// Enforces a minimum cooldown interval between hits.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    cooldown: Duration,
    last_call: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    /// Creates a limiter that enforces a minimum delay between requests.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_call: Arc::new(Mutex::new(None)),
        }
    }

    /// Waits until cooldown is satisfied, then records current call timestamp.
    pub async fn hit(&self) {
        let mut guard = self.last_call.lock().await;
        if let Some(last) = *guard {
            let elapsed = last.elapsed();
            if elapsed < self.cooldown {
                sleep(self.cooldown - elapsed).await;
            }
        }
        *guard = Some(Instant::now());
    }

    /// Returns configured cooldown interval.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}
