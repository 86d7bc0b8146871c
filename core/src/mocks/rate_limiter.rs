//! Mock rate limiter for testing.
#![allow(clippy::unwrap_used)] // Mutex poisoning is unrecoverable in tests

use crate::error::{KeydropError, Result};
use crate::providers::RateLimiter;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory request counter. Windows never roll over on their own; tests
/// use [`reset`](MockRateLimiter::reset) to start a fresh window.
#[derive(Debug, Clone, Default)]
pub struct MockRateLimiter {
    counts: Arc<Mutex<HashMap<String, u32>>>,
}

impl MockRateLimiter {
    /// Create a mock rate limiter with no recorded requests.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests recorded for `key` (for assertions).
    #[must_use]
    pub fn recorded(&self, key: &str) -> u32 {
        self.counts.lock().unwrap().get(key).copied().unwrap_or(0)
    }
}

impl RateLimiter for MockRateLimiter {
    async fn check_and_record(&self, key: &str, max_requests: u32, window: Duration) -> Result<()> {
        let mut counts = self.counts.lock().unwrap();

        let count = counts.entry(key.to_string()).or_insert(0);
        *count += 1;

        if *count > max_requests {
            return Err(KeydropError::TooManyRequests {
                retry_after: window,
            });
        }

        Ok(())
    }

    async fn reset(&self, key: &str) -> Result<()> {
        self.counts.lock().unwrap().remove(key);
        Ok(())
    }
}
