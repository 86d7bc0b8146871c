//! Mock expiry store for testing.
#![allow(clippy::unwrap_used)] // Mutex poisoning is unrecoverable in tests

use crate::error::{KeydropError, Result};
use crate::providers::ExpiryStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory expiry markers.
///
/// TTLs are recorded but never lapse on their own; tests drive state
/// explicitly. The `fail` toggle makes every operation error, for
/// exercising the best-effort policy around markers.
#[derive(Debug, Clone, Default)]
pub struct MockExpiryStore {
    markers: Arc<Mutex<HashMap<String, Duration>>>,
    fail: Arc<AtomicBool>,
}

impl MockExpiryStore {
    /// Create an empty mock expiry store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail (or stop failing).
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// The TTL a marker was armed with (for assertions).
    #[must_use]
    pub fn armed_ttl(&self, link_id: &str) -> Option<Duration> {
        self.markers.lock().unwrap().get(link_id).copied()
    }

    fn check_fail(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(KeydropError::StoreError("Expiry store unavailable".to_string()));
        }
        Ok(())
    }
}

impl ExpiryStore for MockExpiryStore {
    async fn arm(&self, link_id: &str, ttl: Duration) -> Result<()> {
        self.check_fail()?;
        self.markers.lock().unwrap().insert(link_id.to_string(), ttl);
        Ok(())
    }

    async fn disarm(&self, link_id: &str) -> Result<()> {
        self.check_fail()?;
        self.markers.lock().unwrap().remove(link_id);
        Ok(())
    }

    async fn is_armed(&self, link_id: &str) -> Result<bool> {
        self.check_fail()?;
        Ok(self.markers.lock().unwrap().contains_key(link_id))
    }
}
