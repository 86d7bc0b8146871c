//! Mock key pool for testing.
#![allow(clippy::unwrap_used)] // Mutex poisoning is unrecoverable in tests

use crate::error::Result;
use crate::providers::KeyPool;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// In-memory key pool with atomic removal under a mutex.
#[derive(Debug, Clone, Default)]
pub struct MockKeyPool {
    entries: Arc<Mutex<HashSet<String>>>,
}

impl MockKeyPool {
    /// Create an empty mock pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock pool pre-seeded with `keys`.
    #[must_use]
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pool = Self::new();
        pool.entries
            .lock()
            .unwrap()
            .extend(keys.into_iter().map(Into::into));
        pool
    }

    /// Whether `key` is currently available (for assertions).
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains(key)
    }
}

impl KeyPool for MockKeyPool {
    async fn pop_key(&self) -> Result<Option<String>> {
        let mut entries = self.entries.lock().unwrap();

        // Take an arbitrary entry; removal under the same guard makes the
        // pop exclusive.
        let Some(key) = entries.iter().next().cloned() else {
            return Ok(None);
        };
        entries.remove(&key);

        Ok(Some(key))
    }

    async fn add_keys(&self, keys: &[String]) -> Result<u64> {
        let mut entries = self.entries.lock().unwrap();

        let added = keys
            .iter()
            .filter(|key| entries.insert((*key).clone()))
            .count();

        Ok(added as u64)
    }

    async fn remaining(&self) -> Result<u64> {
        Ok(self.entries.lock().unwrap().len() as u64)
    }
}
