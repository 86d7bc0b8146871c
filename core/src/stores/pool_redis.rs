//! Redis-based key pool implementation.
//!
//! The pool is a single Redis SET. `SPOP` gives atomic random removal: the
//! server removes and returns one member in a single command, so concurrent
//! issuance calls can never observe the same entry. `SADD` gives the
//! idempotent refill insert.
//!
//! # Key layout
//!
//! One set at `{namespace}:pool` (namespace defaults to `keydrop`).

use crate::error::{KeydropError, Result};
use crate::providers::KeyPool;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

/// `Redis`-backed inventory pool with atomic random removal.
///
/// # Thread Safety
///
/// This type is `Clone`; each clone shares the same `ConnectionManager`.
#[derive(Clone)]
pub struct RedisKeyPool {
    /// Connection manager for connection pooling.
    conn_manager: ConnectionManager,

    /// Key namespace, `keydrop` unless overridden.
    namespace: String,
}

impl RedisKeyPool {
    /// Create a new `Redis` key pool.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - `Redis` connection URL (e.g., "<redis://127.0.0.1:6379>")
    ///
    /// # Errors
    ///
    /// Returns error if the URL is malformed or the connection fails.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| KeydropError::StoreError(format!("Failed to create Redis client: {e}")))?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            KeydropError::StoreError(format!("Failed to create Redis connection manager: {e}"))
        })?;

        tracing::info!("RedisKeyPool initialized");

        Ok(Self {
            conn_manager,
            namespace: "keydrop".to_string(),
        })
    }

    /// Override the key namespace. Lets tests isolate their pool from the
    /// production keyspace on a shared instance.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// The `Redis` key holding the pool set.
    fn pool_key(&self) -> String {
        format!("{}:pool", self.namespace)
    }
}

impl KeyPool for RedisKeyPool {
    async fn pop_key(&self) -> Result<Option<String>> {
        let mut conn = self.conn_manager.clone();

        // SPOP removes and returns one random member in a single server-side
        // operation; nil means the pool is empty. This is the atomicity
        // boundary for "inventory consumed".
        let popped: Option<String> = conn
            .spop(self.pool_key())
            .await
            .map_err(|e| KeydropError::StoreError(format!("Failed to pop from pool: {e}")))?;

        if popped.is_some() {
            tracing::debug!("Popped one key from pool");
        }

        Ok(popped)
    }

    async fn add_keys(&self, keys: &[String]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn_manager.clone();

        // SADD returns the number of members that were not already present.
        let added: u64 = conn
            .sadd(self.pool_key(), keys)
            .await
            .map_err(|e| KeydropError::StoreError(format!("Failed to add keys to pool: {e}")))?;

        tracing::info!(offered = keys.len(), added, "Added keys to pool");

        Ok(added)
    }

    async fn remaining(&self) -> Result<u64> {
        let mut conn = self.conn_manager.clone();

        let count: u64 = conn
            .scard(self.pool_key())
            .await
            .map_err(|e| KeydropError::StoreError(format!("Failed to read pool size: {e}")))?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests require a running Redis instance
    // Run with: docker run -d -p 6379:6379 redis:7-alpine

    #[allow(clippy::expect_used)] // Test code
    async fn fresh_pool(tag: &str) -> RedisKeyPool {
        RedisKeyPool::new("redis://127.0.0.1:6379")
            .await
            .expect("Failed to create pool")
            .with_namespace(format!("keydrop-test:{tag}:{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    #[allow(clippy::unwrap_used)] // Test code
    async fn test_pop_drains_pool() {
        let pool = fresh_pool("drain").await;

        pool.add_keys(&["K1".into(), "K2".into()]).await.unwrap();
        assert_eq!(pool.remaining().await.unwrap(), 2);

        let first = pool.pop_key().await.unwrap().unwrap();
        let second = pool.pop_key().await.unwrap().unwrap();
        assert_ne!(first, second, "SPOP must never hand out the same entry");

        assert_eq!(pool.remaining().await.unwrap(), 0);
        assert!(pool.pop_key().await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    #[allow(clippy::unwrap_used)] // Test code
    async fn test_add_is_idempotent() {
        let pool = fresh_pool("idem").await;

        let added = pool.add_keys(&["K1".into(), "K2".into()]).await.unwrap();
        assert_eq!(added, 2);

        // Re-offering the same values is a no-op, not an error.
        let added = pool.add_keys(&["K1".into(), "K2".into()]).await.unwrap();
        assert_eq!(added, 0);
        assert_eq!(pool.remaining().await.unwrap(), 2);
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    #[allow(clippy::unwrap_used)] // Test code
    async fn test_concurrent_pops_are_exclusive() {
        let pool = fresh_pool("race").await;
        pool.add_keys(&["K1".into()]).await.unwrap();

        let mut handles = vec![];
        for _ in 0..10 {
            let pool = pool.clone();
            handles.push(tokio::spawn(async move { pool.pop_key().await.unwrap() }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1, "exactly one pop may obtain the single entry");
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    #[allow(clippy::unwrap_used)] // Test code
    async fn test_empty_add_is_noop() {
        let pool = fresh_pool("empty").await;
        assert_eq!(pool.add_keys(&[]).await.unwrap(), 0);
        assert_eq!(pool.remaining().await.unwrap(), 0);
    }
}
