//! Redis-based expiry marker store.
//!
//! Markers are plain keys with a TTL; Redis expiration is the whole
//! mechanism. Everything here is advisory; the issuance and redemption
//! services call this store outside their critical sections and tolerate
//! every failure.
//!
//! # Key layout
//!
//! `{namespace}:expiry:{link_id}` → "1", TTL = configured freshness window.

use crate::error::{KeydropError, Result};
use crate::providers::ExpiryStore;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::time::Duration;

/// `Redis`-backed advisory expiry markers.
#[derive(Clone)]
pub struct RedisExpiryStore {
    /// Connection manager for connection pooling.
    conn_manager: ConnectionManager,

    /// Key namespace, `keydrop` unless overridden.
    namespace: String,
}

impl RedisExpiryStore {
    /// Create a new `Redis` expiry store.
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

        Ok(Self {
            conn_manager,
            namespace: "keydrop".to_string(),
        })
    }

    /// Override the key namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// The `Redis` key for a link's marker.
    fn marker_key(&self, link_id: &str) -> String {
        format!("{}:expiry:{link_id}", self.namespace)
    }
}

impl ExpiryStore for RedisExpiryStore {
    async fn arm(&self, link_id: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn_manager.clone();

        // SET with EX is atomic; TTL of at least one second so the marker
        // is observable even with a degenerate configuration.
        let ttl_seconds = ttl.as_secs().max(1);

        let _: () = conn
            .set_ex(self.marker_key(link_id), "1", ttl_seconds)
            .await
            .map_err(|e| KeydropError::StoreError(format!("Failed to arm expiry marker: {e}")))?;

        tracing::debug!(link_id, ttl_seconds, "Armed expiry marker");

        Ok(())
    }

    async fn disarm(&self, link_id: &str) -> Result<()> {
        let mut conn = self.conn_manager.clone();

        let deleted: i32 = conn
            .del(self.marker_key(link_id))
            .await
            .map_err(|e| KeydropError::StoreError(format!("Failed to disarm expiry marker: {e}")))?;

        if deleted > 0 {
            tracing::debug!(link_id, "Disarmed expiry marker");
        }

        Ok(())
    }

    async fn is_armed(&self, link_id: &str) -> Result<bool> {
        let mut conn = self.conn_manager.clone();

        let exists: bool = conn
            .exists(self.marker_key(link_id))
            .await
            .map_err(|e| KeydropError::StoreError(format!("Failed to check expiry marker: {e}")))?;

        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests require a running Redis instance
    // Run with: docker run -d -p 6379:6379 redis:7-alpine

    #[allow(clippy::expect_used)] // Test code
    async fn fresh_store() -> RedisExpiryStore {
        RedisExpiryStore::new("redis://127.0.0.1:6379")
            .await
            .expect("Failed to create store")
            .with_namespace(format!("keydrop-test:{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    #[allow(clippy::unwrap_used)] // Test code
    async fn test_marker_lifecycle() {
        let store = fresh_store().await;

        store.arm("L1", Duration::from_secs(60)).await.unwrap();
        assert!(store.is_armed("L1").await.unwrap());

        store.disarm("L1").await.unwrap();
        assert!(!store.is_armed("L1").await.unwrap());

        // Disarming an absent marker is a no-op.
        store.disarm("L1").await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    #[allow(clippy::unwrap_used)] // Test code
    async fn test_marker_lapses() {
        let store = fresh_store().await;

        store.arm("L2", Duration::from_secs(1)).await.unwrap();
        assert!(store.is_armed("L2").await.unwrap());

        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(!store.is_armed("L2").await.unwrap());
    }
}
