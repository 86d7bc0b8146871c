//! Issuance: pop one key from the pool and bind it to a fresh link.
//!
//! The pool pop is the durability boundary for "inventory consumed" and the
//! ledger insert is the durability boundary for "redeemable". The handoff
//! between the two stores is not transactional: a crash between pop and
//! insert loses one key from circulation, which is accepted because it can
//! never duplicate delivery.

use crate::config::KeydropConfig;
use crate::error::{KeydropError, Result};
use crate::providers::{ExpiryStore, IssuedLink, KeyPool, LinkLedger};
use crate::utils::bounded;

/// Issues one-time links against the pool and ledger.
///
/// Holds no state of its own; every concurrency guarantee comes from the
/// stores. `Clone` shares the underlying store handles.
#[derive(Clone)]
pub struct IssuanceService<P, L, E> {
    pool: P,
    ledger: L,
    expiry: E,
    config: KeydropConfig,
}

impl<P, L, E> IssuanceService<P, L, E>
where
    P: KeyPool,
    L: LinkLedger,
    E: ExpiryStore,
{
    /// Create an issuance service over the given stores.
    pub const fn new(pool: P, ledger: L, expiry: E, config: KeydropConfig) -> Self {
        Self {
            pool,
            ledger,
            expiry,
            config,
        }
    }

    /// Issue one key: atomically remove an arbitrary pool entry, persist a
    /// ledger row binding it to a fresh link id, and arm the advisory
    /// expiry marker.
    ///
    /// No two concurrent calls can receive the same pool entry, and a
    /// popped key is never re-popped.
    ///
    /// # Errors
    ///
    /// - [`KeydropError::NoInventory`] when the pool is empty (terminal for
    ///   this request; an admin refill makes the next one succeed)
    /// - [`KeydropError::StoreError`] on pool/ledger faults or timeouts
    pub async fn issue(&self) -> Result<IssuedLink> {
        let timeout = self.config.store_timeout;

        let popped = bounded(timeout, "pool pop", self.pool.pop_key()).await?;
        let Some(key_value) = popped else {
            tracing::info!("Claim rejected: pool is empty");
            return Err(KeydropError::NoInventory);
        };

        let link = IssuedLink::bind(key_value);

        if let Err(e) = bounded(timeout, "ledger insert", self.ledger.insert_link(&link)).await {
            // The pop already committed: this key has left circulation
            // without becoming redeemable. Accepted crash-window loss.
            tracing::error!(
                error = %e,
                link_id = %link.link_id,
                "Ledger insert failed after pool pop; one key left circulation"
            );
            return Err(e);
        }

        // Advisory only: the link is already issued and redeemable, so a
        // marker failure must not fail the request.
        let armed = bounded(
            timeout,
            "expiry arm",
            self.expiry.arm(&link.link_id, self.config.link_ttl),
        )
        .await;
        if let Err(e) = armed {
            tracing::warn!(
                error = %e,
                link_id = %link.link_id,
                "Failed to arm expiry marker; continuing without it"
            );
        }

        tracing::info!(link_id = %link.link_id, "Issued one-time link");

        Ok(link)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::mocks::{MockExpiryStore, MockKeyPool, MockLinkLedger};
    use std::collections::HashSet;

    fn service(
        pool: MockKeyPool,
        ledger: MockLinkLedger,
        expiry: MockExpiryStore,
    ) -> IssuanceService<MockKeyPool, MockLinkLedger, MockExpiryStore> {
        IssuanceService::new(pool, ledger, expiry, KeydropConfig::default())
    }

    #[tokio::test]
    async fn issue_binds_popped_key() {
        let pool = MockKeyPool::with_keys(["K1"]);
        let ledger = MockLinkLedger::new();
        let expiry = MockExpiryStore::new();
        let issuance = service(pool.clone(), ledger.clone(), expiry.clone());

        let link = issuance.issue().await.unwrap();

        assert_eq!(link.key_value, "K1");
        assert!(!pool.contains("K1"), "popped key must leave the pool");
        assert_eq!(ledger.get(&link.link_id).unwrap().key_value, "K1");
        assert!(expiry.is_armed(&link.link_id).await.unwrap());
    }

    #[tokio::test]
    async fn empty_pool_is_no_inventory() {
        let issuance = service(
            MockKeyPool::new(),
            MockLinkLedger::new(),
            MockExpiryStore::new(),
        );

        assert_eq!(issuance.issue().await, Err(KeydropError::NoInventory));
    }

    #[tokio::test]
    async fn marker_failure_does_not_fail_issuance() {
        let expiry = MockExpiryStore::new();
        expiry.set_fail(true);
        let ledger = MockLinkLedger::new();
        let issuance = service(MockKeyPool::with_keys(["K1"]), ledger.clone(), expiry);

        let link = issuance.issue().await.unwrap();

        assert_eq!(link.key_value, "K1");
        assert!(ledger.get(&link.link_id).is_some());
    }

    #[tokio::test]
    async fn marker_armed_with_configured_ttl() {
        let expiry = MockExpiryStore::new();
        let config = KeydropConfig::new().with_link_ttl(std::time::Duration::from_secs(120));
        let issuance = IssuanceService::new(
            MockKeyPool::with_keys(["K1"]),
            MockLinkLedger::new(),
            expiry.clone(),
            config,
        );

        let link = issuance.issue().await.unwrap();

        assert_eq!(
            expiry.armed_ttl(&link.link_id),
            Some(std::time::Duration::from_secs(120))
        );
    }

    #[tokio::test]
    async fn racing_issues_split_inventory_exactly() {
        let pool = MockKeyPool::with_keys(["K1", "K2", "K3"]);
        let issuance = service(pool, MockLinkLedger::new(), MockExpiryStore::new());

        let mut handles = vec![];
        for _ in 0..10 {
            let issuance = issuance.clone();
            handles.push(tokio::spawn(async move { issuance.issue().await }));
        }

        let mut keys = HashSet::new();
        let mut empty = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(link) => {
                    assert!(keys.insert(link.key_value), "no key may be issued twice");
                }
                Err(KeydropError::NoInventory) => empty += 1,
                Err(other) => assert_eq!(other, KeydropError::NoInventory),
            }
        }

        assert_eq!(keys.len(), 3, "every pool entry is issued exactly once");
        assert_eq!(empty, 7);
    }
}
