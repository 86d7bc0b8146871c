//! Inventory administration: catalog-to-pool refills and the audit view.
//!
//! Not on the hot path. Refills lean entirely on the pool's set semantics
//! for idempotence; a key that was already issued re-enters circulation
//! only through an explicit refill after being re-added here, never
//! automatically.

use crate::config::KeydropConfig;
use crate::error::Result;
use crate::providers::{IssuedLink, KeyPool, LinkLedger};
use crate::utils::bounded;

/// Admin-facing operations over the pool and ledger.
#[derive(Clone)]
pub struct InventoryService<P, L> {
    pool: P,
    ledger: L,
    config: KeydropConfig,
}

impl<P, L> InventoryService<P, L>
where
    P: KeyPool,
    L: LinkLedger,
{
    /// Create an inventory service over the given stores.
    pub const fn new(pool: P, ledger: L, config: KeydropConfig) -> Self {
        Self {
            pool,
            ledger,
            config,
        }
    }

    /// Transfer every non-deprecated catalog key into the pool.
    ///
    /// Duplicate inserts are no-ops, so running this twice in a row adds
    /// nothing the second time and never errors. Returns the number of
    /// entries newly added.
    ///
    /// # Errors
    ///
    /// Returns [`KeydropError::StoreError`](crate::KeydropError::StoreError)
    /// on catalog or pool faults.
    pub async fn refill(&self) -> Result<u64> {
        let timeout = self.config.store_timeout;

        let keys = bounded(timeout, "catalog read", self.ledger.catalog_keys()).await?;
        if keys.is_empty() {
            tracing::info!("Refill found an empty catalog");
            return Ok(0);
        }

        let added = bounded(timeout, "pool refill", self.pool.add_keys(&keys)).await?;

        tracing::info!(catalog = keys.len(), added, "Pool refilled from catalog");

        Ok(added)
    }

    /// Number of keys currently available in the pool.
    ///
    /// # Errors
    ///
    /// Returns [`KeydropError::StoreError`](crate::KeydropError::StoreError)
    /// if the pool is unreachable.
    pub async fn pool_size(&self) -> Result<u64> {
        bounded(self.config.store_timeout, "pool size", self.pool.remaining()).await
    }

    /// Most recent issuance records, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`KeydropError::StoreError`](crate::KeydropError::StoreError)
    /// if the ledger is unreachable.
    pub async fn recent_links(&self, limit: i64) -> Result<Vec<IssuedLink>> {
        bounded(
            self.config.store_timeout,
            "recent links",
            self.ledger.recent_links(limit),
        )
        .await
    }
}
