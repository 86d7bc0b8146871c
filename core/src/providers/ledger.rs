//! Issuance ledger trait.
//!
//! The ledger is the durable record of every issued link and the single
//! arbiter of redemption: the check-then-mark transition happens entirely
//! inside the store, under a per-row lock.

use crate::error::Result;
use crate::providers::IssuedLink;
use std::net::IpAddr;

/// Durable, row-oriented store of issuance records plus the key catalog.
///
/// # Implementation Notes
///
/// - **CRITICAL**: `redeem_link()` MUST serialize concurrent attempts on
///   the same row. Use an explicit row lock (`SELECT ... FOR UPDATE` in a
///   transaction) or a mutex-held check-and-mark. The first committer wins;
///   every later attempt observes the consumed state.
/// - The ledger is append-only from the services' perspective: rows are
///   created once and mutated once, never deleted.
pub trait LinkLedger: Send + Sync {
    /// Persist a freshly issued, unconsumed link row.
    ///
    /// # Errors
    ///
    /// Returns error if the store round-trip fails or the link id already
    /// exists.
    fn insert_link(&self, link: &IssuedLink) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Atomically check-and-mark the row for `link_id` as consumed,
    /// returning the bound key value.
    ///
    /// The whole sequence (locate with a row lock, inspect `consumed`,
    /// stamp the consumption columns, commit) is one unit of work. On any
    /// abort path the row is left untouched and unlocked.
    ///
    /// # Errors
    ///
    /// - [`KeydropError::LinkNotFound`](crate::KeydropError::LinkNotFound)
    ///   if no row exists for `link_id`
    /// - [`KeydropError::AlreadyConsumed`](crate::KeydropError::AlreadyConsumed)
    ///   if the row was consumed before this attempt acquired the lock
    /// - [`KeydropError::StoreError`](crate::KeydropError::StoreError) on
    ///   transaction failure, after rollback
    fn redeem_link(
        &self,
        link_id: &str,
        requester_ip: IpAddr,
        requester_agent: Option<&str>,
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Most recent issuance records, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the store round-trip fails.
    fn recent_links(&self, limit: i64) -> impl std::future::Future<Output = Result<Vec<IssuedLink>>> + Send;

    /// All non-deprecated key values from the durable catalog.
    ///
    /// # Errors
    ///
    /// Returns error if the store round-trip fails.
    fn catalog_keys(&self) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
}
