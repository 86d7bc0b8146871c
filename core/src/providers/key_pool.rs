//! Key pool trait.
//!
//! The pool is the ephemeral inventory of unissued key values. It has set
//! semantics: entries have no identity beyond their value, and removal is
//! destructive.

use crate::error::Result;

/// Ephemeral pool of available, not-yet-issued key values.
///
/// # Implementation Notes
///
/// - **CRITICAL**: `pop_key()` MUST be atomic: at most one concurrent
///   caller may obtain a given entry. Use `Redis` `SPOP` or a
///   mutex-protected set; a store lacking an exclusive-removal primitive
///   must simulate one with a compare-and-swap loop.
/// - `add_keys()` is an idempotent set insert: re-adding a present value is
///   a no-op, not an error.
pub trait KeyPool: Send + Sync {
    /// Atomically remove and return one arbitrary entry.
    ///
    /// Returns `Ok(None)` when the pool is empty. No two concurrent calls
    /// can receive the same entry.
    ///
    /// # Errors
    ///
    /// Returns error if the store round-trip fails.
    fn pop_key(&self) -> impl std::future::Future<Output = Result<Option<String>>> + Send;

    /// Insert key values with set semantics.
    ///
    /// Returns the number of entries that were newly added (already-present
    /// values do not count and do not error).
    ///
    /// # Errors
    ///
    /// Returns error if the store round-trip fails.
    fn add_keys(&self, keys: &[String]) -> impl std::future::Future<Output = Result<u64>> + Send;

    /// Number of entries currently available.
    ///
    /// # Errors
    ///
    /// Returns error if the store round-trip fails.
    fn remaining(&self) -> impl std::future::Future<Output = Result<u64>> + Send;
}
