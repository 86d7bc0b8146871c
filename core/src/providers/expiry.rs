//! Expiry marker trait.
//!
//! Markers are advisory cleanup records keyed by link id, self-expiring
//! after a TTL. They bound how long a forgotten link's presentation page
//! stays fresh; they are NOT a correctness mechanism, and every caller
//! treats marker failures as non-fatal.

use crate::error::Result;
use std::time::Duration;

/// Self-expiring advisory markers, one per active link.
pub trait ExpiryStore: Send + Sync {
    /// Arm a marker for `link_id` that lapses after `ttl` if untouched.
    ///
    /// # Errors
    ///
    /// Returns error if the store round-trip fails.
    fn arm(&self, link_id: &str, ttl: Duration) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Remove the marker for `link_id`. Removing an absent marker is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns error if the store round-trip fails.
    fn disarm(&self, link_id: &str) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Whether a live marker exists for `link_id`.
    ///
    /// # Errors
    ///
    /// Returns error if the store round-trip fails.
    fn is_armed(&self, link_id: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
}
