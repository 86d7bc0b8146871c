//! Rate limiter trait for the claim path.
//!
//! The claim endpoint is guarded by a fixed-window request budget per
//! origin. The limiter is a collaborator enforced before issuance is
//! invoked; the core services themselves never consult it.

use crate::error::Result;
use std::time::Duration;

/// Fixed-window request budget.
pub trait RateLimiter: Send + Sync {
    /// Record one request for `key` and enforce the budget.
    ///
    /// The check and the recording are one atomic operation so that racing
    /// requests cannot both slip under the limit.
    ///
    /// # Errors
    ///
    /// - [`KeydropError::TooManyRequests`](crate::KeydropError::TooManyRequests)
    ///   when the budget for the current window is spent
    /// - [`KeydropError::StoreError`](crate::KeydropError::StoreError) if
    ///   the store round-trip fails
    fn check_and_record(
        &self,
        key: &str,
        max_requests: u32,
        window: Duration,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Clear the budget state for `key`.
    ///
    /// # Errors
    ///
    /// Returns error if the store round-trip fails.
    fn reset(&self, key: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}
