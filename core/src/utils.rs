//! Utility functions for key distribution.

use crate::error::{KeydropError, Result};
use base64::Engine;
use rand::RngCore;
use std::future::Future;
use std::time::Duration;

/// Generate a fresh, unguessable link identifier.
///
/// Returns a 256-bit random value encoded as base64url without padding
/// (43 characters), safe to embed in a URL path segment.
#[must_use]
pub fn generate_link_id() -> String {
    let mut random_bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut random_bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random_bytes)
}

/// Bound a store round-trip with a timeout.
///
/// An elapsed timer cancels the future (dropping any in-flight transaction,
/// which rolls back server-side) and surfaces as a store error.
pub(crate) async fn bounded<T>(
    limit: Duration,
    operation: &str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(KeydropError::StoreError(format!("{operation} timed out"))),
    }
}
