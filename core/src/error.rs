//! Error types for key distribution operations.

use thiserror::Error;

/// Result type alias for key distribution operations.
pub type Result<T> = std::result::Result<T, KeydropError>;

/// Error taxonomy for the claim/issue/redeem pipeline.
///
/// Variants are organized by category: outcomes a user can trigger through
/// normal use come first, store-level faults last.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeydropError {
    // ═══════════════════════════════════════════════════════════
    // Issuance Outcomes
    // ═══════════════════════════════════════════════════════════

    /// The key pool is exhausted. Retriable after an admin refill.
    #[error("No keys available")]
    NoInventory,

    // ═══════════════════════════════════════════════════════════
    // Redemption Outcomes
    // ═══════════════════════════════════════════════════════════

    /// The link identifier does not resolve to any issuance record.
    #[error("Link not found")]
    LinkNotFound,

    /// The link was already redeemed. Not a bug condition: losing a
    /// redemption race lands here.
    #[error("Link has already been claimed")]
    AlreadyConsumed,

    // ═══════════════════════════════════════════════════════════
    // Boundary Outcomes
    // ═══════════════════════════════════════════════════════════

    /// The claim request budget for this origin is spent.
    #[error("Too many requests, please retry after {retry_after:?}")]
    TooManyRequests {
        /// Duration to wait before retrying.
        retry_after: std::time::Duration,
    },

    /// Admin credential missing or wrong.
    #[error("Unauthorized")]
    Unauthorized,

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Transient store or transaction failure. The unit of work has been
    /// rolled back; the whole request is safe to retry.
    #[error("Store error: {0}")]
    StoreError(String),

    /// Internal encode/decode failure.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl KeydropError {
    /// Returns `true` if this error is a normal user-facing outcome rather
    /// than a system fault.
    ///
    /// # Examples
    ///
    /// ```
    /// # use keydrop_core::KeydropError;
    /// assert!(KeydropError::NoInventory.is_user_error());
    /// assert!(KeydropError::AlreadyConsumed.is_user_error());
    /// assert!(!KeydropError::StoreError("timeout".into()).is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::NoInventory
                | Self::LinkNotFound
                | Self::AlreadyConsumed
                | Self::TooManyRequests { .. }
                | Self::Unauthorized
        )
    }
}
