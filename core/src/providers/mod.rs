//! Provider traits for the key distribution core.
//!
//! This module defines the seams between the services and their external
//! stores. Providers are **interfaces**, not implementations: the issuance
//! and redemption services depend on these traits, and the runtime supplies
//! concrete implementations.
//!
//! This enables:
//! - **Testing**: in-memory mocks, deterministic and fast
//! - **Production**: Redis for the pool/markers, PostgreSQL for the ledger
//!
//! The core holds no in-process shared mutable state; every concurrency
//! guarantee is delegated to the stores behind these traits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod expiry;
pub mod key_pool;
pub mod ledger;
pub mod rate_limiter;

// Re-export provider traits
pub use expiry::ExpiryStore;
pub use key_pool::KeyPool;
pub use ledger::LinkLedger;
pub use rate_limiter::RateLimiter;

use crate::utils::generate_link_id;

/// Catalog entry for a distributable key.
///
/// Stored in PostgreSQL (`key_catalog`). Created by out-of-band admin
/// seeding; never mutated by the hot path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct KeyRecord {
    /// The secret payload handed to a redeemer.
    pub key_value: String,

    /// Excluded from future pool refills when set.
    pub deprecated: bool,

    /// When the key entered the catalog.
    pub added_at: DateTime<Utc>,
}

/// Issuance ledger row binding an opaque link identifier to one key.
///
/// Created once by issuance, mutated exactly once by redemption, never
/// deleted. `consumed` transitions false→true exactly once and never
/// reverts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct IssuedLink {
    /// Opaque, unguessable link identifier.
    pub link_id: String,

    /// The bound secret, copied from the pool at issuance. Immutable.
    pub key_value: String,

    /// Issuance timestamp.
    pub created_at: DateTime<Utc>,

    /// Whether the link has been redeemed.
    pub consumed: bool,

    /// Redemption timestamp, stamped on consumption.
    pub consumed_at: Option<DateTime<Utc>>,

    /// Redeemer IP address, stamped on consumption.
    pub requester_ip: Option<String>,

    /// Redeemer user agent, stamped on consumption.
    pub requester_agent: Option<String>,
}

impl IssuedLink {
    /// Create a fresh, unconsumed link bound to `key_value`.
    #[must_use]
    pub fn bind(key_value: String) -> Self {
        Self {
            link_id: generate_link_id(),
            key_value,
            created_at: Utc::now(),
            consumed: false,
            consumed_at: None,
            requester_ip: None,
            requester_agent: None,
        }
    }
}
