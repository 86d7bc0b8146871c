//! # Keydrop Core
//!
//! Single-use key distribution: hand out each secret from a bounded
//! inventory to exactly one requester, behind a claim → issue → redeem
//! state machine.
//!
//! ## Architecture
//!
//! Two external stores carry all coordination:
//!
//! ```text
//! key_catalog ──refill──▶ Pool (Redis SET) ──pop──▶ Ledger (PostgreSQL)
//!  (Postgres)              atomic SPOP              row-locked redeem
//! ```
//!
//! - the **pool** supports atomic random removal, so concurrent claims can
//!   never receive the same key;
//! - the **ledger** serializes redemption attempts per link with a row
//!   lock, so each secret is delivered at most once;
//! - **expiry markers** and the **rate limiter** are advisory collaborators
//!   whose failures never affect the two guarantees above.
//!
//! The services (`IssuanceService`, `RedemptionService`,
//! `InventoryService`) are generic over provider traits, so tests run
//! against in-memory mocks at memory speed while production wires Redis
//! and PostgreSQL.

pub mod config;
pub mod error;
pub mod inventory;
pub mod issuance;
pub mod providers;
pub mod redemption;
pub mod stores;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use config::KeydropConfig;
pub use error::{KeydropError, Result};
pub use inventory::InventoryService;
pub use issuance::IssuanceService;
pub use providers::{IssuedLink, KeyRecord};
pub use redemption::RedemptionService;
