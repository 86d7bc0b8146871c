//! Mock provider implementations for testing.
//!
//! Simple in-memory implementations of all provider traits. Each one keeps
//! its state behind an `Arc<Mutex<_>>` and performs its check-and-mutate
//! sequences under a single guard, so the atomicity contracts hold at
//! memory speed.

pub mod expiry;
pub mod key_pool;
pub mod ledger;
pub mod rate_limiter;

// Re-exports
pub use expiry::MockExpiryStore;
pub use key_pool::MockKeyPool;
pub use ledger::MockLinkLedger;
pub use rate_limiter::MockRateLimiter;
