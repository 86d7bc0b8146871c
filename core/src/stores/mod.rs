//! Storage implementations for the key distribution core.
//!
//! - **Key Pool** (Redis) - unordered inventory set with atomic random
//!   removal via `SPOP`
//! - **Expiry Store** (Redis) - advisory TTL markers per link
//! - **Rate Limiter** (Redis) - fixed-window claim budget
//! - **Link Ledger** (PostgreSQL) - durable issuance records with row-level
//!   check-then-mark redemption, plus the key catalog

pub mod expiry_redis;
pub mod pool_redis;
pub mod postgres;
pub mod rate_limiter_redis;

// Re-exports
pub use expiry_redis::RedisExpiryStore;
pub use pool_redis::RedisKeyPool;
pub use postgres::PostgresLinkLedger;
pub use rate_limiter_redis::RedisRateLimiter;
