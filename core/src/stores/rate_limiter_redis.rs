//! Redis-based rate limiter implementation.
//!
//! Fixed-window counting: requests land in a counter keyed by origin and
//! window bucket, and the counter expires with the window. The increment
//! and the TTL are set in one atomic pipeline so racing requests cannot
//! both slip under the limit.

use crate::error::{KeydropError, Result};
use crate::providers::RateLimiter;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// `Redis`-based fixed-window rate limiter.
///
/// # Example
///
/// ```no_run
/// use keydrop_core::stores::RedisRateLimiter;
/// use keydrop_core::providers::RateLimiter;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let limiter = RedisRateLimiter::new("redis://127.0.0.1:6379").await?;
///
/// // 10 claim requests per origin per minute
/// limiter.check_and_record("claim:203.0.113.1", 10, Duration::from_secs(60)).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RedisRateLimiter {
    /// Connection manager for connection pooling.
    conn_manager: ConnectionManager,

    /// Key namespace, `keydrop` unless overridden.
    namespace: String,
}

impl RedisRateLimiter {
    /// Create a new `Redis` rate limiter.
    ///
    /// # Errors
    ///
    /// Returns error if connection to `Redis` fails.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| KeydropError::StoreError(format!("Failed to create Redis client: {e}")))?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            KeydropError::StoreError(format!("Failed to create Redis connection manager: {e}"))
        })?;

        Ok(Self {
            conn_manager,
            namespace: "keydrop".to_string(),
        })
    }

    /// Override the key namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Seconds since the epoch.
    fn now_secs() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs()
    }

    /// The counter key for `key` in the window bucket containing `now`.
    fn window_key(&self, key: &str, window_secs: u64) -> String {
        let bucket = Self::now_secs() / window_secs.max(1);
        format!("{}:rate:{key}:{bucket}", self.namespace)
    }
}

impl RateLimiter for RedisRateLimiter {
    async fn check_and_record(&self, key: &str, max_requests: u32, window: Duration) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let window_secs = window.as_secs().max(1);
        let rate_key = self.window_key(key, window_secs);

        // Atomic pipeline: bump the counter and keep the bucket from
        // outliving its window. INCR returns the post-increment count, so
        // the check below sees this request included.
        //
        // Note: .ignore() means "don't return this value", NOT "ignore
        // errors": a failed EXPIRE fails the whole pipeline, and the safe
        // default is to deny.
        #[allow(clippy::cast_possible_wrap)] // Windows are small durations
        let (count,): (u64,) = redis::pipe()
            .atomic()
            .incr(&rate_key, 1)
            .expire(&rate_key, window_secs as i64 + 1)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    key = %key,
                    "Redis pipeline failed during rate limit check (safe default: deny)"
                );
                KeydropError::StoreError(format!("Failed to check and record rate limit: {e}"))
            })?;

        if count > u64::from(max_requests) {
            // Time left in the current fixed window.
            let retry_after = Duration::from_secs(window_secs - (Self::now_secs() % window_secs));

            tracing::warn!(
                rate_limit_exceeded = true,
                key = %key,
                requests = count,
                max_requests,
                window_secs,
                "Claim budget exceeded"
            );

            return Err(KeydropError::TooManyRequests { retry_after });
        }

        tracing::debug!(
            key = %key,
            requests = count,
            max_requests,
            window_secs,
            "Claim budget check passed"
        );

        Ok(())
    }

    async fn reset(&self, key: &str) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let window_keys: Vec<String> = conn
            .keys(format!("{}:rate:{key}:*", self.namespace))
            .await
            .map_err(|e| KeydropError::StoreError(format!("Failed to list rate limit keys: {e}")))?;

        if !window_keys.is_empty() {
            let _: () = conn
                .del(window_keys)
                .await
                .map_err(|e| KeydropError::StoreError(format!("Failed to reset rate limit: {e}")))?;
        }

        tracing::info!(key = %key, "Reset rate limit");

        Ok(())
    }
}
