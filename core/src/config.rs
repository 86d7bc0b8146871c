//! Key distribution configuration.
//!
//! Tunables for the issuance/redemption services. Values should be provided
//! by the application, not hardcoded.

use std::time::Duration;

/// Configuration for the key distribution services.
#[derive(Debug, Clone)]
pub struct KeydropConfig {
    /// Advisory freshness window for an issued link. The expiry marker is
    /// armed with this TTL; its lapse never affects ledger correctness.
    ///
    /// Default: 15 minutes
    pub link_ttl: Duration,

    /// Upper bound on a single store round-trip. An elapsed timer surfaces
    /// as a store error and rolls back the unit of work.
    ///
    /// Default: 5 seconds
    pub store_timeout: Duration,

    /// Claim requests allowed per origin per window.
    ///
    /// Default: 10
    pub claim_limit: u32,

    /// Fixed window for the claim request budget.
    ///
    /// Default: 60 seconds
    pub claim_window: Duration,
}

impl KeydropConfig {
    /// Create a configuration with the default tunables.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            link_ttl: Duration::from_secs(15 * 60),
            store_timeout: Duration::from_secs(5),
            claim_limit: 10,
            claim_window: Duration::from_secs(60),
        }
    }

    /// Set the advisory link freshness window.
    #[must_use]
    pub const fn with_link_ttl(mut self, ttl: Duration) -> Self {
        self.link_ttl = ttl;
        self
    }

    /// Set the per-round-trip store timeout.
    #[must_use]
    pub const fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Set the claim request budget.
    #[must_use]
    pub const fn with_claim_budget(mut self, limit: u32, window: Duration) -> Self {
        self.claim_limit = limit;
        self.claim_window = window;
        self
    }
}

impl Default for KeydropConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = KeydropConfig::default();
        assert_eq!(config.link_ttl, Duration::from_secs(900));
        assert_eq!(config.store_timeout, Duration::from_secs(5));
        assert_eq!(config.claim_limit, 10);
        assert_eq!(config.claim_window, Duration::from_secs(60));
    }

    #[test]
    fn test_config_builder() {
        let config = KeydropConfig::new()
            .with_link_ttl(Duration::from_secs(300))
            .with_store_timeout(Duration::from_secs(2))
            .with_claim_budget(3, Duration::from_secs(30));

        assert_eq!(config.link_ttl, Duration::from_secs(300));
        assert_eq!(config.store_timeout, Duration::from_secs(2));
        assert_eq!(config.claim_limit, 3);
        assert_eq!(config.claim_window, Duration::from_secs(30));
    }
}
