//! Redemption: exchange a link for its bound key, exactly once.
//!
//! The whole transition lives inside the ledger's locked unit of work; this
//! service adds the round-trip timeout and the best-effort marker cleanup,
//! both outside the critical section.

use crate::config::KeydropConfig;
use crate::error::Result;
use crate::providers::{ExpiryStore, LinkLedger};
use crate::utils::bounded;
use std::net::IpAddr;

/// Redeems issued links against the ledger.
#[derive(Clone)]
pub struct RedemptionService<L, E> {
    ledger: L,
    expiry: E,
    config: KeydropConfig,
}

impl<L, E> RedemptionService<L, E>
where
    L: LinkLedger,
    E: ExpiryStore,
{
    /// Create a redemption service over the given stores.
    pub const fn new(ledger: L, expiry: E, config: KeydropConfig) -> Self {
        Self {
            ledger,
            expiry,
            config,
        }
    }

    /// Redeem `link_id`, returning the bound key value.
    ///
    /// Attempts on the same link are linearized by the ledger's row lock:
    /// the first to commit receives the key, and every other caller (racing
    /// or arriving later) observes the consumed state. The key value is
    /// therefore returned exactly once across the record's lifetime.
    ///
    /// # Errors
    ///
    /// - [`KeydropError::LinkNotFound`](crate::KeydropError::LinkNotFound)
    ///   when the identifier resolves to no record
    /// - [`KeydropError::AlreadyConsumed`](crate::KeydropError::AlreadyConsumed)
    ///   when the link was redeemed earlier (or by a racing winner)
    /// - [`KeydropError::StoreError`](crate::KeydropError::StoreError) on
    ///   ledger faults or timeouts, after rollback
    pub async fn redeem(
        &self,
        link_id: &str,
        requester_ip: IpAddr,
        requester_agent: Option<&str>,
    ) -> Result<String> {
        let key_value = bounded(
            self.config.store_timeout,
            "ledger redeem",
            self.ledger.redeem_link(link_id, requester_ip, requester_agent),
        )
        .await?;

        // Consumption is committed; the marker is now garbage. Advisory
        // cleanup, so failure must not fail the request.
        let disarmed = bounded(
            self.config.store_timeout,
            "expiry disarm",
            self.expiry.disarm(link_id),
        )
        .await;
        if let Err(e) = disarmed {
            tracing::warn!(
                error = %e,
                link_id,
                "Failed to disarm expiry marker after redemption"
            );
        }

        tracing::info!(link_id, requester_ip = %requester_ip, "Link redeemed");

        Ok(key_value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::error::KeydropError;
    use crate::mocks::{MockExpiryStore, MockLinkLedger};
    use crate::providers::IssuedLink;
    use std::time::Duration;

    fn localhost() -> IpAddr {
        IpAddr::V4(std::net::Ipv4Addr::LOCALHOST)
    }

    fn service(
        ledger: MockLinkLedger,
        expiry: MockExpiryStore,
    ) -> RedemptionService<MockLinkLedger, MockExpiryStore> {
        RedemptionService::new(ledger, expiry, KeydropConfig::default())
    }

    #[tokio::test]
    async fn redeem_returns_key_and_stamps_requester() {
        let ledger = MockLinkLedger::new();
        let link = IssuedLink::bind("K1".to_string());
        ledger.insert_link(&link).await.unwrap();

        let redemption = service(ledger.clone(), MockExpiryStore::new());
        let key = redemption
            .redeem(&link.link_id, localhost(), Some("curl/8.0"))
            .await
            .unwrap();

        assert_eq!(key, "K1");
        let stored = ledger.get(&link.link_id).unwrap();
        assert!(stored.consumed);
        assert_eq!(stored.requester_ip.as_deref(), Some("127.0.0.1"));
        assert_eq!(stored.requester_agent.as_deref(), Some("curl/8.0"));
    }

    #[tokio::test]
    async fn second_redeem_is_already_consumed() {
        let ledger = MockLinkLedger::new();
        let link = IssuedLink::bind("K1".to_string());
        ledger.insert_link(&link).await.unwrap();

        let redemption = service(ledger, MockExpiryStore::new());
        redemption
            .redeem(&link.link_id, localhost(), None)
            .await
            .unwrap();

        assert_eq!(
            redemption.redeem(&link.link_id, localhost(), None).await,
            Err(KeydropError::AlreadyConsumed)
        );
    }

    #[tokio::test]
    async fn unknown_link_is_not_found() {
        let redemption = service(MockLinkLedger::new(), MockExpiryStore::new());

        assert_eq!(
            redemption.redeem("does-not-exist", localhost(), None).await,
            Err(KeydropError::LinkNotFound)
        );
    }

    #[tokio::test]
    async fn redeem_disarms_marker() {
        let ledger = MockLinkLedger::new();
        let expiry = MockExpiryStore::new();
        let link = IssuedLink::bind("K1".to_string());
        ledger.insert_link(&link).await.unwrap();
        expiry
            .arm(&link.link_id, Duration::from_secs(900))
            .await
            .unwrap();

        let redemption = service(ledger, expiry.clone());
        redemption
            .redeem(&link.link_id, localhost(), None)
            .await
            .unwrap();

        assert!(!expiry.is_armed(&link.link_id).await.unwrap());
    }

    #[tokio::test]
    async fn marker_failure_does_not_fail_redemption() {
        let ledger = MockLinkLedger::new();
        let expiry = MockExpiryStore::new();
        let link = IssuedLink::bind("K1".to_string());
        ledger.insert_link(&link).await.unwrap();
        expiry.set_fail(true);

        let redemption = service(ledger, expiry);
        let key = redemption
            .redeem(&link.link_id, localhost(), None)
            .await
            .unwrap();

        assert_eq!(key, "K1");
    }

    #[tokio::test]
    async fn racing_redeems_have_single_winner() {
        let ledger = MockLinkLedger::new();
        let link = IssuedLink::bind("K1".to_string());
        ledger.insert_link(&link).await.unwrap();

        let redemption = service(ledger, MockExpiryStore::new());

        let mut handles = vec![];
        for _ in 0..10 {
            let redemption = redemption.clone();
            let link_id = link.link_id.clone();
            handles.push(tokio::spawn(async move {
                redemption.redeem(&link_id, localhost(), None).await
            }));
        }

        let mut winners = 0;
        let mut losers = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(key) => {
                    assert_eq!(key, "K1");
                    winners += 1;
                }
                Err(KeydropError::AlreadyConsumed) => losers += 1,
                Err(other) => assert_eq!(other, KeydropError::AlreadyConsumed),
            }
        }

        assert_eq!(winners, 1, "the key is delivered exactly once");
        assert_eq!(losers, 9);
    }
}
