//! Mock issuance ledger for testing.
#![allow(clippy::unwrap_used)] // Mutex poisoning is unrecoverable in tests

use crate::error::{KeydropError, Result};
use crate::providers::{IssuedLink, KeyRecord, LinkLedger};
use chrono::Utc;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct LedgerState {
    links: HashMap<String, IssuedLink>,
    catalog: Vec<KeyRecord>,
}

/// In-memory ledger with mutex-held check-and-mark redemption.
#[derive(Debug, Clone, Default)]
pub struct MockLinkLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl MockLinkLedger {
    /// Create an empty mock ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock ledger whose catalog holds `keys`, none deprecated.
    #[must_use]
    pub fn with_catalog<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ledger = Self::new();
        ledger.state.lock().unwrap().catalog = keys
            .into_iter()
            .map(|key| KeyRecord {
                key_value: key.into(),
                deprecated: false,
                added_at: Utc::now(),
            })
            .collect();
        ledger
    }

    /// Add a catalog entry (for testing deprecation).
    pub fn push_catalog_key(&self, key_value: impl Into<String>, deprecated: bool) {
        self.state.lock().unwrap().catalog.push(KeyRecord {
            key_value: key_value.into(),
            deprecated,
            added_at: Utc::now(),
        });
    }

    /// Fetch a stored link row (for assertions).
    #[must_use]
    pub fn get(&self, link_id: &str) -> Option<IssuedLink> {
        self.state.lock().unwrap().links.get(link_id).cloned()
    }

    /// Number of stored link rows (for assertions).
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().links.len()
    }

    /// Whether the ledger holds no link rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LinkLedger for MockLinkLedger {
    async fn insert_link(&self, link: &IssuedLink) -> Result<()> {
        let mut state = self.state.lock().unwrap();

        if state.links.contains_key(&link.link_id) {
            return Err(KeydropError::StoreError("Link id already exists".to_string()));
        }
        state.links.insert(link.link_id.clone(), link.clone());

        Ok(())
    }

    async fn redeem_link(
        &self,
        link_id: &str,
        requester_ip: IpAddr,
        requester_agent: Option<&str>,
    ) -> Result<String> {
        // Single guard across the whole check-then-mark sequence: this is
        // the mock's analogue of the row lock.
        let mut state = self.state.lock().unwrap();

        let Some(link) = state.links.get_mut(link_id) else {
            return Err(KeydropError::LinkNotFound);
        };

        if link.consumed {
            return Err(KeydropError::AlreadyConsumed);
        }

        link.consumed = true;
        link.consumed_at = Some(Utc::now());
        link.requester_ip = Some(requester_ip.to_string());
        link.requester_agent = requester_agent.map(ToString::to_string);

        Ok(link.key_value.clone())
    }

    async fn recent_links(&self, limit: i64) -> Result<Vec<IssuedLink>> {
        let state = self.state.lock().unwrap();

        let mut links: Vec<IssuedLink> = state.links.values().cloned().collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        links.truncate(usize::try_from(limit).unwrap_or(0));

        Ok(links)
    }

    async fn catalog_keys(&self) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();

        Ok(state
            .catalog
            .iter()
            .filter(|record| !record.deprecated)
            .map(|record| record.key_value.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn localhost() -> IpAddr {
        IpAddr::V4(std::net::Ipv4Addr::LOCALHOST)
    }

    #[tokio::test]
    async fn redeem_marks_exactly_once() {
        let ledger = MockLinkLedger::new();
        let link = IssuedLink::bind("K1".to_string());
        ledger.insert_link(&link).await.unwrap();

        let key = ledger
            .redeem_link(&link.link_id, localhost(), Some("agent"))
            .await
            .unwrap();
        assert_eq!(key, "K1");

        let stored = ledger.get(&link.link_id).unwrap();
        assert!(stored.consumed);
        assert!(stored.consumed_at.is_some());
        assert_eq!(stored.requester_agent.as_deref(), Some("agent"));

        assert_eq!(
            ledger.redeem_link(&link.link_id, localhost(), None).await,
            Err(KeydropError::AlreadyConsumed)
        );
    }

    #[tokio::test]
    async fn unknown_link_is_not_found() {
        let ledger = MockLinkLedger::new();
        assert_eq!(
            ledger.redeem_link("missing", localhost(), None).await,
            Err(KeydropError::LinkNotFound)
        );
    }

    #[tokio::test]
    async fn concurrent_redeems_have_single_winner() {
        let ledger = MockLinkLedger::new();
        let link = IssuedLink::bind("K1".to_string());
        ledger.insert_link(&link).await.unwrap();

        let (a, b) = tokio::join!(
            ledger.redeem_link(&link.link_id, localhost(), None),
            ledger.redeem_link(&link.link_id, localhost(), None),
        );

        let wins = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1, "exactly one concurrent redemption may succeed");
    }

    #[tokio::test]
    async fn catalog_excludes_deprecated() {
        let ledger = MockLinkLedger::with_catalog(["K1", "K2"]);
        ledger.push_catalog_key("K3", true);

        let keys = ledger.catalog_keys().await.unwrap();
        assert_eq!(keys.len(), 2);
        assert!(!keys.contains(&"K3".to_string()));
    }
}
