//! Application state for Axum handlers.

use keydrop_core::providers::{ExpiryStore, KeyPool, LinkLedger, RateLimiter};
use keydrop_core::{InventoryService, IssuanceService, KeydropConfig, RedemptionService};

/// Application state shared across all HTTP handlers.
///
/// Generic over the provider traits so the router can be wired against the
/// real Redis/PostgreSQL stores in production and against the in-memory
/// mocks in tests. `Clone` shares the underlying store handles.
#[derive(Clone)]
pub struct AppState<P, L, E, R> {
    /// Pop-and-bind service behind the claim endpoint.
    pub issuance: IssuanceService<P, L, E>,

    /// Check-and-mark service behind the presentation endpoint.
    pub redemption: RedemptionService<L, E>,

    /// Admin refill and audit service.
    pub inventory: InventoryService<P, L>,

    /// Claim-path request budget.
    pub rate_limiter: R,

    /// Service tunables (claim budget, TTLs, timeouts).
    pub config: KeydropConfig,

    /// Public base URL used to build presentation redirects.
    pub base_url: String,

    /// Shared secret expected in `X-Admin-Token`.
    pub admin_token: String,
}

impl<P, L, E, R> AppState<P, L, E, R>
where
    P: KeyPool + Clone,
    L: LinkLedger + Clone,
    E: ExpiryStore + Clone,
    R: RateLimiter + Clone,
{
    /// Wire the services over the given stores.
    pub fn new(
        pool: P,
        ledger: L,
        expiry: E,
        rate_limiter: R,
        config: KeydropConfig,
        base_url: impl Into<String>,
        admin_token: impl Into<String>,
    ) -> Self {
        Self {
            issuance: IssuanceService::new(
                pool.clone(),
                ledger.clone(),
                expiry.clone(),
                config.clone(),
            ),
            redemption: RedemptionService::new(ledger.clone(), expiry, config.clone()),
            inventory: InventoryService::new(pool, ledger, config.clone()),
            rate_limiter,
            config,
            base_url: base_url.into(),
            admin_token: admin_token.into(),
        }
    }
}
