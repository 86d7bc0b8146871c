//! Route table for the key distribution boundary.

use crate::handlers::{admin, claim, health, present};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use keydrop_core::providers::{ExpiryStore, KeyPool, LinkLedger, RateLimiter};
use tower_http::trace::TraceLayer;

/// Build the application router over the given state.
///
/// Public surface: claim, presentation, health. Admin surface: refill and
/// audit, both behind the `X-Admin-Token` check inside the handlers.
pub fn build_router<P, L, E, R>(state: AppState<P, L, E, R>) -> Router
where
    P: KeyPool + Clone + Send + Sync + 'static,
    L: LinkLedger + Clone + Send + Sync + 'static,
    E: ExpiryStore + Clone + Send + Sync + 'static,
    R: RateLimiter + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health::health_check))
        .route("/claim", get(claim::claim_key::<P, L, E, R>))
        .route("/keys/:link_id", get(present::present_key::<P, L, E, R>))
        .route(
            "/api/v1/admin/refill",
            post(admin::refill_pool::<P, L, E, R>),
        )
        .route(
            "/api/v1/admin/links",
            get(admin::recent_links::<P, L, E, R>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
