//! Claim handler: the entry point of the distribution flow.
//!
//! A claim spends one unit of the requester's fixed-window budget, pops one
//! key from the pool, and redirects to the presentation URL for the freshly
//! issued link. The user lands here after completing the external redirect
//! step; nothing verifies that the step actually happened, so the claim path
//! is purely client-triggered, and the budget is the only gate.

use crate::error::AppError;
use crate::extractors::{ClientIp, CorrelationId};
use crate::state::AppState;
use axum::{extract::State, response::Redirect};
use keydrop_core::providers::{ExpiryStore, KeyPool, LinkLedger, RateLimiter};

/// Claim one key.
///
/// # Endpoint
///
/// ```text
/// GET /claim
/// ```
///
/// # Responses
///
/// - `303 See Other` → `{base_url}/keys/{link_id}`
/// - `410 Gone` when the pool is exhausted
/// - `429 Too Many Requests` when the claim budget is spent
/// - `500` on store faults
pub async fn claim_key<P, L, E, R>(
    State(state): State<AppState<P, L, E, R>>,
    correlation_id: CorrelationId,
    ClientIp(client_ip): ClientIp,
) -> Result<Redirect, AppError>
where
    P: KeyPool + Clone + Send + Sync + 'static,
    L: LinkLedger + Clone + Send + Sync + 'static,
    E: ExpiryStore + Clone + Send + Sync + 'static,
    R: RateLimiter + Clone + Send + Sync + 'static,
{
    // The budget check precedes every store touch on the hot path.
    state
        .rate_limiter
        .check_and_record(
            &format!("claim:{client_ip}"),
            state.config.claim_limit,
            state.config.claim_window,
        )
        .await?;

    let link = state.issuance.issue().await?;

    tracing::info!(
        correlation_id = %correlation_id.0,
        client_ip = %client_ip,
        link_id = %link.link_id,
        "Claim accepted"
    );

    Ok(Redirect::to(&format!(
        "{}/keys/{}",
        state.base_url, link.link_id
    )))
}
