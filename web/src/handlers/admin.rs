//! Admin handlers: pool refill and the issuance audit view.
//!
//! Both require the out-of-band shared secret in `X-Admin-Token`. The
//! comparison is constant-time, and authorization happens before any store
//! is touched.

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Utc};
use keydrop_core::providers::{ExpiryStore, IssuedLink, KeyPool, LinkLedger, RateLimiter};
use serde::{Deserialize, Serialize};

/// Default and maximum audit page sizes.
const DEFAULT_AUDIT_LIMIT: i64 = 50;
const MAX_AUDIT_LIMIT: i64 = 500;

/// Response after a pool refill.
#[derive(Debug, Clone, Serialize)]
pub struct RefillResponse {
    /// Entries newly added to the pool.
    pub added: u64,

    /// Pool size after the refill.
    pub pool_size: u64,
}

/// Query parameters for the audit view.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditQuery {
    /// Maximum records to return (default 50, capped at 500).
    pub limit: Option<i64>,
}

/// One issuance record in the audit view.
///
/// `key_value` is withheld until the link is consumed: the audit endpoint
/// must not become a side channel around the redemption state machine.
#[derive(Debug, Clone, Serialize)]
pub struct LinkAuditView {
    /// Opaque link identifier.
    pub link_id: String,

    /// The delivered secret, present only for consumed links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_value: Option<String>,

    /// Issuance timestamp.
    pub created_at: DateTime<Utc>,

    /// Whether the link has been redeemed.
    pub consumed: bool,

    /// Redemption timestamp.
    pub consumed_at: Option<DateTime<Utc>>,

    /// Redeemer IP address.
    pub requester_ip: Option<String>,

    /// Redeemer user agent.
    pub requester_agent: Option<String>,
}

impl From<IssuedLink> for LinkAuditView {
    fn from(link: IssuedLink) -> Self {
        let key_value = link.consumed.then_some(link.key_value);
        Self {
            link_id: link.link_id,
            key_value,
            created_at: link.created_at,
            consumed: link.consumed,
            consumed_at: link.consumed_at,
            requester_ip: link.requester_ip,
            requester_agent: link.requester_agent,
        }
    }
}

/// Check the admin credential without leaking timing information.
fn authorize(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let provided = headers
        .get("X-Admin-Token")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Admin credential required"))?;

    if !constant_time_eq::constant_time_eq(provided.as_bytes(), expected_token.as_bytes()) {
        return Err(AppError::unauthorized("Admin credential required"));
    }

    Ok(())
}

/// Transfer all vetted catalog keys into the pool.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/admin/refill
/// X-Admin-Token: <shared secret>
/// ```
pub async fn refill_pool<P, L, E, R>(
    State(state): State<AppState<P, L, E, R>>,
    headers: HeaderMap,
) -> Result<Json<RefillResponse>, AppError>
where
    P: KeyPool + Clone + Send + Sync + 'static,
    L: LinkLedger + Clone + Send + Sync + 'static,
    E: ExpiryStore + Clone + Send + Sync + 'static,
    R: RateLimiter + Clone + Send + Sync + 'static,
{
    authorize(&headers, &state.admin_token)?;

    let added = state.inventory.refill().await?;
    let pool_size = state.inventory.pool_size().await?;

    Ok(Json(RefillResponse { added, pool_size }))
}

/// Audit view over recent issuance records, newest first.
///
/// # Endpoint
///
/// ```text
/// GET /api/v1/admin/links?limit=N
/// X-Admin-Token: <shared secret>
/// ```
pub async fn recent_links<P, L, E, R>(
    State(state): State<AppState<P, L, E, R>>,
    headers: HeaderMap,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<LinkAuditView>>, AppError>
where
    P: KeyPool + Clone + Send + Sync + 'static,
    L: LinkLedger + Clone + Send + Sync + 'static,
    E: ExpiryStore + Clone + Send + Sync + 'static,
    R: RateLimiter + Clone + Send + Sync + 'static,
{
    authorize(&headers, &state.admin_token)?;

    let limit = query
        .limit
        .unwrap_or(DEFAULT_AUDIT_LIMIT)
        .clamp(1, MAX_AUDIT_LIMIT);

    let links = state.inventory.recent_links(limit).await?;

    Ok(Json(links.into_iter().map(LinkAuditView::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Utc;

    #[test]
    fn authorize_rejects_missing_and_wrong_tokens() {
        let empty = HeaderMap::new();
        assert!(authorize(&empty, "secret").is_err());

        let mut wrong = HeaderMap::new();
        wrong.insert("X-Admin-Token", HeaderValue::from_static("guess"));
        assert!(authorize(&wrong, "secret").is_err());

        let mut right = HeaderMap::new();
        right.insert("X-Admin-Token", HeaderValue::from_static("secret"));
        assert!(authorize(&right, "secret").is_ok());
    }

    #[test]
    fn audit_view_masks_unconsumed_keys() {
        let unconsumed = IssuedLink::bind("hidden-secret".to_string());
        let view = LinkAuditView::from(unconsumed);
        assert!(view.key_value.is_none());

        let mut consumed = IssuedLink::bind("delivered-secret".to_string());
        consumed.consumed = true;
        consumed.consumed_at = Some(Utc::now());
        let view = LinkAuditView::from(consumed);
        assert_eq!(view.key_value.as_deref(), Some("delivered-secret"));
    }
}
