//! Custom Axum extractors.
//!
//! - `CorrelationId`: request correlation id from `X-Correlation-ID`, or a
//!   fresh UUID
//! - `ClientIp`: requester address from proxy headers; this is both the
//!   rate-limit key and the value stamped into the ledger on redemption
//! - `UserAgent`: optional `User-Agent`, stamped into the ledger on
//!   redemption

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use std::net::IpAddr;
use uuid::Uuid;

/// Correlation ID for request tracing.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let correlation_id = parts
            .headers
            .get("X-Correlation-ID")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// Requester IP address.
///
/// Resolution order: first entry of `X-Forwarded-For`, then `X-Real-IP`,
/// then the loopback fallback (direct connections behind no proxy).
#[derive(Debug, Clone, Copy)]
pub struct ClientIp(pub IpAddr);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(client_ip_from_headers(&parts.headers)))
    }
}

fn client_ip_from_headers(headers: &HeaderMap) -> IpAddr {
    let forwarded = headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse::<IpAddr>().ok());

    if let Some(ip) = forwarded {
        return ip;
    }

    let real_ip = headers
        .get("X-Real-IP")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<IpAddr>().ok());

    real_ip.unwrap_or(IpAddr::V4(std::net::Ipv4Addr::LOCALHOST))
}

/// Requester `User-Agent`, if any.
#[derive(Debug, Clone)]
pub struct UserAgent(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for UserAgent
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .headers
            .get("User-Agent")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);

        Ok(Self(user_agent))
    }
}
