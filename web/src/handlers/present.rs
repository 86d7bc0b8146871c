//! Presentation handler: render a redeemed key exactly once.
//!
//! The response is the single delivery of the secret, so the boundary must
//! keep every intermediary from replaying it: `no-store` cache directives
//! and a `noindex` robots directive on the success path. A cached or
//! indexed copy would hand the secret to a second viewer without going
//! through the ledger's state machine.

use crate::error::AppError;
use crate::extractors::{ClientIp, UserAgent};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, HeaderName},
    response::{Html, IntoResponse},
};
use keydrop_core::providers::{ExpiryStore, KeyPool, LinkLedger, RateLimiter};

/// Cache and robots directives for the one-time page.
const NO_STORE: &str = "no-store, no-cache, must-revalidate, private";
const NO_INDEX: &str = "noindex, nofollow";

/// Redeem a link and render its key.
///
/// # Endpoint
///
/// ```text
/// GET /keys/:link_id
/// ```
///
/// # Responses
///
/// - `200 OK` - the key, rendered once, with cache-disabling headers
/// - `404 Not Found` - unknown or invalid link
/// - `409 Conflict` - link already claimed (racing losers land here)
/// - `500` on store faults
pub async fn present_key<P, L, E, R>(
    State(state): State<AppState<P, L, E, R>>,
    Path(link_id): Path<String>,
    ClientIp(client_ip): ClientIp,
    UserAgent(user_agent): UserAgent,
) -> Result<impl IntoResponse, AppError>
where
    P: KeyPool + Clone + Send + Sync + 'static,
    L: LinkLedger + Clone + Send + Sync + 'static,
    E: ExpiryStore + Clone + Send + Sync + 'static,
    R: RateLimiter + Clone + Send + Sync + 'static,
{
    let key_value = state
        .redemption
        .redeem(&link_id, client_ip, user_agent.as_deref())
        .await?;

    Ok((
        [
            (header::CACHE_CONTROL, NO_STORE),
            (header::PRAGMA, "no-cache"),
            (HeaderName::from_static("x-robots-tag"), NO_INDEX),
        ],
        Html(render_key_page(&key_value)),
    ))
}

/// Minimal one-time presentation page.
fn render_key_page(key_value: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head><meta charset=\"utf-8\"><meta name=\"robots\" content=\"{NO_INDEX}\">\
         <title>Your key</title></head>\n\
         <body>\n\
         <h1>Your key</h1>\n\
         <p><code>{}</code></p>\n\
         <p>This key is shown exactly once. Copy it now; this page will not load again.</p>\n\
         </body>\n\
         </html>\n",
        escape_html(key_value)
    )
}

/// Escape a value for embedding in HTML text content.
fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html("<key value=\"a&b\">"),
            "&lt;key value=&quot;a&amp;b&quot;&gt;"
        );
    }

    #[test]
    fn page_embeds_escaped_key() {
        let page = render_key_page("AB<CD>EF");
        assert!(page.contains("AB&lt;CD&gt;EF"));
        assert!(!page.contains("AB<CD>EF"));
    }
}
