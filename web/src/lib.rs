//! HTTP boundary for the keydrop key distribution service.
//!
//! The boundary is a thin imperative shell over `keydrop-core`:
//!
//! 1. **HTTP request** arrives at an Axum handler
//! 2. **Extract** the requester context (IP, user agent, correlation id)
//! 3. **Invoke** the issuance/redemption/inventory service
//! 4. **Map** the domain outcome to an HTTP response
//!
//! All correctness lives in the core services and their stores; handlers
//! add only the rate-limit gate, the admin credential check, and the
//! cache/robots policy on the one-time presentation page.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use config::Config;
pub use error::AppError;
pub use extractors::{ClientIp, CorrelationId, UserAgent};
pub use router::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
