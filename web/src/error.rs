//! Error types for web handlers.
//!
//! Bridges the domain error taxonomy to HTTP responses via Axum's
//! `IntoResponse`. User-visible bodies carry a stable code and a short
//! message, never internal diagnostic detail; server-class errors are
//! logged here at the boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use keydrop_core::KeydropError;
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Attach a source error for server-side logging.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            message.into(),
            "UNAUTHORIZED".to_string(),
        )
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            message.into(),
            "NOT_FOUND".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }

    /// The HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<KeydropError> for AppError {
    fn from(err: KeydropError) -> Self {
        match err {
            KeydropError::NoInventory => Self::new(
                StatusCode::GONE,
                "No keys are available right now".to_string(),
                "NO_INVENTORY".to_string(),
            ),
            KeydropError::LinkNotFound => Self::not_found("This link is invalid or has expired"),
            KeydropError::AlreadyConsumed => Self::new(
                StatusCode::CONFLICT,
                "This key has already been claimed".to_string(),
                "ALREADY_CLAIMED".to_string(),
            ),
            KeydropError::TooManyRequests { retry_after } => Self::new(
                StatusCode::TOO_MANY_REQUESTS,
                format!("Too many requests, retry in {}s", retry_after.as_secs()),
                "TOO_MANY_REQUESTS".to_string(),
            ),
            KeydropError::Unauthorized => Self::unauthorized("Admin credential required"),
            KeydropError::StoreError(_) | KeydropError::SerializationError(_) => {
                // Store detail goes to the log, never to the client.
                Self::internal("An internal error occurred").with_source(anyhow::Error::new(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::unauthorized("Admin credential required");
        assert_eq!(err.to_string(), "[UNAUTHORIZED] Admin credential required");
    }

    #[test]
    fn domain_outcomes_map_to_statuses() {
        assert_eq!(
            AppError::from(KeydropError::NoInventory).status(),
            StatusCode::GONE
        );
        assert_eq!(
            AppError::from(KeydropError::LinkNotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(KeydropError::AlreadyConsumed).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(KeydropError::TooManyRequests {
                retry_after: std::time::Duration::from_secs(30)
            })
            .status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn store_detail_is_not_user_visible() {
        let err = AppError::from(KeydropError::StoreError("pg deadlock detail".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("deadlock"));
        assert!(err.source.is_some());
    }
}
