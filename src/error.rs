//! Error types for Storefront
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.
//! Authentication failures keep their own taxonomy in [`AuthError`]
//! so handlers and tests can match on the exact rejection reason.

use axum::extract::rejection::{BytesRejection, JsonRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Reasons a session operation can fail
///
/// Every variant is terminal for the current request. None of them
/// are retried by the session layer.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No token was supplied with the request
    #[error("Access denied. No token provided.")]
    MissingToken,

    /// Token failed signature verification or could not be decoded
    #[error("Invalid token.")]
    TokenInvalid,

    /// Token verified but its expiry has passed
    #[error("Token has expired. Please login again.")]
    TokenExpired,

    /// Token verified but its user no longer exists
    #[error("User not found.")]
    UserNotFound,

    /// Token verified but is no longer the user's active session token
    #[error("Session invalid or expired. Please login again.")]
    SessionSuperseded,

    /// Login refused because the user already holds a live session
    #[error("You are already logged in on another device. Please logout first.")]
    AlreadyLoggedInElsewhere,

    /// Persistence failure; detail is logged, never returned
    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(String),

    /// Token could not be produced or checked with the configured key
    #[error("Token signing failed: {0}")]
    Signing(String),
}

impl AuthError {
    /// HTTP status for this rejection
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::AlreadyLoggedInElsewhere => StatusCode::FORBIDDEN,
            AuthError::StoreUnavailable(_) | AuthError::Signing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Short label used for metrics and log fields
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::TokenInvalid => "token_invalid",
            AuthError::TokenExpired => "token_expired",
            AuthError::UserNotFound => "user_not_found",
            AuthError::SessionSuperseded => "session_superseded",
            AuthError::AlreadyLoggedInElsewhere => "already_logged_in",
            AuthError::StoreUnavailable(_) => "store_unavailable",
            AuthError::Signing(_) => "signing_failed",
        }
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Auth(inner) => inner,
            other => AuthError::StoreUnavailable(other.to_string()),
        }
    }
}

/// Application-wide error type
///
/// This enum represents all possible errors that can occur
/// in the application. It implements `IntoResponse` to
/// automatically convert errors to appropriate HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Session/authentication failure (401, 403 or 500)
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Access to another user's resource (403)
    #[error("{0}")]
    Forbidden(String),

    /// Validation error (400)
    #[error("{0}")]
    Validation(String),

    /// Unique constraint violated (409)
    #[error("{0}")]
    Conflict(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl AppError {
    /// Status code, client-facing message and metric label
    fn parts(&self) -> (StatusCode, String, &'static str) {
        match self {
            AppError::Auth(err @ (AuthError::StoreUnavailable(_) | AuthError::Signing(_))) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                err.reason(),
            ),
            AppError::Auth(err) => (err.status_code(), err.to_string(), err.reason()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), "not_found"),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone(), "forbidden"),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), "validation"),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone(), "conflict"),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "database",
            ),
            AppError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "config",
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "internal",
            ),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.parts().0
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Maps each error variant to appropriate HTTP status code
    /// and JSON error body. Server-side failures are logged with
    /// their detail and answered with a generic message.
    fn into_response(self) -> Response {
        use axum::Json;

        let (status, error_message, error_type) = self.parts();

        if status.is_server_error() {
            tracing::error!(error = %self, error_type, "Request failed");
        }

        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[error_type]).inc();

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
