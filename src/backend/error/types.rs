/**
 * Backend Error Types
 *
 * Errors surfaced by the HTTP layer of the relay (the upgrade route and
 * the auth middleware) and by server startup. Errors that happen inside a chat
 * session never reach this type; they are written to the socket as
 * `error` frames instead.
 *
 * # Error Categories
 *
 * - `HandlerError` - A handler rejected the request with a specific status
 * - `Auth` - Credential missing or invalid (401)
 * - `Config` - Startup configuration problem
 * - `Io` - Listener or socket setup failure
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::auth::AuthError;
use crate::backend::server::config::ConfigError;

/// Backend-specific error types
///
/// Each variant maps to an HTTP status through [`BackendError::status_code`].
///
/// # Usage
///
/// ```rust
/// use axum::http::StatusCode;
/// use capsule_relay::backend::error::BackendError;
///
/// let err = BackendError::handler(StatusCode::FORBIDDEN, "origin not allowed");
/// assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error with an explicit status
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Authentication failure
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Configuration failure
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackendError {
    /// Create a new handler error with a status code
    ///
    /// # Arguments
    ///
    /// * `status` - HTTP status code
    /// * `message` - Error message
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Shorthand for a 401 handler error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::UNAUTHORIZED, message)
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `Auth` - 401 Unauthorized
    /// - `Config`, `Io` - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Config(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message exposed to the client
    ///
    /// Internal failures are not described beyond their category.
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::Auth(_) => "unauthorized".to_string(),
            Self::Config(_) | Self::Io(_) => "internal server error".to_string(),
        }
    }
}
