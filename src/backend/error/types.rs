/**
 * Backend Error Types
 *
 * This module defines error types specific to the sync server. These errors
 * are used in HTTP handlers and can be converted to HTTP responses.
 *
 * # Error Categories
 *
 * - Handler errors: malformed requests, missing headers
 * - Store errors: persistence failures from the document store
 * - Serialization errors: response encoding failures
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::store::StoreError;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// Each variant carries enough context to be converted into an HTTP
/// response; see the `IntoResponse` impl in `conversion`.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (e.g., malformed body, missing headers)
    #[error("handler error: {message}")]
    Handler {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Document store failure.
    ///
    /// Persistence failures are all-or-nothing on the store side, so the
    /// previously stored document is still intact when this surfaces.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Shared error (from the shared module)
    #[error(transparent)]
    Shared(#[from] SharedError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Handler { status, message: message.into() }
    }

    /// Create a 400 handler error for an unparseable request body
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, message)
    }

    /// HTTP status code this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Handler { status, .. } => *status,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Shared(_) => StatusCode::BAD_REQUEST,
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Human-readable message for the response body
    pub fn message(&self) -> String {
        self.to_string()
    }
}
