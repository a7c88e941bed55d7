//! Client-side error types
//!
//! Every failure the agent can hit maps to one of these. None of them ever
//! reach the UI as an unhandled error: the driver converts them into state
//! transitions and the health indicator, and local data stays intact.
use thiserror::Error;

use crate::shared::SharedError;

/// Errors raised inside the client sync agent
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network-level failure (connect, timeout, reset, bad status)
    #[error("transport error: {message}")]
    Transport {
        /// Human-readable error message
        message: String,
    },

    /// The server rejected the pushed document as malformed
    #[error("server rejected the document: {message}")]
    Rejected {
        /// Detail from the server's error response
        message: String,
    },

    /// Local storage failure
    #[error("local storage error: {message}")]
    Storage {
        /// Human-readable error message
        message: String,
    },

    /// Shared error (from the shared module)
    #[error(transparent)]
    Shared(#[from] SharedError),
}

impl ClientError {
    /// Create a new transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }

    /// Create a new rejection error
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected { message: message.into() }
    }

    /// Create a new storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage { message: message.into() }
    }
}
