//! Shared Error Types
//!
//! Error types that can occur on either side of the sync protocol.
//!
//! # Error Categories
//!
//! - `Serialization` - JSON encoding/decoding failures
//! - `Document` - structurally invalid document payloads
use thiserror::Error;

/// Errors shared between the server and the client sync agent
#[derive(Debug, Error, Clone)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Human-readable error message
        message: String,
    },

    /// The payload parsed as JSON but is not a usable document
    #[error("invalid document: {message}")]
    Document {
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization { message: message.into() }
    }

    /// Create a new document error
    pub fn document(message: impl Into<String>) -> Self {
        Self::Document { message: message.into() }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
