//! Adapter error types.
//!
//! Errors are `Clone` because resolution futures are shared between every
//! caller awaiting the same in-flight fetch; causes are carried as strings
//! rather than source errors for that reason.

use thiserror::Error;

/// Errors that can occur during adapter operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// Service responded with a non-success status
    #[error("request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    /// Request never reached the service
    #[error("connection failed: {0}")]
    Connection(String),

    /// Response body could not be decoded
    #[error("response decoding failed: {0}")]
    Decode(String),
}

impl AdapterError {
    /// Create an Http error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Create a Connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a Decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Whether this error represents a missing resource (HTTP 404).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status: 404, .. })
    }
}
