//! Store error types.
//!
//! Every variant is `Clone`: resolution futures are shared between all
//! callers awaiting the same in-flight operation, so rejections must be
//! cloneable to every awaiter.

use thiserror::Error;

use castview_api::AdapterError;

/// Errors produced by payload normalization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// Payload lacks a resolvable id
    #[error("payload for '{ty}' has no resolvable id")]
    MissingId { ty: String },

    /// Payload is structurally malformed
    #[error("malformed payload for '{ty}': {message}")]
    Malformed { ty: String, message: String },

    /// No schema registered for the entity type
    #[error("no schema registered for entity type '{ty}'")]
    UnknownType { ty: String },
}

impl NormalizeError {
    /// Create a MissingId error.
    pub fn missing_id(ty: impl Into<String>) -> Self {
        Self::MissingId { ty: ty.into() }
    }

    /// Create a Malformed error.
    pub fn malformed(ty: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            ty: ty.into(),
            message: message.into(),
        }
    }

    /// Create an UnknownType error.
    pub fn unknown_type(ty: impl Into<String>) -> Self {
        Self::UnknownType { ty: ty.into() }
    }
}

/// Errors that can occur during store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Adapter call failed
    #[error("network request failed: {0}")]
    Network(#[from] AdapterError),

    /// Payload normalization failed
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    /// Expected target absent from the store after a successful fetch
    #[error("target {ty}:{id} missing after fetch")]
    MissingTarget { ty: String, id: String },

    /// Record has no relationship under the requested key
    #[error("record {ty}:{id} has no relationship '{key}'")]
    UnknownRelationship { ty: String, id: String, key: String },

    /// Single-kind relationship with no target id to resolve
    #[error("relationship '{key}' on {ty} has no target")]
    EmptyRelationship { ty: String, key: String },

    /// Background fetch task failed to complete
    #[error("background fetch task failed: {0}")]
    Task(String),
}

impl StoreError {
    /// Create a MissingTarget error.
    pub fn missing_target(ty: impl Into<String>, id: impl Into<String>) -> Self {
        Self::MissingTarget {
            ty: ty.into(),
            id: id.into(),
        }
    }

    /// Create an UnknownRelationship error.
    pub fn unknown_relationship(
        ty: impl Into<String>,
        id: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self::UnknownRelationship {
            ty: ty.into(),
            id: id.into(),
            key: key.into(),
        }
    }

    /// Create an EmptyRelationship error.
    pub fn empty_relationship(ty: impl Into<String>, key: impl Into<String>) -> Self {
        Self::EmptyRelationship {
            ty: ty.into(),
            key: key.into(),
        }
    }

    /// Create a Task error.
    pub fn task(message: impl Into<String>) -> Self {
        Self::Task(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::missing_target("stream", "42");
        assert!(err.to_string().contains("stream:42"));

        let err = StoreError::unknown_relationship("product", "1", "owner");
        assert!(err.to_string().contains("product:1"));
        assert!(err.to_string().contains("'owner'"));
    }

    #[test]
    fn test_adapter_error_wraps() {
        let err: StoreError = AdapterError::http(500, "boom").into();
        assert!(matches!(err, StoreError::Network(_)));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_errors_are_cloneable() {
        // Shared futures hand the same rejection to every awaiter.
        let err = StoreError::Network(AdapterError::connection("refused"));
        let cloned = err.clone();
        assert_eq!(err, cloned);
    }
}
