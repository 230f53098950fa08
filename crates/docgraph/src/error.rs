use thiserror::Error;

use dho_common::Checksum256;

use crate::storage::StorageError;

/// Errors raised by the document graph
#[derive(Debug, Error)]
pub enum GraphError {
    /// No document with this hash
    #[error("Document not found: {0}")]
    DocumentNotFound(Checksum256),

    /// No edge with this (from, to, name)
    #[error("Edge not found: {from} --{name}--> {to}")]
    EdgeNotFound {
        from: Checksum256,
        to: Checksum256,
        name: String,
    },

    /// An edge with this (from, to, name) already exists
    #[error("Edge already exists: {from} --{name}--> {to}")]
    EdgeExists {
        from: Checksum256,
        to: Checksum256,
        name: String,
    },

    /// Content group missing from a document
    #[error("content group not found: {0}")]
    GroupNotFound(String),

    /// Content item missing from a group
    #[error("content label not found: {group}.{label}")]
    ContentNotFound { group: String, label: String },

    /// Content item holds a different kind of value
    #[error("content {label} is not of type {expected}")]
    ContentTypeMismatch { label: String, expected: &'static str },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Common(#[from] dho_common::Error),
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        GraphError::Serialization(err.to_string())
    }
}

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;
