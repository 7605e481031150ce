//! Schema Store Error Types
//!
//! Errors raised by [`SchemaStore`](super::SchemaStore) implementations.

use crate::operations::ErrorCategory;
use std::path::PathBuf;
use thiserror::Error;

/// Schema persistence errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// No schema stored under the id
    #[error("Schema not found: {id}")]
    NotFound { id: String },

    /// Id cannot be used as a storage key
    #[error("Invalid schema id '{id}': {reason}")]
    InvalidId { id: String, reason: String },

    /// Reading or writing the storage location failed
    #[error("Storage I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A stored document or the registry could not be (de)serialized
    #[error("Schema serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Create a not found error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create an invalid id error
    pub fn invalid_id(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidId {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create an I/O error bound to the path that failed
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::InvalidId { .. } => ErrorCategory::Validation,
            Self::Io { .. } | Self::Serialization(_) => ErrorCategory::Storage,
        }
    }
}
