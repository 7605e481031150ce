//! Service Layer Error Types
//!
//! Errors of [`SchemaEditorService`](super::SchemaEditorService), chaining the
//! store and compiler errors it surfaces.

use crate::db::StoreError;
use crate::operations::ErrorCategory;
use crate::services::DecompileError;
use thiserror::Error;

/// Editing-session errors
#[derive(Error, Debug)]
pub enum SchemaServiceError {
    /// Persistence failed (missing schema, bad id, I/O)
    #[error("Schema store error: {0}")]
    Store(#[from] StoreError),

    /// A stored or imported schema cannot be turned into a property tree
    #[error("Cannot load schema: {0}")]
    Decompile(#[from] DecompileError),

    /// Imported document is neither a schema nor a `{metadata, schema}` envelope
    #[error("Invalid schema document: {0}")]
    InvalidDocument(String),

    /// Editor configuration failed validation
    #[error("Invalid editor configuration: {0}")]
    InvalidConfig(String),
}

impl SchemaServiceError {
    /// Create an invalid document error
    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Store(err) => err.category(),
            Self::Decompile(err) => err.category(),
            Self::InvalidDocument(_) => ErrorCategory::Structural,
            Self::InvalidConfig(_) => ErrorCategory::Validation,
        }
    }
}
