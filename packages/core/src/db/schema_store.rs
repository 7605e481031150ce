//! SchemaStore Trait - Persistence Abstraction
//!
//! Stores compiled schema documents by id. Implementations exchange whole
//! documents only; they never see property trees.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: every method is async so file-backed and remote
//!    backends share one interface
//! 2. **Whole documents**: `save` replaces the stored schema and keeps the
//!    first `createdAt`
//! 3. **Name fallback**: an empty name is stored as the id
//!
//! # Examples
//!
//! ```rust
//! use schema_studio_core::db::{InMemorySchemaStore, SchemaStore};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), schema_studio_core::db::StoreError> {
//! let store: Arc<dyn SchemaStore> = Arc::new(InMemorySchemaStore::new());
//!
//! let summary = store
//!     .save("service", "", "", json!({"type": "object", "properties": {}}))
//!     .await?;
//! assert_eq!(summary.name, "service");
//! assert_eq!(store.list().await?.len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::db::StoreError;
use crate::models::{SchemaDocument, SchemaSummary};
use async_trait::async_trait;
use serde_json::Value;

/// Persistence of compiled schemas
///
/// Implementations must be `Send + Sync` so a store can be shared behind an
/// `Arc` between editing sessions.
#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// Create or replace the schema stored under `id`
    ///
    /// An empty `name` is stored as `id`. Replacing keeps the first
    /// `createdAt` and refreshes `updatedAt`.
    async fn save(
        &self,
        id: &str,
        name: &str,
        description: &str,
        schema: Value,
    ) -> Result<SchemaSummary, StoreError>;

    /// Fetch a stored schema
    ///
    /// Returns `StoreError::NotFound` when nothing is stored under `id`.
    async fn get(&self, id: &str) -> Result<SchemaDocument, StoreError>;

    /// Summaries of all stored schemas, most recently updated first (ties by id)
    async fn list(&self) -> Result<Vec<SchemaSummary>, StoreError>;

    /// Remove a stored schema
    ///
    /// Returns `StoreError::NotFound` when nothing is stored under `id`.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Check that `id` is usable as a storage key
///
/// Ids are non-empty and made of ASCII letters, digits, `-` and `_`, which
/// also keeps them safe as directory names.
pub fn validate_schema_id(id: &str) -> Result<(), StoreError> {
    if id.is_empty() {
        return Err(StoreError::invalid_id(id, "id cannot be empty"));
    }
    if let Some(c) = id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(StoreError::invalid_id(
            id,
            format!("character '{}' is not allowed (use letters, digits, '-' or '_')", c),
        ));
    }
    Ok(())
}

/// Display name stored for a schema
pub(crate) fn effective_name(id: &str, name: &str) -> String {
    if name.trim().is_empty() {
        id.to_string()
    } else {
        name.to_string()
    }
}

/// Order summaries most recently updated first, ties by id
pub(crate) fn sort_summaries(summaries: &mut [SchemaSummary]) {
    summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_schema_id() {
        assert!(validate_schema_id("service-config_2").is_ok());
        assert!(matches!(
            validate_schema_id(""),
            Err(StoreError::InvalidId { .. })
        ));
        assert!(matches!(
            validate_schema_id("../etc"),
            Err(StoreError::InvalidId { .. })
        ));
        assert!(matches!(
            validate_schema_id("with space"),
            Err(StoreError::InvalidId { .. })
        ));
    }

    #[test]
    fn test_effective_name() {
        assert_eq!(effective_name("svc", ""), "svc");
        assert_eq!(effective_name("svc", "  "), "svc");
        assert_eq!(effective_name("svc", "Service"), "Service");
    }
}
