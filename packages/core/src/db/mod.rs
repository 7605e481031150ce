//! Schema Persistence Layer
//!
//! This module contains the storage abstraction for compiled schemas:
//!
//! - [`SchemaStore`] - async trait implemented by every backend
//! - [`InMemorySchemaStore`] - process-local store
//! - [`FileSchemaStore`] - registry file plus one directory per schema
//! - [`StoreError`] - persistence errors

mod error;
mod file_store;
mod memory_store;
mod schema_store;

pub use error::StoreError;
pub use file_store::FileSchemaStore;
pub use memory_store::InMemorySchemaStore;
pub use schema_store::{validate_schema_id, SchemaStore};
