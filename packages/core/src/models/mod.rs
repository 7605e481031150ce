//! Data Models
//!
//! This module contains the data structures of the schema editor:
//!
//! - [`constraints`] - per-type constraint sets and their validation
//! - [`property_node`] - the property tree, its nodes and read-only navigation
//! - [`schema_document`] - stored/exchanged schema documents

pub mod constraints;
pub mod property_node;
pub mod schema_document;

pub use constraints::{
    validate as validate_constraints, ArrayConstraints, ConstraintError, Constraints,
    NumberConstraints, PropertyType, StringConstraints, StringFormat,
};
pub use property_node::{
    Parent, PreOrder, PropertyInput, PropertyNode, PropertyTree, ValidationError,
    DEFAULT_ID_PREFIX,
};
pub use schema_document::{SchemaDocument, SchemaEnvelope, SchemaMetadata, SchemaSummary};
