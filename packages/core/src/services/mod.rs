//! Schema Services
//!
//! This module contains the logic built on top of the property tree:
//!
//! - `SchemaCompiler` - property tree to JSON Schema and back
//! - `example_generator` - sample instances of a tree's schema
//! - `fixed_fields` - checks configuration values against fixed properties
//! - `SchemaEditorService` - editing sessions over a `SchemaStore`

pub mod error;
pub mod example_generator;
pub mod fixed_fields;
pub mod schema_compiler;
pub mod schema_editor_service;

pub use error::SchemaServiceError;
pub use example_generator::{example_for, generate_example};
pub use fixed_fields::{apply_fixed_values, fixed_field_violations, FixedFieldViolation};
pub use schema_compiler::{CompilerOptions, DecompileError, FixedMarker, SchemaCompiler};
pub use schema_editor_service::{EditingSession, SchemaEditorService};
