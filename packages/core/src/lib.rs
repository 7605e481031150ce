//! Schema Studio Core
//!
//! This crate provides the editing model behind Schema Studio: JSON Schemas
//! are edited as a tree of typed properties and compiled to (and imported
//! from) JSON Schema documents.
//!
//! # Architecture
//!
//! - **Owned property tree**: properties own their children; ids are stable
//!   handles generated per tree
//! - **Validate, then mutate**: tree operations check everything first, so a
//!   failed call never leaves a half-applied change
//! - **Compiled storage**: stores only hold compiled schemas; sessions rebuild
//!   trees through the decompiler
//!
//! # Modules
//!
//! - [`models`] - Property types, constraints, the property tree and schema documents
//! - [`operations`] - Tree mutations (add, edit, delete, move)
//! - [`services`] - Schema compiler, example generator, fixed-field checks, editing sessions
//! - [`db`] - Schema stores (in-memory and file-backed)
//! - [`config`] - Editor configuration

pub mod config;
pub mod db;
pub mod models;
pub mod operations;
pub mod services;

// Re-export commonly used types
pub use config::{ConfigError, EditorConfig};
pub use db::{FileSchemaStore, InMemorySchemaStore, SchemaStore, StoreError};
pub use models::*;
pub use operations::{EditOutcome, ErrorCategory, TreeOperationError};
pub use services::{
    example_for, generate_example, CompilerOptions, DecompileError, EditingSession,
    FixedMarker, SchemaCompiler, SchemaEditorService, SchemaServiceError,
};
