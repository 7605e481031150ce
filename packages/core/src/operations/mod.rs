//! Property Tree Operations
//!
//! Mutations of a [`PropertyTree`](crate::models::PropertyTree): add, edit,
//! delete and move. All of them are synchronous and run to completion; a
//! failed operation leaves the tree untouched.

pub mod error;
pub mod tree_operations;

// Re-export types for convenience
pub use error::{ErrorCategory, TreeOperationError};
pub use tree_operations::EditOutcome;
