//! Error types for tree operations
//!
//! Every failure of a tree operation is an ordinary result outcome: the tree
//! is left exactly as it was before the call.

use crate::models::{ConstraintError, ValidationError};
use thiserror::Error;

/// How a failure should be surfaced to the user
///
/// - `Validation`: user-correctable, shown inline on the offending field
/// - `Structural`: blocking message, the operation is aborted
/// - `NotFound`: the caller is working on a stale id and should refresh its view
/// - `Storage`: reading or writing persisted schemas failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Structural,
    NotFound,
    Storage,
}

/// Errors that can occur while mutating a property tree
///
/// # Examples
///
/// ```rust
/// use schema_studio_core::operations::{ErrorCategory, TreeOperationError};
///
/// let err = TreeOperationError::duplicate_name("port", None);
/// assert_eq!(err.category(), ErrorCategory::Validation);
/// assert_eq!(err.to_string(), "A property named 'port' already exists at the root");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeOperationError {
    /// Referenced property does not exist (stale or removed id)
    #[error("Property '{id}' does not exist")]
    PropertyNotFound { id: String },

    /// Name collides with a sibling in the target scope
    #[error("A property named '{name}' already exists {}", scope_label(.parent_id))]
    DuplicateName {
        name: String,
        parent_id: Option<String>,
    },

    /// Constraints are not legal for the property type
    #[error("Invalid constraints: {0}")]
    InvalidConstraints(#[from] ConstraintError),

    /// Name, fixed value or item type is invalid
    #[error("Invalid property: {0}")]
    InvalidProperty(#[from] ValidationError),

    /// Target parent cannot own children
    #[error("Property '{id}' cannot hold child properties: {reason}")]
    InvalidParent { id: String, reason: String },

    /// Move would make a property its own ancestor
    #[error("Cannot move property '{id}' under '{new_parent_id}': a property cannot become its own ancestor")]
    CycleDetected { id: String, new_parent_id: String },

    /// Insertion index past the end of the target scope
    #[error("Index {index} is out of range for a scope holding {len} properties")]
    InvalidIndex { index: usize, len: usize },
}

fn scope_label(parent_id: &Option<String>) -> String {
    match parent_id {
        None => "at the root".to_string(),
        Some(id) => format!("under property '{}'", id),
    }
}

impl TreeOperationError {
    pub fn property_not_found(id: impl Into<String>) -> Self {
        Self::PropertyNotFound { id: id.into() }
    }

    pub fn duplicate_name(name: impl Into<String>, parent_id: Option<&str>) -> Self {
        Self::DuplicateName {
            name: name.into(),
            parent_id: parent_id.map(str::to_string),
        }
    }

    pub fn invalid_parent(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParent {
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn cycle_detected(id: impl Into<String>, new_parent_id: impl Into<String>) -> Self {
        Self::CycleDetected {
            id: id.into(),
            new_parent_id: new_parent_id.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::PropertyNotFound { .. } => ErrorCategory::NotFound,
            Self::DuplicateName { .. }
            | Self::InvalidConstraints(_)
            | Self::InvalidProperty(_)
            | Self::InvalidIndex { .. } => ErrorCategory::Validation,
            Self::InvalidParent { .. } | Self::CycleDetected { .. } => ErrorCategory::Structural,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PropertyType;

    #[test]
    fn test_messages() {
        let err = TreeOperationError::duplicate_name("city", Some("prop_2"));
        assert_eq!(
            err.to_string(),
            "A property named 'city' already exists under property 'prop_2'"
        );

        let err: TreeOperationError =
            ConstraintError::unknown_key(PropertyType::Number, "pattern").into();
        assert_eq!(
            err.to_string(),
            "Invalid constraints: Constraint 'pattern' is not allowed on number properties"
        );
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            TreeOperationError::property_not_found("prop_1").category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            TreeOperationError::cycle_detected("prop_1", "prop_2").category(),
            ErrorCategory::Structural
        );
        assert_eq!(
            TreeOperationError::from(ValidationError::EmptyName).category(),
            ErrorCategory::Validation
        );
    }
}
