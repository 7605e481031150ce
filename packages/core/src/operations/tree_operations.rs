//! Property Tree Operations
//!
//! The only code allowed to mutate a [`PropertyTree`]. Each operation checks
//! everything it needs before touching the tree, so a failed call leaves the
//! tree unchanged.
//!
//! Parent scopes are addressed with `Option<&str>`: `None` is the root,
//! `Some(id)` an `object` property or an `array` property's item template.
//!
//! # Example
//!
//! ```rust
//! use schema_studio_core::models::{PropertyInput, PropertyTree, PropertyType};
//! use schema_studio_core::operations::TreeOperationError;
//!
//! let mut tree = PropertyTree::new();
//! tree.add_property(None, PropertyInput::new("port", PropertyType::Number)).unwrap();
//!
//! let err = tree
//!     .add_property(None, PropertyInput::new("port", PropertyType::String))
//!     .unwrap_err();
//! assert!(matches!(err, TreeOperationError::DuplicateName { .. }));
//! assert_eq!(tree.node_count(), 1);
//! ```

use crate::models::constraints::{retain_legal_keys, validate};
use crate::models::{PropertyInput, PropertyNode, PropertyTree, ValidationError};
use crate::operations::TreeOperationError;
use serde::Serialize;

/// Result of a successful edit
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOutcome {
    /// The property as it now stands in the tree
    pub property: PropertyNode,

    /// Nodes discarded because the type changed away from object/array
    pub cleared_children: usize,

    /// Constraint keys dropped because they are illegal for the new type
    pub dropped_constraints: Vec<String>,
}

impl EditOutcome {
    /// Whether the edit discarded anything the user should be told about
    pub fn has_warnings(&self) -> bool {
        self.cleared_children > 0 || !self.dropped_constraints.is_empty()
    }
}

impl PropertyTree {
    /// Append a new property to a parent scope
    ///
    /// # Errors
    ///
    /// - `PropertyNotFound`: `parent_id` does not exist
    /// - `InvalidParent`: the parent is a primitive or an array with a primitive item type
    /// - `InvalidConstraints`: constraints are not legal for the input's type
    /// - `InvalidProperty`: empty name, bad fixed value or item type
    /// - `DuplicateName`: a sibling already uses the name
    pub fn add_property(
        &mut self,
        parent_id: Option<&str>,
        input: PropertyInput,
    ) -> Result<PropertyNode, TreeOperationError> {
        self.ensure_accepts_children(parent_id)?;
        let constraints = validate(input.property_type, &input.constraints)?;
        input.validate(&constraints)?;
        self.ensure_unique_name(parent_id, &input.name, None)?;

        let id = self.allocate_id();
        let node = PropertyNode::from_input(id, input, constraints);
        let siblings = self
            .children_of_mut(parent_id)
            .ok_or_else(|| TreeOperationError::property_not_found(parent_id.unwrap_or_default()))?;
        siblings.push(node.clone());

        tracing::debug!(
            "Added {} property '{}' ({}) under {:?}",
            node.property_type,
            node.name,
            node.id,
            parent_id
        );

        Ok(node)
    }

    /// Replace the definition of an existing property
    ///
    /// Children are kept unless the type changes to a primitive, in which
    /// case they are discarded and counted in [`EditOutcome::cleared_children`].
    /// When the type changes, constraint keys illegal for the new type are
    /// dropped and reported; without a type change they are an error.
    ///
    /// # Errors
    ///
    /// - `PropertyNotFound`: `id` does not exist
    /// - `DuplicateName`: the new name is used by another sibling
    /// - `InvalidConstraints` / `InvalidProperty`: as for [`add_property`](Self::add_property)
    pub fn edit_property(
        &mut self,
        id: &str,
        input: PropertyInput,
    ) -> Result<EditOutcome, TreeOperationError> {
        let current = self
            .find_by_id(id)
            .ok_or_else(|| TreeOperationError::property_not_found(id))?;
        let type_changed = current.property_type != input.property_type;
        let has_children = !current.children.is_empty();

        let (raw_constraints, dropped_constraints) = if type_changed {
            retain_legal_keys(input.property_type, &input.constraints)
        } else {
            (input.constraints.clone(), Vec::new())
        };
        let constraints = validate(input.property_type, &raw_constraints)?;
        input.validate(&constraints)?;

        let keeps_children = has_children && input.property_type.is_container();
        if keeps_children && input.item_type.is_some() {
            return Err(ValidationError::InvalidItemType {
                name: input.name.clone(),
                reason: "array already has child properties describing its items".to_string(),
            }
            .into());
        }

        let parent_id = self
            .parent_of(id)
            .and_then(|parent| parent.id())
            .map(str::to_string);
        self.ensure_unique_name(parent_id.as_deref(), &input.name, Some(id))?;

        let node = self
            .find_by_id_mut(id)
            .ok_or_else(|| TreeOperationError::property_not_found(id))?;
        node.name = input.name;
        node.property_type = input.property_type;
        node.required = input.required;
        node.description = input.description;
        node.fixed_value = input.fixed_value;
        node.is_fixed = input.is_fixed;
        node.constraints = constraints;
        node.item_type = input.item_type;

        let cleared_children = if has_children && !keeps_children {
            let removed = node.children.iter().map(|child| child.iter().count()).sum();
            node.children.clear();
            removed
        } else {
            0
        };

        let outcome = EditOutcome {
            property: node.clone(),
            cleared_children,
            dropped_constraints,
        };

        if outcome.has_warnings() {
            tracing::warn!(
                "Type change of property '{}' to {} discarded {} child properties and constraints {:?}",
                id,
                outcome.property.property_type,
                outcome.cleared_children,
                outcome.dropped_constraints
            );
        } else {
            tracing::debug!("Edited property '{}' ({})", outcome.property.name, id);
        }

        Ok(outcome)
    }

    /// Remove a property together with its whole subtree
    ///
    /// Returns the removed subtree. There is no undo.
    pub fn delete_property(&mut self, id: &str) -> Result<PropertyNode, TreeOperationError> {
        let parent_id = self
            .parent_of(id)
            .ok_or_else(|| TreeOperationError::property_not_found(id))?
            .id()
            .map(str::to_string);

        let siblings = self
            .children_of_mut(parent_id.as_deref())
            .ok_or_else(|| TreeOperationError::property_not_found(id))?;
        let index = siblings
            .iter()
            .position(|node| node.id == id)
            .ok_or_else(|| TreeOperationError::property_not_found(id))?;
        let removed = siblings.remove(index);

        tracing::debug!(
            "Deleted property '{}' ({}) and {} descendants",
            removed.name,
            id,
            removed.descendant_count()
        );

        Ok(removed)
    }

    /// Relocate a property to `new_index` within a parent scope
    ///
    /// `new_index` is the position in the target scope after the node has
    /// been taken out of its current place, so `0..=len` is valid. The
    /// node's `required` flag travels with it: it is emitted into the new
    /// parent's `required` list on the next compile.
    ///
    /// # Errors
    ///
    /// - `PropertyNotFound`: `id` or `new_parent_id` does not exist
    /// - `CycleDetected`: `new_parent_id` is the node itself or one of its descendants
    /// - `InvalidParent`: the target cannot hold children
    /// - `DuplicateName`: the target scope already has a property with this name
    /// - `InvalidIndex`: `new_index` is past the end of the target scope
    pub fn move_property(
        &mut self,
        id: &str,
        new_parent_id: Option<&str>,
        new_index: usize,
    ) -> Result<(), TreeOperationError> {
        let name = self
            .find_by_id(id)
            .ok_or_else(|| TreeOperationError::property_not_found(id))?
            .name
            .clone();

        if let Some(target) = new_parent_id {
            if self.find_by_id(target).is_none() {
                return Err(TreeOperationError::property_not_found(target));
            }
            if self.is_same_or_descendant(id, target) {
                return Err(TreeOperationError::cycle_detected(id, target));
            }
        }
        self.ensure_accepts_children(new_parent_id)?;

        let current_parent = self
            .parent_of(id)
            .and_then(|parent| parent.id())
            .map(str::to_string);
        let same_scope = current_parent.as_deref() == new_parent_id;
        if !same_scope {
            self.ensure_unique_name(new_parent_id, &name, Some(id))?;
        }

        let target_len = self.children_of(new_parent_id).map_or(0, <[PropertyNode]>::len);
        let max_index = if same_scope { target_len - 1 } else { target_len };
        if new_index > max_index {
            return Err(TreeOperationError::InvalidIndex {
                index: new_index,
                len: max_index,
            });
        }

        let source = self
            .children_of_mut(current_parent.as_deref())
            .ok_or_else(|| TreeOperationError::property_not_found(id))?;
        let old_index = source
            .iter()
            .position(|node| node.id == id)
            .ok_or_else(|| TreeOperationError::property_not_found(id))?;
        let node = source.remove(old_index);

        match self.children_of_mut(new_parent_id) {
            Some(target) => target.insert(new_index, node),
            None => {
                // Target vanished with the detached subtree; put the node back.
                if let Some(source) = self.children_of_mut(current_parent.as_deref()) {
                    source.insert(old_index, node);
                }
                return Err(TreeOperationError::property_not_found(
                    new_parent_id.unwrap_or_default(),
                ));
            }
        }

        tracing::debug!(
            "Moved property '{}' ({}) from {:?} to {:?} at index {}",
            name,
            id,
            current_parent,
            new_parent_id,
            new_index
        );

        Ok(())
    }

    fn ensure_accepts_children(&self, parent_id: Option<&str>) -> Result<(), TreeOperationError> {
        let Some(parent_id) = parent_id else {
            return Ok(());
        };
        let parent = self
            .find_by_id(parent_id)
            .ok_or_else(|| TreeOperationError::property_not_found(parent_id))?;

        if !parent.property_type.is_container() {
            return Err(TreeOperationError::invalid_parent(
                parent_id,
                format!("{} properties have no children", parent.property_type),
            ));
        }
        if let Some(item_type) = parent.item_type {
            return Err(TreeOperationError::invalid_parent(
                parent_id,
                format!(
                    "array items are typed as {}; clear the item type to describe object items",
                    item_type
                ),
            ));
        }
        Ok(())
    }

    fn ensure_unique_name(
        &self,
        parent_id: Option<&str>,
        name: &str,
        except_id: Option<&str>,
    ) -> Result<(), TreeOperationError> {
        let siblings = self.children_of(parent_id).unwrap_or(&[]);
        let taken = siblings
            .iter()
            .any(|node| node.name == name && Some(node.id.as_str()) != except_id);
        if taken {
            return Err(TreeOperationError::duplicate_name(name, parent_id));
        }
        Ok(())
    }
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "tree_operations_test.rs"]
mod tree_operations_test;
