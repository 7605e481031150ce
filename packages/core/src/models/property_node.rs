//! Property Tree Model
//!
//! A schema under edition is a tree of named, typed properties. Each
//! [`PropertyNode`] owns its children outright; the [`PropertyTree`] owns the
//! root-level properties and hands out node ids. There are no back references,
//! so parents are found by walking the tree.
//!
//! Nodes are read-only from the outside. Every mutation goes through the tree
//! operations in [`crate::operations`], which keep these invariants:
//!
//! - only `object` and `array` nodes have children
//! - sibling names are unique within their parent scope (root, each object,
//!   each array item template)
//! - constraints are legal for the node's type
//! - a fixed node carries a value of its own type
//!
//! ## Example
//!
//! ```rust
//! use schema_studio_core::models::{PropertyInput, PropertyTree, PropertyType};
//!
//! let mut tree = PropertyTree::new();
//! let address = tree
//!     .add_property(None, PropertyInput::new("address", PropertyType::Object))
//!     .unwrap();
//! tree.add_property(Some(address.id()), PropertyInput::new("city", PropertyType::String))
//!     .unwrap();
//!
//! assert_eq!(tree.node_count(), 2);
//! assert!(tree.sibling_names(Some(address.id())).unwrap().contains("city"));
//! ```

use crate::models::constraints::{Constraints, PropertyType};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use thiserror::Error;

/// Default prefix of generated property ids (`prop_1`, `prop_2`, ...)
pub const DEFAULT_ID_PREFIX: &str = "prop_";

/// Field-level validation failures of a property definition
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Property name cannot be empty")]
    EmptyName,

    #[error("Invalid fixed value for property '{name}': {reason}")]
    InvalidFixedValue { name: String, reason: String },

    #[error("Invalid item type for property '{name}': {reason}")]
    InvalidItemType { name: String, reason: String },
}

/// User-supplied definition of a property, as submitted by an add/edit form
///
/// Constraints are kept as a raw JSON mapping here; they are validated
/// against `property_type` when the input is applied to a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInput {
    pub name: String,

    #[serde(rename = "type")]
    pub property_type: PropertyType,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub constraints: Map<String, Value>,

    /// Constant value of a fixed field, or an unlocked default when `is_fixed` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_value: Option<Value>,

    #[serde(default)]
    pub is_fixed: bool,

    /// Primitive type of array items when the array has no object template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<PropertyType>,
}

impl PropertyInput {
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            property_type,
            required: false,
            description: None,
            constraints: Map::new(),
            fixed_value: None,
            is_fixed: false,
            item_type: None,
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_constraint(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.constraints.insert(key.into(), value.into());
        self
    }

    /// Lock the property to a constant value
    pub fn fixed(mut self, value: impl Into<Value>) -> Self {
        self.fixed_value = Some(value.into());
        self.is_fixed = true;
        self
    }

    /// Give the property a default value that configurations may override
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.fixed_value = Some(value.into());
        self.is_fixed = false;
        self
    }

    pub fn with_item_type(mut self, item_type: PropertyType) -> Self {
        self.item_type = Some(item_type);
        self
    }

    /// Check the name, item type and fixed value against the validated constraints
    pub fn validate(&self, constraints: &Constraints) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }

        if let Some(item_type) = self.item_type {
            if self.property_type != PropertyType::Array {
                return Err(ValidationError::InvalidItemType {
                    name: self.name.clone(),
                    reason: format!("{} properties have no items", self.property_type),
                });
            }
            if !item_type.is_primitive() {
                return Err(ValidationError::InvalidItemType {
                    name: self.name.clone(),
                    reason: format!(
                        "'{}' items are described by child properties, not an item type",
                        item_type
                    ),
                });
            }
        }

        if self.is_fixed && self.fixed_value.is_none() {
            return Err(ValidationError::InvalidFixedValue {
                name: self.name.clone(),
                reason: "fixed properties need a value".to_string(),
            });
        }

        if let Some(value) = &self.fixed_value {
            if !self.property_type.matches_value(value) {
                return Err(ValidationError::InvalidFixedValue {
                    name: self.name.clone(),
                    reason: format!("{} is not a {}", value, self.property_type),
                });
            }
            if let Some(allowed) = constraints.enum_values() {
                if !allowed.contains(value) {
                    return Err(ValidationError::InvalidFixedValue {
                        name: self.name.clone(),
                        reason: format!("{} is not one of the enum values", value),
                    });
                }
            }
        }

        Ok(())
    }
}

/// One property of the schema
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyNode {
    pub(crate) id: String,
    pub(crate) name: String,
    #[serde(rename = "type")]
    pub(crate) property_type: PropertyType,
    pub(crate) required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) fixed_value: Option<Value>,
    pub(crate) is_fixed: bool,
    #[serde(serialize_with = "serialize_constraints")]
    pub(crate) constraints: Constraints,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) item_type: Option<PropertyType>,
    pub(crate) children: Vec<PropertyNode>,
}

fn serialize_constraints<S: Serializer>(
    constraints: &Constraints,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    constraints.to_json().serialize(serializer)
}

impl PropertyNode {
    pub(crate) fn from_input(id: String, input: PropertyInput, constraints: Constraints) -> Self {
        Self {
            id,
            name: input.name,
            property_type: input.property_type,
            required: input.required,
            description: input.description,
            fixed_value: input.fixed_value,
            is_fixed: input.is_fixed,
            constraints,
            item_type: input.item_type,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn property_type(&self) -> PropertyType {
        self.property_type
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn fixed_value(&self) -> Option<&Value> {
        self.fixed_value.as_ref()
    }

    pub fn is_fixed(&self) -> bool {
        self.is_fixed
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn item_type(&self) -> Option<PropertyType> {
        self.item_type
    }

    pub fn children(&self) -> &[PropertyNode] {
        &self.children
    }

    /// Rebuild the form input that would recreate this node (children excluded)
    pub fn to_input(&self) -> PropertyInput {
        PropertyInput {
            name: self.name.clone(),
            property_type: self.property_type,
            required: self.required,
            description: self.description.clone(),
            constraints: self.constraints.to_json(),
            fixed_value: self.fixed_value.clone(),
            is_fixed: self.is_fixed,
            item_type: self.item_type,
        }
    }

    /// Depth-first, pre-order walk of this node and its descendants
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// Number of nodes below this one
    pub fn descendant_count(&self) -> usize {
        self.iter().count() - 1
    }

    /// Structural equality ignoring ids: name, type, required flag,
    /// description, fixed value, constraints, item type and children (in order)
    pub fn same_shape(&self, other: &PropertyNode) -> bool {
        self.name == other.name
            && self.property_type == other.property_type
            && self.required == other.required
            && self.description == other.description
            && self.fixed_value == other.fixed_value
            && self.is_fixed == other.is_fixed
            && self.constraints == other.constraints
            && self.item_type == other.item_type
            && same_shape_all(&self.children, &other.children)
    }
}

fn same_shape_all(left: &[PropertyNode], right: &[PropertyNode]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(l, r)| l.same_shape(r))
}

/// Pre-order iterator over a forest of property nodes
pub struct PreOrder<'a> {
    stack: Vec<&'a PropertyNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a PropertyNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Location of a node's parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Parent<'a> {
    /// The node is a root-level property
    Root,
    Node(&'a PropertyNode),
}

impl<'a> Parent<'a> {
    /// Parent id, `None` for the root scope
    pub fn id(&self) -> Option<&'a str> {
        match self {
            Parent::Root => None,
            Parent::Node(node) => Some(node.id()),
        }
    }
}

/// Root holder of a property tree
///
/// The root itself is not a property: its children are the top-level
/// properties of the compiled schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyTree {
    #[serde(skip)]
    id_prefix: String,
    #[serde(skip)]
    next_id: u64,
    pub(crate) properties: Vec<PropertyNode>,
}

impl Default for PropertyTree {
    fn default() -> Self {
        Self::with_id_prefix(DEFAULT_ID_PREFIX)
    }
}

impl PropertyTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id_prefix(prefix: impl Into<String>) -> Self {
        Self {
            id_prefix: prefix.into(),
            next_id: 0,
            properties: Vec::new(),
        }
    }

    /// Root-level properties in insertion order
    pub fn properties(&self) -> &[PropertyNode] {
        &self.properties
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Total number of nodes at every depth
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Depth-first, pre-order walk of every node
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder {
            stack: self.properties.iter().rev().collect(),
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<&PropertyNode> {
        self.iter().find(|node| node.id == id)
    }

    /// Parent of the node with `id`; `None` when no such node exists
    pub fn parent_of(&self, id: &str) -> Option<Parent<'_>> {
        if self.properties.iter().any(|node| node.id == id) {
            return Some(Parent::Root);
        }
        self.iter()
            .find(|node| node.children.iter().any(|child| child.id == id))
            .map(Parent::Node)
    }

    /// Names used in a parent scope (`None` = root); `None` when the parent doesn't exist
    pub fn sibling_names(&self, parent_id: Option<&str>) -> Option<BTreeSet<String>> {
        self.children_of(parent_id)
            .map(|children| children.iter().map(|node| node.name.clone()).collect())
    }

    /// Children of a parent scope (`None` = root)
    pub fn children_of(&self, parent_id: Option<&str>) -> Option<&[PropertyNode]> {
        match parent_id {
            None => Some(self.properties.as_slice()),
            Some(id) => self.find_by_id(id).map(PropertyNode::children),
        }
    }

    /// Whether `candidate_id` is `ancestor_id` itself or one of its descendants
    pub fn is_same_or_descendant(&self, ancestor_id: &str, candidate_id: &str) -> bool {
        self.find_by_id(ancestor_id)
            .map(|ancestor| ancestor.iter().any(|node| node.id == candidate_id))
            .unwrap_or(false)
    }

    /// Structural equality ignoring ids, see [`PropertyNode::same_shape`]
    pub fn same_shape(&self, other: &PropertyTree) -> bool {
        same_shape_all(&self.properties, &other.properties)
    }

    pub(crate) fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        format!("{}{}", self.id_prefix, self.next_id)
    }

    pub(crate) fn find_by_id_mut(&mut self, id: &str) -> Option<&mut PropertyNode> {
        find_in_mut(&mut self.properties, id)
    }

    pub(crate) fn children_of_mut(&mut self, parent_id: Option<&str>) -> Option<&mut Vec<PropertyNode>> {
        match parent_id {
            None => Some(&mut self.properties),
            Some(id) => self.find_by_id_mut(id).map(|node| &mut node.children),
        }
    }
}

fn find_in_mut<'a>(nodes: &'a mut [PropertyNode], id: &str) -> Option<&'a mut PropertyNode> {
    for node in nodes.iter_mut() {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_in_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::constraints::validate;
    use serde_json::json;

    fn node(id: &str, name: &str, property_type: PropertyType, children: Vec<PropertyNode>) -> PropertyNode {
        let mut node = PropertyNode::from_input(
            id.to_string(),
            PropertyInput::new(name, property_type),
            Constraints::empty(property_type),
        );
        node.children = children;
        node
    }

    fn sample_tree() -> PropertyTree {
        let mut tree = PropertyTree::new();
        tree.properties = vec![
            node("prop_1", "name", PropertyType::String, vec![]),
            node(
                "prop_2",
                "address",
                PropertyType::Object,
                vec![
                    node("prop_3", "street", PropertyType::String, vec![]),
                    node(
                        "prop_4",
                        "geo",
                        PropertyType::Object,
                        vec![node("prop_5", "lat", PropertyType::Number, vec![])],
                    ),
                ],
            ),
        ];
        tree
    }

    #[test]
    fn test_find_by_id_at_any_depth() {
        let tree = sample_tree();
        assert_eq!(tree.find_by_id("prop_1").unwrap().name(), "name");
        assert_eq!(tree.find_by_id("prop_5").unwrap().name(), "lat");
        assert!(tree.find_by_id("prop_99").is_none());
    }

    #[test]
    fn test_iter_is_pre_order() {
        let tree = sample_tree();
        let ids: Vec<&str> = tree.iter().map(PropertyNode::id).collect();
        assert_eq!(ids, vec!["prop_1", "prop_2", "prop_3", "prop_4", "prop_5"]);
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.find_by_id("prop_2").unwrap().descendant_count(), 3);
    }

    #[test]
    fn test_parent_of() {
        let tree = sample_tree();
        assert_eq!(tree.parent_of("prop_1"), Some(Parent::Root));
        assert_eq!(tree.parent_of("prop_5").unwrap().id(), Some("prop_4"));
        assert_eq!(tree.parent_of("prop_3").unwrap().id(), Some("prop_2"));
        assert!(tree.parent_of("missing").is_none());
    }

    #[test]
    fn test_sibling_names() {
        let tree = sample_tree();
        let root: Vec<String> = tree.sibling_names(None).unwrap().into_iter().collect();
        assert_eq!(root, vec!["address".to_string(), "name".to_string()]);

        let nested = tree.sibling_names(Some("prop_2")).unwrap();
        assert!(nested.contains("street"));
        assert!(nested.contains("geo"));
        assert!(tree.sibling_names(Some("prop_1")).unwrap().is_empty());
        assert!(tree.sibling_names(Some("missing")).is_none());
    }

    #[test]
    fn test_is_same_or_descendant() {
        let tree = sample_tree();
        assert!(tree.is_same_or_descendant("prop_2", "prop_2"));
        assert!(tree.is_same_or_descendant("prop_2", "prop_5"));
        assert!(!tree.is_same_or_descendant("prop_4", "prop_3"));
        assert!(!tree.is_same_or_descendant("missing", "prop_3"));
    }

    #[test]
    fn test_same_shape_ignores_ids() {
        let tree = sample_tree();
        let mut renumbered = sample_tree();
        renumbered.properties[0].id = "other".to_string();
        assert!(tree.same_shape(&renumbered));

        renumbered.properties[1].children[0].required = true;
        assert!(!tree.same_shape(&renumbered));
    }

    #[test]
    fn test_allocated_ids_are_sequential() {
        let mut tree = PropertyTree::with_id_prefix("field_");
        assert_eq!(tree.allocate_id(), "field_1");
        assert_eq!(tree.allocate_id(), "field_2");
    }

    #[test]
    fn test_input_validation() {
        let empty = Constraints::empty(PropertyType::String);

        assert_eq!(
            PropertyInput::new("  ", PropertyType::String).validate(&empty),
            Err(ValidationError::EmptyName)
        );

        let wrong_kind = PropertyInput::new("port", PropertyType::Number).fixed("8080");
        assert!(matches!(
            wrong_kind.validate(&Constraints::empty(PropertyType::Number)),
            Err(ValidationError::InvalidFixedValue { .. })
        ));

        let mut missing_value = PropertyInput::new("port", PropertyType::Number);
        missing_value.is_fixed = true;
        assert!(missing_value
            .validate(&Constraints::empty(PropertyType::Number))
            .is_err());

        let item_on_string = PropertyInput::new("tags", PropertyType::String)
            .with_item_type(PropertyType::String);
        assert!(matches!(
            item_on_string.validate(&empty),
            Err(ValidationError::InvalidItemType { .. })
        ));

        let object_items = PropertyInput::new("tags", PropertyType::Array)
            .with_item_type(PropertyType::Object);
        assert!(object_items
            .validate(&Constraints::empty(PropertyType::Array))
            .is_err());
    }

    #[test]
    fn test_fixed_value_must_be_enum_member() {
        let input = PropertyInput::new("env", PropertyType::String)
            .with_constraint("enum", json!(["dev", "prod"]))
            .fixed("staging");
        let constraints = validate(PropertyType::String, &input.constraints).unwrap();

        assert!(matches!(
            input.validate(&constraints),
            Err(ValidationError::InvalidFixedValue { .. })
        ));
    }

    #[test]
    fn test_node_serialization() {
        let constraints = validate(
            PropertyType::Number,
            json!({"minimum": 0}).as_object().unwrap(),
        )
        .unwrap();
        let node = PropertyNode::from_input(
            "prop_1".to_string(),
            PropertyInput::new("age", PropertyType::Number).with_required(true),
            constraints,
        );

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["id"], "prop_1");
        assert_eq!(value["type"], "number");
        assert_eq!(value["required"], true);
        assert_eq!(value["isFixed"], false);
        assert_eq!(value["constraints"], json!({"minimum": 0}));
        assert!(value.get("fixedValue").is_none());
    }

    #[test]
    fn test_input_deserialization_defaults() {
        let input: PropertyInput =
            serde_json::from_value(json!({"name": "enabled", "type": "boolean"})).unwrap();
        assert_eq!(input.property_type, PropertyType::Boolean);
        assert!(!input.required);
        assert!(!input.is_fixed);
        assert!(input.constraints.is_empty());
    }
}
