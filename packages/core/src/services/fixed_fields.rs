//! Fixed-field enforcement
//!
//! A fixed property carries the only value a configuration may hold for it.
//! These helpers check a configuration value against the locked properties of
//! a tree and write the locked values into it.
//!
//! Values are resolved by property name through nested objects; array
//! properties with an object item template are checked for every element.
//! Absent values are not violations (`required` covers presence).

use crate::models::{PropertyNode, PropertyTree, PropertyType};
use serde::Serialize;
use serde_json::{Map, Value};

/// A configuration value that differs from a fixed property's value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedFieldViolation {
    /// Location in the configuration, e.g. `server.port` or `routes[1].method`
    pub path: String,
    pub property_id: String,
    pub expected: Value,
    pub actual: Value,
}

/// List every fixed property whose value in `config` differs from the locked one
pub fn fixed_field_violations(tree: &PropertyTree, config: &Value) -> Vec<FixedFieldViolation> {
    let mut violations = Vec::new();
    if let Value::Object(object) = config {
        collect_violations(tree.properties(), object, "", &mut violations);
    }
    violations
}

fn collect_violations(
    nodes: &[PropertyNode],
    object: &Map<String, Value>,
    prefix: &str,
    violations: &mut Vec<FixedFieldViolation>,
) {
    for node in nodes {
        let Some(actual) = object.get(node.name()) else {
            continue;
        };
        let path = if prefix.is_empty() {
            node.name().to_string()
        } else {
            format!("{}.{}", prefix, node.name())
        };

        if node.is_fixed() {
            if let Some(expected) = node.fixed_value().filter(|expected| *expected != actual) {
                violations.push(FixedFieldViolation {
                    path,
                    property_id: node.id().to_string(),
                    expected: expected.clone(),
                    actual: actual.clone(),
                });
            }
            continue;
        }

        match (node.property_type(), actual) {
            (PropertyType::Object, Value::Object(nested)) => {
                collect_violations(node.children(), nested, &path, violations)
            }
            (PropertyType::Array, Value::Array(elements)) if !node.children().is_empty() => {
                for (index, element) in elements.iter().enumerate() {
                    if let Value::Object(nested) = element {
                        let element_path = format!("{}[{}]", path, index);
                        collect_violations(node.children(), nested, &element_path, violations);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Write every fixed value into `config`
///
/// Missing intermediate objects are created when they lead to a fixed
/// property. Existing array elements are updated; no elements are added.
/// A non-object `config` is returned unchanged.
pub fn apply_fixed_values(tree: &PropertyTree, mut config: Value) -> Value {
    if let Value::Object(object) = &mut config {
        apply_to_object(tree.properties(), object);
    }
    config
}

fn apply_to_object(nodes: &[PropertyNode], object: &mut Map<String, Value>) {
    for node in nodes {
        if node.is_fixed() {
            if let Some(value) = node.fixed_value() {
                object.insert(node.name().to_string(), value.clone());
            }
            continue;
        }
        if !has_fixed_descendant(node) {
            continue;
        }

        match node.property_type() {
            PropertyType::Object => {
                let entry = object
                    .entry(node.name().to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(nested) = entry {
                    apply_to_object(node.children(), nested);
                }
            }
            PropertyType::Array => {
                if let Some(Value::Array(elements)) = object.get_mut(node.name()) {
                    for element in elements.iter_mut() {
                        if let Value::Object(nested) = element {
                            apply_to_object(node.children(), nested);
                        }
                    }
                }
            }
            PropertyType::String | PropertyType::Number | PropertyType::Boolean => {}
        }
    }
}

fn has_fixed_descendant(node: &PropertyNode) -> bool {
    node.iter().skip(1).any(PropertyNode::is_fixed)
}
