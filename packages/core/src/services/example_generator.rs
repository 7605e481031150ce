//! Example Generator
//!
//! Builds a sample instance that conforms to the schema a property tree
//! describes. Each property's value is chosen in this order:
//!
//! 1. its fixed value (locked or an unlocked default)
//! 2. the first `enum` value
//! 3. a type placeholder derived from the remaining constraints
//!
//! Placeholders honour `format`, length bounds, numeric bounds with
//! `multipleOf`, and `minItems`. `pattern` is not interpreted, so a string
//! placeholder may not match it. Repetition is capped at
//! [`MAX_EXAMPLE_ITEMS`] array items and [`MAX_EXAMPLE_LENGTH`] characters,
//! so larger `minItems`/`minLength` values yield a shorter example.

use crate::models::{Constraints, NumberConstraints, PropertyNode, PropertyTree, PropertyType, StringFormat};
use serde_json::{json, Map, Value};

const STRING_PLACEHOLDER: &str = "example";

/// Upper bound on the number of items put into an example array
pub const MAX_EXAMPLE_ITEMS: u64 = 16;

/// Upper bound on the padding length of an example string
pub const MAX_EXAMPLE_LENGTH: u64 = 256;

/// Sample instance of the whole tree (an object keyed by root property names)
///
/// # Example
///
/// ```rust
/// use schema_studio_core::models::{PropertyInput, PropertyTree, PropertyType};
/// use schema_studio_core::services::generate_example;
/// use serde_json::json;
///
/// let mut tree = PropertyTree::new();
/// tree.add_property(None, PropertyInput::new("version", PropertyType::Number).fixed(42))
///     .unwrap();
/// tree.add_property(None, PropertyInput::new("enabled", PropertyType::Boolean))
///     .unwrap();
///
/// assert_eq!(generate_example(&tree), json!({"version": 42, "enabled": false}));
/// ```
pub fn generate_example(tree: &PropertyTree) -> Value {
    object_example(tree.properties())
}

/// Sample value of a single property
pub fn example_for(node: &PropertyNode) -> Value {
    if let Some(value) = node.fixed_value() {
        return value.clone();
    }
    if let Some(first) = node.constraints().enum_values().and_then(|values| values.first()) {
        return first.clone();
    }

    match node.property_type() {
        PropertyType::Object => object_example(node.children()),
        PropertyType::Array => array_example(node),
        PropertyType::String | PropertyType::Number | PropertyType::Boolean => {
            placeholder(node.constraints())
        }
    }
}

fn object_example(children: &[PropertyNode]) -> Value {
    let mut object = Map::new();
    for child in children {
        object.insert(child.name().to_string(), example_for(child));
    }
    Value::Object(object)
}

fn array_example(node: &PropertyNode) -> Value {
    let item = if !node.children().is_empty() {
        object_example(node.children())
    } else if let Some(item_type) = node.item_type() {
        placeholder(&Constraints::empty(item_type))
    } else {
        return Value::Array(Vec::new());
    };

    let count = match node.constraints() {
        Constraints::Array(array) => {
            let wanted = if array.unique_items == Some(true) {
                1
            } else {
                array.min_items.unwrap_or(1).max(1)
            };
            array
                .max_items
                .map_or(wanted, |max| wanted.min(max))
                .min(MAX_EXAMPLE_ITEMS)
        }
        _ => 1,
    };

    Value::Array(vec![item; count as usize])
}

fn placeholder(constraints: &Constraints) -> Value {
    match constraints {
        Constraints::String(string) => match string.format {
            Some(format) => json!(format_placeholder(format)),
            None => json!(fit_length(STRING_PLACEHOLDER, string.min_length, string.max_length)),
        },
        Constraints::Number(number) => number_placeholder(number),
        Constraints::Boolean { .. } => json!(false),
        Constraints::Object { .. } => Value::Object(Map::new()),
        Constraints::Array(_) => Value::Array(Vec::new()),
    }
}

fn format_placeholder(format: StringFormat) -> &'static str {
    match format {
        StringFormat::Email => "user@example.com",
        StringFormat::Uri => "https://example.com",
        StringFormat::Date => "2024-01-01",
        StringFormat::DateTime => "2024-01-01T00:00:00Z",
        StringFormat::Hostname => "example.com",
        StringFormat::Ipv4 => "192.168.0.1",
        StringFormat::Ipv6 => "::1",
    }
}

fn fit_length(base: &str, min_length: Option<u64>, max_length: Option<u64>) -> String {
    let mut value: String = match max_length {
        Some(max) => base.chars().take(max as usize).collect(),
        None => base.to_string(),
    };
    let min = min_length.unwrap_or(0).min(MAX_EXAMPLE_LENGTH) as usize;
    let len = value.chars().count();
    if len < min {
        value.extend(std::iter::repeat('x').take(min - len));
    }
    value
}

fn number_placeholder(number: &NumberConstraints) -> Value {
    let as_f64 = |n: &Option<serde_json::Number>| n.as_ref().and_then(|n| n.as_f64());
    let minimum = as_f64(&number.minimum);
    let maximum = as_f64(&number.maximum);
    let exclusive_minimum = as_f64(&number.exclusive_minimum);
    let exclusive_maximum = as_f64(&number.exclusive_maximum);
    let step = as_f64(&number.multiple_of).filter(|step| *step > 0.0);

    let mut value = match (minimum, exclusive_minimum) {
        (Some(min), Some(excl)) if excl >= min => excl + step.unwrap_or(1.0),
        (Some(min), _) => min,
        (None, Some(excl)) => excl + step.unwrap_or(1.0),
        (None, None) => 0.0,
    };

    let upper = match (maximum, exclusive_maximum) {
        (Some(max), Some(excl)) => Some(max.min(excl - step.unwrap_or(1.0))),
        (Some(max), None) => Some(max),
        (None, Some(excl)) => Some(excl - step.unwrap_or(1.0)),
        (None, None) => None,
    };
    if let Some(upper) = upper {
        if value > upper && minimum.is_none() && exclusive_minimum.is_none() {
            value = upper;
        }
    }

    // When no multiple of `multipleOf` lies within the bounds, the lower
    // bound itself is used and the example does not satisfy `multipleOf`.
    if let Some(step) = step {
        let has_lower = minimum.is_some() || exclusive_minimum.is_some();
        let snapped = (value / step).ceil() * step;
        value = match upper {
            Some(upper) if snapped > upper && has_lower => value,
            Some(upper) if snapped > upper => (value / step).floor() * step,
            _ => snapped,
        };
    }

    number_value(value)
}

fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        json!(value as i64)
    } else {
        json!(value)
    }
}
