//! Constraint Model
//!
//! Per-type validation rules that can be attached to a property node.
//! Each property type has its own constraint set, expressed as a variant of
//! [`Constraints`] that carries only the keys legal for that type:
//!
//! | type    | keys                                                                      |
//! |---------|---------------------------------------------------------------------------|
//! | string  | `minLength`, `maxLength`, `pattern`, `format`, `enum`                      |
//! | number  | `minimum`, `maximum`, `exclusiveMinimum`, `exclusiveMaximum`, `multipleOf`, `enum` |
//! | boolean | `enum`                                                                    |
//! | object  | `enum`                                                                    |
//! | array   | `minItems`, `maxItems`, `uniqueItems`, `enum`                              |
//!
//! Raw constraint mappings (as produced by an editor form or read from a
//! JSON Schema document) are turned into typed constraints with [`validate`].
//!
//! ## Example
//!
//! ```rust
//! use schema_studio_core::models::{validate_constraints, PropertyType};
//! use serde_json::json;
//!
//! let raw = json!({ "minLength": 3, "maxLength": 10 });
//! let constraints = validate_constraints(PropertyType::String, raw.as_object().unwrap()).unwrap();
//! assert_eq!(constraints.property_type(), PropertyType::String);
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use thiserror::Error;

const STRING_KEYS: &[&str] = &["minLength", "maxLength", "pattern", "format", "enum"];
const NUMBER_KEYS: &[&str] = &[
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
    "enum",
];
const BOOLEAN_KEYS: &[&str] = &["enum"];
const OBJECT_KEYS: &[&str] = &["enum"];
const ARRAY_KEYS: &[&str] = &["minItems", "maxItems", "uniqueItems", "enum"];

/// Type of a property node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl PropertyType {
    pub const ALL: [PropertyType; 5] = [
        PropertyType::String,
        PropertyType::Number,
        PropertyType::Boolean,
        PropertyType::Object,
        PropertyType::Array,
    ];

    /// JSON Schema name of this type
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::String => "string",
            PropertyType::Number => "number",
            PropertyType::Boolean => "boolean",
            PropertyType::Object => "object",
            PropertyType::Array => "array",
        }
    }

    /// Parse a JSON Schema type name. Returns `None` for names outside the supported set.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Object and array nodes may own children
    pub fn is_container(&self) -> bool {
        matches!(self, PropertyType::Object | PropertyType::Array)
    }

    pub fn is_primitive(&self) -> bool {
        !self.is_container()
    }

    /// Whether a JSON value has the kind this type describes
    pub fn matches_value(&self, value: &Value) -> bool {
        match self {
            PropertyType::String => value.is_string(),
            PropertyType::Number => value.is_number(),
            PropertyType::Boolean => value.is_boolean(),
            PropertyType::Object => value.is_object(),
            PropertyType::Array => value.is_array(),
        }
    }

    /// Constraint keys legal for this type
    pub fn allowed_constraint_keys(&self) -> &'static [&'static str] {
        match self {
            PropertyType::String => STRING_KEYS,
            PropertyType::Number => NUMBER_KEYS,
            PropertyType::Boolean => BOOLEAN_KEYS,
            PropertyType::Object => OBJECT_KEYS,
            PropertyType::Array => ARRAY_KEYS,
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formats accepted by the `format` constraint of string properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StringFormat {
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "uri")]
    Uri,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "date-time")]
    DateTime,
    #[serde(rename = "hostname")]
    Hostname,
    #[serde(rename = "ipv4")]
    Ipv4,
    #[serde(rename = "ipv6")]
    Ipv6,
}

impl StringFormat {
    pub const ALL: [StringFormat; 7] = [
        StringFormat::Email,
        StringFormat::Uri,
        StringFormat::Date,
        StringFormat::DateTime,
        StringFormat::Hostname,
        StringFormat::Ipv4,
        StringFormat::Ipv6,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StringFormat::Email => "email",
            StringFormat::Uri => "uri",
            StringFormat::Date => "date",
            StringFormat::DateTime => "date-time",
            StringFormat::Hostname => "hostname",
            StringFormat::Ipv4 => "ipv4",
            StringFormat::Ipv6 => "ipv6",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

/// Errors raised while validating a constraint mapping against a property type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstraintError {
    /// Key is not part of the constraint set of the property type
    #[error("Constraint '{key}' is not allowed on {property_type} properties")]
    UnknownKey {
        property_type: PropertyType,
        key: String,
    },

    /// Key is legal but its value is outside the key's domain
    #[error("Invalid value for constraint '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

impl ConstraintError {
    pub fn unknown_key(property_type: PropertyType, key: impl Into<String>) -> Self {
        Self::UnknownKey {
            property_type,
            key: key.into(),
        }
    }

    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringConstraints {
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    /// Regular expression, already checked to compile
    pub pattern: Option<String>,
    pub format: Option<StringFormat>,
    pub enum_values: Option<Vec<Value>>,
}

/// Numeric bounds are kept as JSON numbers so integers stay integers in the
/// compiled schema (`0`, not `0.0`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberConstraints {
    pub minimum: Option<Number>,
    pub maximum: Option<Number>,
    pub exclusive_minimum: Option<Number>,
    pub exclusive_maximum: Option<Number>,
    pub multiple_of: Option<Number>,
    pub enum_values: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrayConstraints {
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: Option<bool>,
    pub enum_values: Option<Vec<Value>>,
}

/// Validated constraints of a property, one variant per property type
#[derive(Debug, Clone, PartialEq)]
pub enum Constraints {
    String(StringConstraints),
    Number(NumberConstraints),
    Boolean { enum_values: Option<Vec<Value>> },
    Object { enum_values: Option<Vec<Value>> },
    Array(ArrayConstraints),
}

impl Constraints {
    /// Constraint set with every key absent
    pub fn empty(property_type: PropertyType) -> Self {
        match property_type {
            PropertyType::String => Constraints::String(StringConstraints::default()),
            PropertyType::Number => Constraints::Number(NumberConstraints::default()),
            PropertyType::Boolean => Constraints::Boolean { enum_values: None },
            PropertyType::Object => Constraints::Object { enum_values: None },
            PropertyType::Array => Constraints::Array(ArrayConstraints::default()),
        }
    }

    pub fn property_type(&self) -> PropertyType {
        match self {
            Constraints::String(_) => PropertyType::String,
            Constraints::Number(_) => PropertyType::Number,
            Constraints::Boolean { .. } => PropertyType::Boolean,
            Constraints::Object { .. } => PropertyType::Object,
            Constraints::Array(_) => PropertyType::Array,
        }
    }

    pub fn enum_values(&self) -> Option<&[Value]> {
        let values = match self {
            Constraints::String(c) => &c.enum_values,
            Constraints::Number(c) => &c.enum_values,
            Constraints::Boolean { enum_values } => enum_values,
            Constraints::Object { enum_values } => enum_values,
            Constraints::Array(c) => &c.enum_values,
        };
        values.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.to_json().is_empty()
    }

    /// Flatten into JSON Schema keywords, in table order with `enum` last
    pub fn to_json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        match self {
            Constraints::String(c) => {
                insert_opt(&mut map, "minLength", c.min_length.map(Value::from));
                insert_opt(&mut map, "maxLength", c.max_length.map(Value::from));
                insert_opt(&mut map, "pattern", c.pattern.clone().map(Value::String));
                insert_opt(
                    &mut map,
                    "format",
                    c.format.map(|f| Value::String(f.as_str().to_string())),
                );
            }
            Constraints::Number(c) => {
                insert_opt(&mut map, "minimum", c.minimum.clone().map(Value::Number));
                insert_opt(&mut map, "maximum", c.maximum.clone().map(Value::Number));
                insert_opt(
                    &mut map,
                    "exclusiveMinimum",
                    c.exclusive_minimum.clone().map(Value::Number),
                );
                insert_opt(
                    &mut map,
                    "exclusiveMaximum",
                    c.exclusive_maximum.clone().map(Value::Number),
                );
                insert_opt(&mut map, "multipleOf", c.multiple_of.clone().map(Value::Number));
            }
            Constraints::Array(c) => {
                insert_opt(&mut map, "minItems", c.min_items.map(Value::from));
                insert_opt(&mut map, "maxItems", c.max_items.map(Value::from));
                insert_opt(&mut map, "uniqueItems", c.unique_items.map(Value::Bool));
            }
            Constraints::Boolean { .. } | Constraints::Object { .. } => {}
        }
        insert_opt(
            &mut map,
            "enum",
            self.enum_values().map(|values| Value::Array(values.to_vec())),
        );
        map
    }
}

fn insert_opt(map: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value);
    }
}

/// Validate a raw constraint mapping against a property type
///
/// `null` values are treated as absent keys (editor forms submit cleared
/// inputs as `null`).
///
/// # Errors
///
/// - `UnknownKey`: a key outside the type's constraint set
/// - `InvalidValue`: a value outside its key's domain, an invalid regular
///   expression, an unknown format, an `enum` whose values do not match the
///   type, or inverted bounds (`minLength > maxLength` and friends)
pub fn validate(
    property_type: PropertyType,
    raw: &Map<String, Value>,
) -> Result<Constraints, ConstraintError> {
    let allowed = property_type.allowed_constraint_keys();
    if let Some(key) = raw.keys().find(|key| !allowed.contains(&key.as_str())) {
        return Err(ConstraintError::unknown_key(property_type, key.as_str()));
    }

    let enum_values = parse_enum(property_type, field(raw, "enum"))?;

    let constraints = match property_type {
        PropertyType::String => {
            let constraints = StringConstraints {
                min_length: parse_count(raw, "minLength")?,
                max_length: parse_count(raw, "maxLength")?,
                pattern: parse_pattern(raw)?,
                format: parse_format(raw)?,
                enum_values,
            };
            check_order(
                "minLength",
                constraints.min_length.map(|v| v as f64),
                constraints.max_length.map(|v| v as f64),
            )?;
            Constraints::String(constraints)
        }
        PropertyType::Number => {
            let constraints = NumberConstraints {
                minimum: parse_number(raw, "minimum")?,
                maximum: parse_number(raw, "maximum")?,
                exclusive_minimum: parse_number(raw, "exclusiveMinimum")?,
                exclusive_maximum: parse_number(raw, "exclusiveMaximum")?,
                multiple_of: parse_number(raw, "multipleOf")?,
                enum_values,
            };
            check_order(
                "minimum",
                constraints.minimum.as_ref().and_then(Number::as_f64),
                constraints.maximum.as_ref().and_then(Number::as_f64),
            )?;
            if let Some(step) = constraints.multiple_of.as_ref().and_then(Number::as_f64) {
                if step <= 0.0 {
                    return Err(ConstraintError::invalid_value(
                        "multipleOf",
                        "must be strictly greater than 0",
                    ));
                }
            }
            Constraints::Number(constraints)
        }
        PropertyType::Boolean => Constraints::Boolean { enum_values },
        PropertyType::Object => Constraints::Object { enum_values },
        PropertyType::Array => {
            let constraints = ArrayConstraints {
                min_items: parse_count(raw, "minItems")?,
                max_items: parse_count(raw, "maxItems")?,
                unique_items: parse_bool(raw, "uniqueItems")?,
                enum_values,
            };
            check_order(
                "minItems",
                constraints.min_items.map(|v| v as f64),
                constraints.max_items.map(|v| v as f64),
            )?;
            Constraints::Array(constraints)
        }
    };

    Ok(constraints)
}

/// Split a raw mapping into the keys legal for `property_type` and the names
/// of the keys that are not
///
/// An `enum` holding a value of another kind than `property_type` counts as
/// illegal as well.
pub fn retain_legal_keys(
    property_type: PropertyType,
    raw: &Map<String, Value>,
) -> (Map<String, Value>, Vec<String>) {
    let allowed = property_type.allowed_constraint_keys();
    let mut kept = Map::new();
    let mut dropped = Vec::new();
    for (key, value) in raw {
        let mismatched_enum = key == "enum"
            && value
                .as_array()
                .is_some_and(|values| values.iter().any(|v| !property_type.matches_value(v)));
        if allowed.contains(&key.as_str()) && !mismatched_enum {
            kept.insert(key.clone(), value.clone());
        } else {
            dropped.push(key.clone());
        }
    }
    (kept, dropped)
}

fn field<'a>(raw: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    raw.get(key).filter(|value| !value.is_null())
}

fn parse_count(raw: &Map<String, Value>, key: &str) -> Result<Option<u64>, ConstraintError> {
    let Some(value) = field(raw, key) else {
        return Ok(None);
    };
    value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|v| *v >= 0.0 && v.fract() == 0.0)
                .map(|v| v as u64)
        })
        .map(Some)
        .ok_or_else(|| ConstraintError::invalid_value(key, "must be a non-negative integer"))
}

fn parse_number(raw: &Map<String, Value>, key: &str) -> Result<Option<Number>, ConstraintError> {
    match field(raw, key) {
        None => Ok(None),
        Some(Value::Number(number)) => Ok(Some(number.clone())),
        Some(_) => Err(ConstraintError::invalid_value(key, "must be a number")),
    }
}

fn parse_bool(raw: &Map<String, Value>, key: &str) -> Result<Option<bool>, ConstraintError> {
    match field(raw, key) {
        None => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(*flag)),
        Some(_) => Err(ConstraintError::invalid_value(key, "must be a boolean")),
    }
}

fn parse_pattern(raw: &Map<String, Value>) -> Result<Option<String>, ConstraintError> {
    match field(raw, "pattern") {
        None => Ok(None),
        Some(Value::String(pattern)) => {
            Regex::new(pattern).map_err(|e| {
                ConstraintError::invalid_value("pattern", format!("invalid regular expression: {}", e))
            })?;
            Ok(Some(pattern.clone()))
        }
        Some(_) => Err(ConstraintError::invalid_value("pattern", "must be a string")),
    }
}

fn parse_format(raw: &Map<String, Value>) -> Result<Option<StringFormat>, ConstraintError> {
    match field(raw, "format") {
        None => Ok(None),
        Some(Value::String(name)) => StringFormat::parse(name).map(Some).ok_or_else(|| {
            let known: Vec<&str> = StringFormat::ALL.iter().map(StringFormat::as_str).collect();
            ConstraintError::invalid_value(
                "format",
                format!("unknown format '{}', expected one of: {}", name, known.join(", ")),
            )
        }),
        Some(_) => Err(ConstraintError::invalid_value("format", "must be a string")),
    }
}

fn parse_enum(
    property_type: PropertyType,
    value: Option<&Value>,
) -> Result<Option<Vec<Value>>, ConstraintError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let Value::Array(values) = value else {
        return Err(ConstraintError::invalid_value("enum", "must be an array"));
    };
    if values.is_empty() {
        return Err(ConstraintError::invalid_value("enum", "must list at least one value"));
    }
    for (index, candidate) in values.iter().enumerate() {
        if !property_type.matches_value(candidate) {
            return Err(ConstraintError::invalid_value(
                "enum",
                format!("value {} is not a {}", candidate, property_type),
            ));
        }
        if values[..index].contains(candidate) {
            return Err(ConstraintError::invalid_value(
                "enum",
                format!("value {} is listed more than once", candidate),
            ));
        }
    }
    Ok(Some(values.clone()))
}

fn check_order(key: &str, lower: Option<f64>, upper: Option<f64>) -> Result<(), ConstraintError> {
    if let (Some(lower), Some(upper)) = (lower, upper) {
        if lower > upper {
            return Err(ConstraintError::invalid_value(
                key,
                format!("lower bound {} exceeds upper bound {}", lower, upper),
            ));
        }
    }
    Ok(())
}
