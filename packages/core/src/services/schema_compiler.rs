//! Schema Compiler
//!
//! Bidirectional mapping between a [`PropertyTree`] and a JSON Schema document.
//!
//! ## Forward (`compile`)
//!
//! The tree root becomes an `object` schema whose `properties` are the
//! root-level nodes. Each node compiles to:
//!
//! ```json
//! {
//!   "type": "<type>",
//!   "description": "...",
//!   "<constraint keywords>": "...",
//!   "properties": { }, "required": [ ],
//!   "items": { },
//!   "default": "<fixed value>",
//!   "readOnly": true
//! }
//! ```
//!
//! Object keys follow the children's insertion order, so compiled documents
//! diff reproducibly. `required` is omitted when no child is required.
//! Arrays compile their child properties into an object item schema, a
//! primitive item type into `{"type": ...}`, and otherwise into the untyped
//! item schema `{}`.
//!
//! ## Inverse (`decompile`)
//!
//! Rebuilds a tree through the regular tree operations, so every tree
//! invariant is checked again on import. Constructs outside the supported
//! subset (`$ref`, composition, conditionals, type lists, ...) abort the whole
//! import with [`DecompileError::UnsupportedSchemaShape`].

use crate::models::{PropertyInput, PropertyNode, PropertyTree, PropertyType, DEFAULT_ID_PREFIX};
use crate::operations::{ErrorCategory, TreeOperationError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Keyword marking a fixed property with the standard annotation
pub const READ_ONLY_KEY: &str = "readOnly";

/// Keyword marking a fixed property with the extension annotation
pub const FIXED_EXTENSION_KEY: &str = "x-fixed";

/// Keywords outside the supported subset of JSON Schema
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "$ref",
    "$defs",
    "definitions",
    "allOf",
    "anyOf",
    "oneOf",
    "not",
    "if",
    "then",
    "else",
    "const",
    "additionalProperties",
    "patternProperties",
    "propertyNames",
    "dependencies",
    "dependentRequired",
    "dependentSchemas",
    "unevaluatedProperties",
    "unevaluatedItems",
    "prefixItems",
    "additionalItems",
    "contains",
    "minContains",
    "maxContains",
    "minProperties",
    "maxProperties",
];

/// Annotations accepted on import and dropped
const IGNORED_ANNOTATIONS: &[&str] = &[
    "title",
    "$schema",
    "$id",
    "$comment",
    "examples",
    "deprecated",
    "writeOnly",
];

/// How fixed properties are advertised in the compiled schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FixedMarker {
    /// `"readOnly": true`
    #[default]
    #[serde(rename = "readOnly")]
    ReadOnly,

    /// `"x-fixed": true`
    #[serde(rename = "x-fixed")]
    Extension,
}

impl FixedMarker {
    pub fn key(&self) -> &'static str {
        match self {
            FixedMarker::ReadOnly => READ_ONLY_KEY,
            FixedMarker::Extension => FIXED_EXTENSION_KEY,
        }
    }
}

/// Compiler settings
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerOptions {
    pub fixed_marker: FixedMarker,

    /// Emitted as `$schema` on the root when set
    pub schema_dialect: Option<String>,

    /// Prefix of the ids given to decompiled properties
    pub id_prefix: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            fixed_marker: FixedMarker::default(),
            schema_dialect: None,
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
        }
    }
}

/// Failures of [`SchemaCompiler::decompile`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecompileError {
    /// The document uses JSON Schema features the property tree cannot represent
    #[error("Unsupported schema shape at '{path}': {reason}")]
    UnsupportedSchemaShape { path: String, reason: String },

    /// A property was rejected by the tree operations (constraints, names, fixed values)
    #[error("Invalid property at '{path}': {source}")]
    InvalidProperty {
        path: String,
        source: TreeOperationError,
    },
}

impl DecompileError {
    pub fn unsupported(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedSchemaShape {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// JSON pointer of the offending schema location (`""` for the root)
    pub fn path(&self) -> &str {
        match self {
            Self::UnsupportedSchemaShape { path, .. } | Self::InvalidProperty { path, .. } => path,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedSchemaShape { .. } => ErrorCategory::Structural,
            Self::InvalidProperty { source, .. } => source.category(),
        }
    }
}

/// Where a decompiled property's children come from
enum Shape<'a> {
    Leaf,
    /// `properties` of the property schema itself
    Members,
    /// `properties` of the array's item schema
    ItemMembers(&'a Map<String, Value>),
}

/// Converts property trees to JSON Schema documents and back
#[derive(Debug, Clone, Default)]
pub struct SchemaCompiler {
    options: CompilerOptions,
}

impl SchemaCompiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compile the tree into a JSON Schema document
    ///
    /// # Example
    ///
    /// ```rust
    /// use schema_studio_core::models::{PropertyInput, PropertyTree, PropertyType};
    /// use schema_studio_core::services::SchemaCompiler;
    /// use serde_json::json;
    ///
    /// let mut tree = PropertyTree::new();
    /// tree.add_property(
    ///     None,
    ///     PropertyInput::new("age", PropertyType::Number)
    ///         .with_required(true)
    ///         .with_constraint("minimum", 0)
    ///         .with_constraint("maximum", 120),
    /// )
    /// .unwrap();
    ///
    /// let schema = SchemaCompiler::default().compile(&tree);
    /// assert_eq!(
    ///     schema,
    ///     json!({
    ///         "type": "object",
    ///         "properties": { "age": { "type": "number", "minimum": 0, "maximum": 120 } },
    ///         "required": ["age"]
    ///     })
    /// );
    /// ```
    pub fn compile(&self, tree: &PropertyTree) -> Value {
        let mut root = Map::new();
        if let Some(dialect) = &self.options.schema_dialect {
            root.insert("$schema".to_string(), Value::String(dialect.clone()));
        }
        root.insert("type".to_string(), json!("object"));
        self.insert_members(&mut root, tree.properties());
        Value::Object(root)
    }

    /// Compile a single property (and its subtree)
    pub fn compile_node(&self, node: &PropertyNode) -> Value {
        let mut schema = Map::new();
        schema.insert("type".to_string(), json!(node.property_type().as_str()));
        if let Some(description) = node.description() {
            schema.insert("description".to_string(), json!(description));
        }
        schema.extend(node.constraints().to_json());

        match node.property_type() {
            PropertyType::Object => self.insert_members(&mut schema, node.children()),
            PropertyType::Array => {
                schema.insert("items".to_string(), self.compile_items(node));
            }
            PropertyType::String | PropertyType::Number | PropertyType::Boolean => {}
        }

        if let Some(value) = node.fixed_value() {
            schema.insert("default".to_string(), value.clone());
            if node.is_fixed() {
                schema.insert(self.options.fixed_marker.key().to_string(), Value::Bool(true));
            }
        }

        Value::Object(schema)
    }

    fn compile_items(&self, node: &PropertyNode) -> Value {
        if !node.children().is_empty() {
            let mut items = Map::new();
            items.insert("type".to_string(), json!("object"));
            self.insert_members(&mut items, node.children());
            Value::Object(items)
        } else if let Some(item_type) = node.item_type() {
            json!({ "type": item_type.as_str() })
        } else {
            Value::Object(Map::new())
        }
    }

    fn insert_members(&self, target: &mut Map<String, Value>, children: &[PropertyNode]) {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for child in children {
            properties.insert(child.name().to_string(), self.compile_node(child));
            if child.required() {
                required.push(json!(child.name()));
            }
        }
        target.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            target.insert("required".to_string(), Value::Array(required));
        }
    }

    /// Rebuild a property tree from a JSON Schema document
    ///
    /// # Errors
    ///
    /// - `UnsupportedSchemaShape`: the document uses constructs outside the
    ///   supported subset; nothing is imported
    /// - `InvalidProperty`: a property's constraints, name or fixed value is invalid
    pub fn decompile(&self, schema: &Value) -> Result<PropertyTree, DecompileError> {
        let root = schema
            .as_object()
            .ok_or_else(|| DecompileError::unsupported("", "schema root must be a JSON object"))?;
        reject_unsupported_keywords(root, "")?;

        match root.get("type") {
            None => {}
            Some(Value::String(name)) if name == "object" => {}
            Some(other) => {
                return Err(DecompileError::unsupported(
                    "",
                    format!("schema root must be of type \"object\", found {}", other),
                ))
            }
        }
        for key in root.keys() {
            let allowed = matches!(key.as_str(), "type" | "properties" | "required" | "description")
                || IGNORED_ANNOTATIONS.contains(&key.as_str());
            if !allowed {
                return Err(DecompileError::unsupported(
                    "",
                    format!("keyword \"{}\" is not supported on the schema root", key),
                ));
            }
        }

        let mut tree = PropertyTree::with_id_prefix(self.options.id_prefix.clone());
        self.decompile_members(&mut tree, None, root, "")?;

        tracing::debug!("Decompiled schema into {} properties", tree.node_count());
        Ok(tree)
    }

    fn decompile_members(
        &self,
        tree: &mut PropertyTree,
        parent_id: Option<&str>,
        schema: &Map<String, Value>,
        path: &str,
    ) -> Result<(), DecompileError> {
        let properties = match schema.get("properties") {
            None => return self.check_required_names(schema, &Map::new(), path).map(|_| ()),
            Some(Value::Object(properties)) => properties,
            Some(_) => {
                return Err(DecompileError::unsupported(
                    format!("{}/properties", path),
                    "\"properties\" must be an object",
                ))
            }
        };
        let required = self.check_required_names(schema, properties, path)?;

        for (name, child) in properties {
            let child_path = format!("{}/properties/{}", path, escape_pointer(name));
            let child = child.as_object().ok_or_else(|| {
                DecompileError::unsupported(child_path.clone(), "property schema must be an object")
            })?;

            let is_required = required.iter().any(|r| r == name);
            let (input, shape) = read_property(name, child, is_required, &child_path)?;
            let node = tree
                .add_property(parent_id, input)
                .map_err(|source| DecompileError::InvalidProperty {
                    path: child_path.clone(),
                    source,
                })?;

            match shape {
                Shape::Leaf => {}
                Shape::Members => {
                    self.decompile_members(tree, Some(node.id()), child, &child_path)?
                }
                Shape::ItemMembers(items) => self.decompile_members(
                    tree,
                    Some(node.id()),
                    items,
                    &format!("{}/items", child_path),
                )?,
            }
        }

        Ok(())
    }

    /// Read the `required` list and check it only names declared properties
    fn check_required_names(
        &self,
        schema: &Map<String, Value>,
        properties: &Map<String, Value>,
        path: &str,
    ) -> Result<Vec<String>, DecompileError> {
        let required_path = format!("{}/required", path);
        let names = match schema.get("required") {
            None => return Ok(Vec::new()),
            Some(Value::Array(names)) => names,
            Some(_) => {
                return Err(DecompileError::unsupported(
                    required_path,
                    "\"required\" must be a list of property names",
                ))
            }
        };

        names
            .iter()
            .map(|name| match name {
                Value::String(name) if properties.contains_key(name) => Ok(name.clone()),
                Value::String(name) => Err(DecompileError::unsupported(
                    required_path.clone(),
                    format!("required property '{}' is not declared", name),
                )),
                other => Err(DecompileError::unsupported(
                    required_path.clone(),
                    format!("required entry {} is not a property name", other),
                )),
            })
            .collect()
    }
}

fn read_property<'a>(
    name: &str,
    schema: &'a Map<String, Value>,
    required: bool,
    path: &str,
) -> Result<(PropertyInput, Shape<'a>), DecompileError> {
    reject_unsupported_keywords(schema, path)?;
    let property_type = read_type(schema, path)?;

    let mut input = PropertyInput::new(name, property_type).with_required(required);
    let mut default = None;
    let mut marked_fixed = false;

    for (key, value) in schema {
        match key.as_str() {
            "type" | "items" => {}
            "description" => {
                let description = value.as_str().ok_or_else(|| {
                    DecompileError::unsupported(path, "\"description\" must be a string")
                })?;
                input.description = Some(description.to_string());
            }
            "default" => default = Some(value.clone()),
            READ_ONLY_KEY | FIXED_EXTENSION_KEY => {
                marked_fixed |= value.as_bool().ok_or_else(|| {
                    DecompileError::unsupported(path, format!("\"{}\" must be a boolean", key))
                })?;
            }
            "properties" | "required" => {
                if property_type != PropertyType::Object {
                    return Err(DecompileError::unsupported(
                        path,
                        format!("\"{}\" is only supported on object properties", key),
                    ));
                }
            }
            annotation if IGNORED_ANNOTATIONS.contains(&annotation) => {}
            _ => {
                input.constraints.insert(key.clone(), value.clone());
            }
        }
    }

    if marked_fixed && default.is_none() {
        return Err(DecompileError::unsupported(
            path,
            "read-only property has no \"default\" value",
        ));
    }
    input.fixed_value = default;
    input.is_fixed = marked_fixed;

    let shape = match property_type {
        PropertyType::Object => {
            if schema.contains_key("items") {
                return Err(DecompileError::unsupported(
                    path,
                    "\"items\" is only supported on array properties",
                ));
            }
            Shape::Members
        }
        PropertyType::Array => match schema.get("items") {
            None => Shape::Leaf,
            Some(Value::Object(items)) => {
                read_items(items, &mut input, &format!("{}/items", path))?
            }
            Some(Value::Array(_)) => {
                return Err(DecompileError::unsupported(
                    path,
                    "tuple \"items\" lists are not supported",
                ))
            }
            Some(_) => {
                return Err(DecompileError::unsupported(
                    path,
                    "\"items\" must be a schema object",
                ))
            }
        },
        PropertyType::String | PropertyType::Number | PropertyType::Boolean => {
            if schema.contains_key("items") {
                return Err(DecompileError::unsupported(
                    path,
                    "\"items\" is only supported on array properties",
                ));
            }
            Shape::Leaf
        }
    };

    Ok((input, shape))
}

fn read_items<'a>(
    items: &'a Map<String, Value>,
    input: &mut PropertyInput,
    path: &str,
) -> Result<Shape<'a>, DecompileError> {
    if items.is_empty() {
        return Ok(Shape::Leaf);
    }
    reject_unsupported_keywords(items, path)?;

    let item_type = read_type(items, path)?;
    let allowed: &[&str] = match item_type {
        PropertyType::Object => &["type", "properties", "required"],
        PropertyType::String | PropertyType::Number | PropertyType::Boolean => &["type"],
        PropertyType::Array => {
            return Err(DecompileError::unsupported(
                path,
                "arrays of arrays are not supported",
            ))
        }
    };
    if let Some(key) = items
        .keys()
        .find(|key| !allowed.contains(&key.as_str()) && !IGNORED_ANNOTATIONS.contains(&key.as_str()))
    {
        return Err(DecompileError::unsupported(
            path,
            format!("keyword \"{}\" is not supported in {} item schemas", key, item_type),
        ));
    }

    if item_type == PropertyType::Object {
        Ok(Shape::ItemMembers(items))
    } else {
        input.item_type = Some(item_type);
        Ok(Shape::Leaf)
    }
}

fn read_type(schema: &Map<String, Value>, path: &str) -> Result<PropertyType, DecompileError> {
    match schema.get("type") {
        None => Err(DecompileError::unsupported(path, "missing \"type\"")),
        Some(Value::String(name)) => PropertyType::parse(name).ok_or_else(|| {
            DecompileError::unsupported(path, format!("type \"{}\" is not supported", name))
        }),
        Some(Value::Array(_)) => Err(DecompileError::unsupported(
            path,
            "multiple \"type\" values are not supported",
        )),
        Some(other) => Err(DecompileError::unsupported(
            path,
            format!("invalid \"type\" value {}", other),
        )),
    }
}

fn reject_unsupported_keywords(
    schema: &Map<String, Value>,
    path: &str,
) -> Result<(), DecompileError> {
    match UNSUPPORTED_KEYWORDS.iter().find(|keyword| schema.contains_key(**keyword)) {
        Some(keyword) => Err(DecompileError::unsupported(
            path,
            format!("\"{}\" is not supported", keyword),
        )),
        None => Ok(()),
    }
}

/// Escape a property name for use in a JSON pointer
fn escape_pointer(name: &str) -> String {
    name.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConstraintError;

    fn nested_tree() -> PropertyTree {
        let mut tree = PropertyTree::new();
        tree.add_property(
            None,
            PropertyInput::new("name", PropertyType::String)
                .with_required(true)
                .with_description("Service name")
                .with_constraint("minLength", 1)
                .with_constraint("pattern", "^[a-z-]+$"),
        )
        .unwrap();
        let server = tree
            .add_property(None, PropertyInput::new("server", PropertyType::Object).with_required(true))
            .unwrap();
        tree.add_property(
            Some(server.id()),
            PropertyInput::new("port", PropertyType::Number)
                .with_required(true)
                .with_constraint("minimum", 1)
                .with_constraint("maximum", 65535),
        )
        .unwrap();
        tree.add_property(
            Some(server.id()),
            PropertyInput::new("host", PropertyType::String).with_constraint("format", "hostname"),
        )
        .unwrap();
        let routes = tree
            .add_property(
                None,
                PropertyInput::new("routes", PropertyType::Array).with_constraint("minItems", 1),
            )
            .unwrap();
        tree.add_property(
            Some(routes.id()),
            PropertyInput::new("path", PropertyType::String).with_required(true),
        )
        .unwrap();
        tree.add_property(
            None,
            PropertyInput::new("labels", PropertyType::Array).with_item_type(PropertyType::String),
        )
        .unwrap();
        tree.add_property(None, PropertyInput::new("extra", PropertyType::Array))
            .unwrap();
        tree
    }

    #[test]
    fn test_compile_single_required_number() {
        let mut tree = PropertyTree::new();
        tree.add_property(
            None,
            PropertyInput::new("age", PropertyType::Number)
                .with_required(true)
                .with_constraint("minimum", 0)
                .with_constraint("maximum", 120),
        )
        .unwrap();

        let schema = SchemaCompiler::default().compile(&tree);
        assert_eq!(
            schema,
            json!({
                "type": "object",
                "properties": {"age": {"type": "number", "minimum": 0, "maximum": 120}},
                "required": ["age"]
            })
        );
    }

    #[test]
    fn test_compile_empty_tree() {
        let schema = SchemaCompiler::default().compile(&PropertyTree::new());
        assert_eq!(schema, json!({"type": "object", "properties": {}}));
    }

    #[test]
    fn test_compile_nested_shapes() {
        let schema = SchemaCompiler::default().compile(&nested_tree());

        assert_eq!(
            schema["properties"]["server"],
            json!({
                "type": "object",
                "properties": {
                    "port": {"type": "number", "minimum": 1, "maximum": 65535},
                    "host": {"type": "string", "format": "hostname"}
                },
                "required": ["port"]
            })
        );
        assert_eq!(
            schema["properties"]["routes"],
            json!({
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "properties": {"path": {"type": "string"}},
                    "required": ["path"]
                }
            })
        );
        assert_eq!(
            schema["properties"]["labels"],
            json!({"type": "array", "items": {"type": "string"}})
        );
        assert_eq!(schema["properties"]["extra"], json!({"type": "array", "items": {}}));
        assert_eq!(schema["required"], json!(["name", "server"]));
    }

    #[test]
    fn test_compile_keeps_insertion_order() {
        let schema = SchemaCompiler::default().compile(&nested_tree());

        let root_keys: Vec<&str> = schema["properties"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(root_keys, vec!["name", "server", "routes", "labels", "extra"]);

        let name_keys: Vec<&str> = schema["properties"]["name"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(name_keys, vec!["type", "description", "minLength", "pattern"]);
    }

    #[test]
    fn test_compile_fixed_property() {
        let mut tree = PropertyTree::new();
        tree.add_property(None, PropertyInput::new("version", PropertyType::Number).fixed(42))
            .unwrap();
        tree.add_property(
            None,
            PropertyInput::new("region", PropertyType::String).with_default("eu-west-1"),
        )
        .unwrap();

        let schema = SchemaCompiler::default().compile(&tree);
        assert_eq!(
            schema["properties"]["version"],
            json!({"type": "number", "default": 42, "readOnly": true})
        );
        assert_eq!(
            schema["properties"]["region"],
            json!({"type": "string", "default": "eu-west-1"})
        );

        let compiler = SchemaCompiler::new(CompilerOptions {
            fixed_marker: FixedMarker::Extension,
            schema_dialect: Some("http://json-schema.org/draft-07/schema#".to_string()),
            ..CompilerOptions::default()
        });
        let schema = compiler.compile(&tree);
        assert_eq!(schema["$schema"], "http://json-schema.org/draft-07/schema#");
        assert_eq!(schema["properties"]["version"]["x-fixed"], true);
        assert!(schema["properties"]["version"].get("readOnly").is_none());
    }

    #[test]
    fn test_round_trip_nested_tree() {
        let compiler = SchemaCompiler::default();
        let tree = nested_tree();

        let restored = compiler.decompile(&compiler.compile(&tree)).unwrap();
        assert!(restored.same_shape(&tree));
        assert_eq!(restored.node_count(), tree.node_count());
    }

    #[test]
    fn test_round_trip_fixed_with_extension_marker() {
        let compiler = SchemaCompiler::new(CompilerOptions {
            fixed_marker: FixedMarker::Extension,
            ..CompilerOptions::default()
        });
        let mut tree = PropertyTree::new();
        tree.add_property(
            None,
            PropertyInput::new("env", PropertyType::String)
                .with_constraint("enum", json!(["dev", "prod"]))
                .fixed("prod"),
        )
        .unwrap();

        let restored = compiler.decompile(&compiler.compile(&tree)).unwrap();
        assert!(restored.same_shape(&tree));
        assert!(restored.properties()[0].is_fixed());
    }

    #[test]
    fn test_decompile_assigns_fresh_ids() {
        let compiler = SchemaCompiler::default();
        let tree = compiler
            .decompile(&json!({
                "type": "object",
                "properties": {"a": {"type": "string"}, "b": {"type": "boolean"}}
            }))
            .unwrap();
        let ids: Vec<&str> = tree.iter().map(|n| n.id()).collect();
        assert_eq!(ids, vec!["prop_1", "prop_2"]);
    }

    #[test]
    fn test_decompile_tolerates_annotations() {
        let tree = SchemaCompiler::default()
            .decompile(&json!({
                "$schema": "http://json-schema.org/draft-07/schema#",
                "title": "Config",
                "properties": {
                    "debug": {"type": "boolean", "title": "Debug mode", "examples": [true]}
                }
            }))
            .unwrap();
        assert_eq!(tree.properties()[0].name(), "debug");
    }

    #[test]
    fn test_decompile_rejects_unsupported_constructs() {
        let compiler = SchemaCompiler::default();
        let cases = vec![
            json!({"type": "object", "properties": {"a": {"$ref": "#/definitions/a"}}}),
            json!({"type": "object", "properties": {"a": {"oneOf": [{"type": "string"}]}}}),
            json!({"type": "object", "properties": {"a": {"type": ["string", "null"]}}}),
            json!({"type": "object", "properties": {"a": {"type": "integer"}}}),
            json!({"type": "object", "properties": {"a": {"description": "no type"}}}),
            json!({"type": "object", "properties": {"a": {"type": "array", "items": [{"type": "string"}]}}}),
            json!({"type": "object", "properties": {"a": {"type": "array", "items": {"type": "string", "minLength": 1}}}}),
            json!({"type": "object", "properties": {"a": {"type": "string", "properties": {}}}}),
            json!({"type": "object", "properties": {"a": {"type": "object", "items": {"type": "string"}, "properties": {}}}}),
            json!({"type": "object", "properties": {"a": {"type": "number", "readOnly": true}}}),
            json!({"type": "object", "properties": {"a": {"type": "string"}}, "required": ["b"]}),
            json!({"type": "object", "allOf": []}),
            json!({"type": "array"}),
            json!([1, 2]),
        ];

        for case in cases {
            match compiler.decompile(&case) {
                Err(err @ DecompileError::UnsupportedSchemaShape { .. }) => {
                    assert_eq!(err.category(), ErrorCategory::Structural)
                }
                other => panic!("expected UnsupportedSchemaShape for {}, got {:?}", case, other),
            }
        }
    }

    #[test]
    fn test_decompile_reports_nested_path() {
        let err = SchemaCompiler::default()
            .decompile(&json!({
                "type": "object",
                "properties": {
                    "server": {
                        "type": "object",
                        "properties": {"port": {"type": "number", "anyOf": []}}
                    }
                }
            }))
            .unwrap_err();
        assert_eq!(err.path(), "/properties/server/properties/port");
    }

    #[test]
    fn test_decompile_rejects_cross_type_constraints() {
        let err = SchemaCompiler::default()
            .decompile(&json!({
                "type": "object",
                "properties": {"count": {"type": "number", "pattern": "^1$"}}
            }))
            .unwrap_err();

        match err {
            DecompileError::InvalidProperty { path, source } => {
                assert_eq!(path, "/properties/count");
                assert_eq!(
                    source,
                    TreeOperationError::InvalidConstraints(ConstraintError::unknown_key(
                        PropertyType::Number,
                        "pattern"
                    ))
                );
            }
            other => panic!("expected InvalidProperty, got {:?}", other),
        }
    }

    #[test]
    fn test_escape_pointer() {
        assert_eq!(escape_pointer("a/b~c"), "a~1b~0c");
    }
}
