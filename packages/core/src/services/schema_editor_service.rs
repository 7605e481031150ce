//! Schema Editing Service
//!
//! Ties the property tree, the compiler and a [`SchemaStore`] together. A
//! session owns its tree outright; the store only ever sees compiled
//! documents, so every load goes through `decompile` and every save through
//! `compile`.
//!
//! ## Example Usage
//!
//! ```rust
//! # use schema_studio_core::config::EditorConfig;
//! # use schema_studio_core::db::{InMemorySchemaStore, SchemaStore};
//! # use schema_studio_core::models::{PropertyInput, PropertyType};
//! # use schema_studio_core::services::SchemaEditorService;
//! # use std::sync::Arc;
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store: Arc<dyn SchemaStore> = Arc::new(InMemorySchemaStore::new());
//! let service = SchemaEditorService::new(store, &EditorConfig::default())?;
//!
//! let mut session = service.new_session(Some("service"))?;
//! session.name = "Service".to_string();
//! session
//!     .tree
//!     .add_property(None, PropertyInput::new("port", PropertyType::Number).with_required(true))?;
//! service.save(&session).await?;
//!
//! let reopened = service.open("service").await?;
//! assert!(reopened.tree.same_shape(&session.tree));
//! # Ok(())
//! # }
//! ```

use crate::config::EditorConfig;
use crate::db::{validate_schema_id, SchemaStore};
use crate::models::{PropertyTree, SchemaEnvelope, SchemaMetadata, SchemaSummary};
use crate::services::{
    fixed_field_violations, generate_example, FixedFieldViolation, SchemaCompiler,
    SchemaServiceError,
};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// A schema being edited: its identity plus the tree it is built from
#[derive(Debug, Clone)]
pub struct EditingSession {
    pub schema_id: String,
    pub name: String,
    pub description: String,
    pub tree: PropertyTree,
}

/// Service for editing stored schemas through property trees
pub struct SchemaEditorService {
    store: Arc<dyn SchemaStore>,
    compiler: SchemaCompiler,
}

impl SchemaEditorService {
    /// Create a new SchemaEditorService
    ///
    /// # Errors
    ///
    /// - `InvalidConfig`: `config` fails [`EditorConfig::validate`]
    pub fn new(
        store: Arc<dyn SchemaStore>,
        config: &EditorConfig,
    ) -> Result<Self, SchemaServiceError> {
        config.validate().map_err(SchemaServiceError::InvalidConfig)?;
        Ok(Self {
            store,
            compiler: SchemaCompiler::new(config.compiler_options()),
        })
    }

    pub fn compiler(&self) -> &SchemaCompiler {
        &self.compiler
    }

    /// Start editing a new, empty schema
    ///
    /// Without an id a `schema-<uuid>` id is generated. Nothing is stored
    /// until [`save`](Self::save).
    pub fn new_session(&self, schema_id: Option<&str>) -> Result<EditingSession, SchemaServiceError> {
        let schema_id = match schema_id {
            Some(id) => id.to_string(),
            None => format!("schema-{}", Uuid::new_v4().simple()),
        };
        validate_schema_id(&schema_id)?;

        Ok(EditingSession {
            schema_id,
            name: String::new(),
            description: String::new(),
            tree: PropertyTree::with_id_prefix(self.compiler.options().id_prefix.clone()),
        })
    }

    /// Load a stored schema into a new session
    ///
    /// # Errors
    ///
    /// - `Store(NotFound)`: nothing stored under `schema_id`
    /// - `Decompile`: the stored schema uses unsupported constructs
    pub async fn open(&self, schema_id: &str) -> Result<EditingSession, SchemaServiceError> {
        let document = self.store.get(schema_id).await?;
        let tree = self.compiler.decompile(&document.schema).map_err(|e| {
            tracing::warn!("Stored schema '{}' cannot be edited: {}", schema_id, e);
            e
        })?;

        tracing::debug!(
            "Opened schema '{}' with {} properties",
            schema_id,
            tree.node_count()
        );

        Ok(EditingSession {
            schema_id: document.id,
            name: document.metadata.name,
            description: document.metadata.description,
            tree,
        })
    }

    /// Compile the session's tree and store it
    pub async fn save(&self, session: &EditingSession) -> Result<SchemaSummary, SchemaServiceError> {
        let schema = self.compile(session);
        let summary = self
            .store
            .save(
                &session.schema_id,
                &session.name,
                &session.description,
                schema,
            )
            .await?;
        Ok(summary)
    }

    /// Store an external document after checking it can be edited
    ///
    /// `document` is either a bare schema or a `{metadata, schema}` envelope.
    /// The schema is stored in its compiled form, so unknown annotations such
    /// as `title` are dropped.
    pub async fn import(
        &self,
        schema_id: &str,
        document: Value,
    ) -> Result<SchemaSummary, SchemaServiceError> {
        validate_schema_id(schema_id)?;

        let envelope = if is_envelope(&document) {
            serde_json::from_value::<SchemaEnvelope>(document)
                .map_err(|e| SchemaServiceError::invalid_document(e.to_string()))?
        } else {
            SchemaEnvelope {
                metadata: SchemaMetadata::default(),
                schema: document,
            }
        };

        let tree = self.compiler.decompile(&envelope.schema).map_err(|e| {
            tracing::warn!("Rejected import of schema '{}': {}", schema_id, e);
            e
        })?;
        let summary = self
            .store
            .save(
                schema_id,
                &envelope.metadata.name,
                &envelope.metadata.description,
                self.compiler.compile(&tree),
            )
            .await?;
        Ok(summary)
    }

    pub async fn list(&self) -> Result<Vec<SchemaSummary>, SchemaServiceError> {
        Ok(self.store.list().await?)
    }

    pub async fn delete(&self, schema_id: &str) -> Result<(), SchemaServiceError> {
        Ok(self.store.delete(schema_id).await?)
    }

    /// JSON Schema of the session's current tree
    pub fn compile(&self, session: &EditingSession) -> Value {
        self.compiler.compile(&session.tree)
    }

    /// Sample instance of the session's current tree
    pub fn preview(&self, session: &EditingSession) -> Value {
        generate_example(&session.tree)
    }

    /// Fixed properties whose value in `config` differs from the locked value
    pub fn check_configuration(
        &self,
        session: &EditingSession,
        config: &Value,
    ) -> Vec<FixedFieldViolation> {
        fixed_field_violations(&session.tree, config)
    }
}

/// `{ "schema": {...}, "metadata"?: {...} }` with nothing else at the top level
fn is_envelope(document: &Value) -> bool {
    match document.as_object() {
        Some(object) => {
            matches!(object.get("schema"), Some(Value::Object(_)))
                && object.keys().all(|key| key == "schema" || key == "metadata")
        }
        None => false,
    }
}
