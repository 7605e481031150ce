//! In-memory [`SchemaStore`]
//!
//! Keeps documents in a `RwLock<HashMap>`. Used by tests and by callers that
//! do not need schemas to outlive the process.

use crate::db::schema_store::{effective_name, sort_summaries, validate_schema_id};
use crate::db::{SchemaStore, StoreError};
use crate::models::{SchemaDocument, SchemaMetadata, SchemaSummary};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemorySchemaStore {
    documents: RwLock<HashMap<String, SchemaDocument>>,
}

impl InMemorySchemaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SchemaStore for InMemorySchemaStore {
    async fn save(
        &self,
        id: &str,
        name: &str,
        description: &str,
        schema: Value,
    ) -> Result<SchemaSummary, StoreError> {
        validate_schema_id(id)?;

        let mut documents = self.documents.write().await;
        let now = Utc::now();
        let created_at = documents.get(id).map_or(now, |existing| existing.created_at);
        let document = SchemaDocument {
            id: id.to_string(),
            metadata: SchemaMetadata {
                name: effective_name(id, name),
                description: description.to_string(),
            },
            schema,
            created_at,
            updated_at: now,
        };
        let summary = document.summary();
        documents.insert(id.to_string(), document);

        tracing::info!("Saved schema '{}' in memory", id);
        Ok(summary)
    }

    async fn get(&self, id: &str) -> Result<SchemaDocument, StoreError> {
        self.documents
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id))
    }

    async fn list(&self) -> Result<Vec<SchemaSummary>, StoreError> {
        let mut summaries: Vec<SchemaSummary> = self
            .documents
            .read()
            .await
            .values()
            .map(SchemaDocument::summary)
            .collect();
        sort_summaries(&mut summaries);
        Ok(summaries)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.documents
            .write()
            .await
            .remove(id)
            .ok_or_else(|| StoreError::not_found(id))?;

        tracing::info!("Deleted schema '{}' from memory", id);
        Ok(())
    }
}
