//! File-backed [`SchemaStore`]
//!
//! # Layout
//!
//! ```text
//! <root>/
//!   schema-registry.json     id -> summary (name, description, timestamps)
//!   <id>/schema.json         compiled schema, pretty printed
//! ```
//!
//! The registry is loaded once on [`FileSchemaStore::open`] and cached; every
//! write rewrites it. Writes go through a temporary file and a rename so an
//! interrupted save never leaves a truncated registry behind. The cache only
//! changes after the registry file has been written, so a failed write leaves
//! it matching the disk.

use crate::db::schema_store::{effective_name, sort_summaries, validate_schema_id};
use crate::db::{SchemaStore, StoreError};
use crate::models::{SchemaDocument, SchemaMetadata, SchemaSummary};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

const REGISTRY_FILE: &str = "schema-registry.json";
const SCHEMA_FILE: &str = "schema.json";

type Registry = BTreeMap<String, SchemaSummary>;

#[derive(Debug)]
pub struct FileSchemaStore {
    root: PathBuf,
    registry: RwLock<Registry>,
}

impl FileSchemaStore {
    /// Open (or create) a store rooted at `root`
    ///
    /// Creates the directory and an empty registry when they do not exist yet.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| StoreError::io(&root, e))?;

        let registry_path = root.join(REGISTRY_FILE);
        let registry = match fs::read(&registry_path).await {
            Ok(bytes) => serde_json::from_slice::<Registry>(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let registry = Registry::new();
                write_json(&registry_path, &serde_json::to_vec_pretty(&registry)?).await?;
                registry
            }
            Err(e) => return Err(StoreError::io(registry_path, e)),
        };

        tracing::info!(
            "Opened schema store at {} ({} schemas)",
            root.display(),
            registry.len()
        );

        Ok(Self {
            root,
            registry: RwLock::new(registry),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn schema_dir(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    async fn persist_registry(&self, registry: &Registry) -> Result<(), StoreError> {
        write_json(
            &self.root.join(REGISTRY_FILE),
            &serde_json::to_vec_pretty(registry)?,
        )
        .await
    }
}

async fn write_json(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes)
        .await
        .map_err(|e| StoreError::io(&tmp, e))?;
    fs::rename(&tmp, path)
        .await
        .map_err(|e| StoreError::io(path, e))
}

#[async_trait]
impl SchemaStore for FileSchemaStore {
    async fn save(
        &self,
        id: &str,
        name: &str,
        description: &str,
        schema: Value,
    ) -> Result<SchemaSummary, StoreError> {
        validate_schema_id(id)?;
        let bytes = serde_json::to_vec_pretty(&schema)?;

        let mut registry = self.registry.write().await;

        let dir = self.schema_dir(id);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::io(&dir, e))?;
        write_json(&dir.join(SCHEMA_FILE), &bytes).await?;

        let now = Utc::now();
        let summary = SchemaSummary {
            id: id.to_string(),
            name: effective_name(id, name),
            description: description.to_string(),
            created_at: registry.get(id).map_or(now, |existing| existing.created_at),
            updated_at: now,
        };
        let mut updated = registry.clone();
        updated.insert(id.to_string(), summary.clone());
        self.persist_registry(&updated).await?;
        *registry = updated;

        tracing::info!("Saved schema '{}' to {}", id, dir.display());
        Ok(summary)
    }

    async fn get(&self, id: &str) -> Result<SchemaDocument, StoreError> {
        let registry = self.registry.read().await;
        let summary = registry.get(id).ok_or_else(|| StoreError::not_found(id))?;

        let path = self.schema_dir(id).join(SCHEMA_FILE);
        let bytes = fs::read(&path)
            .await
            .map_err(|e| StoreError::io(&path, e))?;
        let schema: Value = serde_json::from_slice(&bytes)?;

        Ok(SchemaDocument {
            id: summary.id.clone(),
            metadata: SchemaMetadata {
                name: summary.name.clone(),
                description: summary.description.clone(),
            },
            schema,
            created_at: summary.created_at,
            updated_at: summary.updated_at,
        })
    }

    async fn list(&self) -> Result<Vec<SchemaSummary>, StoreError> {
        let mut summaries: Vec<SchemaSummary> =
            self.registry.read().await.values().cloned().collect();
        sort_summaries(&mut summaries);
        Ok(summaries)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut registry = self.registry.write().await;
        if !registry.contains_key(id) {
            return Err(StoreError::not_found(id));
        }

        let dir = self.schema_dir(id);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("Schema directory {} was already gone", dir.display());
            }
            Err(e) => return Err(StoreError::io(dir, e)),
        }

        let mut updated = registry.clone();
        updated.remove(id);
        self.persist_registry(&updated).await?;
        *registry = updated;

        tracing::info!("Deleted schema '{}'", id);
        Ok(())
    }
}
