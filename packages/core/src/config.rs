//! Editor configuration
//!
//! Loaded from a JSON file; every field has a default so partial files work:
//!
//! ```json
//! {
//!   "storageDir": "/var/lib/schema-studio",
//!   "idPrefix": "prop_",
//!   "fixedMarker": "readOnly",
//!   "schemaDialect": "http://json-schema.org/draft-07/schema#"
//! }
//! ```

use crate::models::DEFAULT_ID_PREFIX;
use crate::services::{CompilerOptions, FixedMarker};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors while loading an [`EditorConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Directory of the file-backed schema store
    ///
    /// `None` resolves to `~/.schema-studio/schemas`.
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,

    /// Prefix of generated property ids
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,

    /// Annotation emitted on fixed properties
    #[serde(default)]
    pub fixed_marker: FixedMarker,

    /// `$schema` URI put on compiled documents
    #[serde(default)]
    pub schema_dialect: Option<String>,
}

fn default_id_prefix() -> String {
    DEFAULT_ID_PREFIX.to_string()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            id_prefix: default_id_prefix(),
            fixed_marker: FixedMarker::default(),
            schema_dialect: None,
        }
    }
}

impl EditorConfig {
    /// Load a config file, falling back to defaults when it does not exist
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = match tokio::fs::read(path).await {
            Ok(bytes) => {
                serde_json::from_slice::<Self>(&bytes).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No config file at {}, using defaults", path.display());
                Self::default()
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.id_prefix.is_empty() {
            return Err("id_prefix cannot be empty".to_string());
        }

        if !self
            .id_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(format!(
                "id_prefix '{}' may only contain letters, digits, '-' and '_'",
                self.id_prefix
            ));
        }

        if matches!(&self.schema_dialect, Some(dialect) if dialect.trim().is_empty()) {
            return Err("schema_dialect cannot be empty when set".to_string());
        }

        Ok(())
    }

    /// Directory of the file-backed store
    ///
    /// Uses `storage_dir` when set, otherwise `~/.schema-studio/schemas`.
    pub fn resolve_storage_dir(&self) -> Result<PathBuf, std::io::Error> {
        if let Some(dir) = &self.storage_dir {
            return Ok(dir.clone());
        }

        let home_dir = dirs::home_dir().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Cannot determine home directory",
            )
        })?;

        Ok(home_dir.join(".schema-studio").join("schemas"))
    }

    pub fn compiler_options(&self) -> CompilerOptions {
        CompilerOptions {
            fixed_marker: self.fixed_marker,
            schema_dialect: self.schema_dialect.clone(),
            id_prefix: self.id_prefix.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.id_prefix, "prop_");
        assert_eq!(config.fixed_marker, FixedMarker::ReadOnly);
        assert!(config.storage_dir.is_none());
        assert!(config.schema_dialect.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EditorConfig::default();

        // Invalid: empty prefix
        config.id_prefix = String::new();
        assert!(config.validate().is_err());

        // Invalid: prefix with spaces
        config.id_prefix = "my prop".to_string();
        assert!(config.validate().is_err());

        // Invalid: blank dialect
        config.id_prefix = "field-".to_string();
        config.schema_dialect = Some(" ".to_string());
        assert!(config.validate().is_err());

        config.schema_dialect = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolve_storage_dir_prefers_explicit_dir() {
        let config = EditorConfig {
            storage_dir: Some(PathBuf::from("/tmp/schemas")),
            ..EditorConfig::default()
        };
        assert_eq!(
            config.resolve_storage_dir().unwrap(),
            PathBuf::from("/tmp/schemas")
        );
    }

    #[tokio::test]
    async fn test_load_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = EditorConfig::load(temp_dir.path().join("missing.json"))
            .await
            .unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[tokio::test]
    async fn test_load_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"fixedMarker": "x-fixed", "idPrefix": "f"}"#).unwrap();

        let config = EditorConfig::load(&path).await.unwrap();
        assert_eq!(config.fixed_marker, FixedMarker::Extension);
        assert_eq!(config.id_prefix, "f");
        assert!(config.storage_dir.is_none());
    }

    #[tokio::test]
    async fn test_load_rejects_invalid_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"idPrefix": ""}"#).unwrap();

        assert!(matches!(
            EditorConfig::load(&path).await,
            Err(ConfigError::Invalid(_))
        ));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            EditorConfig::load(&path).await,
            Err(ConfigError::Parse { .. })
        ));
    }
}
