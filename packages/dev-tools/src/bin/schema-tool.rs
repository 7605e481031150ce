//! Schema Store Tool
//!
//! Inspect and maintain the file-backed schema store from the command line.
//!
//! # Usage
//!
//! ```bash
//! schema-tool list
//! schema-tool show <id>          # compiled schema as stored
//! schema-tool example <id>       # sample instance of the schema
//! schema-tool import <id> <file> # bare schema or {metadata, schema} envelope
//! schema-tool delete <id>
//! ```
//!
//! # Environment Variables
//!
//! - `SCHEMA_STUDIO_CONFIG`: editor config file (default: `schema-studio.json`)
//! - `SCHEMA_STUDIO_DIR`: store directory, overrides `storageDir` from the config
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")

use anyhow::Context;
use clap::{Parser, Subcommand};
use schema_studio_core::config::EditorConfig;
use schema_studio_core::db::{FileSchemaStore, SchemaStore};
use schema_studio_core::services::SchemaEditorService;
use serde_json::Value;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

/// Inspect and maintain the file-backed schema store
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List stored schemas, most recently updated first
    List,
    /// Print a compiled schema as stored
    Show {
        /// Schema id
        id: String,
    },
    /// Print a sample instance of a schema
    Example {
        /// Schema id
        id: String,
    },
    /// Import a bare schema or a {metadata, schema} envelope
    Import {
        /// Id to store the schema under
        id: String,
        /// JSON file to read
        file: PathBuf,
    },
    /// Remove a stored schema
    Delete {
        /// Schema id
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = env::var("SCHEMA_STUDIO_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("schema-studio.json"));
    let mut config = EditorConfig::load(&config_path)
        .await
        .with_context(|| format!("loading {}", config_path.display()))?;
    if let Ok(dir) = env::var("SCHEMA_STUDIO_DIR") {
        config.storage_dir = Some(PathBuf::from(dir));
    }

    let storage_dir = config.resolve_storage_dir()?;
    tracing::debug!("Using schema store at {}", storage_dir.display());
    let store: Arc<dyn SchemaStore> = Arc::new(FileSchemaStore::open(storage_dir).await?);
    let service = SchemaEditorService::new(store.clone(), &config)?;

    match cli.command {
        Command::List => {
            let summaries = service.list().await?;
            if summaries.is_empty() {
                println!("No schemas stored");
            }
            for summary in summaries {
                println!(
                    "{}\t{}\t{}\t{}",
                    summary.id,
                    summary.name,
                    summary.updated_at.to_rfc3339(),
                    summary.description
                );
            }
        }
        Command::Show { id } => {
            let document = store.get(&id).await?;
            println!("{}", serde_json::to_string_pretty(&document.into_envelope())?);
        }
        Command::Example { id } => {
            let session = service.open(&id).await?;
            println!("{}", serde_json::to_string_pretty(&service.preview(&session))?);
        }
        Command::Import { id, file } => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let document: Value = serde_json::from_slice(&bytes)
                .with_context(|| format!("parsing {}", file.display()))?;
            let summary = service.import(&id, document).await?;
            tracing::info!("Imported '{}' as schema '{}'", file.display(), summary.id);
        }
        Command::Delete { id } => {
            service.delete(&id).await?;
            tracing::info!("Deleted schema '{}'", id);
        }
    }

    Ok(())
}
