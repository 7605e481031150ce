//! Schema Documents
//!
//! Persisted and exchanged form of a schema. The `schema` field holds the
//! compiled JSON Schema of a property tree; `metadata` and the envelope
//! fields are passed through untouched by the compiler.
//!
//! ## Wire Format
//!
//! ```json
//! {
//!   "metadata": { "name": "Service config", "description": "Settings of the API service" },
//!   "schema": {
//!     "type": "object",
//!     "properties": { "port": { "type": "number", "minimum": 1 } },
//!     "required": ["port"]
//!   }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Display metadata of a schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaMetadata {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,
}

/// Exchange envelope: metadata plus the compiled schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaEnvelope {
    #[serde(default)]
    pub metadata: SchemaMetadata,

    pub schema: Value,
}

/// A stored schema with its timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    pub id: String,
    pub metadata: SchemaMetadata,
    pub schema: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SchemaDocument {
    pub fn summary(&self) -> SchemaSummary {
        SchemaSummary {
            id: self.id.clone(),
            name: self.metadata.name.clone(),
            description: self.metadata.description.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn into_envelope(self) -> SchemaEnvelope {
        SchemaEnvelope {
            metadata: self.metadata,
            schema: self.schema,
        }
    }
}

/// Listing entry of a stored schema (registry record)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
