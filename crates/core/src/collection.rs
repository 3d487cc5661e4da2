//! VectorCollection trait: a named similarity-search collection.
//!
//! The service keeps two of these: `documents` (ingested chunks) and
//! `memories` (personal facts). Collections are opaque: the pipeline only
//! adds records, asks for the `k` nearest texts to a vector, counts, and
//! resets.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::VectorError;

/// A single record handed to [`VectorCollection::add`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Unique ID within the collection; adding an existing ID replaces it
    pub id: String,

    /// The stored passage
    pub text: String,

    /// Embedding of `text`
    #[serde(skip)]
    pub embedding: Vec<f32>,

    /// Free-form metadata (source label, chunk index, record type)
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl VectorRecord {
    pub fn new(id: impl Into<String>, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            embedding,
            metadata: serde_json::Map::new(),
        }
    }

    /// Attach a metadata key.
    pub fn with_meta(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// A passage returned by a similarity query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredText {
    pub id: String,
    pub text: String,

    /// Similarity to the query vector (higher = more relevant)
    pub score: f32,

    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// The core VectorCollection trait.
///
/// Implementations: in-memory (for tests and ephemeral runs), SQLite.
#[async_trait]
pub trait VectorCollection: Send + Sync {
    /// The collection name (e.g., "docs", "memories").
    fn name(&self) -> &str;

    /// Store records. All-or-nothing: on error nothing from this call is kept.
    ///
    /// Returns the stored IDs in input order.
    async fn add(&self, records: Vec<VectorRecord>) -> Result<Vec<String>, VectorError>;

    /// The `k` records nearest to `embedding`, highest similarity first.
    ///
    /// Ties keep insertion order. An empty collection yields an empty list.
    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<ScoredText>, VectorError>;

    /// Number of stored records.
    async fn count(&self) -> Result<usize, VectorError>;

    /// Remove every record.
    async fn reset(&self) -> Result<(), VectorError>;
}
