//! Context retrieval over the documents and memories collections.

use std::sync::Arc;

use ragdock_core::error::Result;
use ragdock_core::{ScoredText, VectorCollection};
use serde::Serialize;
use tracing::debug;

use crate::embedder::Embedder;

/// Passages retrieved for one question: documents first, then memories.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContextBundle {
    pub documents: Vec<ScoredText>,
    pub memories: Vec<ScoredText>,
}

impl ContextBundle {
    /// Passage texts in prompt order (documents, then memories).
    pub fn passages(&self) -> Vec<String> {
        self.documents
            .iter()
            .chain(self.memories.iter())
            .map(|hit| hit.text.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len() + self.memories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct ContextRetriever {
    embedder: Embedder,
    documents: Arc<dyn VectorCollection>,
    memories: Arc<dyn VectorCollection>,
    memory_cap: usize,
}

impl ContextRetriever {
    pub fn new(
        embedder: Embedder,
        documents: Arc<dyn VectorCollection>,
        memories: Arc<dyn VectorCollection>,
        memory_cap: usize,
    ) -> Self {
        Self {
            embedder,
            documents,
            memories,
            memory_cap,
        }
    }

    /// Retrieve up to `top_k` documents and `min(memory_cap, top_k)` memories.
    ///
    /// The query is embedded once; the two collections are searched one after
    /// the other. Results are not deduplicated. `top_k == 0` returns an empty
    /// bundle without calling any backend.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<ContextBundle> {
        if top_k == 0 {
            return Ok(ContextBundle::default());
        }

        let query_vector = self.embedder.embed_one(query).await?;
        let documents = self.documents.query(&query_vector, top_k).await?;
        let memories = self
            .memories
            .query(&query_vector, self.memory_cap.min(top_k))
            .await?;

        debug!(
            top_k,
            documents = documents.len(),
            memories = memories.len(),
            "Context retrieved"
        );
        Ok(ContextBundle {
            documents,
            memories,
        })
    }
}
