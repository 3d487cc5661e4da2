//! In-memory collection: useful for testing and ephemeral runs.

use async_trait::async_trait;
use ragdock_core::error::VectorError;
use ragdock_core::{ScoredText, VectorCollection, VectorRecord};
use tokio::sync::RwLock;

use crate::vector::{self, Candidate};

/// A collection that keeps its records in a Vec, in insertion order.
pub struct InMemoryCollection {
    name: String,
    records: RwLock<Vec<VectorRecord>>,
}

impl InMemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VectorCollection for InMemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn add(&self, records: Vec<VectorRecord>) -> Result<Vec<String>, VectorError> {
        let dim = vector::batch_dimension(records.iter().map(|r| r.embedding.as_slice()))
            .map_err(VectorError::Storage)?;

        // Validate everything before touching the stored records
        let mut stored = self.records.write().await;
        if let (Some(dim), Some(existing)) = (dim, stored.first()) {
            if existing.embedding.len() != dim {
                return Err(VectorError::Storage(format!(
                    "collection '{}' holds {}-dimensional embeddings, got {dim}",
                    self.name,
                    existing.embedding.len()
                )));
            }
        }

        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            ids.push(record.id.clone());
            match stored.iter_mut().find(|r| r.id == record.id) {
                Some(slot) => *slot = record,
                None => stored.push(record),
            }
        }
        Ok(ids)
    }

    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<ScoredText>, VectorError> {
        let stored = self.records.read().await;
        let candidates = stored
            .iter()
            .map(|r| Candidate {
                hit: ScoredText {
                    id: r.id.clone(),
                    text: r.text.clone(),
                    score: 0.0,
                    metadata: r.metadata.clone(),
                },
                embedding: r.embedding.clone(),
            })
            .collect();
        Ok(vector::rank_by_similarity(candidates, embedding, k))
    }

    async fn count(&self) -> Result<usize, VectorError> {
        Ok(self.records.read().await.len())
    }

    async fn reset(&self) -> Result<(), VectorError> {
        self.records.write().await.clear();
        Ok(())
    }
}
