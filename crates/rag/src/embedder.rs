//! Embedding gateway: texts in, one vector per text out.

use std::sync::Arc;

use ragdock_core::error::{Error, ProviderError, Result};
use ragdock_core::provider::{EmbeddingRequest, Provider};
use tracing::debug;

/// Embeds text through the configured backend and embedding model.
#[derive(Clone)]
pub struct Embedder {
    provider: Arc<dyn Provider>,
    model: String,
}

impl Embedder {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Embed `texts`, preserving order.
    ///
    /// An empty input returns an empty list without calling the backend.
    /// Any backend failure, or a vector count that does not match the input
    /// count, is an `EmbeddingService` error.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(model = %self.model, count = texts.len(), "Embedding texts");
        let response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.model.clone(),
                inputs: texts.to_vec(),
            })
            .await
            .map_err(Error::EmbeddingService)?;

        if response.embeddings.len() != texts.len() {
            return Err(Error::EmbeddingService(ProviderError::MalformedResponse(
                format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    response.embeddings.len()
                ),
            )));
        }
        Ok(response.embeddings)
    }

    /// Embed a single text.
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| {
            Error::EmbeddingService(ProviderError::MalformedResponse(
                "no embedding returned".into(),
            ))
        })
    }
}
