//! Provider trait: the abstraction over embedding and chat backends.
//!
//! A Provider knows how to turn texts into vectors and how to send a
//! role-tagged message sequence to a language model, either getting a
//! complete answer back or a stream of content fragments.
//!
//! Implementations: Ollama (native API), OpenAI-compatible endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Receiver;

use crate::error::ProviderError;
use crate::message::Message;

/// A chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "mistral:latest")
    pub model: String,

    /// The conversation messages
    pub messages: Vec<Message>,
}

impl ProviderRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
        }
    }
}

/// A complete (non-streaming) response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated message
    pub message: Message,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A single frame of a streaming response.
///
/// Frames are opaque apart from an optional content fragment; fragments are
/// concatenated in arrival order to form the answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Partial content delta
    #[serde(default)]
    pub content: Option<String>,

    /// Whether this is the final chunk
    #[serde(default)]
    pub done: bool,

    /// Usage info (typically only in the final chunk)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// An embedding request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    /// The model to use for embeddings (e.g., "nomic-embed-text").
    pub model: String,

    /// The texts to embed.
    pub inputs: Vec<String>,
}

/// An embedding response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    /// The embedding vectors, one per input text.
    pub embeddings: Vec<Vec<f32>>,

    /// Which model was used.
    pub model: String,
}

/// The core Provider trait.
///
/// The RAG pipeline calls `embed()` and `stream()` without knowing which
/// backend is configured.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "ollama").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError>;

    /// Send a request and get a stream of response chunks.
    ///
    /// Default implementation calls `complete()` and wraps the result as a single chunk.
    async fn stream(
        &self,
        request: ProviderRequest,
    ) -> Result<Receiver<Result<StreamChunk, ProviderError>>, ProviderError> {
        let response = self.complete(request).await?;
        let (tx, rx) = tokio::sync::mpsc::channel(1);
        let _ = tx
            .send(Ok(StreamChunk {
                content: Some(response.message.content),
                done: true,
                usage: response.usage,
            }))
            .await;
        Ok(rx)
    }

    /// Generate embeddings for the given texts.
    ///
    /// Default implementation returns an error indicating embeddings aren't supported.
    async fn embed(&self, _request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        Err(ProviderError::NotConfigured(format!(
            "Provider '{}' does not support embeddings",
            self.name()
        )))
    }

    /// Health check: can we reach the provider?
    async fn health_check(&self) -> Result<bool, ProviderError> {
        Ok(true)
    }
}

/// Drain a response stream into the final answer text.
///
/// Content fragments are concatenated in arrival order and the result is
/// trimmed. Reading stops at the first `done` frame or when the sender
/// closes; the first transport error aborts the whole answer.
pub async fn collect_answer(
    mut rx: Receiver<Result<StreamChunk, ProviderError>>,
) -> Result<String, ProviderError> {
    let mut answer = String::new();
    while let Some(chunk) = rx.recv().await {
        let chunk = chunk?;
        if let Some(content) = chunk.content {
            answer.push_str(&content);
        }
        if chunk.done {
            break;
        }
    }
    Ok(answer.trim().to_string())
}
