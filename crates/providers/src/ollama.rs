//! Native Ollama backend.
//!
//! Speaks Ollama's own HTTP API rather than its OpenAI shim:
//! - `POST /api/embeddings` (one request per text)
//! - `POST /api/chat` (single JSON body, or NDJSON when streaming)
//! - `GET /api/tags` for health checks

use async_trait::async_trait;
use futures::StreamExt;
use ragdock_core::error::ProviderError;
use ragdock_core::message::Message;
use ragdock_core::provider::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::lines::LineBuffer;

/// A provider backed by a local or remote Ollama server.
pub struct OllamaProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a provider for the server at `base_url` (e.g. `http://localhost:11434`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn chat_body(request: &ProviderRequest, stream: bool) -> serde_json::Value {
        serde_json::json!({
            "model": request.model,
            "messages": to_api_messages(&request.messages),
            "stream": stream,
        })
    }

    async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
        model: &str,
    ) -> Result<reqwest::Response, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(ProviderError::ModelNotFound(model.to_string()));
        }
        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, path, "Ollama returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }
        Ok(response)
    }
}

fn map_transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}

fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage<'_>> {
    messages
        .iter()
        .map(|m| ApiMessage {
            role: m.role.as_str(),
            content: &m.content,
        })
        .collect()
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        debug!(model = %request.model, "Sending Ollama chat request");
        let body = Self::chat_body(&request, false);
        let response = self.post_json("/api/chat", &body, &request.model).await?;

        let line: ChatLine = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("chat response: {e}")))?;

        let content = line.message.and_then(|m| m.content).unwrap_or_default();
        Ok(ProviderResponse {
            message: Message::assistant(content),
            usage: None,
            model: line.model.unwrap_or(request.model),
        })
    }

    async fn stream(
        &self,
        request: ProviderRequest,
    ) -> Result<tokio::sync::mpsc::Receiver<Result<StreamChunk, ProviderError>>, ProviderError>
    {
        debug!(model = %request.model, "Sending Ollama streaming chat request");
        let body = Self::chat_body(&request, true);
        let response = self.post_json("/api/chat", &body, &request.model).await?;

        let (tx, rx) = tokio::sync::mpsc::channel(64);

        // Read NDJSON frames off the byte stream
        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut lines = LineBuffer::default();

            while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx
                            .send(Err(ProviderError::StreamInterrupted(e.to_string())))
                            .await;
                        return;
                    }
                };

                for line in lines.push(&bytes) {
                    if let Some(chunk) = parse_chat_line(&line) {
                        let done = chunk.done;
                        if tx.send(Ok(chunk)).await.is_err() || done {
                            return;
                        }
                    }
                }
            }

            // Trailing frame without a newline
            if let Some(chunk) = lines.finish().as_deref().and_then(parse_chat_line) {
                let _ = tx.send(Ok(chunk)).await;
            }
            let _ = tx
                .send(Ok(StreamChunk {
                    done: true,
                    ..StreamChunk::default()
                }))
                .await;
        });

        Ok(rx)
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        debug!(
            model = %request.model,
            count = request.inputs.len(),
            "Sending Ollama embedding requests"
        );

        let mut embeddings = Vec::with_capacity(request.inputs.len());
        for input in &request.inputs {
            let body = serde_json::json!({
                "model": request.model,
                "prompt": input,
            });
            let response = self
                .post_json("/api/embeddings", &body, &request.model)
                .await?;
            let parsed: EmbeddingApiResponse = response.json().await.map_err(|e| {
                ProviderError::MalformedResponse(format!("embedding response: {e}"))
            })?;
            if parsed.embedding.is_empty() {
                return Err(ProviderError::MalformedResponse(
                    "embedding response contained an empty vector".into(),
                ));
            }
            embeddings.push(parsed.embedding);
        }

        Ok(EmbeddingResponse {
            embeddings,
            model: request.model,
        })
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_transport_error)?;
        Ok(response.status().is_success())
    }
}

/// Parse one NDJSON line of a streaming chat response.
///
/// Returns `None` for blank or malformed lines, which are skipped.
pub fn parse_chat_line(line: &str) -> Option<StreamChunk> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str::<ChatLine>(line) {
        Ok(parsed) => Some(StreamChunk {
            content: parsed.message.and_then(|m| m.content),
            done: parsed.done,
            usage: None,
        }),
        Err(e) => {
            trace!(line = %line, error = %e, "Ignoring unparseable chat line");
            None
        }
    }
}

// --- Ollama API types (internal) ---

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatLine {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    message: Option<ChatLineMessage>,
    #[serde(default)]
    done: bool,
}

#[derive(Debug, Deserialize)]
struct ChatLineMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingApiResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}
