//! Backend for OpenAI-style HTTP APIs.
//!
//! Covers OpenAI itself and self-hosted servers exposing the same routes
//! (vLLM, llama.cpp server, LM Studio, Ollama's `/v1` shim):
//! - `POST /embeddings` (batched)
//! - `POST /chat/completions` (JSON body, or SSE when streaming)
//! - `GET /models` for health checks

use async_trait::async_trait;
use futures::StreamExt;
use ragdock_core::error::ProviderError;
use ragdock_core::message::Message;
use ragdock_core::provider::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::lines::LineBuffer;

pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// `base_url` already includes the version prefix (e.g. `/v1`).
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    fn chat_body(request: &ProviderRequest, stream: bool) -> serde_json::Value {
        let messages: Vec<ApiMessage<'_>> = request
            .messages
            .iter()
            .map(|m| ApiMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect();

        serde_json::json!({
            "model": request.model,
            "messages": messages,
            "stream": stream,
        })
    }

    async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(provider = %self.name, status = status.as_u16(), body = %error_body, "Backend returned error");
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        debug!(provider = %self.name, model = %request.model, "Sending chat request");
        let body = Self::chat_body(&request, false);
        let response = self.post("/chat/completions", &body).await?;

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("chat response: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| ProviderError::MalformedResponse("response has no choices".into()))?;

        Ok(ProviderResponse {
            message: Message::assistant(content),
            usage: parsed.usage.map(Usage::from),
            model: parsed.model,
        })
    }

    async fn stream(
        &self,
        request: ProviderRequest,
    ) -> Result<tokio::sync::mpsc::Receiver<Result<StreamChunk, ProviderError>>, ProviderError>
    {
        debug!(provider = %self.name, model = %request.model, "Sending streaming chat request");
        let body = Self::chat_body(&request, true);
        let response = self.post("/chat/completions", &body).await?;

        let (tx, rx) = tokio::sync::mpsc::channel(64);
        let provider_name = self.name.clone();

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
                    match parse_sse_line(&line) {
                        SseLine::Skip => {}
                        SseLine::Done => {
                            let _ = tx.send(Ok(final_chunk())).await;
                            return;
                        }
                        SseLine::Chunk(chunk) => {
                            if tx.send(Ok(chunk)).await.is_err() {
                                return;
                            }
                        }
                        SseLine::Unparseable(error) => {
                            trace!(provider = %provider_name, line = %line, error = %error, "Ignoring unparseable SSE line");
                        }
                    }
                }
            }

            // Server closed without [DONE]
            if let Some(SseLine::Chunk(chunk)) = lines.finish().as_deref().map(parse_sse_line) {
                let _ = tx.send(Ok(chunk)).await;
            }
            let _ = tx.send(Ok(final_chunk())).await;
        });

        Ok(rx)
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        debug!(
            provider = %self.name,
            model = %request.model,
            count = request.inputs.len(),
            "Sending embedding request"
        );
        let body = serde_json::json!({
            "model": request.model,
            "input": request.inputs,
            "encoding_format": "float",
        });
        let response = self.post("/embeddings", &body).await?;

        let mut parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("embedding response: {e}")))?;

        // Entries may arrive out of order
        parsed.data.sort_by_key(|d| d.index);
        Ok(EmbeddingResponse {
            embeddings: parsed.data.into_iter().map(|d| d.embedding).collect(),
            model: parsed.model,
        })
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(response.status().is_success())
    }
}

fn final_chunk() -> StreamChunk {
    StreamChunk {
        done: true,
        ..StreamChunk::default()
    }
}

/// What one SSE line contributes to the answer.
#[derive(Debug)]
enum SseLine {
    Skip,
    Done,
    Chunk(StreamChunk),
    Unparseable(String),
}

fn parse_sse_line(line: &str) -> SseLine {
    // Blank separators, `:` comments and `event:`/`id:` fields
    let Some(data) = line.strip_prefix("data:").map(str::trim) else {
        return SseLine::Skip;
    };
    if data == "[DONE]" {
        return SseLine::Done;
    }

    let frame: StreamFrame = match serde_json::from_str(data) {
        Ok(frame) => frame,
        Err(e) => return SseLine::Unparseable(e.to_string()),
    };
    let content = frame
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .filter(|c| !c.is_empty());

    match (content, frame.usage) {
        (None, None) => SseLine::Skip,
        (content, usage) => SseLine::Chunk(StreamChunk {
            content,
            done: false,
            usage: usage.map(Usage::from),
        }),
    }
}

// --- Wire types (internal) ---

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    total_tokens: u32,
}

impl From<ApiUsage> for Usage {
    fn from(u: ApiUsage) -> Self {
        Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<CompletionChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingEntry>,
    #[serde(default)]
    model: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingEntry {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

#[derive(Debug, Deserialize)]
struct StreamFrame {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_trailing_slash() {
        let provider = OpenAiCompatProvider::new(
            "openai",
            "http://host:8080/v1/",
            "sk-test",
            Duration::from_secs(5),
        );
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.base_url, "http://host:8080/v1");
    }

    #[test]
    fn chat_body_shape() {
        let request = ProviderRequest::new(
            "gpt-4o-mini",
            vec![Message::system("Be helpful."), Message::user("Hello")],
        );
        let body = OpenAiCompatProvider::chat_body(&request, true);
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Hello");
    }

    #[test]
    fn content_delta_becomes_chunk() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hello"},"finish_reason":null}]}"#;
        match parse_sse_line(line) {
            SseLine::Chunk(chunk) => {
                assert_eq!(chunk.content.as_deref(), Some("Hello"));
                assert!(!chunk.done);
            }
            other => panic!("expected chunk, got {other:?}"),
        }
    }

    #[test]
    fn finish_frame_is_skipped() {
        let line = r#"data: {"choices":[{"delta":{},"finish_reason":"stop"}]}"#;
        assert!(matches!(parse_sse_line(line), SseLine::Skip));
    }

    #[test]
    fn usage_frame_carries_usage() {
        let line = r#"data: {"choices":[],"usage":{"prompt_tokens":10,"completion_tokens":5,"total_tokens":15}}"#;
        match parse_sse_line(line) {
            SseLine::Chunk(chunk) => {
                assert!(chunk.content.is_none());
                assert_eq!(chunk.usage.unwrap().total_tokens, 15);
            }
            other => panic!("expected usage chunk, got {other:?}"),
        }
    }

    #[test]
    fn done_comment_and_garbage() {
        assert!(matches!(parse_sse_line("data: [DONE]"), SseLine::Done));
        assert!(matches!(parse_sse_line("data:[DONE]"), SseLine::Done));
        assert!(matches!(parse_sse_line(": keep-alive"), SseLine::Skip));
        assert!(matches!(parse_sse_line(""), SseLine::Skip));
        assert!(matches!(
            parse_sse_line("data: {oops"),
            SseLine::Unparseable(_)
        ));
    }

    #[test]
    fn sse_lines_join_into_answer() {
        let raw = concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Grounded \"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"answer.\"}}]}\n\n",
            "data: [DONE]\n\n",
        );
        let mut lines = LineBuffer::default();
        let mut answer = String::new();
        for line in lines.push(raw.as_bytes()) {
            match parse_sse_line(&line) {
                SseLine::Chunk(chunk) => answer.push_str(&chunk.content.unwrap_or_default()),
                SseLine::Done => break,
                _ => {}
            }
        }
        assert_eq!(answer, "Grounded answer.");
    }

    #[test]
    fn embedding_entries_restore_order() {
        let data = r#"{
            "data": [
                {"embedding": [0.4, 0.5], "index": 1},
                {"embedding": [0.1, 0.2], "index": 0}
            ],
            "model": "text-embedding-3-small"
        }"#;
        let mut parsed: EmbeddingsResponse = serde_json::from_str(data).unwrap();
        parsed.data.sort_by_key(|d| d.index);
        assert_eq!(parsed.data[0].embedding, vec![0.1, 0.2]);
        assert_eq!(parsed.data[1].embedding, vec![0.4, 0.5]);
    }

    #[test]
    fn completion_without_content_is_empty() {
        let parsed: CompletionResponse = serde_json::from_str(
            r#"{"model":"m","choices":[{"message":{"role":"assistant","content":null}}]}"#,
        )
        .unwrap();
        assert!(parsed.choices[0].message.content.is_none());
        assert!(parsed.usage.is_none());
    }
}
