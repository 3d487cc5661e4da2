//! Shared test helpers for pipeline tests.

use ragdock_core::error::ProviderError;
use ragdock_core::message::Message;
use ragdock_core::provider::{
    EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse, StreamChunk,
};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const DIM: usize = 16;

/// A mock backend with bag-of-words embeddings and scripted answers.
///
/// Texts sharing words get similar vectors, so retrieval behaves sensibly.
/// Answers are handed out in order; once the script runs out every answer
/// is `"mock answer"`.
pub struct MockProvider {
    answers: Mutex<VecDeque<String>>,
    chat_requests: Mutex<Vec<ProviderRequest>>,
    embed_calls: AtomicUsize,
    fail_embeddings: bool,
    fail_chat: bool,
    drop_last_embedding: bool,
    embed_delay: Option<Duration>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            answers: Mutex::new(VecDeque::new()),
            chat_requests: Mutex::new(Vec::new()),
            embed_calls: AtomicUsize::new(0),
            fail_embeddings: false,
            fail_chat: false,
            drop_last_embedding: false,
            embed_delay: None,
        }
    }

    pub fn with_answers(self, answers: Vec<&str>) -> Self {
        *self.answers.lock().unwrap() = answers.into_iter().map(String::from).collect();
        self
    }

    pub fn failing_embeddings(mut self) -> Self {
        self.fail_embeddings = true;
        self
    }

    pub fn failing_chat(mut self) -> Self {
        self.fail_chat = true;
        self
    }

    pub fn dropping_last_embedding(mut self) -> Self {
        self.drop_last_embedding = true;
        self
    }

    /// Every embedding call waits this long before answering.
    pub fn with_embed_delay(mut self, delay: Duration) -> Self {
        self.embed_delay = Some(delay);
        self
    }

    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    pub fn chat_requests(&self) -> Vec<ProviderRequest> {
        self.chat_requests.lock().unwrap().clone()
    }

    /// The embedding this mock produces for `text`.
    pub fn vector_for(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; DIM];
        for word in text.split_whitespace() {
            let word: String = word
                .chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect();
            if word.is_empty() {
                continue;
            }
            // FNV-1a
            let mut hash: u64 = 0xcbf29ce484222325;
            for byte in word.bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(0x100000001b3);
            }
            v[(hash % DIM as u64) as usize] += 1.0;
        }
        v
    }

    fn next_answer(&self, request: ProviderRequest) -> Result<String, ProviderError> {
        self.chat_requests.lock().unwrap().push(request);
        if self.fail_chat {
            return Err(ProviderError::ApiError {
                status_code: 500,
                message: "model crashed".into(),
            });
        }
        Ok(self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "mock answer".into()))
    }
}

#[async_trait::async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let model = request.model.clone();
        let answer = self.next_answer(request)?;
        Ok(ProviderResponse {
            message: Message::assistant(answer),
            usage: None,
            model,
        })
    }

    /// Streams the answer as two fragments followed by a done frame.
    async fn stream(
        &self,
        request: ProviderRequest,
    ) -> Result<tokio::sync::mpsc::Receiver<Result<StreamChunk, ProviderError>>, ProviderError>
    {
        let answer = self.next_answer(request)?;
        let split = answer
            .char_indices()
            .map(|(i, _)| i)
            .nth(answer.chars().count() / 2)
            .unwrap_or(answer.len());
        let (head, tail) = answer.split_at(split);

        let (tx, rx) = tokio::sync::mpsc::channel(4);
        for piece in [head, tail] {
            tx.send(Ok(StreamChunk {
                content: Some(piece.to_string()),
                ..StreamChunk::default()
            }))
            .await
            .unwrap();
        }
        tx.send(Ok(StreamChunk {
            done: true,
            ..StreamChunk::default()
        }))
        .await
        .unwrap();
        Ok(rx)
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.embed_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_embeddings {
            return Err(ProviderError::ApiError {
                status_code: 503,
                message: "embedding model unavailable".into(),
            });
        }
        let mut embeddings: Vec<Vec<f32>> =
            request.inputs.iter().map(|t| Self::vector_for(t)).collect();
        if self.drop_last_embedding {
            embeddings.pop();
        }
        Ok(EmbeddingResponse {
            embeddings,
            model: request.model,
        })
    }
}
