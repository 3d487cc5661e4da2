//! RagService: the façade every surface (HTTP, CLI) talks to.
//!
//! Owns the chunker, the embedding and chat gateways, both collections and
//! the session history store. All writes are all-or-nothing: every text is
//! embedded before anything is stored, and chat history is appended only
//! after an answer came back.

use std::sync::Arc;

use tokio::sync::Mutex;

use ragdock_config::AppConfig;
use ragdock_core::error::{Error, Result};
use ragdock_core::{Provider, VectorRecord};
use ragdock_store::Collections;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chat::ChatClient;
use crate::chunker::{Chunk, Chunker};
use crate::embedder::Embedder;
use crate::extract;
use crate::prompt::PromptAssembler;
use crate::retriever::ContextRetriever;
use crate::session::{SessionStore, Turn};

/// File name used when an upload carries none.
pub const DEFAULT_UPLOAD_NAME: &str = "upload";

// ── Results ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub added: usize,
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileIngestReport {
    pub file: String,
    pub chunks: usize,
    pub ids: Vec<String>,
}

/// A grounded answer and the passages it was grounded on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub context: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub docs_count: usize,
    pub mem_count: usize,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetReport {
    pub status: String,
    pub path: String,
}

// ── Service ───────────────────────────────────────────────────────────────

pub struct RagService {
    collections: Collections,
    chunker: Chunker,
    embedder: Embedder,
    retriever: ContextRetriever,
    chat: ChatClient,
    prompts: PromptAssembler,
    sessions: Arc<SessionStore>,
    /// Serializes id allocation with the insert that uses it
    write_lock: Mutex<()>,
    default_top_k: usize,
    history_turns: usize,
}

impl RagService {
    /// Wire the pipeline from configuration.
    ///
    /// Fails with `InvalidConfiguration` when the chunking policy is unusable.
    pub fn new(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        collections: Collections,
        sessions: Arc<SessionStore>,
    ) -> Result<Self> {
        let chunker = Chunker::from_config(&config.chunking)?;
        let embedder = Embedder::new(provider.clone(), &config.backend.embed_model);
        let retriever = ContextRetriever::new(
            embedder.clone(),
            collections.documents.clone(),
            collections.memories.clone(),
            config.retrieval.memory_cap,
        );

        Ok(Self {
            chunker,
            embedder,
            retriever,
            chat: ChatClient::new(provider, &config.backend.chat_model),
            prompts: PromptAssembler::new(config.retrieval.history_order),
            sessions,
            write_lock: Mutex::new(()),
            default_top_k: config.retrieval.top_k,
            history_turns: config.retrieval.history_turns,
            collections,
        })
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// A requested `top_k`, or the configured default when absent or not positive.
    pub fn resolve_top_k(&self, requested: Option<i64>) -> usize {
        match requested {
            Some(k) if k > 0 => usize::try_from(k).unwrap_or(usize::MAX),
            _ => self.default_top_k,
        }
    }

    /// Chunk, embed and store raw text under `source`.
    pub async fn ingest_text(&self, text: &str, source: &str) -> Result<IngestReport> {
        let chunks = self.chunker.chunk_document(text, source);
        let ids = self.store_chunks(chunks).await?;
        info!(source, added = ids.len(), "Ingested text");
        Ok(IngestReport {
            added: ids.len(),
            ids,
        })
    }

    /// Extract text from an uploaded file, then ingest it under the file name.
    pub async fn ingest_file(&self, filename: Option<&str>, bytes: Vec<u8>) -> Result<FileIngestReport> {
        let name = filename
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_UPLOAD_NAME)
            .to_string();

        let text = extract::extract_text(&name, bytes).await?;
        let chunks = self.chunker.chunk_document(&text, &name);
        let chunk_count = chunks.len();
        let ids = self.store_chunks(chunks).await?;

        info!(file = %name, chunks = chunk_count, "Ingested file");
        Ok(FileIngestReport {
            file: name,
            chunks: chunk_count,
            ids,
        })
    }

    async fn store_chunks(&self, chunks: Vec<Chunk>) -> Result<Vec<String>> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;

        // Ids derive from the current count; allocate and insert as one step
        let _guard = self.write_lock.lock().await;
        let offset = self.collections.documents.count().await?;
        let records = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| {
                VectorRecord::new(format!("doc-{offset}-{}", chunk.index), chunk.text, vector)
                    .with_meta("source", chunk.source)
                    .with_meta("chunk_index", chunk.index)
            })
            .collect();

        Ok(self.collections.documents.add(records).await?)
    }

    /// Store a personal fact in the memories collection.
    pub async fn remember(&self, fact: &str) -> Result<Vec<String>> {
        let fact = fact.trim();
        if fact.is_empty() {
            return Err(Error::InvalidRequest("fact must not be empty".into()));
        }

        let vector = self.embedder.embed_one(fact).await?;

        let guard = self.write_lock.lock().await;
        let offset = self.collections.memories.count().await?;
        let record =
            VectorRecord::new(format!("mem-{offset}"), fact, vector).with_meta("type", "memory");

        let ids = self.collections.memories.add(vec![record]).await?;
        drop(guard);
        info!(ids = ?ids, "Stored memory");
        Ok(ids)
    }

    /// Answer a one-shot question from retrieved context.
    pub async fn query(&self, question: &str, top_k: Option<i64>) -> Result<Answer> {
        let top_k = self.resolve_top_k(top_k);
        let bundle = self.retriever.retrieve(question, top_k).await?;
        let context = bundle.passages();

        let messages = self.prompts.build_query_messages(question, &context);
        let answer = self.chat.answer(messages).await?;

        info!(top_k, passages = context.len(), "Answered query");
        Ok(Answer { answer, context })
    }

    /// Answer a chat message with retrieved context and the session's recent turns.
    pub async fn chat(&self, session_id: &str, message: &str, top_k: Option<i64>) -> Result<Answer> {
        let top_k = self.resolve_top_k(top_k);
        let history = self.sessions.recent(session_id, self.history_turns).await;

        let bundle = self.retriever.retrieve(message, top_k).await?;
        let context = bundle.passages();

        let messages = self
            .prompts
            .build_chat_messages(&history, message, &context);
        let answer = self.chat.answer(messages).await?;

        self.sessions
            .append(session_id, Turn::new(message, answer.clone()))
            .await;

        info!(session_id, history = history.len(), passages = context.len(), "Answered chat");
        Ok(Answer { answer, context })
    }

    pub async fn stats(&self) -> Result<Stats> {
        Ok(Stats {
            docs_count: self.collections.documents.count().await?,
            mem_count: self.collections.memories.count().await?,
            path: self.collections.location.clone(),
        })
    }

    /// Empty both collections and forget every session.
    pub async fn reset(&self) -> Result<ResetReport> {
        let _guard = self.write_lock.lock().await;
        self.collections.documents.reset().await?;
        self.collections.memories.reset().await?;
        self.sessions.clear().await;

        info!(path = %self.collections.location, "Store reset");
        Ok(ResetReport {
            status: "reset".into(),
            path: self.collections.location.clone(),
        })
    }

    /// Whether the embedding/chat backend answers.
    pub async fn backend_healthy(&self) -> bool {
        self.chat.healthy().await
    }
}
