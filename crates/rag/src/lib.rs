//! The ragdock pipeline.
//!
//! Ingestion runs **extract → normalize → chunk → embed → store**; answering
//! runs **embed query → retrieve documents and memories → assemble prompt →
//! chat**. [`RagService`] owns every stage and the session history store.

pub mod chat;
pub mod chunker;
pub mod embedder;
pub mod extract;
pub mod prompt;
pub mod retriever;
pub mod service;
pub mod session;
pub mod text;

pub use chat::ChatClient;
pub use chunker::{Chunk, Chunker, chunk_text};
pub use embedder::Embedder;
pub use extract::{DocumentFormat, extract_text};
pub use prompt::PromptAssembler;
pub use retriever::{ContextBundle, ContextRetriever};
pub use service::{Answer, FileIngestReport, IngestReport, RagService, ResetReport, Stats};
pub use session::{SessionStore, Turn};
pub use text::{normalize, split_paragraphs};

#[cfg(test)]
pub(crate) mod test_helpers;
