//! # ragdock Core
//!
//! Domain types, traits, and error definitions for the ragdock retrieval
//! service. This crate has **no framework dependencies**: it defines the
//! domain model that the adapters and the pipeline implement against.
//!
//! ## Seams
//!
//! The two external systems the service talks to are defined as traits here:
//! - [`Provider`]: the embedding/chat model backend
//! - [`VectorCollection`]: a named similarity-search collection
//!
//! Implementations live in `ragdock-providers` and `ragdock-store`.

pub mod collection;
pub mod error;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use collection::{ScoredText, VectorCollection, VectorRecord};
pub use error::{Error, ProviderError, Result, VectorError};
pub use message::{Message, Role};
pub use provider::{
    EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse, StreamChunk,
    Usage, collect_answer,
};
