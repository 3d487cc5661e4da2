//! Embedding and chat backends for ragdock.
//!
//! All backends implement the `ragdock_core::Provider` trait.
//! The router selects the configured backend.

mod lines;
pub mod ollama;
pub mod openai_compat;
pub mod router;

pub use ollama::OllamaProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::build_from_config;
