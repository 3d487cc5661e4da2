//! Error types for the ragdock domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each external collaborator has its own error enum; the top-level
//! [`Error`] says which pipeline stage the failure belongs to.

use thiserror::Error;

/// The top-level error type for all ragdock operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Chunker parameters violate `overlap < chunk_size`, or another
    /// configuration value is unusable at call time.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// File extension not recognized by any extractor.
    #[error("Unsupported file type: {0}")]
    UnsupportedInputFormat(String),

    /// A recognized file could not be turned into text.
    #[error("Text extraction failed for {file}: {reason}")]
    Extraction { file: String, reason: String },

    /// The caller sent something the service cannot interpret.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Embedding service error: {0}")]
    EmbeddingService(ProviderError),

    #[error("Chat service error: {0}")]
    ChatService(ProviderError),

    #[error("Vector service error: {0}")]
    VectorService(#[from] VectorError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Collaborator errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum VectorError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}
