//! Configuration loading, validation, and management for ragdock.
//!
//! Loads configuration from `~/.ragdock/config.toml` (or an explicit path)
//! with environment variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.ragdock/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Embedding/chat backend
    #[serde(default)]
    pub backend: BackendConfig,

    /// Vector collection storage
    #[serde(default)]
    pub store: StoreConfig,

    /// Chunking policy for ingestion
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Retrieval and prompt-assembly policy
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// HTTP gateway
    #[serde(default)]
    pub gateway: GatewayConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// "ollama" (native API) or "openai" (any OpenAI-compatible endpoint)
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    #[serde(default = "default_embed_model")]
    pub embed_model: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_provider() -> String {
    "ollama".into()
}
fn default_base_url() -> String {
    "http://localhost:11434".into()
}
fn default_chat_model() -> String {
    "mistral:latest".into()
}
fn default_embed_model() -> String {
    "nomic-embed-text".into()
}
fn default_request_timeout() -> u64 {
    120
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            api_key: None,
            chat_model: default_chat_model(),
            embed_model: default_embed_model(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("chat_model", &self.chat_model)
            .field("embed_model", &self.embed_model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "sqlite" (persistent, under `rag_dir`) or "memory" (process lifetime)
    #[serde(default = "default_store_backend")]
    pub backend: String,

    #[serde(default = "default_rag_dir")]
    pub rag_dir: PathBuf,

    #[serde(default = "default_docs_collection")]
    pub docs_collection: String,

    #[serde(default = "default_mem_collection")]
    pub mem_collection: String,
}

fn default_store_backend() -> String {
    "sqlite".into()
}
fn default_rag_dir() -> PathBuf {
    PathBuf::from("./rag_store")
}
fn default_docs_collection() -> String {
    "docs".into()
}
fn default_mem_collection() -> String {
    "memories".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            rag_dir: default_rag_dir(),
            docs_collection: default_docs_collection(),
            mem_collection: default_mem_collection(),
        }
    }
}

/// Chunk sizes are measured in words.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_chunk_size() -> usize {
    1200
}
fn default_chunk_overlap() -> usize {
    200
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Documents retrieved per question when the request does not say
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Upper bound on memories mixed into the context
    #[serde(default = "default_memory_cap")]
    pub memory_cap: usize,

    /// How many past turns a chat prompt includes
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,

    #[serde(default)]
    pub history_order: HistoryOrder,
}

fn default_top_k() -> usize {
    4
}
fn default_memory_cap() -> usize {
    2
}
fn default_history_turns() -> usize {
    4
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            memory_cap: default_memory_cap(),
            history_turns: default_history_turns(),
            history_order: HistoryOrder::default(),
        }
    }
}

/// Order of the history window inside a chat prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOrder {
    /// Oldest turn of the window first
    #[default]
    Chronological,
    /// Newest turn first, each pair still user-then-assistant
    MostRecentFirst,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Request body limit, applies to file uploads
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.ragdock/config.toml).
    ///
    /// Environment variables override file values:
    /// - `OLLAMA_HOST`, `CHAT_MODEL`, `EMBED_MODEL`
    /// - `RAG_DIR`, `DOCS_COLLECTION`, `MEM_COLLECTION`
    /// - `TOP_K`, `CHUNK_SIZE`, `CHUNK_OVERLAP`
    /// - `RAGDOCK_PROVIDER`, `RAGDOCK_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_with_env(&config_path)
    }

    /// Load from `path`, then apply process environment overrides and validate.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment-like lookup.
    ///
    /// Numeric values that fail to parse are ignored with a warning.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("OLLAMA_HOST") {
            self.backend.base_url = host;
        }
        if let Some(model) = lookup("CHAT_MODEL") {
            self.backend.chat_model = model;
        }
        if let Some(model) = lookup("EMBED_MODEL") {
            self.backend.embed_model = model;
        }
        if let Some(provider) = lookup("RAGDOCK_PROVIDER") {
            self.backend.provider = provider;
        }
        if let Some(key) = lookup("RAGDOCK_API_KEY") {
            self.backend.api_key = Some(key);
        }
        if let Some(dir) = lookup("RAG_DIR") {
            self.store.rag_dir = PathBuf::from(dir);
        }
        if let Some(name) = lookup("DOCS_COLLECTION") {
            self.store.docs_collection = name;
        }
        if let Some(name) = lookup("MEM_COLLECTION") {
            self.store.mem_collection = name;
        }
        override_number(&lookup, "TOP_K", &mut self.retrieval.top_k);
        override_number(&lookup, "CHUNK_SIZE", &mut self.chunking.chunk_size);
        override_number(&lookup, "CHUNK_OVERLAP", &mut self.chunking.chunk_overlap);
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".ragdock")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunking.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "chunk_size must be greater than 0".into(),
            ));
        }

        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(ConfigError::ValidationError(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }

        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "top_k must be greater than 0".into(),
            ));
        }

        if !matches!(self.backend.provider.as_str(), "ollama" | "openai") {
            return Err(ConfigError::ValidationError(format!(
                "unknown backend provider '{}' (expected 'ollama' or 'openai')",
                self.backend.provider
            )));
        }

        if !matches!(self.store.backend.as_str(), "sqlite" | "memory") {
            return Err(ConfigError::ValidationError(format!(
                "unknown store backend '{}' (expected 'sqlite' or 'memory')",
                self.store.backend
            )));
        }

        if self.store.docs_collection == self.store.mem_collection {
            return Err(ConfigError::ValidationError(
                "docs_collection and mem_collection must differ".into(),
            ));
        }

        Ok(())
    }

    /// Render the configuration as TOML (for the `config` command).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

fn override_number(lookup: &impl Fn(&str) -> Option<String>, key: &str, target: &mut usize) {
    if let Some(raw) = lookup(key) {
        match raw.trim().parse::<usize>() {
            Ok(value) => *target = value,
            Err(e) => tracing::warn!(key, value = %raw, error = %e, "Ignoring invalid override"),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
