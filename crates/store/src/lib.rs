//! Vector collection implementations for ragdock.

pub mod in_memory;
pub mod vector;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::InMemoryCollection;
pub use vector::{cosine_similarity, rank_by_similarity};

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteCollection, SqliteStore};

use std::sync::Arc;

use ragdock_config::StoreConfig;
use ragdock_core::VectorCollection;
use ragdock_core::error::VectorError;

/// Database file name inside the configured storage directory.
pub const DB_FILE_NAME: &str = "ragdock.sqlite";

/// The two collections the service works with.
#[derive(Clone)]
pub struct Collections {
    pub documents: Arc<dyn VectorCollection>,
    pub memories: Arc<dyn VectorCollection>,
    /// Where the collections live, as reported by stats and reset
    pub location: String,
}

impl Collections {
    /// Fresh in-memory collections.
    pub fn in_memory(docs_name: &str, mem_name: &str) -> Self {
        Self {
            documents: Arc::new(InMemoryCollection::new(docs_name)),
            memories: Arc::new(InMemoryCollection::new(mem_name)),
            location: ":memory:".into(),
        }
    }
}

/// Open the collections described by the store configuration.
pub async fn open_collections(config: &StoreConfig) -> Result<Collections, VectorError> {
    match config.backend.as_str() {
        "memory" => Ok(Collections::in_memory(
            &config.docs_collection,
            &config.mem_collection,
        )),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            std::fs::create_dir_all(&config.rag_dir).map_err(|e| {
                VectorError::Storage(format!(
                    "cannot create storage directory {}: {e}",
                    config.rag_dir.display()
                ))
            })?;
            let store = SqliteStore::open(&config.rag_dir.join(DB_FILE_NAME)).await?;
            Ok(Collections {
                documents: Arc::new(store.collection(config.docs_collection.clone())),
                memories: Arc::new(store.collection(config.mem_collection.clone())),
                location: config.rag_dir.display().to_string(),
            })
        }
        other => Err(VectorError::Storage(format!(
            "unknown store backend '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_from_config() {
        let config = StoreConfig {
            backend: "memory".into(),
            ..StoreConfig::default()
        };
        let collections = open_collections(&config).await.unwrap();
        assert_eq!(collections.documents.name(), "docs");
        assert_eq!(collections.memories.name(), "memories");
        assert_eq!(collections.location, ":memory:");
    }

    #[tokio::test]
    async fn sqlite_backend_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let rag_dir = dir.path().join("nested").join("store");
        let config = StoreConfig {
            rag_dir: rag_dir.clone(),
            ..StoreConfig::default()
        };
        let collections = open_collections(&config).await.unwrap();
        assert!(rag_dir.join(DB_FILE_NAME).exists());
        assert_eq!(collections.location, rag_dir.display().to_string());
        assert_eq!(collections.documents.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_backend_rejected() {
        let config = StoreConfig {
            backend: "redis".into(),
            ..StoreConfig::default()
        };
        assert!(open_collections(&config).await.is_err());
    }
}
