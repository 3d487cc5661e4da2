//! SQLite-backed collections.
//!
//! All collections share one database file and one table:
//! - `records` holds `(collection, id)`-keyed passages with their metadata
//!   (JSON text) and embedding (little-endian f32 blob).
//!
//! Similarity ranking happens in Rust after a scan of the collection, in
//! insertion order (`iid`), so ties resolve the same way as in memory.

use crate::vector::{self, Candidate};
use async_trait::async_trait;
use chrono::Utc;
use ragdock_core::error::VectorError;
use ragdock_core::{ScoredText, VectorCollection, VectorRecord};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// A SQLite database holding any number of named collections.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database file at `path`.
    pub async fn open(path: &Path) -> Result<Self, VectorError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| VectorError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite vector store initialized at {}", path.display());
        Ok(store)
    }

    /// An ephemeral database (useful for tests).
    pub async fn in_memory() -> Result<Self, VectorError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| VectorError::Storage(format!("Invalid SQLite options: {e}")))?;

        // Every connection to :memory: is a separate database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| VectorError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// A handle to the named collection. Collections need no creation step.
    pub fn collection(&self, name: impl Into<String>) -> SqliteCollection {
        SqliteCollection {
            name: name.into(),
            pool: self.pool.clone(),
        }
    }

    async fn run_migrations(&self) -> Result<(), VectorError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                iid         INTEGER PRIMARY KEY AUTOINCREMENT,
                collection  TEXT NOT NULL,
                id          TEXT NOT NULL,
                content     TEXT NOT NULL,
                metadata    TEXT NOT NULL DEFAULT '{}',
                embedding   BLOB NOT NULL,
                created_at  TEXT NOT NULL,
                UNIQUE(collection, id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| VectorError::MigrationFailed(format!("records table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_records_collection ON records(collection, iid)")
            .execute(&self.pool)
            .await
            .map_err(|e| VectorError::MigrationFailed(format!("collection index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }
}

/// One named collection inside a [`SqliteStore`].
pub struct SqliteCollection {
    name: String,
    pool: SqlitePool,
}

impl SqliteCollection {
    async fn stored_dimension(&self) -> Result<Option<usize>, VectorError> {
        let row = sqlx::query(
            "SELECT length(embedding) AS bytes FROM records WHERE collection = ?1 LIMIT 1",
        )
        .bind(&self.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| VectorError::QueryFailed(format!("dimension check: {e}")))?;

        match row {
            Some(row) => {
                let bytes: i64 = row
                    .try_get("bytes")
                    .map_err(|e| VectorError::QueryFailed(format!("bytes column: {e}")))?;
                Ok(Some(bytes as usize / 4))
            }
            None => Ok(None),
        }
    }

    fn row_to_candidate(row: &sqlx::sqlite::SqliteRow) -> Result<Candidate, VectorError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| VectorError::QueryFailed(format!("id column: {e}")))?;
        let content: String = row
            .try_get("content")
            .map_err(|e| VectorError::QueryFailed(format!("content column: {e}")))?;
        let metadata_json: String = row
            .try_get("metadata")
            .map_err(|e| VectorError::QueryFailed(format!("metadata column: {e}")))?;
        let blob: Vec<u8> = row
            .try_get("embedding")
            .map_err(|e| VectorError::QueryFailed(format!("embedding column: {e}")))?;

        let metadata = serde_json::from_str(&metadata_json).unwrap_or_default();

        Ok(Candidate {
            hit: ScoredText {
                id,
                text: content,
                score: 0.0,
                metadata,
            },
            embedding: vector::blob_to_embedding(&blob),
        })
    }
}

#[async_trait]
impl VectorCollection for SqliteCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn add(&self, records: Vec<VectorRecord>) -> Result<Vec<String>, VectorError> {
        let dim = vector::batch_dimension(records.iter().map(|r| r.embedding.as_slice()))
            .map_err(VectorError::Storage)?;
        let Some(dim) = dim else {
            return Ok(Vec::new());
        };
        if let Some(existing) = self.stored_dimension().await? {
            if existing != dim {
                return Err(VectorError::Storage(format!(
                    "collection '{}' holds {existing}-dimensional embeddings, got {dim}",
                    self.name
                )));
            }
        }

        let created_at = Utc::now().to_rfc3339();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| VectorError::Storage(format!("BEGIN failed: {e}")))?;

        let mut ids = Vec::with_capacity(records.len());
        for record in &records {
            let metadata_json = serde_json::to_string(&record.metadata)
                .map_err(|e| VectorError::Storage(format!("Metadata serialization: {e}")))?;

            sqlx::query(
                r#"
                INSERT INTO records (collection, id, content, metadata, embedding, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(collection, id) DO UPDATE SET
                    content = excluded.content,
                    metadata = excluded.metadata,
                    embedding = excluded.embedding
                "#,
            )
            .bind(&self.name)
            .bind(&record.id)
            .bind(&record.text)
            .bind(&metadata_json)
            .bind(vector::embedding_to_blob(&record.embedding))
            .bind(&created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| VectorError::Storage(format!("INSERT failed: {e}")))?;

            ids.push(record.id.clone());
        }

        tx.commit()
            .await
            .map_err(|e| VectorError::Storage(format!("COMMIT failed: {e}")))?;

        debug!(collection = %self.name, count = ids.len(), "Stored records");
        Ok(ids)
    }

    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<ScoredText>, VectorError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            "SELECT id, content, metadata, embedding FROM records WHERE collection = ?1 ORDER BY iid",
        )
        .bind(&self.name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| VectorError::QueryFailed(format!("Vector scan: {e}")))?;

        let candidates = rows
            .iter()
            .map(Self::row_to_candidate)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(vector::rank_by_similarity(candidates, embedding, k))
    }

    async fn count(&self) -> Result<usize, VectorError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM records WHERE collection = ?1")
            .bind(&self.name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| VectorError::QueryFailed(format!("COUNT failed: {e}")))?;
        let n: i64 = row
            .try_get("n")
            .map_err(|e| VectorError::QueryFailed(format!("count column: {e}")))?;
        Ok(n as usize)
    }

    async fn reset(&self) -> Result<(), VectorError> {
        sqlx::query("DELETE FROM records WHERE collection = ?1")
            .bind(&self.name)
            .execute(&self.pool)
            .await
            .map_err(|e| VectorError::Storage(format!("DELETE failed: {e}")))?;
        info!(collection = %self.name, "Collection reset");
        Ok(())
    }
}
