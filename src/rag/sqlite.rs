//! SQLite-backed vector store.
//!
//! Chunks live in one table keyed by `(collection, chunk_id)`; embeddings
//! are little-endian f32 BLOBs ranked by brute-force cosine similarity.

use std::cmp::Ordering;
use std::path::PathBuf;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::store::{Chunk, ScoredChunk, VectorStore};
use crate::core::config::settings::StoreConfig;
use crate::core::config::AppPaths;
use crate::core::errors::RagError;

const DIMENSION_KEY: &str = "dimension";

pub struct SqliteVectorStore {
    pool: SqlitePool,
    collection: String,
    db_path: PathBuf,
}

impl SqliteVectorStore {
    pub async fn new(paths: &AppPaths, config: &StoreConfig) -> Result<Self, RagError> {
        Self::with_path(paths.resolve(&config.path), &config.collection).await
    }

    pub async fn with_path(db_path: PathBuf, collection: &str) -> Result<Self, RagError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(RagError::store)?;

        let store = Self {
            pool,
            collection: collection.to_string(),
            db_path,
        };
        store.init_schema().await?;
        Ok(store)
    }

    pub fn db_path(&self) -> &PathBuf {
        &self.db_path
    }

    async fn init_schema(&self) -> Result<(), RagError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS chunks (
                collection TEXT NOT NULL,
                chunk_id TEXT NOT NULL,
                content TEXT NOT NULL,
                embedding BLOB NOT NULL,
                created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now')),
                PRIMARY KEY (collection, chunk_id)
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(RagError::store)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS store_meta (
                collection TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (collection, key)
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(RagError::store)?;

        Ok(())
    }

    async fn recorded_dimension(&self) -> Result<Option<usize>, RagError> {
        let value: Option<String> = sqlx::query_scalar(
            "SELECT value FROM store_meta WHERE collection = ?1 AND key = ?2",
        )
        .bind(&self.collection)
        .bind(DIMENSION_KEY)
        .fetch_optional(&self.pool)
        .await
        .map_err(RagError::store)?;

        value
            .map(|v| {
                v.parse::<usize>()
                    .map_err(|_| RagError::Store(format!("corrupt dimension entry: {}", v)))
            })
            .transpose()
    }

    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;

    if denom <= f32::EPSILON {
        0.0
    } else {
        dot / denom
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    async fn upsert(&self, items: Vec<(Chunk, Vec<f32>)>) -> Result<(), RagError> {
        if items.is_empty() {
            return Ok(());
        }

        let expected = match self.recorded_dimension().await? {
            Some(dim) => dim,
            None => items[0].1.len(),
        };
        if expected == 0 {
            return Err(RagError::Store("embeddings must not be empty".to_string()));
        }
        if let Some((chunk, embedding)) = items.iter().find(|(_, e)| e.len() != expected) {
            return Err(RagError::Store(format!(
                "embedding for {} has width {}, store expects {}",
                chunk.id,
                embedding.len(),
                expected
            )));
        }

        let mut tx = self.pool.begin().await.map_err(RagError::store)?;

        sqlx::query(
            "INSERT OR IGNORE INTO store_meta (collection, key, value) VALUES (?1, ?2, ?3)",
        )
        .bind(&self.collection)
        .bind(DIMENSION_KEY)
        .bind(expected.to_string())
        .execute(&mut *tx)
        .await
        .map_err(RagError::store)?;

        for (chunk, embedding) in &items {
            sqlx::query(
                "INSERT OR REPLACE INTO chunks (collection, chunk_id, content, embedding)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(&self.collection)
            .bind(&chunk.id)
            .bind(&chunk.content)
            .bind(Self::serialize_embedding(embedding))
            .execute(&mut *tx)
            .await
            .map_err(RagError::store)?;
        }

        tx.commit().await.map_err(RagError::store)?;
        Ok(())
    }

    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<ScoredChunk>, RagError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        if let Some(dim) = self.recorded_dimension().await? {
            if dim != embedding.len() {
                return Err(RagError::Store(format!(
                    "query embedding has width {}, store expects {}",
                    embedding.len(),
                    dim
                )));
            }
        }

        let rows = sqlx::query(
            "SELECT chunk_id, content, embedding FROM chunks WHERE collection = ?1",
        )
        .bind(&self.collection)
        .fetch_all(&self.pool)
        .await
        .map_err(RagError::store)?;

        let mut scored: Vec<ScoredChunk> = rows
            .iter()
            .map(|row| {
                let bytes: Vec<u8> = row.get("embedding");
                let stored = Self::deserialize_embedding(&bytes);
                ScoredChunk {
                    chunk: Chunk {
                        id: row.get("chunk_id"),
                        content: row.get("content"),
                    },
                    score: cosine_similarity(embedding, &stored),
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.chunk.id.cmp(&b.chunk.id))
        });
        scored.truncate(k);

        Ok(scored)
    }

    async fn count(&self) -> Result<usize, RagError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks WHERE collection = ?1")
            .bind(&self.collection)
            .fetch_one(&self.pool)
            .await
            .map_err(RagError::store)?;

        Ok(count as usize)
    }

    async fn delete_all(&self) -> Result<(), RagError> {
        let mut tx = self.pool.begin().await.map_err(RagError::store)?;

        sqlx::query("DELETE FROM chunks WHERE collection = ?1")
            .bind(&self.collection)
            .execute(&mut *tx)
            .await
            .map_err(RagError::store)?;

        sqlx::query("DELETE FROM store_meta WHERE collection = ?1")
            .bind(&self.collection)
            .execute(&mut *tx)
            .await
            .map_err(RagError::store)?;

        tx.commit().await.map_err(RagError::store)?;
        Ok(())
    }
}
