//! Vector store interface over chunk embeddings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::RagError;

/// A unit of source text, immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable identifier (`doc_<n>`).
    pub id: String,
    pub content: String,
}

impl Chunk {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }

    /// Identifier for the `index`-th chunk of an ingestion run.
    pub fn sequential_id(index: usize) -> String {
        format!("doc_{}", index)
    }
}

/// Result of a similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    /// Cosine similarity (higher = better).
    pub score: f32,
}

/// Nearest-neighbour store over chunk embeddings.
///
/// Implementations keep exactly one vector per chunk id and a single vector
/// width for the lifetime of the collection.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace a batch of chunks atomically.
    async fn upsert(&self, items: Vec<(Chunk, Vec<f32>)>) -> Result<(), RagError>;

    /// Up to `k` chunks, most similar first.
    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<ScoredChunk>, RagError>;

    async fn count(&self) -> Result<usize, RagError>;

    /// Remove every chunk, resetting the recorded vector width.
    async fn delete_all(&self) -> Result<(), RagError>;
}
