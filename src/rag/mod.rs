//! RAG (Retrieval-Augmented Generation) module.
//!
//! This module provides:
//! - `VectorStore`: the chunk store capability, backed by `SqliteVectorStore`
//! - `ContextBuilder`: bounded context strings from ranked chunks
//! - `RagContext`: the embedder and store handles shared by ingestion and query

mod context_builder;
mod sqlite;
mod store;

use std::sync::Arc;

pub use context_builder::{build_retrieval_context, truncate_chars, ContextBuilder};
pub use sqlite::{cosine_similarity, SqliteVectorStore};
pub use store::{Chunk, ScoredChunk, VectorStore};

use crate::core::config::{AppConfig, AppPaths};
use crate::core::errors::RagError;
use crate::embedding::{build_embedder, Embedder};

/// Handles to the embedding and vector-store capabilities.
///
/// Built once at process start and passed explicitly to both pipelines.
#[derive(Clone)]
pub struct RagContext {
    pub embedder: Arc<dyn Embedder>,
    pub store: Arc<dyn VectorStore>,
}

impl RagContext {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    pub async fn from_config(paths: &AppPaths, config: &AppConfig) -> Result<Self, RagError> {
        let embedder = build_embedder(&config.embedding)?;
        let store = SqliteVectorStore::new(paths, &config.store).await?;
        tracing::info!(
            "Vector store {} (collection {}) with {} embedder",
            store.db_path().display(),
            config.store.collection,
            embedder.name()
        );
        Ok(Self::new(embedder, Arc::new(store)))
    }
}
