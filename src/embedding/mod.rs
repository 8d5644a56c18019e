//! Embedding capability: text in, fixed-width vectors out.

mod hash;
mod openai;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

pub use hash::HashEmbedder;
pub use openai::OpenAiEmbedder;

use crate::core::config::settings::{EmbeddingConfig, EmbeddingProvider};
use crate::core::errors::RagError;

#[async_trait]
pub trait Embedder: Send + Sync {
    fn name(&self) -> &str;

    /// Embeds `inputs`, returning exactly one vector per input, in order.
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RagError>;

    async fn embed_one(&self, input: &str) -> Result<Vec<f32>, RagError> {
        let mut vectors = self.embed(&[input.to_string()]).await?;
        match (vectors.pop(), vectors.is_empty()) {
            (Some(vector), true) => Ok(vector),
            _ => Err(RagError::Embedding(format!(
                "{} did not return exactly one vector",
                self.name()
            ))),
        }
    }
}

pub fn build_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>, RagError> {
    match config.provider {
        EmbeddingProvider::Openai => Ok(Arc::new(OpenAiEmbedder::new(
            &config.base_url,
            config.api_key.as_deref(),
            &config.model,
            Duration::from_secs(config.timeout_secs),
        )?)),
        EmbeddingProvider::Hash => Ok(Arc::new(HashEmbedder::new(config.dimensions))),
    }
}
