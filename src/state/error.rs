use thiserror::Error;

use crate::core::errors::RagError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[source] RagError),

    #[error("Failed to initialize RAG context: {0}")]
    Rag(#[source] RagError),

    #[error("Failed to initialize completion client: {0}")]
    Completion(#[source] RagError),
}
