//! Retrieval context builder.
//!
//! Turns ranked chunks into the bounded reference text handed to the model:
//! 1. Drop empty chunks
//! 2. Cap each chunk at `max_doc_chars`
//! 3. Join with newlines and cap the whole at `max_context_chars`
//!
//! All limits count characters, not bytes.

use super::store::ScoredChunk;
use crate::core::config::RetrievalConfig;

/// Returns the first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Builds the bounded context string from documents in relevance order.
pub fn build_retrieval_context<'a, I>(
    documents: I,
    max_doc_chars: usize,
    max_context_chars: usize,
) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let joined = documents
        .into_iter()
        .filter(|doc| !doc.is_empty())
        .map(|doc| truncate_chars(doc, max_doc_chars))
        .collect::<Vec<_>>()
        .join("\n");

    truncate_chars(&joined, max_context_chars).to_string()
}

pub struct ContextBuilder {
    config: RetrievalConfig,
}

impl ContextBuilder {
    pub fn new(config: RetrievalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn build(&self, results: &[ScoredChunk]) -> String {
        build_retrieval_context(
            results.iter().map(|r| r.chunk.content.as_str()),
            self.config.max_doc_chars,
            self.config.max_context_chars,
        )
    }
}
