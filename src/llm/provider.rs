use async_trait::async_trait;

use super::types::PromptRequest;
use crate::core::errors::CompletionFailure;

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// return the provider name (e.g. "groq")
    fn name(&self) -> &str;

    /// the model identifier every request is sent with
    fn model(&self) -> &str;

    /// chat completion (non-streaming), returning the first choice's content
    async fn complete(&self, request: &PromptRequest) -> Result<String, CompletionFailure>;
}
