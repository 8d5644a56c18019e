//! Query pipeline: one user turn in, one assistant turn out.
//!
//! The pipeline never writes the vector store. Failures after the user turn
//! is recorded are folded into [`Answer::Failed`] so every front-end sees the
//! same error text and the transcript stays consistent.

use std::sync::Arc;

use serde::Serialize;

use crate::core::config::defaults::CONTEXT_PREAMBLE;
use crate::core::config::{AppConfig, RetrievalConfig};
use crate::core::errors::RagError;
use crate::llm::{CompletionProvider, ConversationTurn, PromptRequest};
use crate::rag::{ContextBuilder, RagContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    Embedding,
    Store,
    Completion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Reply(String),
    Failed {
        reason: FailureReason,
        message: String,
    },
}

impl Answer {
    fn failed(reason: FailureReason, detail: impl std::fmt::Display) -> Self {
        Answer::Failed {
            reason,
            message: format!("❌ Error: {}", detail),
        }
    }

    /// Text shown to the user; becomes the assistant turn.
    pub fn text(&self) -> &str {
        match self {
            Answer::Reply(text) => text,
            Answer::Failed { message, .. } => message,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Answer::Failed { .. })
    }
}

pub struct QueryPipeline {
    context: RagContext,
    completion: Arc<dyn CompletionProvider>,
    builder: ContextBuilder,
    system_prompt: String,
}

impl QueryPipeline {
    pub fn new(
        context: RagContext,
        completion: Arc<dyn CompletionProvider>,
        retrieval: RetrievalConfig,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            context,
            completion,
            builder: ContextBuilder::new(retrieval),
            system_prompt: system_prompt.into(),
        }
    }

    pub fn from_config(
        context: RagContext,
        completion: Arc<dyn CompletionProvider>,
        config: &AppConfig,
    ) -> Self {
        Self::new(
            context,
            completion,
            config.retrieval,
            config.assistant.system_prompt.clone(),
        )
    }

    /// Answers `user_message` given the prior transcript.
    ///
    /// The returned history is `history` plus the user turn and the assistant
    /// turn, whether or not the answer succeeded.
    pub async fn answer(
        &self,
        mut history: Vec<ConversationTurn>,
        user_message: &str,
    ) -> (Answer, Vec<ConversationTurn>) {
        history.push(ConversationTurn::user(user_message));

        let answer = match self.generate(&history, user_message).await {
            Ok(reply) => Answer::Reply(reply),
            Err((reason, err)) => Answer::failed(reason, error_detail(&err)),
        };
        if let Answer::Failed { reason, message } = &answer {
            tracing::warn!(
                "Query failed ({:?}) via {} ({}): {}",
                reason,
                self.completion.name(),
                self.completion.model(),
                message
            );
        }

        history.push(ConversationTurn::assistant(answer.text()));
        (answer, history)
    }

    async fn generate(
        &self,
        history: &[ConversationTurn],
        user_message: &str,
    ) -> Result<String, (FailureReason, RagError)> {
        let query = self
            .context
            .embedder
            .embed_one(user_message)
            .await
            .map_err(|e| (FailureReason::Embedding, e))?;

        let top_k = self.builder.config().top_k;
        let results = self
            .context
            .store
            .query(&query, top_k)
            .await
            .map_err(|e| (FailureReason::Store, e))?;
        tracing::debug!("Retrieved {} chunk(s) for query", results.len());

        let retrieval_context = self.builder.build(&results);
        let request = self.build_prompt(&retrieval_context, history);

        self.completion
            .complete(&request)
            .await
            .map_err(|e| (FailureReason::Completion, RagError::from(e)))
    }

    /// `[persona, context turn, ..history]`; `history` already ends with the
    /// new user turn.
    pub fn build_prompt(
        &self,
        retrieval_context: &str,
        history: &[ConversationTurn],
    ) -> PromptRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ConversationTurn::system(self.system_prompt.clone()));
        messages.push(ConversationTurn::system(format!(
            "{}\n\n{}",
            CONTEXT_PREAMBLE, retrieval_context
        )));
        messages.extend(history.iter().cloned());
        PromptRequest::new(messages)
    }
}

/// User-facing detail: the collaborator's own message, without the kind prefix.
fn error_detail(err: &RagError) -> String {
    match err {
        RagError::Embedding(detail) | RagError::Store(detail) => detail.clone(),
        RagError::Completion(failure) => failure.to_string(),
        other => other.to_string(),
    }
}
