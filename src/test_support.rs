//! Shared fakes for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use tokio::net::TcpListener;

use crate::core::config::{AppConfig, AppPaths, ConfigService};
use crate::core::errors::{CompletionFailure, RagError};
use crate::embedding::Embedder;
use crate::llm::{CompletionProvider, PromptRequest};
use crate::rag::{RagContext, SqliteVectorStore};
use crate::state::AppState;

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

const VOCABULARY: [&str; 8] = [
    "vata",
    "pitta",
    "kapha",
    "movement",
    "metabolism",
    "structure",
    "calms",
    "ginger",
];

/// Bag-of-words embedder over a tiny fixed vocabulary, counting calls.
#[derive(Default)]
pub struct KeywordEmbedder {
    pub calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let tokens: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();
        VOCABULARY
            .iter()
            .map(|word| tokens.iter().filter(|t| *t == word).count() as f32)
            .collect()
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(inputs.iter().map(|text| Self::vector(text)).collect())
    }
}

/// Embedder that always fails.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    fn name(&self) -> &str {
        "failing"
    }

    async fn embed(&self, _inputs: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        Err(RagError::Embedding("model not loaded".to_string()))
    }
}

/// Completion provider returning a canned reply and recording requests.
pub struct ScriptedCompletion {
    reply: Result<String, String>,
    delay: Option<Duration>,
    pub requests: Mutex<Vec<PromptRequest>>,
}

impl ScriptedCompletion {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(detail: &str) -> Self {
        Self {
            reply: Err(detail.to_string()),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Sleeps for `delay` before answering, like a slow upstream.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn last_request(&self) -> Option<PromptRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Message counts of every prompt received, in arrival order.
    pub fn prompt_sizes(&self) -> Vec<usize> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.messages.len())
            .collect()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedCompletion {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: &PromptRequest) -> Result<String, CompletionFailure> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply
            .clone()
            .map_err(|detail| CompletionFailure::Status {
                status: 500,
                body: detail,
            })
    }
}

/// A `RagContext` over a fresh SQLite store in `dir` and the keyword embedder.
pub async fn keyword_context(dir: &std::path::Path) -> (RagContext, Arc<KeywordEmbedder>) {
    let embedder = Arc::new(KeywordEmbedder::default());
    let store = SqliteVectorStore::with_path(dir.join("store.db"), "chat_chunks")
        .await
        .unwrap();
    let context = RagContext::new(embedder.clone(), Arc::new(store));
    (context, embedder)
}

/// App state over a temp data dir, the keyword embedder and `completion`.
pub async fn test_state(
    dir: &std::path::Path,
    completion: Arc<dyn CompletionProvider>,
) -> Arc<AppState> {
    let paths = Arc::new(AppPaths::with_data_dir(
        dir.to_path_buf(),
        dir.join("user_data"),
    ));
    let mut settings = AppConfig::default();
    settings.completion.api_key = Some("gsk-test-secret".to_string());
    let (rag, _) = keyword_context(dir).await;
    let config = ConfigService::new(paths.clone());
    Arc::new(AppState::from_parts(paths, config, settings, rag, completion))
}

/// Status and JSON body of a handler response.
pub async fn response_json(
    response: axum::response::Response,
) -> (axum::http::StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}
