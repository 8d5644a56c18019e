use std::sync::Arc;
use std::time::Instant;

use crate::core::config::{AppConfig, AppPaths, ConfigService};
use crate::history::SessionStore;
use crate::llm::{ChatCompletionsClient, CompletionProvider};
use crate::pipeline::QueryPipeline;
use crate::rag::RagContext;

pub mod error;

use error::InitializationError;

/// Application state shared across all routes.
///
/// Contains references to:
/// - Configuration and paths
/// - The RAG context (embedder and vector store)
/// - The query pipeline and its completion client
/// - In-memory chat sessions
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: ConfigService,
    pub settings: Arc<AppConfig>,
    pub rag: RagContext,
    pub pipeline: Arc<QueryPipeline>,
    pub sessions: SessionStore,
    pub started_at: Instant,
}

impl AppState {
    /// Initializes the application state.
    ///
    /// This process includes:
    /// 1. Setting up paths and loading configuration
    /// 2. Opening the vector store and building the embedder
    /// 3. Building the completion client (fails without an API key)
    /// 4. Wiring the query pipeline
    pub async fn initialize(paths: Arc<AppPaths>) -> Result<Arc<Self>, InitializationError> {
        let config = ConfigService::new(paths.clone());
        let settings = config
            .load_app_config()
            .map_err(InitializationError::Config)?;

        let completion: Arc<dyn CompletionProvider> = Arc::new(
            ChatCompletionsClient::from_config(&settings.completion)
                .map_err(InitializationError::Completion)?,
        );
        tracing::info!(
            "Completion provider {} using model {}",
            completion.name(),
            completion.model()
        );

        let rag = RagContext::from_config(paths.as_ref(), &settings)
            .await
            .map_err(InitializationError::Rag)?;

        Ok(Arc::new(Self::from_parts(paths, config, settings, rag, completion)))
    }

    pub fn from_parts(
        paths: Arc<AppPaths>,
        config: ConfigService,
        settings: AppConfig,
        rag: RagContext,
        completion: Arc<dyn CompletionProvider>,
    ) -> Self {
        let pipeline = Arc::new(QueryPipeline::from_config(rag.clone(), completion, &settings));
        AppState {
            paths,
            config,
            settings: Arc::new(settings),
            rag,
            pipeline,
            sessions: SessionStore::new(),
            started_at: Instant::now(),
        }
    }
}
