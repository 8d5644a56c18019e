use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use ayur_assist::core::config::AppPaths;
use ayur_assist::core::logging;
use ayur_assist::ingest::Ingestor;
use ayur_assist::server;
use ayur_assist::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    logging::init(&paths, "server.log", "info");

    let state = AppState::initialize(paths.clone()).await?;

    // Ingestion needs the store to itself, so it finishes before the
    // listener accepts any query traffic.
    if state.settings.ingest.on_startup {
        let source = paths.resolve(&state.settings.ingest.source_dir);
        let report = Ingestor::from_config(state.rag.clone(), &state.settings)
            .ingest(&source, false)
            .await
            .with_context(|| format!("Startup ingestion from {} failed", source.display()))?;
        tracing::info!(
            "Startup ingestion: {} embedded, {} extracted",
            report.embedded,
            report.extracted
        );
    }

    let server_config = &state.settings.server;
    let bind_addr = format!("{}:{}", server_config.host, server_config.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    println!("AYUR_PORT={}", addr.port());
    tracing::info!(
        "Listening on {} (model {})",
        addr,
        state.settings.completion.model
    );

    let app: Router = server::router::router(state.clone());
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
