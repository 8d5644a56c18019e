use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let store_count = state.rag.store.count().await?;
    Ok(Json(json!({
        "status": "ok",
        "store_count": store_count,
        "embedder": state.rag.embedder.name(),
        "uptime_secs": state.started_at.elapsed().as_secs()
    })))
}
