use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::core::errors::ApiError;
use crate::state::AppState;

/// Effective configuration with secrets redacted.
pub async fn get_config(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let config = serde_json::to_value(state.settings.as_ref()).map_err(ApiError::internal)?;
    Ok(Json(state.config.redact_sensitive_values(&config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{response_json, test_state, ScriptedCompletion};

    #[tokio::test]
    async fn api_key_is_redacted() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), Arc::new(ScriptedCompletion::replying("ok"))).await;

        let response = get_config(State(state)).await.into_response();
        let (status, body) = response_json(response).await;
        assert_eq!(status, 200);
        assert_eq!(body["completion"]["api_key"], "****");
        assert_eq!(body["completion"]["model"], "llama3-8b-8192");
        assert_eq!(body["retrieval"]["top_k"], 3);
        assert!(!body.to_string().contains("gsk-test-secret"));
    }
}
