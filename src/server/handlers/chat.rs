use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::pipeline::Answer;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Stateless single turn: every request starts from an empty history.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }

    let (answer, _) = state.pipeline.answer(Vec::new(), &payload.message).await;
    match answer {
        Answer::Reply(reply) => Ok(Json(json!({ "reply": reply }))),
        Answer::Failed { message, .. } => Err(ApiError::Internal(message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{response_json, test_state, ScriptedCompletion};

    fn request(message: &str) -> Json<ChatRequest> {
        Json(ChatRequest {
            message: message.to_string(),
        })
    }

    #[tokio::test]
    async fn returns_reply() {
        let dir = tempfile::tempdir().unwrap();
        let completion = Arc::new(ScriptedCompletion::replying("Drink warm water."));
        let state = test_state(dir.path(), completion.clone()).await;

        let response = chat(State(state), request("I feel cold")).await.into_response();
        let (status, body) = response_json(response).await;
        assert_eq!(status, 200);
        assert_eq!(body, json!({ "reply": "Drink warm water." }));

        // no history carried between requests
        let sent = completion.last_request().unwrap();
        assert_eq!(sent.messages.len(), 3);
    }

    #[tokio::test]
    async fn pipeline_failure_is_500_with_error_body() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), Arc::new(ScriptedCompletion::failing("boom"))).await;

        let response = chat(State(state), request("hello")).await.into_response();
        let (status, body) = response_json(response).await;
        assert_eq!(status, 500);
        let error = body["error"].as_str().unwrap();
        assert!(error.starts_with("❌ Error: "));
        assert!(error.contains("boom"));
    }

    #[tokio::test]
    async fn blank_message_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let completion = Arc::new(ScriptedCompletion::replying("unused"));
        let state = test_state(dir.path(), completion.clone()).await;

        let response = chat(State(state), request("   ")).await.into_response();
        assert_eq!(response.status(), 400);
        assert!(completion.last_request().is_none());
    }
}
