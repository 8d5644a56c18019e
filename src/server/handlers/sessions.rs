use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub message: String,
}

fn session_not_found() -> ApiError {
    ApiError::NotFound("Session not found".to_string())
}

pub async fn list_sessions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let sessions = state.sessions.list_sessions().await;
    Json(json!({ "sessions": sessions }))
}

pub async fn create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.sessions.create_session().await;
    Json(json!({ "session": session }))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .sessions
        .get_session(&session_id)
        .await
        .ok_or_else(session_not_found)?;
    let messages = state
        .sessions
        .get_history(&session_id)
        .await
        .ok_or_else(session_not_found)?;

    Ok(Json(json!({ "session": session, "messages": messages })))
}

/// Runs one turn against the session transcript.
///
/// Pipeline failures are part of the conversation: the error text is stored
/// as the assistant turn and the response carries `failed: true`. Turns on
/// one session are serialized, so each prompt sees every earlier turn.
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(payload): Json<PostMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }

    let pipeline = state.pipeline.clone();
    let message = payload.message;
    let (answer, messages) = state
        .sessions
        .with_turn(&session_id, |history| async move {
            pipeline.answer(history, &message).await
        })
        .await
        .ok_or_else(session_not_found)?;

    Ok(Json(json!({
        "reply": answer.text(),
        "failed": answer.is_failed(),
        "messages": messages
    })))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.sessions.delete_session(&session_id).await {
        return Err(session_not_found());
    }
    Ok(Json(json!({ "status": "success" })))
}
