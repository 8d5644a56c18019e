use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{chat, config, health, sessions};
use crate::state::AppState;

/// Creates the application router with all routes and middleware.
///
/// This function sets up:
/// - CORS middleware
/// - Health check endpoint
/// - Stateless chat endpoint
/// - Session and config API endpoints
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = build_cors_layer(&state.settings.server.cors_allowed_origins);
    Router::new()
        .route("/health", get(health::health))
        .route("/chat", post(chat::chat))
        .route("/api/config", get(config::get_config))
        .route(
            "/api/sessions",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route(
            "/api/sessions/:session_id",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route(
            "/api/sessions/:session_id/messages",
            post(sessions::post_message),
        )
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(configured: &[String]) -> CorsLayer {
    let origins = resolve_allowed_origins(configured)
        .into_iter()
        .filter_map(|origin| HeaderValue::from_str(&origin).ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}

fn resolve_allowed_origins(configured: &[String]) -> Vec<String> {
    let origins = configured
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();

    if origins.is_empty() {
        return default_local_origins();
    }
    origins
}

fn default_local_origins() -> Vec<String> {
    vec![
        "http://localhost".to_string(),
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
        "http://localhost:7860".to_string(),
        "http://127.0.0.1".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://127.0.0.1:5173".to_string(),
        "http://127.0.0.1:7860".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{spawn_server, test_state, ScriptedCompletion};
    use serde_json::{json, Value};

    #[test]
    fn blank_origins_fall_back_to_local_defaults() {
        assert_eq!(
            resolve_allowed_origins(&["  ".to_string()]),
            default_local_origins()
        );
        assert_eq!(
            resolve_allowed_origins(&[" https://ayur.example ".to_string()]),
            vec!["https://ayur.example".to_string()]
        );
    }

    #[tokio::test]
    async fn serves_chat_over_http() {
        let dir = tempfile::tempdir().unwrap();
        let completion = Arc::new(ScriptedCompletion::replying("Namaste."));
        let state = test_state(dir.path(), completion).await;
        let base = spawn_server(router(state)).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/chat", base))
            .json(&json!({ "message": "hello" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["reply"], "Namaste.");

        let response = client.get(format!("{}/health", base)).send().await.unwrap();
        assert_eq!(response.status(), 200);

        let response = client
            .post(format!("{}/chat", base))
            .json(&json!({ "text": "wrong field" }))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }
}
