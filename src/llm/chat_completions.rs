//! OpenAI-compatible `/chat/completions` client (Groq by default).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde_json::{json, Value};

use super::provider::CompletionProvider;
use super::types::PromptRequest;
use crate::core::config::settings::CompletionConfig;
use crate::core::errors::{CompletionFailure, RagError};

#[derive(Clone)]
pub struct ChatCompletionsClient {
    api_url: String,
    model: String,
    client: Client,
}

impl ChatCompletionsClient {
    /// Fails when the bearer credential is missing so a misconfigured
    /// process stops at startup instead of on its first request.
    pub fn new(
        api_url: &str,
        api_key: Option<&str>,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, RagError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                RagError::Configuration(
                    "missing completion API key (set GROQ_API_KEY or completion.api_key)"
                        .to_string(),
                )
            })?;
        if model.trim().is_empty() {
            return Err(RagError::Configuration(
                "missing completion model name".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| RagError::Configuration("invalid completion API key".to_string()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| RagError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_url: api_url.to_string(),
            model: model.to_string(),
            client,
        })
    }

    pub fn from_config(config: &CompletionConfig) -> Result<Self, RagError> {
        Self::new(
            &config.api_url,
            config.api_key.as_deref(),
            &config.model,
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl CompletionProvider for ChatCompletionsClient {
    fn name(&self) -> &str {
        "chat_completions"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &PromptRequest) -> Result<String, CompletionFailure> {
        let body = json!({
            "model": self.model,
            "messages": request.messages,
        });

        let res = self
            .client
            .post(&self.api_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionFailure::Transport(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(CompletionFailure::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let payload: Value = res
            .json()
            .await
            .map_err(|e| CompletionFailure::MalformedResponse(e.to_string()))?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                CompletionFailure::MalformedResponse(
                    "missing choices[0].message.content".to_string(),
                )
            })
    }
}
