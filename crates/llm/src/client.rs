//! Client for OpenAI-compatible chat-completions endpoints.
//!
//! Sends `POST {base_url}/chat/completions` with bearer auth and returns the
//! first choice's message content.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::GenerationError;
use crate::generator::{GenerationRequest, TextGenerator};

/// HTTP client for a chat-completions API.
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    /// Create a client with a default [`reqwest::Client`] (no timeout).
    pub fn new(base_url: String, api_key: Option<String>, model: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key, model)
    }

    /// Create a client reusing a configured [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        base_url: String,
        api_key: Option<String>,
        model: String,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, capturing the body
    /// text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GenerationError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

/// Chat-completions request body for a generation request.
pub fn build_request_body(model: &str, request: &GenerationRequest) -> serde_json::Value {
    serde_json::json!({
        "model": model,
        "temperature": request.temperature,
        "max_tokens": request.max_tokens,
        "messages": [
            { "role": "system", "content": request.system },
            { "role": "user", "content": request.prompt },
        ],
    })
}

/// Pull the first choice's text out of a chat-completions response.
pub fn extract_content(body: &str) -> Result<String, GenerationError> {
    let completion: ChatCompletion =
        serde_json::from_str(body).map_err(|e| GenerationError::Decode(e.to_string()))?;

    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(GenerationError::EmptyContent)
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;

        tracing::debug!(
            phase = request.phase.as_str(),
            model = %self.model,
            max_tokens = request.max_tokens,
            "Sending chat completion request",
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&build_request_body(&self.model, request))
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        extract_content(&body)
    }
}
