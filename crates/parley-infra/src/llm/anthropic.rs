//! AnthropicClient -- concrete [`LlmProvider`] implementation for the
//! Anthropic Messages API (`POST /v1/messages`).
//!
//! The API key arrives per call wrapped in [`SecretString`] and is only
//! exposed when the auth header is built; it never appears in Debug output
//! or logs.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use parley_core::llm::LlmProvider;
use parley_types::error::LlmError;
use parley_types::message::Message;

/// Model used when the operator does not name one.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";

/// Upper bound on generated tokens per reply.
const MAX_TOKENS: u32 = 1024;

/// Anthropic Claude provider client.
pub struct AnthropicClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl AnthropicClient {
    /// The Anthropic API version header value.
    const API_VERSION: &'static str = "2023-06-01";

    pub fn new(model: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: "https://api.anthropic.com".to_string(),
            model,
        }
    }

    /// Override the base URL (useful for tests or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Shape the conversation into the Messages API request body.
    ///
    /// The system prompt rides in the top-level `system` field, not the
    /// messages array.
    fn build_request(&self, system: &str, history: &[Message]) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            system: system.to_string(),
            messages: history
                .iter()
                .map(|m| WireMessage {
                    role: m.role.to_string(),
                    content: m.content.clone(),
                })
                .collect(),
        }
    }
}

impl LlmProvider for AnthropicClient {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(
        &self,
        system: &str,
        history: &[Message],
        api_key: &SecretString,
    ) -> Result<String, LlmError> {
        let body = self.build_request(system, history);
        let url = format!("{}/v1/messages", self.base_url);
        debug!(model = %self.model, turns = history.len(), "requesting completion");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key.expose_secret())
            .header("anthropic-version", Self::API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Format(e.to_string()))?;

        extract_reply(value)
    }
}

/// Request body for the Messages API.
#[derive(Debug, Clone, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<WireMessage>,
}

#[derive(Debug, Clone, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: String,
}

/// Validate a Messages API response body and extract the reply text.
///
/// Pure: rejects a missing or empty `content` array and any first block
/// without a string `text` field, and returns the trimmed text otherwise.
fn extract_reply(value: serde_json::Value) -> Result<String, LlmError> {
    let response: MessagesResponse = serde_json::from_value(value)
        .map_err(|e| LlmError::Format(format!("unexpected response shape: {e}")))?;

    let first = response
        .content
        .first()
        .ok_or_else(|| LlmError::Format("response content is empty".to_string()))?;

    Ok(first.text.trim().to_string())
}
