//! OpenAiClient -- [`LlmProvider`] implementation for the OpenAI chat
//! completions API (`POST /v1/chat/completions`).
//!
//! Unlike the Anthropic wire format, the system prompt travels as the
//! first entry of the messages array with role `system`.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use parley_core::llm::LlmProvider;
use parley_types::error::LlmError;
use parley_types::message::Message;

/// Model used when the operator does not name one.
pub const DEFAULT_MODEL: &str = "gpt-4o";

const MAX_TOKENS: u32 = 1024;

/// OpenAI chat completions provider client.
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(model: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: "https://api.openai.com".to_string(),
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

    fn build_request(&self, system: &str, history: &[Message]) -> CompletionsRequest {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(WireMessage {
            role: "system".to_string(),
            content: system.to_string(),
        });
        messages.extend(history.iter().map(|m| WireMessage {
            role: m.role.to_string(),
            content: m.content.clone(),
        }));

        CompletionsRequest {
            model: self.model.clone(),
            messages,
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
            top_p: 1.0,
            n: 1,
            stream: false,
        }
    }
}

impl LlmProvider for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(
        &self,
        system: &str,
        history: &[Message],
        api_key: &SecretString,
    ) -> Result<String, LlmError> {
        let body = self.build_request(system, history);
        let url = format!("{}/v1/chat/completions", self.base_url);
        debug!(model = %self.model, turns = history.len(), "requesting completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key.expose_secret())
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

/// Request body for the chat completions API.
#[derive(Debug, Clone, Serialize)]
struct CompletionsRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
    n: u32,
    stream: bool,
}

#[derive(Debug, Clone, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompletionsResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Validate a chat completions response body and extract the reply text.
///
/// Pure: rejects a missing or empty `choices` array and any first choice
/// without a string `message.content`, and returns the trimmed text
/// otherwise.
fn extract_reply(value: serde_json::Value) -> Result<String, LlmError> {
    let response: CompletionsResponse = serde_json::from_value(value)
        .map_err(|e| LlmError::Format(format!("unexpected response shape: {e}")))?;

    let first = response
        .choices
        .first()
        .ok_or_else(|| LlmError::Format("response choices are empty".to_string()))?;

    Ok(first.message.content.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_types::message::MessageRole;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use uuid::Uuid;

    /// Answer one request on a local port with the given status line and
    /// body.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 8192];
            let _ = stream.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len(),
            );
            let _ = stream.write_all(response.as_bytes()).await;
        });
        format!("http://{addr}")
    }

    fn history_entry(role: MessageRole, content: &str) -> Message {
        let now = chrono::Utc::now();
        Message {
            id: Uuid::now_v7(),
            chat_id: Uuid::now_v7(),
            role,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_request_prepends_system_message() {
        let client = OpenAiClient::new(DEFAULT_MODEL.to_string());
        let history = vec![history_entry(MessageRole::User, "hello")];

        let request = client.build_request("be brief", &history);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["model"], "gpt-4o");
        assert_eq!(value["temperature"], 0.0);
        assert_eq!(value["stream"], false);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][0]["content"], "be brief");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["messages"][1]["content"], "hello");
    }

    #[tokio::test]
    async fn test_generate_surfaces_non_success_status() {
        let client = OpenAiClient::new(DEFAULT_MODEL.to_string())
            .with_base_url(serve_once("503 Service Unavailable", "upstream down").await);
        assert_eq!(client.model(), DEFAULT_MODEL);

        let history = vec![history_entry(MessageRole::User, "hello")];
        let err = client
            .generate("be brief", &history, &SecretString::from("test-key-not-real"))
            .await
            .unwrap_err();

        match err {
            LlmError::Status { status, body } => {
                assert_eq!(status, 503);
                assert!(body.contains("upstream down"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_reply_trims_first_choice() {
        let body = json!({"choices": [{"message": {"content": "  hi  "}}]});
        assert_eq!(extract_reply(body).unwrap(), "hi");
    }

    #[test]
    fn test_extract_reply_rejects_empty_choices() {
        let body = json!({"choices": []});
        assert!(matches!(extract_reply(body), Err(LlmError::Format(_))));
    }

    #[test]
    fn test_extract_reply_rejects_missing_choices() {
        let body = json!({"object": "chat.completion"});
        assert!(matches!(extract_reply(body), Err(LlmError::Format(_))));
    }

    #[test]
    fn test_extract_reply_rejects_non_string_content() {
        let body = json!({"choices": [{"message": {"content": null}}]});
        assert!(matches!(extract_reply(body), Err(LlmError::Format(_))));
    }
}
