//! LLM provider implementations.
//!
//! Concrete implementations of the [`LlmProvider`] trait defined in
//! `parley-core`: the Anthropic Messages API and the OpenAI chat
//! completions API. Providers are mutually exclusive and selected once at
//! startup; [`ProviderKind`] is the tagged variant the binary matches on.

pub mod anthropic;
pub mod openai;

use parley_core::llm::LlmProvider;
use parley_types::error::LlmError;
use parley_types::message::Message;
use secrecy::SecretString;

use self::anthropic::AnthropicClient;
use self::openai::OpenAiClient;

/// The provider selected at startup.
///
/// Delegates [`LlmProvider`] to the wrapped client, so callers generic over
/// the trait never branch on which provider is active.
pub enum ProviderKind {
    Anthropic(AnthropicClient),
    OpenAi(OpenAiClient),
}

impl ProviderKind {
    /// Construct the named provider with its default model.
    ///
    /// `model` overrides the provider default when present.
    pub fn from_name(name: &str, model: Option<String>) -> Option<Self> {
        match name {
            "anthropic" => Some(Self::Anthropic(AnthropicClient::new(
                model.unwrap_or_else(|| anthropic::DEFAULT_MODEL.to_string()),
            ))),
            "openai" => Some(Self::OpenAi(OpenAiClient::new(
                model.unwrap_or_else(|| openai::DEFAULT_MODEL.to_string()),
            ))),
            _ => None,
        }
    }
}

impl LlmProvider for ProviderKind {
    fn name(&self) -> &str {
        match self {
            Self::Anthropic(client) => client.name(),
            Self::OpenAi(client) => client.name(),
        }
    }

    async fn generate(
        &self,
        system: &str,
        history: &[Message],
        api_key: &SecretString,
    ) -> Result<String, LlmError> {
        match self {
            Self::Anthropic(client) => client.generate(system, history, api_key).await,
            Self::OpenAi(client) => client.generate(system, history, api_key).await,
        }
    }
}
