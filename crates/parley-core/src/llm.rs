//! LlmProvider trait definition.
//!
//! The outbound side of the generation pipeline: an implementation shapes
//! the conversation into its provider's wire format, issues the HTTP call,
//! and validates the response body down to a single reply string.
//!
//! Providers are mutually exclusive variants selected at startup; adding a
//! provider means adding one more implementation of this contract.

use parley_types::error::LlmError;
use parley_types::message::Message;
use secrecy::SecretString;

/// Trait for LLM provider clients (Anthropic, OpenAI-compatible, ...).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in parley-infra.
///
/// The API key arrives as a call parameter -- providers hold no credentials
/// and the core never reads process-wide configuration. The key is wrapped
/// in [`SecretString`] and only exposed when building auth headers.
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "anthropic", "openai").
    fn name(&self) -> &str;

    /// Turn the ordered conversation history into one reply string.
    ///
    /// Exactly one attempt; no retries. Any transport failure, non-success
    /// status, or shape mismatch surfaces as [`LlmError`] for the pipeline
    /// boundary to collapse.
    fn generate(
        &self,
        system: &str,
        history: &[Message],
        api_key: &SecretString,
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send;
}
