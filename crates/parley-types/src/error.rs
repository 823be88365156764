use thiserror::Error;

/// Errors from resource backend operations.
///
/// Not-found is never an error: lookups, updates, and deletes that miss
/// return `Ok(None)`. These variants cover genuine I/O and constraint
/// failures only, and they propagate to the caller unchanged.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("constraint violation: {0}")]
    Constraint(String),
}

/// Errors from a single LLM provider call.
///
/// Internal to the generation pipeline: the pipeline boundary collapses
/// every variant into [`ChatError::ProviderUnavailable`], logging the
/// original diagnostic. The variants exist so logs can distinguish a dead
/// network from a malformed body.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The HTTP call itself failed (DNS, connect, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered with a non-success status.
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// A success status carried a body that does not match the expected
    /// shape (missing or empty arrays, missing text, non-string content).
    #[error("malformed provider response: {0}")]
    Format(String),
}

/// Errors surfaced by the chat service to the HTTP layer.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("chat not found")]
    ChatNotFound,

    /// The only error kind the generation pipeline ever surfaces,
    /// deliberately coarse so callers need not branch on provider detail.
    #[error("message provider unavailable")]
    ProviderUnavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::Status {
            status: 529,
            body: "overloaded".to_string(),
        };
        assert!(err.to_string().contains("529"));
    }

    #[test]
    fn test_chat_error_wraps_storage() {
        let err: ChatError = StorageError::Connection.into();
        assert_eq!(err.to_string(), "database connection error");
    }
}
