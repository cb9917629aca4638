//! Error types for semantic enrichment

use thiserror::Error;

/// Reasons a batch fails
///
/// These never leave the batcher as `Err`: they end up as the `error` string
/// of a failed [`SemanticEvidence`](moat_domain::SemanticEvidence).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnricherError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// LLM call exceeded the configured timeout
    #[error("LLM call timed out after {0}s")]
    Timeout(u64),

    /// No parse strategy recovered JSON from the response
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// JSON recovered but does not describe the batch
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<moat_llm::ParseError> for EnricherError {
    fn from(e: moat_llm::ParseError) -> Self {
        EnricherError::JsonParse(e.to_string())
    }
}
