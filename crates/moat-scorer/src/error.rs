//! Error types for the LLM moat analysis

use thiserror::Error;

/// Errors from [`MoatAnalyst`](crate::MoatAnalyst)
///
/// Scoring itself is infallible; only the optional LLM analysis step can fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScorerError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// LLM call exceeded the configured timeout
    #[error("LLM call timed out after {0}s")]
    Timeout(u64),

    /// No parse strategy recovered JSON from the response
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// JSON recovered but not a usable moat analysis
    #[error("Invalid moat analysis: {0}")]
    InvalidFormat(String),
}

impl From<moat_llm::ParseError> for ScorerError {
    fn from(e: moat_llm::ParseError) -> Self {
        ScorerError::JsonParse(e.to_string())
    }
}
