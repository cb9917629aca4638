//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Thesis failed to load or validate
    #[error(transparent)]
    Thesis(#[from] moat_thesis::ThesisError),

    /// Store error
    #[error(transparent)]
    Store(#[from] moat_store::StoreError),

    /// Pipeline error
    #[error(transparent)]
    Pipeline(#[from] moat_pipeline::PipelineError),

    /// LLM provider could not be set up
    #[error(transparent)]
    Llm(#[from] moat_llm::LlmError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
