//! Error types for thesis loading

use thiserror::Error;

/// Errors raised while loading a thesis. All of them are fatal at startup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThesisError {
    /// Thesis file could not be read
    #[error("Failed to read thesis file {path}: {message}")]
    Io {
        /// Path that was attempted
        path: String,
        /// Underlying I/O error
        message: String,
    },

    /// TOML syntax or shape error
    #[error("Thesis parse error: {0}")]
    Parse(String),

    /// Thesis parsed but breaks a validation rule
    #[error("Invalid thesis: {0}")]
    Invalid(String),
}

impl From<toml::de::Error> for ThesisError {
    fn from(e: toml::de::Error) -> Self {
        ThesisError::Parse(e.to_string())
    }
}
