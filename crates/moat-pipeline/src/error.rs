//! Error types for pipeline runs

use thiserror::Error;

/// Errors that abort a pipeline operation
///
/// Per-company failures never surface here; they are logged and counted in
/// the run metrics.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
