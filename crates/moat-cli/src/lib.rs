//! Moat CLI library.
//!
//! This library provides the command-line front end for the moat scoring
//! pipeline: configuration management, an offline extraction source,
//! command execution and output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod source;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
pub use source::FileExtractionSource;
