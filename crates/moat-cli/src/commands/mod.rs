//! Command implementations.

pub mod discover;
pub mod report;
pub mod run;
pub mod scores;
pub mod thesis;

pub use self::discover::execute_discover;
pub use self::report::execute_report;
pub use self::run::execute_run;
pub use self::scores::execute_scores;
pub use self::thesis::execute_thesis;

use crate::config::Config;
use crate::error::Result;
use crate::source::FileExtractionSource;
use moat_llm::OllamaProvider;
use moat_pipeline::Pipeline;
use moat_store::SqliteStore;
use moat_thesis::ThesisConfig;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// The pipeline the CLI drives.
pub type CliPipeline = Pipeline<SqliteStore, FileExtractionSource, OllamaProvider>;

/// Resolved configuration shared by every command.
#[derive(Debug, Clone)]
pub struct Session {
    /// Loaded configuration
    pub config: Config,
    /// Database path after command-line overrides
    pub database: PathBuf,
    /// Thesis path after command-line overrides; `None` means the bundled thesis
    pub thesis: Option<PathBuf>,
}

impl Session {
    /// Apply command-line overrides to a loaded configuration.
    pub fn new(config: Config, database: Option<PathBuf>, thesis: Option<PathBuf>) -> Result<Self> {
        let database = match database {
            Some(path) => path,
            None => config.database_path()?,
        };
        let thesis = thesis.or_else(|| config.thesis.clone());
        Ok(Self {
            config,
            database,
            thesis,
        })
    }

    /// Load and validate the thesis.
    pub fn load_thesis(&self) -> Result<Arc<ThesisConfig>> {
        let thesis = match &self.thesis {
            Some(path) => ThesisConfig::load(path)?,
            None => ThesisConfig::default_thesis()?,
        };
        Ok(Arc::new(thesis))
    }

    /// Open the store, creating its directory if needed.
    pub fn open_store(&self) -> Result<SqliteStore> {
        if let Some(parent) = self.database.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        debug!("Opening store at {}", self.database.display());
        Ok(SqliteStore::new(&self.database)?)
    }
}
