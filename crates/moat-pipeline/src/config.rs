//! Configuration for pipeline runs
//!
//! Defines the re-extraction skip window and which LLM stages run.

use crate::error::PipelineError;
use moat_enricher::EnricherConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SECONDS_PER_DAY: u64 = 86_400;

/// Configuration for the pipeline orchestrator
///
/// # Examples
///
/// ```
/// use moat_pipeline::PipelineConfig;
///
/// // Default configuration: re-extract weekly
/// let config = PipelineConfig::default();
/// assert_eq!(config.skip_window_days, 7);
///
/// // Aggressive refresh
/// let config = PipelineConfig::aggressive();
/// assert_eq!(config.skip_window_days, 1);
///
/// // Lenient refresh
/// let config = PipelineConfig::lenient();
/// assert_eq!(config.skip_window_days, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Days before an extracted company is extracted again
    /// Default: 7 days
    #[serde(default = "default_skip_window_days")]
    pub skip_window_days: u64,

    /// Re-run every stage regardless of completion markers
    /// Default: false
    #[serde(default)]
    pub force: bool,

    /// Run the semantic enrichment batcher when an LLM is configured
    /// Default: true
    #[serde(default = "default_true")]
    pub enrichment_enabled: bool,

    /// Run the per-company LLM moat analysis when an LLM is configured
    /// Default: true
    #[serde(default = "default_true")]
    pub analysis_enabled: bool,

    /// Settings for the semantic batcher
    #[serde(default)]
    pub enricher: EnricherConfig,
}

fn default_skip_window_days() -> u64 {
    7
}

fn default_true() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            skip_window_days: default_skip_window_days(),
            force: false,
            enrichment_enabled: true,
            analysis_enabled: true,
            enricher: EnricherConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Aggressive refresh: daily re-extraction, one company per LLM call
    pub fn aggressive() -> Self {
        Self {
            skip_window_days: 1,
            enricher: EnricherConfig::aggressive(),
            ..Self::default()
        }
    }

    /// Lenient refresh: monthly re-extraction, long LLM inputs
    pub fn lenient() -> Self {
        Self {
            skip_window_days: 30,
            enricher: EnricherConfig::lenient(),
            ..Self::default()
        }
    }

    /// Get the skip window as a Duration
    pub fn skip_window(&self) -> Duration {
        Duration::from_secs(self.skip_window_days * SECONDS_PER_DAY)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.skip_window_days == 0 {
            return Err("skip_window_days must be at least 1 (use force to rerun)".to_string());
        }
        if self.skip_window_days > 365 {
            return Err("skip_window_days must be at most 365".to_string());
        }
        self.enricher.validate()
    }

    /// Parse and validate from TOML
    pub fn from_toml(text: &str) -> Result<Self, PipelineError> {
        let config: PipelineConfig =
            toml::from_str(text).map_err(|e| PipelineError::Config(e.to_string()))?;
        config.validate().map_err(PipelineError::Config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.skip_window(), Duration::from_secs(7 * 86_400));
        assert!(!config.force);
        assert!(config.enrichment_enabled);
        assert!(config.analysis_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_ordering() {
        assert!(PipelineConfig::aggressive().skip_window() < PipelineConfig::default().skip_window());
        assert!(PipelineConfig::lenient().skip_window() > PipelineConfig::default().skip_window());
        assert_eq!(PipelineConfig::aggressive().enricher.batch_size, Some(1));
    }

    #[test]
    fn test_validation() {
        let config = PipelineConfig {
            skip_window_days: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.enricher.batch_size = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_with_defaults() {
        let config = PipelineConfig::from_toml("skip_window_days = 14\nanalysis_enabled = false\n").unwrap();
        assert_eq!(config.skip_window_days, 14);
        assert!(config.enrichment_enabled);
        assert!(!config.analysis_enabled);
        assert_eq!(config.enricher, EnricherConfig::default());

        let text = "skip_window_days = 3\n[enricher]\nbatch_size = 2\nmax_description_chars = 500\nmax_website_chars = 900\nmax_certifications = 4\ncall_timeout_secs = 30\n";
        let config = PipelineConfig::from_toml(text).unwrap();
        assert_eq!(config.enricher.batch_size, Some(2));

        assert!(matches!(
            PipelineConfig::from_toml("skip_window_days = 0"),
            Err(PipelineError::Config(_))
        ));
    }
}
