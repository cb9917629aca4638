//! Configuration for the semantic batcher

use crate::error::EnricherError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Semantic Enrichment Batcher
///
/// # Examples
///
/// ```
/// use moat_enricher::EnricherConfig;
///
/// let config = EnricherConfig::default();
/// assert_eq!(config.max_description_chars, 1500);
/// assert!(config.batch_size.is_none());
///
/// let config = EnricherConfig::aggressive();
/// assert_eq!(config.batch_size, Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnricherConfig {
    /// Companies per prompt; `None` defers to the provider profile
    pub batch_size: Option<usize>,

    /// Description characters sent per company
    pub max_description_chars: usize,

    /// Website text characters sent per company
    pub max_website_chars: usize,

    /// Certifications listed per company
    pub max_certifications: usize,

    /// Maximum time for a single LLM call (seconds)
    pub call_timeout_secs: u64,
}

impl Default for EnricherConfig {
    fn default() -> Self {
        Self {
            batch_size: None,
            max_description_chars: 1500,
            max_website_chars: 3000,
            max_certifications: 10,
            call_timeout_secs: 120,
        }
    }
}

impl EnricherConfig {
    /// Aggressive preset: one company per call, short inputs, short timeout
    ///
    /// For small local models that lose track of multi-company prompts.
    pub fn aggressive() -> Self {
        Self {
            batch_size: Some(1),
            max_description_chars: 800,
            max_website_chars: 1500,
            max_certifications: 5,
            call_timeout_secs: 60,
        }
    }

    /// Lenient preset: long inputs and a generous timeout
    pub fn lenient() -> Self {
        Self {
            batch_size: None,
            max_description_chars: 3000,
            max_website_chars: 6000,
            max_certifications: 20,
            call_timeout_secs: 300,
        }
    }

    /// Get the call timeout as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == Some(0) {
            return Err("batch_size must be greater than 0".to_string());
        }
        if self.max_description_chars == 0 || self.max_website_chars == 0 {
            return Err("truncation limits must be greater than 0".to_string());
        }
        if self.call_timeout_secs == 0 {
            return Err("call_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Parse and validate from TOML
    pub fn from_toml(text: &str) -> Result<Self, EnricherError> {
        let config: EnricherConfig =
            toml::from_str(text).map_err(|e| EnricherError::Config(e.to_string()))?;
        config.validate().map_err(EnricherError::Config)?;
        Ok(config)
    }

    /// Serialise to TOML
    pub fn to_toml(&self) -> Result<String, EnricherError> {
        toml::to_string_pretty(self).map_err(|e| EnricherError::Config(e.to_string()))
    }
}
