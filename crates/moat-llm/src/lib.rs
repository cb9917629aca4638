//! Moat LLM Provider Layer
//!
//! Pluggable LLM provider implementations plus the pieces every LLM-facing
//! stage shares.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//!
//! # Shared pieces
//!
//! - [`json`]: ordered parse strategies that recover JSON from sloppy LLM output
//! - [`CostTracker`]: process-wide token/cost accumulator, injected into stages
//! - [`ProviderProfile`]: capability profile used to size enrichment batches
//!
//! # Examples
//!
//! ```
//! use moat_llm::MockProvider;
//! use moat_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt").unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod cost;
pub mod json;
pub mod ollama;
pub mod profile;

use moat_domain::traits::LlmProvider as LlmProviderTrait;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use cost::{CostEntry, CostTracker};
pub use json::{parse_tolerant, ParseError, Parsed};
pub use ollama::OllamaProvider;
pub use profile::ProviderProfile;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

const ERROR_MARKER: &str = "ERROR";

/// Mock LLM provider for deterministic testing
///
/// Responses are selected by prompt fragment: the first registered rule whose
/// fragment occurs in the prompt wins, otherwise the default response is used.
/// Every prompt is recorded so tests can assert on what was sent.
///
/// # Examples
///
/// ```
/// use moat_llm::MockProvider;
/// use moat_domain::traits::LlmProvider;
///
/// let mut provider = MockProvider::new("[]");
/// provider.add_response("Name: Acme", r#"[{"regulatory": {"score": 70}}]"#);
/// assert!(provider.generate("... Name: Acme ...").unwrap().contains("regulatory"));
/// assert_eq!(provider.generate("anything else").unwrap(), "[]");
/// assert_eq!(provider.call_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    rules: Arc<Mutex<Vec<(String, String)>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    provider_name: String,
    model_name: String,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            rules: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            provider_name: "mock".to_string(),
            model_name: "mock-model".to_string(),
        }
    }

    /// Pretend to be a specific provider family (affects batch sizing)
    pub fn with_provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider_name = name.into();
        self
    }

    /// Respond with `response` whenever the prompt contains `fragment`
    pub fn add_response(&mut self, fragment: impl Into<String>, response: impl Into<String>) {
        if let Ok(mut rules) = self.rules.lock() {
            rules.push((fragment.into(), response.into()));
        }
    }

    /// Fail whenever the prompt contains `fragment`
    pub fn add_error(&mut self, fragment: impl Into<String>) {
        self.add_response(fragment, ERROR_MARKER);
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Prompts received so far, in order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Reset the call log
    pub fn reset_call_count(&self) {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.clear();
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.prompts
            .lock()
            .map_err(|e| LlmError::Other(format!("Mock lock poisoned: {}", e)))?
            .push(prompt.to_string());

        let rules = self
            .rules
            .lock()
            .map_err(|e| LlmError::Other(format!("Mock lock poisoned: {}", e)))?;
        let response = rules
            .iter()
            .find(|(fragment, _)| prompt.contains(fragment.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.default_response.clone());

        if response == ERROR_MARKER {
            return Err(LlmError::Other("Mock error".to_string()));
        }
        Ok(response)
    }

    fn generate_structured(&self, prompt: &str, _schema: &str) -> Result<String, Self::Error> {
        self.generate(prompt)
    }

    fn provider_name(&self) -> &str {
        &self.provider_name
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
