//! Provider capability profiles
//!
//! Weaker providers lose track of company boundaries in long prompts, so the
//! number of companies packed into one enrichment call depends on who answers.

/// Capability profile of an LLM provider family
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProviderProfile {
    /// Companies per enrichment batch
    pub batch_size: usize,
    /// USD per million input tokens
    pub input_cost_per_mtok: f64,
    /// USD per million output tokens
    pub output_cost_per_mtok: f64,
}

impl ProviderProfile {
    /// Profile for a provider family name (case-insensitive)
    pub fn for_provider(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "anthropic" | "openai" => Self {
                batch_size: 5,
                input_cost_per_mtok: 3.0,
                output_cost_per_mtok: 15.0,
            },
            "gemini" | "groq" | "mistral" => Self {
                batch_size: 3,
                input_cost_per_mtok: 0.5,
                output_cost_per_mtok: 1.5,
            },
            "ollama" => Self {
                batch_size: 2,
                input_cost_per_mtok: 0.0,
                output_cost_per_mtok: 0.0,
            },
            _ => Self {
                batch_size: 1,
                input_cost_per_mtok: 0.0,
                output_cost_per_mtok: 0.0,
            },
        }
    }

    /// Cost in USD of a call with the given token counts
    pub fn cost_usd(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        (input_tokens as f64 * self.input_cost_per_mtok
            + output_tokens as f64 * self.output_cost_per_mtok)
            / 1_000_000.0
    }
}

/// Rough token estimate (≈ 4 characters per token)
pub fn estimate_tokens(text: &str) -> u64 {
    (text.chars().count() as u64).div_ceil(4)
}
