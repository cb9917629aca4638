//! Process-wide LLM cost accounting
//!
//! A single [`CostTracker`] is created at startup and shared (`Arc`) with
//! every stage that calls an LLM. Each increment happens inside one exclusive
//! section so concurrent stages never lose an update.

use crate::profile::{estimate_tokens, ProviderProfile};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Accumulated usage for one (provider, model) pair
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostEntry {
    /// Number of calls
    pub calls: u64,
    /// Estimated input tokens
    pub input_tokens: u64,
    /// Estimated output tokens
    pub output_tokens: u64,
    /// Estimated cost in USD
    pub cost_usd: f64,
}

/// Token and cost accumulator keyed by provider and model
#[derive(Debug, Default)]
pub struct CostTracker {
    entries: Mutex<BTreeMap<(String, String), CostEntry>>,
}

impl CostTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one call with explicit token counts
    pub fn record(&self, provider: &str, model: &str, input_tokens: u64, output_tokens: u64) {
        let cost = ProviderProfile::for_provider(provider).cost_usd(input_tokens, output_tokens);
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let entry = entries
            .entry((provider.to_string(), model.to_string()))
            .or_default();
        entry.calls += 1;
        entry.input_tokens += input_tokens;
        entry.output_tokens += output_tokens;
        entry.cost_usd += cost;
    }

    /// Record one call, estimating tokens from prompt and response text
    pub fn record_call(&self, provider: &str, model: &str, prompt: &str, response: &str) {
        self.record(provider, model, estimate_tokens(prompt), estimate_tokens(response));
    }

    /// Snapshot of every entry
    pub fn snapshot(&self) -> BTreeMap<(String, String), CostEntry> {
        match self.entries.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Total calls across all providers
    pub fn total_calls(&self) -> u64 {
        self.snapshot().values().map(|e| e.calls).sum()
    }

    /// Total estimated cost in USD
    pub fn total_cost_usd(&self) -> f64 {
        self.snapshot().values().map(|e| e.cost_usd).sum()
    }

    /// Human-readable summary
    pub fn summary(&self) -> String {
        let snapshot = self.snapshot();
        if snapshot.is_empty() {
            return "LLM usage: no calls".to_string();
        }
        let mut lines = vec!["LLM usage:".to_string()];
        for ((provider, model), entry) in &snapshot {
            lines.push(format!(
                "  {}/{}: {} calls, {} in / {} out tokens, ${:.4}",
                provider, model, entry.calls, entry.input_tokens, entry.output_tokens, entry.cost_usd
            ));
        }
        lines.push(format!("  Total: ${:.4}", self.total_cost_usd()));
        lines.join("\n")
    }
}
