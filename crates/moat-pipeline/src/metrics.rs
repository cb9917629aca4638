//! Metrics collected during pipeline runs

use serde::{Deserialize, Serialize};

/// Counts collected during one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineMetrics {
    /// New companies stored by discovery
    pub discovered: usize,

    /// Discovery records matching an existing company
    pub duplicates: usize,

    /// Companies extracted this run
    pub extracted: usize,

    /// Re-extracted companies whose facts did not change
    pub facts_unchanged: usize,

    /// Individual extraction steps that failed
    pub extraction_step_failures: usize,

    /// Companies given successful semantic evidence
    pub enriched: usize,

    /// Companies whose enrichment failed
    pub enrichment_failures: usize,

    /// Companies retried on their own after a batch failed
    pub enrichment_retries: usize,

    /// Companies given an LLM moat analysis
    pub analysed: usize,

    /// LLM moat analyses that failed
    pub analysis_failures: usize,

    /// Companies scored
    pub scored: usize,

    /// Companies marked as lacking input
    pub insufficient_data: usize,

    /// Scoring events appended
    pub events_appended: usize,

    /// Companies skipped because they are soft-excluded
    pub excluded: usize,

    /// Per-company store failures
    pub store_failures: usize,

    /// LLM calls made during the run
    pub llm_calls: u64,

    /// Estimated LLM spend during the run
    pub llm_cost_usd: f64,

    /// Total runtime in seconds
    pub total_runtime_secs: u64,
}

impl PipelineMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-company failures of any kind
    pub fn total_failures(&self) -> usize {
        self.enrichment_failures + self.analysis_failures + self.store_failures
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Pipeline Run Summary".to_string(),
            "====================".to_string(),
            format!("Total runtime: {}s", self.total_runtime_secs),
            String::new(),
        ];

        if self.discovered > 0 || self.duplicates > 0 {
            lines.push("Discovery:".to_string());
            lines.push(format!("  New: {}", self.discovered));
            lines.push(format!("  Duplicates: {}", self.duplicates));
            lines.push(String::new());
        }

        lines.push("Extraction:".to_string());
        lines.push(format!("  Extracted: {}", self.extracted));
        lines.push(format!("  Unchanged: {}", self.facts_unchanged));
        lines.push(format!("  Step failures: {}", self.extraction_step_failures));
        lines.push(String::new());

        if self.enriched + self.enrichment_failures + self.analysed + self.analysis_failures > 0 {
            lines.push("LLM stages:".to_string());
            lines.push(format!("  Enriched: {}", self.enriched));
            lines.push(format!("  Enrichment failures: {}", self.enrichment_failures));
            lines.push(format!("  Single-company retries: {}", self.enrichment_retries));
            lines.push(format!("  Analysed: {}", self.analysed));
            lines.push(format!("  Analysis failures: {}", self.analysis_failures));
            lines.push(format!("  Calls: {} (${:.4})", self.llm_calls, self.llm_cost_usd));
            lines.push(String::new());
        }

        lines.push("Scoring:".to_string());
        lines.push(format!("  Scored: {}", self.scored));
        lines.push(format!("  Insufficient data: {}", self.insufficient_data));
        lines.push(format!("  Events appended: {}", self.events_appended));

        if self.excluded > 0 || self.store_failures > 0 {
            lines.push(String::new());
            lines.push(format!("Excluded: {}", self.excluded));
            lines.push(format!("Store failures: {}", self.store_failures));
        }

        lines.join("\n")
    }
}
