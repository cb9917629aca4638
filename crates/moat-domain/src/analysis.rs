//! Full scoring rationale stored as `moat_analysis`

use crate::Tier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which soft source supplied a pillar's LLM evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoftEvidenceSource {
    /// Semantic enrichment sub-score
    Semantic,
    /// LLM moat-analysis response
    LlmAnalysis,
    /// No usable soft evidence
    None,
}

/// Per-pillar scoring breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarBreakdown {
    /// Deterministic evidence score
    pub hard_score: i32,
    /// LLM-derived evidence score
    pub soft_score: i32,
    /// Where the soft score came from
    pub soft_source: SoftEvidenceSource,
    /// `max(hard, soft)` clamped to the pillar's maximum
    pub raw_score: i32,
    /// Thesis weight
    pub weight: f64,
    /// Thesis evidence threshold
    pub evidence_threshold: i32,
    /// Whether the raw score met the threshold
    pub present: bool,
    /// Weighted contribution to the moat score
    pub contribution: f64,
}

/// A single risk penalty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Penalty {
    /// What triggered it
    pub reason: String,
    /// Points subtracted
    pub amount: i32,
}

/// Informational deal-screening sub-scores (never added to the moat score)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DealScreening {
    /// Revenue sweet-spot and margin fit [0, 100]
    pub financial_fit: i32,
    /// Market share, competitor count and growth [0, 100]
    pub competitive_position: i32,
    /// How each component was derived
    pub notes: Vec<String>,
}

/// Complete rationale for one scoring pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoatAnalysis {
    /// Thesis name
    pub thesis_name: String,
    /// Thesis version
    pub thesis_version: String,
    /// Pillar name → breakdown
    pub pillars: BTreeMap<String, PillarBreakdown>,
    /// Sum of contributions before penalties
    pub weighted_score: f64,
    /// Risk penalties applied, in order
    pub penalties: Vec<Penalty>,
    /// Sum of penalties (never above the thesis ceiling)
    pub total_penalty: i32,
    /// Deal-screening sub-scores
    pub deal_screening: DealScreening,
    /// Final integer score (may be negative)
    pub final_score: i32,
    /// Tier assigned from the final score
    pub tier: Tier,
}
