//! Pillar evidence: scored attributes, semantic sub-scores and LLM analysis

use crate::Tier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-pillar outcome exposed on the company record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PillarAttribute {
    /// Whether the raw score met the pillar's evidence threshold
    pub present: bool,

    /// Justification (empty when the pillar is not present)
    pub justification: String,

    /// Raw pillar score
    pub score: i32,
}

/// One pillar's sub-score from semantic enrichment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticPillarScore {
    /// Score reported by the LLM, clamped to the pillar's range
    pub score: i32,

    /// Confidence reported by the LLM [0.0, 1.0]
    pub confidence: f64,

    /// Plausible score range (low, high)
    pub band: (i32, i32),

    /// Short justification
    pub justification: String,

    /// Confidence after capping by input quality
    pub effective_confidence: f64,
}

/// Semantic sub-object attached by the enrichment batcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticEvidence {
    /// Pillar name → sub-score
    pub pillars: BTreeMap<String, SemanticPillarScore>,

    /// Share of the six input signals that were populated [0.0, 1.0]
    pub input_quality: f64,

    /// Whether the LLM response for this company parsed
    pub enrichment_successful: bool,

    /// Failure description when enrichment did not succeed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Model that produced the evidence
    pub model: String,

    /// When the evidence was produced
    pub enriched_at: u64,
}

impl SemanticEvidence {
    /// A failed enrichment record
    pub fn failed(error: impl Into<String>, input_quality: f64, model: impl Into<String>, now: u64) -> Self {
        Self {
            pillars: BTreeMap::new(),
            input_quality,
            enrichment_successful: false,
            error: Some(error.into()),
            model: model.into(),
            enriched_at: now,
        }
    }
}

/// One pillar entry of an LLM moat-analysis response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmPillarScore {
    /// Score reported by the LLM
    pub score: i32,

    /// Evidence text
    pub evidence: String,
}

/// Parsed LLM moat-analysis response for one company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmMoatAnalysis {
    /// Pillar name → score and evidence
    pub pillars: BTreeMap<String, LlmPillarScore>,

    /// Overall score the LLM suggested (informational)
    #[serde(default)]
    pub overall_moat_score: Option<i32>,

    /// Tier the LLM suggested (informational)
    #[serde(default)]
    pub recommended_tier: Option<Tier>,

    /// Free-text reasoning
    #[serde(default)]
    pub reasoning: String,
}
