//! Moat Scoring Engine

use crate::delta::ScoreDelta;
use crate::hard_evidence::{self, HardEvidence};
use crate::penalties;
use crate::screening;
use moat_domain::{
    Company, MoatAnalysis, PillarAttribute, PillarBreakdown, ScoringEvent, ScoringStatus,
    SoftEvidenceSource, Tier,
};
use moat_thesis::{PillarConfig, ThesisConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Everything one scoring pass produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringOutcome {
    /// Scored, or not enough input to score
    pub status: ScoringStatus,
    /// Final score; `None` when the company could not be scored
    pub moat_score: Option<i32>,
    /// Tier for `moat_score`
    pub tier: Option<Tier>,
    /// Per-pillar attributes; empty when not scored
    pub attributes: BTreeMap<String, PillarAttribute>,
    /// Full rationale; `None` when not scored
    pub analysis: Option<MoatAnalysis>,
    /// Comparison with the previous scoring event
    pub delta: ScoreDelta,
}

impl ScoringOutcome {
    /// Whether a score was produced
    pub fn is_scored(&self) -> bool {
        self.status == ScoringStatus::Scored
    }

    /// Write the outcome onto the company record
    pub fn apply(&self, company: &mut Company, now: u64) {
        company.scoring_status = Some(self.status);
        company.moat_score = self.moat_score;
        company.tier = self.tier;
        company.moat_attributes = self.attributes.clone();
        company.moat_analysis = self.analysis.clone();
        company.scored_at = Some(now);
    }
}

/// Scores companies against a thesis
///
/// Stateless apart from the shared thesis; the previous scoring event is
/// passed in, so the engine never touches storage.
///
/// # Examples
///
/// ```
/// use moat_domain::{Certification, Company, Tier};
/// use moat_scorer::MoatScorer;
/// use moat_thesis::ThesisConfig;
/// use std::sync::Arc;
///
/// let scorer = MoatScorer::new(Arc::new(ThesisConfig::default_thesis().unwrap()));
///
/// let mut company = Company::new("Acme Secure Ltd", "test", 0);
/// company.description = Some("Managed security services for UK defence primes".to_string());
/// company.certifications.push(Certification::new("FCA Authorised"));
///
/// let outcome = scorer.score(&company, None);
/// assert!(outcome.is_scored());
/// // regulatory 80 x 0.25 = 20
/// assert_eq!(outcome.moat_score, Some(20));
/// assert_eq!(outcome.tier, Some(Tier::Waitlist));
/// ```
#[derive(Debug, Clone)]
pub struct MoatScorer {
    thesis: Arc<ThesisConfig>,
}

impl MoatScorer {
    /// Create a scorer for a thesis
    pub fn new(thesis: Arc<ThesisConfig>) -> Self {
        Self { thesis }
    }

    /// The thesis this scorer applies
    pub fn thesis(&self) -> &ThesisConfig {
        &self.thesis
    }

    /// Score a company, comparing against its previous event if any
    pub fn score(&self, company: &Company, previous: Option<&ScoringEvent>) -> ScoringOutcome {
        if !company.has_sufficient_input() {
            debug!("'{}' lacks input for scoring", company.name);
            return ScoringOutcome {
                status: ScoringStatus::InsufficientData,
                moat_score: None,
                tier: None,
                attributes: BTreeMap::new(),
                analysis: None,
                delta: ScoreDelta::compute(previous, None, &BTreeMap::new()),
            };
        }

        let thesis = self.thesis.as_ref();
        let text = company.searchable_text();

        let mut breakdowns = BTreeMap::new();
        let mut attributes = BTreeMap::new();
        let mut weighted_score = 0.0;

        for (name, pillar) in &thesis.pillars {
            let hard = hard_evidence::evaluate(pillar.hard_evidence, company, &text, thesis);
            let soft = self.soft_evidence(company, name);
            let (breakdown, attribute) = score_pillar(pillar, &hard, &soft);

            weighted_score += breakdown.contribution;
            breakdowns.insert(name.clone(), breakdown);
            attributes.insert(name.clone(), attribute);
        }

        let deal_screening = screening::screen(company, &thesis.deal_screening);
        let (penalties, total_penalty) = penalties::assess(
            &company.revenue_history,
            &text,
            &thesis.risk,
            thesis.term_matching,
        );

        // Penalties can push the score below zero; it is not floored
        let final_score = weighted_score.round() as i32 - total_penalty;
        let tier = thesis.tier_for(final_score);

        debug!(
            "'{}' scored {} ({}): weighted {:.2}, penalty {}",
            company.name, final_score, tier, weighted_score, total_penalty
        );

        let delta = ScoreDelta::compute(previous, Some(final_score), &attributes);

        ScoringOutcome {
            status: ScoringStatus::Scored,
            moat_score: Some(final_score),
            tier: Some(tier),
            attributes,
            analysis: Some(MoatAnalysis {
                thesis_name: thesis.name.clone(),
                thesis_version: thesis.version.clone(),
                pillars: breakdowns,
                weighted_score,
                penalties,
                total_penalty,
                deal_screening,
                final_score,
                tier,
            }),
            delta,
        }
    }

    /// Score a company and write the outcome onto it
    pub fn apply(&self, company: &mut Company, previous: Option<&ScoringEvent>, now: u64) -> ScoringOutcome {
        let outcome = self.score(company, previous);
        outcome.apply(company, now);
        outcome
    }

    /// Semantic score when trustworthy, else the LLM analysis score, else nothing
    fn soft_evidence(&self, company: &Company, pillar: &str) -> SoftEvidence {
        if let Some(semantic) = &company.semantic_evidence {
            if semantic.enrichment_successful {
                if let Some(score) = semantic.pillars.get(pillar) {
                    if score.effective_confidence >= self.thesis.semantic.min_effective_confidence {
                        return SoftEvidence {
                            score: score.score,
                            source: SoftEvidenceSource::Semantic,
                            justification: score.justification.clone(),
                        };
                    }
                }
            }
        }

        if let Some(analysis) = &company.llm_analysis {
            if let Some(score) = analysis.pillars.get(pillar) {
                return SoftEvidence {
                    score: score.score,
                    source: SoftEvidenceSource::LlmAnalysis,
                    justification: score.evidence.clone(),
                };
            }
        }

        SoftEvidence {
            score: 0,
            source: SoftEvidenceSource::None,
            justification: String::new(),
        }
    }
}

struct SoftEvidence {
    score: i32,
    source: SoftEvidenceSource,
    justification: String,
}

fn score_pillar(
    pillar: &PillarConfig,
    hard: &HardEvidence,
    soft: &SoftEvidence,
) -> (PillarBreakdown, PillarAttribute) {
    // Hard evidence is a floor: a lower LLM guess never overrides it
    let raw_score = hard.score.max(soft.score).clamp(0, pillar.max_raw_score);
    let present = raw_score >= pillar.evidence_threshold;
    let weight = pillar.weight;
    let contribution = if present {
        (raw_score as f64 * weight).min(weight * 100.0)
    } else {
        0.0
    };

    let justification = if !present {
        String::new()
    } else if hard.score >= soft.score && !hard.detail.is_empty() {
        hard.detail.clone()
    } else if !soft.justification.is_empty() {
        soft.justification.clone()
    } else {
        hard.detail.clone()
    };

    (
        PillarBreakdown {
            hard_score: hard.score,
            soft_score: soft.score,
            soft_source: soft.source,
            raw_score,
            weight,
            evidence_threshold: pillar.evidence_threshold,
            present,
            contribution,
        },
        PillarAttribute {
            present,
            justification,
            score: raw_score,
        },
    )
}
