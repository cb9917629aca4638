//! Per-company pipeline state
//!
//! A company's stage is derived entirely from its completion markers, so
//! a run can be killed at any point and resumed without redoing finished
//! work.

use moat_domain::Company;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How far through the pipeline a stored company has progressed
///
/// Companies that are not in the store yet are "undiscovered" and have no
/// stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Stored, facts not yet gathered
    Discovered,
    /// Registry and website steps attempted
    ExtractionComplete,
    /// Semantic evidence attached (optional stage)
    SemanticallyEnriched,
    /// A scoring pass has run; the status says whether it produced a score
    Scored,
}

impl PipelineStage {
    /// Stage of a company, from its markers
    pub fn of(company: &Company) -> Self {
        if company.extraction_completed_at.is_none() {
            PipelineStage::Discovered
        } else if company.scored_at.is_some() {
            PipelineStage::Scored
        } else if company.semantically_enriched_at.is_some() {
            PipelineStage::SemanticallyEnriched
        } else {
            PipelineStage::ExtractionComplete
        }
    }

    /// Stable string form
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Discovered => "discovered",
            PipelineStage::ExtractionComplete => "extraction_complete",
            PipelineStage::SemanticallyEnriched => "semantically_enriched",
            PipelineStage::Scored => "scored",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Extraction is due: never done, or done at least `window_secs` ago
pub fn needs_extraction(company: &Company, now: u64, window_secs: u64, force: bool) -> bool {
    if company.is_excluded() {
        return false;
    }
    match company.extraction_completed_at {
        _ if force => true,
        None => true,
        Some(at) => now.saturating_sub(at) >= window_secs,
    }
}

/// Enrichment is due: extracted, and never enriched or enriched before the
/// facts last changed
pub fn needs_enrichment(company: &Company, force: bool) -> bool {
    if company.is_excluded() || company.extraction_completed_at.is_none() {
        return false;
    }
    match (company.semantically_enriched_at, company.facts_updated_at) {
        _ if force => true,
        (None, _) => true,
        (Some(enriched), Some(facts)) => enriched < facts,
        (Some(_), None) => false,
    }
}

/// Scoring is due: extracted, and never scored or scored before any input
/// last changed
pub fn needs_scoring(company: &Company, force: bool) -> bool {
    if company.is_excluded() || company.extraction_completed_at.is_none() {
        return false;
    }
    match (company.scored_at, company.inputs_updated_at()) {
        _ if force => true,
        (None, _) => true,
        (Some(scored), Some(inputs)) => scored < inputs,
        (Some(_), None) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEEK: u64 = 7 * 86_400;

    fn company() -> Company {
        Company::new("Acme", "test", 0)
    }

    #[test]
    fn test_stage_progression() {
        let mut c = company();
        assert_eq!(PipelineStage::of(&c), PipelineStage::Discovered);

        c.extraction_completed_at = Some(10);
        assert_eq!(PipelineStage::of(&c), PipelineStage::ExtractionComplete);

        c.semantically_enriched_at = Some(11);
        assert_eq!(PipelineStage::of(&c), PipelineStage::SemanticallyEnriched);

        c.scored_at = Some(12);
        assert_eq!(PipelineStage::of(&c), PipelineStage::Scored);
        assert!(PipelineStage::Scored > PipelineStage::Discovered);
    }

    #[test]
    fn test_extraction_skip_window() {
        let mut c = company();
        assert!(needs_extraction(&c, 100, WEEK, false));

        c.extraction_completed_at = Some(100);
        assert!(!needs_extraction(&c, 100 + WEEK - 1, WEEK, false));
        assert!(needs_extraction(&c, 100 + WEEK, WEEK, false));
        assert!(needs_extraction(&c, 101, WEEK, true));
    }

    #[test]
    fn test_excluded_companies_never_run() {
        let mut c = company();
        c.exclusion_reason = Some("dissolved".to_string());
        assert!(!needs_extraction(&c, 100, WEEK, true));

        c.extraction_completed_at = Some(1);
        assert!(!needs_enrichment(&c, true));
        assert!(!needs_scoring(&c, true));
    }

    #[test]
    fn test_enrichment_follows_facts() {
        let mut c = company();
        assert!(!needs_enrichment(&c, false));

        c.extraction_completed_at = Some(10);
        c.facts_updated_at = Some(10);
        assert!(needs_enrichment(&c, false));

        c.semantically_enriched_at = Some(10);
        assert!(!needs_enrichment(&c, false));

        c.facts_updated_at = Some(20);
        assert!(needs_enrichment(&c, false));
    }

    #[test]
    fn test_scoring_follows_inputs() {
        let mut c = company();
        c.extraction_completed_at = Some(10);
        c.facts_updated_at = Some(10);
        assert!(needs_scoring(&c, false));

        c.scored_at = Some(10);
        assert!(!needs_scoring(&c, false));

        c.semantically_enriched_at = Some(15);
        assert!(needs_scoring(&c, false));

        c.scored_at = Some(15);
        assert!(!needs_scoring(&c, false));
        assert!(needs_scoring(&c, true));
    }
}
