//! Scoring event construction

use moat_domain::{CompanyId, EventId, ScoringEvent, ScoringTrigger};
use moat_scorer::{ScoreDelta, ScoringOutcome};
use moat_thesis::ThesisConfig;

/// Build the audit event for a scoring outcome
///
/// Returns `None` for outcomes without a score: insufficient-data companies
/// leave no trace in the audit log. The trigger is `initial` when there is
/// no previous event and `rescan` otherwise.
pub fn build_scoring_event(
    company_id: CompanyId,
    outcome: &ScoringOutcome,
    thesis: &ThesisConfig,
    previous: Option<&ScoringEvent>,
    now: u64,
) -> Option<ScoringEvent> {
    let moat_score = outcome.moat_score?;
    let tier = outcome.tier?;
    let delta = ScoreDelta::compute(previous, Some(moat_score), &outcome.attributes);

    Some(ScoringEvent {
        id: EventId::new(),
        company_id,
        created_at: now,
        moat_score,
        tier,
        moat_attributes: outcome.attributes.clone(),
        weights: thesis.weights(),
        thesis_name: thesis.name.clone(),
        thesis_version: thesis.version.clone(),
        previous_score: delta.previous_score,
        score_delta: delta.score_delta,
        pillar_changes: delta.pillar_changes,
        trigger: if previous.is_some() {
            ScoringTrigger::Rescan
        } else {
            ScoringTrigger::Initial
        },
    })
}
