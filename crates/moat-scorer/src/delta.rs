//! Score deltas against the previous scoring event

use moat_domain::{PillarAttribute, PillarChange, ScoringEvent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a new score differs from the last recorded one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreDelta {
    /// Score on the previous event
    pub previous_score: Option<i32>,
    /// New minus previous; 0 when either side is missing
    pub score_delta: i32,
    /// Pillars whose score or justification changed
    pub pillar_changes: BTreeMap<String, PillarChange>,
}

impl ScoreDelta {
    /// Compare a new score and attributes with the previous event
    ///
    /// Without a previous event there is nothing to compare: no previous
    /// score, a zero delta and no pillar changes.
    pub fn compute(
        previous: Option<&ScoringEvent>,
        new_score: Option<i32>,
        new_attributes: &BTreeMap<String, PillarAttribute>,
    ) -> Self {
        let Some(previous) = previous else {
            return Self::default();
        };
        Self {
            previous_score: Some(previous.moat_score),
            score_delta: new_score.map(|s| s - previous.moat_score).unwrap_or(0),
            pillar_changes: diff_attributes(&previous.moat_attributes, new_attributes),
        }
    }
}

/// Per-pillar differences; pillars on only one side have `None` on the other
pub fn diff_attributes(
    old: &BTreeMap<String, PillarAttribute>,
    new: &BTreeMap<String, PillarAttribute>,
) -> BTreeMap<String, PillarChange> {
    let mut changes = BTreeMap::new();

    for name in old.keys().chain(new.keys()) {
        if changes.contains_key(name) {
            continue;
        }
        let before = old.get(name);
        let after = new.get(name);
        let changed = match (before, after) {
            (Some(b), Some(a)) => b.score != a.score || b.justification != a.justification,
            _ => true,
        };
        if changed {
            changes.insert(
                name.clone(),
                PillarChange {
                    old_score: before.map(|b| b.score),
                    new_score: after.map(|a| a.score),
                    old_justification: before.map(|b| b.justification.clone()),
                    new_justification: after.map(|a| a.justification.clone()),
                },
            );
        }
    }

    changes
}
