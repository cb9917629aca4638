//! Scoring events - the append-only audit log

use crate::{CompanyId, PillarAttribute, Tier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for a scoring event (UUIDv7, chronologically sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct EventId(u128);

impl EventId {
    /// Generate a new EventId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Parse an EventId from its UUID string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid event id: {}", e))
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl From<EventId> for String {
    fn from(id: EventId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for EventId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_string(&value)
    }
}

/// What caused a scoring pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringTrigger {
    /// First scoring pass for the company
    Initial,
    /// Any later pass
    Rescan,
}

/// Old and new values of one pillar between consecutive passes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PillarChange {
    /// Score in the previous pass (`None` if the pillar was absent)
    pub old_score: Option<i32>,
    /// Score in this pass (`None` if the pillar was removed)
    pub new_score: Option<i32>,
    /// Previous justification
    pub old_justification: Option<String>,
    /// New justification
    pub new_justification: Option<String>,
}

/// Immutable snapshot of one scoring pass for one company
///
/// Events are never mutated or deleted; the audit trail is the append log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringEvent {
    /// Event identifier
    pub id: EventId,
    /// Company scored
    pub company_id: CompanyId,
    /// When the pass ran
    pub created_at: u64,
    /// Score assigned
    pub moat_score: i32,
    /// Tier assigned
    pub tier: Tier,
    /// Attribute snapshot
    pub moat_attributes: BTreeMap<String, PillarAttribute>,
    /// Thesis weight set used
    pub weights: BTreeMap<String, f64>,
    /// Thesis name
    pub thesis_name: String,
    /// Thesis version
    pub thesis_version: String,
    /// Score of the preceding pass
    pub previous_score: Option<i32>,
    /// `moat_score - previous_score` (0 for the initial pass)
    pub score_delta: i32,
    /// Pillars whose score or justification changed
    pub pillar_changes: BTreeMap<String, PillarChange>,
    /// What caused the pass
    pub trigger: ScoringTrigger,
}

impl ScoringEvent {
    /// Serialize for API exposure
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
