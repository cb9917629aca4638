//! Tier change detection

use moat_domain::{CompanyId, PillarAttribute, Tier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which way a company moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeDirection {
    /// Moved to a higher tier
    Promoted,
    /// Moved to a lower tier
    Demoted,
    /// Tiered for the first time
    NewEntry,
}

impl ChangeDirection {
    /// Stable string form
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeDirection::Promoted => "promoted",
            ChangeDirection::Demoted => "demoted",
            ChangeDirection::NewEntry => "new_entry",
        }
    }
}

impl fmt::Display for ChangeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One company's tier movement within a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierChange {
    /// Company that moved
    pub company_id: CompanyId,
    /// Display name
    pub company_name: String,
    /// Tier before; `None` for new entries
    pub old_tier: Option<Tier>,
    /// Tier after
    pub new_tier: Tier,
    /// Score before
    pub old_score: Option<i32>,
    /// Score after
    pub new_score: Option<i32>,
    /// Direction of travel
    pub direction: ChangeDirection,
    /// Highest-scoring pillar after the change
    pub top_pillar: Option<String>,
}

impl TierChange {
    /// A move up into (or a first appearance in) strong or top
    pub fn is_notable(&self) -> bool {
        self.new_tier.is_upper()
            && matches!(
                self.direction,
                ChangeDirection::Promoted | ChangeDirection::NewEntry
            )
    }
}

/// Compare the previous tier with the new one
///
/// `old_tier` is the stored string form; anything that does not parse is
/// treated as absent, making the change a new entry. Returns `None` when
/// there is no new tier or the tier is unchanged.
pub fn detect_tier_change(
    company_id: CompanyId,
    company_name: &str,
    old_tier: Option<&str>,
    new_tier: Option<Tier>,
    old_score: Option<i32>,
    new_score: Option<i32>,
    attributes: &BTreeMap<String, PillarAttribute>,
) -> Option<TierChange> {
    let new_tier = new_tier?;
    let old_tier = old_tier.and_then(Tier::parse);

    let direction = match old_tier {
        None => ChangeDirection::NewEntry,
        Some(old) if old == new_tier => return None,
        Some(old) if new_tier > old => ChangeDirection::Promoted,
        Some(_) => ChangeDirection::Demoted,
    };

    Some(TierChange {
        company_id,
        company_name: company_name.to_string(),
        old_tier,
        new_tier,
        old_score,
        new_score,
        direction,
        top_pillar: top_pillar(attributes),
    })
}

/// Highest-scoring pillar; ties go to the alphabetically first name
pub fn top_pillar(attributes: &BTreeMap<String, PillarAttribute>) -> Option<String> {
    // BTreeMap iterates names in order, so keep the first of equal scores
    let mut best: Option<(&String, i32)> = None;
    for (name, attr) in attributes {
        match best {
            Some((_, score)) if attr.score <= score => {}
            _ => best = Some((name, attr.score)),
        }
    }
    best.map(|(name, _)| name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, i32)]) -> BTreeMap<String, PillarAttribute> {
        pairs
            .iter()
            .map(|(name, score)| {
                (
                    name.to_string(),
                    PillarAttribute {
                        present: true,
                        justification: String::new(),
                        score: *score,
                    },
                )
            })
            .collect()
    }

    fn detect(old: Option<&str>, new: Option<Tier>) -> Option<TierChange> {
        detect_tier_change(
            CompanyId::new(),
            "Acme",
            old,
            new,
            Some(40),
            Some(75),
            &attrs(&[("regulatory", 80), ("network", 30)]),
        )
    }

    #[test]
    fn test_standard_to_top_is_notable_promotion() {
        let change = detect(Some("standard"), Some(Tier::Top)).unwrap();
        assert_eq!(change.direction, ChangeDirection::Promoted);
        assert!(change.is_notable());
        assert_eq!(change.old_tier, Some(Tier::Standard));
        assert_eq!(change.top_pillar.as_deref(), Some("regulatory"));
    }

    #[test]
    fn test_first_waitlist_is_new_entry_not_notable() {
        let change = detect(None, Some(Tier::Waitlist)).unwrap();
        assert_eq!(change.direction, ChangeDirection::NewEntry);
        assert!(!change.is_notable());
    }

    #[test]
    fn test_new_entry_into_strong_is_notable() {
        assert!(detect(None, Some(Tier::Strong)).unwrap().is_notable());
    }

    #[test]
    fn test_unparseable_old_tier_is_new_entry() {
        let change = detect(Some("gold"), Some(Tier::Standard)).unwrap();
        assert_eq!(change.direction, ChangeDirection::NewEntry);
        assert_eq!(change.old_tier, None);
    }

    #[test]
    fn test_demotion_is_never_notable() {
        let change = detect(Some("TOP"), Some(Tier::Strong)).unwrap();
        assert_eq!(change.direction, ChangeDirection::Demoted);
        assert!(!change.is_notable());
    }

    #[test]
    fn test_unchanged_or_missing_tier() {
        assert!(detect(Some("strong"), Some(Tier::Strong)).is_none());
        assert!(detect(Some("strong"), None).is_none());
    }

    #[test]
    fn test_top_pillar_tie_break() {
        let a = attrs(&[("network", 50), ("data", 50), ("regulatory", 10)]);
        assert_eq!(top_pillar(&a).as_deref(), Some("data"));
        assert_eq!(top_pillar(&BTreeMap::new()), None);
    }
}
