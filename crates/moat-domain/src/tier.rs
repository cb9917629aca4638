//! Tier module - ordered defensibility classes

use serde::{Deserialize, Serialize};

/// Defensibility tier assigned from the final moat score
///
/// Tiers are totally ordered: `Waitlist < Standard < Strong < Top`.
/// The derived `Ord` follows declaration order, so comparisons between
/// tiers are the promotion/demotion relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Below the lowest threshold
    Waitlist,

    /// Meets the first threshold
    Standard,

    /// Meets the second threshold
    Strong,

    /// Meets the highest threshold
    Top,
}

impl Tier {
    /// All tiers, lowest first
    pub const ALL: [Tier; 4] = [Tier::Waitlist, Tier::Standard, Tier::Strong, Tier::Top];

    /// Get the tier name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Waitlist => "waitlist",
            Tier::Standard => "standard",
            Tier::Strong => "strong",
            Tier::Top => "top",
        }
    }

    /// Parse a tier from a string, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "waitlist" => Some(Tier::Waitlist),
            "standard" => Some(Tier::Standard),
            "strong" => Some(Tier::Strong),
            "top" => Some(Tier::Top),
            _ => None,
        }
    }

    /// Numeric rank (waitlist = 0, top = 3)
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Whether this is one of the two highest tiers
    pub fn is_upper(&self) -> bool {
        matches!(self, Tier::Strong | Tier::Top)
    }

    /// Get the next tier in the hierarchy
    pub fn next(&self) -> Option<Self> {
        match self {
            Tier::Waitlist => Some(Tier::Standard),
            Tier::Standard => Some(Tier::Strong),
            Tier::Strong => Some(Tier::Top),
            Tier::Top => None,
        }
    }

    /// Get the previous tier in the hierarchy
    pub fn previous(&self) -> Option<Self> {
        match self {
            Tier::Waitlist => None,
            Tier::Standard => Some(Tier::Waitlist),
            Tier::Strong => Some(Tier::Standard),
            Tier::Top => Some(Tier::Strong),
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid tier: {}", s))
    }
}
