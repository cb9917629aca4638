//! Revenue provenance

use serde::{Deserialize, Serialize};

/// Where a company's resolved revenue figure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RevenueSource {
    /// Turnover as filed with the registry
    #[serde(rename = "registry_filing")]
    RegistryFiling,

    /// Midpoint of a UK filed-accounts band
    #[serde(rename = "ch_band_midpoint")]
    ChBandMidpoint,

    /// Midpoint of an EU SME band inferred from headcount
    #[serde(rename = "eu_band_midpoint")]
    EuBandMidpoint,

    /// LLM estimate extracted from the company website
    #[serde(rename = "llm_website")]
    LlmWebsite,
}

impl RevenueSource {
    /// Stable string tag exposed to collaborators
    pub fn as_str(&self) -> &'static str {
        match self {
            RevenueSource::RegistryFiling => "registry_filing",
            RevenueSource::ChBandMidpoint => "ch_band_midpoint",
            RevenueSource::EuBandMidpoint => "eu_band_midpoint",
            RevenueSource::LlmWebsite => "llm_website",
        }
    }

    /// Whether the figure is backed by registry data
    pub fn is_registry_backed(&self) -> bool {
        !matches!(self, RevenueSource::LlmWebsite)
    }
}

impl std::fmt::Display for RevenueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_match_serde() {
        for source in [
            RevenueSource::RegistryFiling,
            RevenueSource::ChBandMidpoint,
            RevenueSource::EuBandMidpoint,
            RevenueSource::LlmWebsite,
        ] {
            let json = serde_json::to_string(&source).unwrap();
            assert_eq!(json, format!("\"{}\"", source.as_str()));
        }
    }

    #[test]
    fn test_registry_backed() {
        assert!(RevenueSource::ChBandMidpoint.is_registry_backed());
        assert!(!RevenueSource::LlmWebsite.is_registry_backed());
    }
}
