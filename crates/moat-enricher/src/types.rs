//! Input and output types for semantic enrichment

use crate::config::EnricherConfig;
use moat_domain::{Company, CompanyId, SemanticEvidence};
use serde::{Deserialize, Serialize};

/// Number of signals behind `input_quality`
pub const INPUT_SIGNALS: usize = 6;

const RICH_DESCRIPTION_CHARS: usize = 50;
const RICH_WEBSITE_CHARS: usize = 200;

/// What the LLM is told about one company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanySummary {
    /// Company the result belongs to
    pub company_id: CompanyId,
    /// Display name
    pub name: String,
    /// ISO country code
    pub country: Option<String>,
    /// Sector label
    pub sector: Option<String>,
    /// Free-text description
    pub description: Option<String>,
    /// Scraped website text
    pub website_text: Option<String>,
    /// Certification types held
    pub certifications: Vec<String>,
    /// Headcount
    pub employee_count: Option<u32>,
}

impl CompanySummary {
    /// Summarise a company record
    pub fn from_company(company: &Company) -> Self {
        Self {
            company_id: company.id,
            name: company.name.clone(),
            country: company.hq_country.clone(),
            sector: company.sector.clone(),
            description: company.description.clone(),
            website_text: company.raw_website_text.clone(),
            certifications: company
                .certifications
                .iter()
                .map(|c| c.cert_type.clone())
                .collect(),
            employee_count: company.employee_count,
        }
    }

    /// Copy with free text and certification list cut to the configured limits
    pub fn truncated(&self, config: &EnricherConfig) -> Self {
        Self {
            description: self
                .description
                .as_deref()
                .map(|d| truncate_chars(d, config.max_description_chars)),
            website_text: self
                .website_text
                .as_deref()
                .map(|w| truncate_chars(w, config.max_website_chars)),
            certifications: self
                .certifications
                .iter()
                .take(config.max_certifications)
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    /// Share of the six input signals that are meaningfully populated, 0..=1
    ///
    /// Caps the effective confidence of every pillar score for this company.
    pub fn input_quality(&self) -> f64 {
        let signals = [
            text_len(&self.description) >= RICH_DESCRIPTION_CHARS,
            text_len(&self.website_text) >= RICH_WEBSITE_CHARS,
            text_len(&self.sector) > 0,
            text_len(&self.country) > 0,
            !self.certifications.is_empty(),
            self.employee_count.is_some(),
        ];
        let populated = signals.iter().filter(|s| **s).count();
        populated as f64 / INPUT_SIGNALS as f64
    }
}

/// Outcome for one company; failures are carried inside `evidence`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    /// Company the evidence belongs to
    pub company_id: CompanyId,
    /// Pillar scores, or the failure and its error
    pub evidence: SemanticEvidence,
    /// Produced by a single-company retry after its batch failed
    pub retried: bool,
}

impl EnrichmentResult {
    /// Whether enrichment produced usable pillar scores
    pub fn is_success(&self) -> bool {
        self.evidence.enrichment_successful
    }
}

/// Cut to at most `max` characters without splitting a code point
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

fn text_len(s: &Option<String>) -> usize {
    s.as_deref().map(|t| t.trim().chars().count()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> CompanySummary {
        CompanySummary {
            company_id: CompanyId::new(),
            name: "Acme".to_string(),
            country: None,
            sector: None,
            description: None,
            website_text: None,
            certifications: Vec::new(),
            employee_count: None,
        }
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語");
    }

    #[test]
    fn test_truncated_applies_limits() {
        let mut s = summary();
        s.description = Some("d".repeat(2000));
        s.website_text = Some("w".repeat(5000));
        s.certifications = (0..15).map(|i| format!("ISO {}", i)).collect();

        let t = s.truncated(&EnricherConfig::default());
        assert_eq!(t.description.unwrap().len(), 1500);
        assert_eq!(t.website_text.unwrap().len(), 3000);
        assert_eq!(t.certifications.len(), 10);
        assert_eq!(t.name, "Acme");
    }

    #[test]
    fn test_input_quality_empty_and_full() {
        assert_eq!(summary().input_quality(), 0.0);

        let mut s = summary();
        s.description = Some("x".repeat(60));
        s.website_text = Some("y".repeat(250));
        s.sector = Some("Defence".to_string());
        s.country = Some("GB".to_string());
        s.certifications = vec!["ISO 9001".to_string()];
        s.employee_count = Some(40);
        assert_eq!(s.input_quality(), 1.0);
    }

    #[test]
    fn test_input_quality_ignores_thin_text() {
        let mut s = summary();
        s.description = Some("Short blurb".to_string());
        s.website_text = Some("   ".to_string());
        s.country = Some("FR".to_string());
        s.employee_count = Some(3);
        assert!((s.input_quality() - 2.0 / 6.0).abs() < 1e-9);
    }
}
