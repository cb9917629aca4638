//! Deterministic pillar evidence

use moat_domain::Company;
use moat_thesis::{HardEvidenceSource, TermMatching, ThesisConfig};

/// Hard-evidence score for one pillar and what produced it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HardEvidence {
    /// 0 when nothing matched
    pub score: i32,
    /// Human-readable account of the match, empty when nothing matched
    pub detail: String,
}

impl HardEvidence {
    fn new(score: i32, detail: String) -> Self {
        Self { score, detail }
    }
}

/// Evaluate a pillar's deterministic source against a company
///
/// `text` is the company's lower-cased searchable text.
pub fn evaluate(
    source: Option<HardEvidenceSource>,
    company: &Company,
    text: &str,
    thesis: &ThesisConfig,
) -> HardEvidence {
    match source {
        Some(HardEvidenceSource::Certifications) => certifications(company, thesis),
        Some(HardEvidenceSource::Platform) => platform(company, text, thesis),
        Some(HardEvidenceSource::Sovereignty) => sovereignty(company, text, thesis),
        Some(HardEvidenceSource::TestingFirm) => testing_firm(text, thesis),
        None => HardEvidence::default(),
    }
}

fn certifications(company: &Company, thesis: &ThesisConfig) -> HardEvidence {
    company
        .certifications
        .iter()
        .map(|c| (thesis.get_cert_score(&c.cert_type), c.cert_type.as_str()))
        .filter(|(score, _)| *score > 0)
        .max_by_key(|(score, _)| *score)
        .map(|(score, cert)| HardEvidence::new(score, format!("Holds {}", cert)))
        .unwrap_or_default()
}

fn platform(company: &Company, text: &str, thesis: &ThesisConfig) -> HardEvidence {
    let matched: Vec<&str> = thesis
        .known_platforms
        .iter()
        .map(String::as_str)
        .filter(|p| contains_term(text, p, thesis.term_matching))
        .collect();
    let name_score = if matched.is_empty() {
        0
    } else {
        thesis.hard_evidence.platform_match_score
    };

    let centrality_score = company
        .network_centrality
        .filter(|c| c.is_finite())
        .map(|c| (c.clamp(0.0, 1.0) * 100.0).round() as i32)
        .unwrap_or(0);

    if name_score == 0 && centrality_score == 0 {
        HardEvidence::default()
    } else if name_score >= centrality_score {
        HardEvidence::new(name_score, format!("Works with {}", matched.join(", ")))
    } else {
        HardEvidence::new(
            centrality_score,
            format!("Network centrality {}", centrality_score),
        )
    }
}

fn sovereignty(company: &Company, text: &str, thesis: &ThesisConfig) -> HardEvidence {
    let sovereign_cert = company
        .certifications
        .iter()
        .find(|c| thesis.is_sovereignty_cert(&c.cert_type));
    let cert_score = if sovereign_cert.is_some() {
        thesis.hard_evidence.sovereignty_cert_score
    } else {
        0
    };

    let keywords: Vec<&str> = thesis
        .sovereignty_keywords
        .iter()
        .map(String::as_str)
        .filter(|k| contains_term(text, k, thesis.term_matching))
        .collect();
    let keyword_score = (thesis.hard_evidence.sovereignty_keyword_score * keywords.len() as i32)
        .min(thesis.hard_evidence.sovereignty_keyword_cap);

    match sovereign_cert {
        Some(cert) if cert_score >= keyword_score && cert_score > 0 => {
            HardEvidence::new(cert_score, format!("Sovereignty certification {}", cert.cert_type))
        }
        _ if keyword_score > 0 => HardEvidence::new(
            keyword_score,
            format!("Sovereignty signals: {}", keywords.join(", ")),
        ),
        _ => HardEvidence::default(),
    }
}

fn testing_firm(text: &str, thesis: &ThesisConfig) -> HardEvidence {
    thesis
        .testing_firms
        .iter()
        .find(|f| contains_term(text, f, thesis.term_matching))
        .map(|firm| {
            HardEvidence::new(
                thesis.hard_evidence.testing_firm_score,
                format!("Tested by {}", firm),
            )
        })
        .unwrap_or_default()
}

/// Case-insensitive match of `term` in lower-cased `text`
///
/// With [`TermMatching::WholeWord`], the thesis default, "sage" matches
/// "uses Sage 200" but not "message". A thesis that wants plain name
/// substring matching sets `term_matching = "substring"`.
pub fn contains_term(text: &str, term: &str, matching: TermMatching) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return false;
    }
    if matching == TermMatching::Substring {
        return text.contains(&term);
    }
    let mut from = 0;
    while let Some(pos) = text[from..].find(&term) {
        let start = from + pos;
        let end = start + term.len();
        let before_ok = text[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = text[end..].chars().next().map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        // advance past the first char of this match
        from = start + text[start..].chars().next().map_or(1, char::len_utf8);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use moat_domain::Certification;

    fn thesis() -> ThesisConfig {
        ThesisConfig::default_thesis().unwrap()
    }

    fn company(description: &str) -> Company {
        let mut c = Company::new("Acme", "test", 0);
        c.description = Some(description.to_string());
        c
    }

    #[test]
    fn test_contains_term_word_boundaries() {
        let w = TermMatching::WholeWord;
        assert!(contains_term("we integrate with sage 200", "Sage", w));
        assert!(!contains_term("secure message relay", "sage", w));
        assert!(contains_term("uk hosted, eu hosted", "eu hosted", w));
        assert!(contains_term("tested by tüv süd", "TÜV", w));
        assert!(!contains_term("anything", "  ", w));
        assert!(contains_term("massage sage", "sage", w));
    }

    #[test]
    fn test_contains_term_substring() {
        let s = TermMatching::Substring;
        assert!(contains_term("secure message relay", "sage", s));
        assert!(contains_term("sapphire systems", "SAP", s));
        assert!(!contains_term("anything", "  ", s));
        assert!(!contains_term("secure relay", "sage", s));
    }

    #[test]
    fn test_platform_match_follows_thesis_matching() {
        let mut t = thesis();
        let c = company("Secure message relay for insurers");
        let text = c.searchable_text();
        assert_eq!(evaluate(Some(HardEvidenceSource::Platform), &c, &text, &t).score, 0);

        t.term_matching = TermMatching::Substring;
        let e = evaluate(Some(HardEvidenceSource::Platform), &c, &text, &t);
        assert_eq!(e.score, 60);
        assert_eq!(e.detail, "Works with sage");
    }

    #[test]
    fn test_certifications_take_max() {
        let mut c = company("x");
        c.certifications = vec![
            Certification::new("ISO 9001"),
            Certification::new("iso-27001"),
            Certification::new("Made Up Cert"),
        ];
        let e = evaluate(Some(HardEvidenceSource::Certifications), &c, "", &thesis());
        assert_eq!(e.score, 60);
        assert_eq!(e.detail, "Holds iso-27001");
    }

    #[test]
    fn test_platform_name_or_centrality() {
        let t = thesis();
        let mut c = company("Certified ServiceNow partner");
        let text = c.searchable_text();
        assert_eq!(evaluate(Some(HardEvidenceSource::Platform), &c, &text, &t).score, 60);

        c.network_centrality = Some(0.83);
        assert_eq!(evaluate(Some(HardEvidenceSource::Platform), &c, &text, &t).score, 83);

        let c = company("Bespoke tooling");
        let text = c.searchable_text();
        assert_eq!(evaluate(Some(HardEvidenceSource::Platform), &c, &text, &t), HardEvidence::default());
    }

    #[test]
    fn test_sovereignty_keywords_capped() {
        let t = thesis();
        let c = company("Sovereign, air-gapped, on-premise deployments with UK hosted backups and security clearance");
        let text = c.searchable_text();
        let e = evaluate(Some(HardEvidenceSource::Sovereignty), &c, &text, &t);
        assert_eq!(e.score, 45);
    }

    #[test]
    fn test_sovereignty_cert_beats_keywords() {
        let t = thesis();
        let mut c = company("Sovereign cloud");
        c.certifications.push(Certification::new("SecNumCloud"));
        let text = c.searchable_text();
        let e = evaluate(Some(HardEvidenceSource::Sovereignty), &c, &text, &t);
        assert_eq!(e.score, 70);
        assert!(e.detail.contains("SecNumCloud"));
    }

    #[test]
    fn test_testing_firm_match() {
        let t = thesis();
        let c = company("Products certified by Intertek and UL Solutions");
        let text = c.searchable_text();
        assert_eq!(evaluate(Some(HardEvidenceSource::TestingFirm), &c, &text, &t).score, 65);
    }

    #[test]
    fn test_no_source_scores_zero() {
        let c = company("anything at all");
        assert_eq!(evaluate(None, &c, "anything", &thesis()).score, 0);
    }
}
