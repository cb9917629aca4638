//! Thesis data model, loading and validation

use crate::error::ThesisError;
use moat_domain::Tier;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info};

/// Bundled default thesis
pub const DEFAULT_THESIS_TOML: &str = include_str!("../theses/default.toml");

/// Tolerance when checking that pillar weights sum to 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Deterministic evidence source feeding a pillar's hard-evidence score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardEvidenceSource {
    /// Certification-to-score table lookup
    Certifications,
    /// Known platform name match or graph centrality
    Platform,
    /// Sovereignty certification or keyword match
    Sovereignty,
    /// Known testing firm name match
    TestingFirm,
}

/// How thesis terms (platforms, keywords, firms) are found in company text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermMatching {
    /// Term must not be flanked by letters or digits, so "sage" misses "message"
    #[default]
    WholeWord,
    /// Any case-insensitive occurrence counts
    Substring,
}

/// One scoring pillar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarConfig {
    /// Share of the final score, in (0, 1]
    pub weight: f64,

    /// Raw score at which the pillar counts as present
    pub evidence_threshold: i32,

    /// Ceiling for the raw score
    pub max_raw_score: i32,

    /// Deterministic source, if the pillar has one
    #[serde(default)]
    pub hard_evidence: Option<HardEvidenceSource>,

    /// Shown to the LLM when asking for pillar scores
    #[serde(default)]
    pub description: String,
}

/// Scores awarded by deterministic matches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardEvidenceConfig {
    /// Known platform named in the company text
    pub platform_match_score: i32,
    /// Holds a sovereignty certification
    pub sovereignty_cert_score: i32,
    /// Per matched sovereignty keyword
    pub sovereignty_keyword_score: i32,
    /// Ceiling for summed keyword matches
    pub sovereignty_keyword_cap: i32,
    /// Known testing firm named in the company text
    pub testing_firm_score: i32,
}

impl Default for HardEvidenceConfig {
    fn default() -> Self {
        Self {
            platform_match_score: 60,
            sovereignty_cert_score: 70,
            sovereignty_keyword_score: 15,
            sovereignty_keyword_cap: 45,
            testing_firm_score: 65,
        }
    }
}

/// Risk penalty rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Case-insensitive phrases searched in description and website text
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Penalty per matched keyword
    pub keyword_penalty: i32,
    /// Penalty per year-on-year revenue decline
    pub declining_revenue_penalty: i32,
    /// Ceiling on the combined penalty
    pub max_penalty: i32,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            keyword_penalty: 10,
            declining_revenue_penalty: 5,
            max_penalty: 30,
        }
    }
}

/// Three descending cut-offs (percentages)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bands {
    /// Top band lower bound
    pub high: f64,
    /// Middle band lower bound
    pub mid: f64,
    /// Bottom band lower bound
    pub low: f64,
}

impl Bands {
    /// Index of the band `value` falls in: 3 high, 2 mid, 1 low, 0 below
    pub fn grade(&self, value: f64) -> u8 {
        if value >= self.high {
            3
        } else if value >= self.mid {
            2
        } else if value >= self.low {
            1
        } else {
            0
        }
    }

    fn is_ordered(&self) -> bool {
        self.high >= self.mid && self.mid >= self.low
    }
}

/// Deal-screening thresholds (informational scoring only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealScreeningConfig {
    /// Lower bound of the target revenue range (GBP)
    pub revenue_sweet_spot_min: i64,
    /// Upper bound of the target revenue range (GBP)
    pub revenue_sweet_spot_max: i64,
    /// At most this many competitors is a strong position
    pub max_competitors_strong: u32,
    /// At most this many competitors is a moderate position
    pub max_competitors_moderate: u32,
    /// Gross margin bands
    pub margin_bands: Bands,
    /// Market share bands
    pub market_share_bands: Bands,
    /// Revenue growth bands
    pub growth_bands: Bands,
}

impl Default for DealScreeningConfig {
    fn default() -> Self {
        Self {
            revenue_sweet_spot_min: 2_000_000,
            revenue_sweet_spot_max: 30_000_000,
            max_competitors_strong: 5,
            max_competitors_moderate: 15,
            margin_bands: Bands {
                high: 60.0,
                mid: 40.0,
                low: 20.0,
            },
            market_share_bands: Bands {
                high: 20.0,
                mid: 10.0,
                low: 5.0,
            },
            growth_bands: Bands {
                high: 25.0,
                mid: 10.0,
                low: 3.0,
            },
        }
    }
}

/// Tier cut-offs `[standard, strong, top]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    /// Strictly ascending
    pub thresholds: [i32; 3],
}

/// Semantic enrichment settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticConfig {
    /// Semantic pillar scores below this effective confidence are ignored
    pub min_effective_confidence: f64,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            min_effective_confidence: 0.5,
        }
    }
}

/// Prompt templates with `{placeholder}` slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplates {
    /// Single-company moat analysis; needs `{company}`
    pub moat_analysis: String,
    /// Batched pillar scoring; needs `{companies}` and `{pillars}`
    pub semantic_batch: String,
}

/// Immutable investment thesis
///
/// # Examples
///
/// ```
/// use moat_thesis::ThesisConfig;
/// use moat_domain::Tier;
///
/// let thesis = ThesisConfig::default_thesis().unwrap();
/// assert_eq!(thesis.tier_for(75), Tier::Top);
/// assert_eq!(thesis.get_cert_score("iso-27001"), 60);
/// assert_eq!(thesis.get_cert_score("unknown"), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThesisConfig {
    /// Thesis identifier recorded on every scoring event
    pub name: String,

    /// Thesis version recorded on every scoring event
    pub version: String,

    /// Free text
    #[serde(default)]
    pub description: String,

    /// Certification types that also count as sovereignty evidence
    #[serde(default)]
    pub sovereignty_certifications: Vec<String>,

    /// Phrases indicating sovereignty or residency requirements
    #[serde(default)]
    pub sovereignty_keywords: Vec<String>,

    /// Platform names matched against company text
    #[serde(default)]
    pub known_platforms: Vec<String>,

    /// Testing firm names matched against company text
    #[serde(default)]
    pub testing_firms: Vec<String>,

    /// Matching rule for platforms, sovereignty keywords, testing firms and risk keywords
    #[serde(default)]
    pub term_matching: TermMatching,

    /// Pillars keyed by name
    pub pillars: BTreeMap<String, PillarConfig>,

    /// Certification type to score
    #[serde(default)]
    pub certifications: BTreeMap<String, i32>,

    /// Deterministic match scores
    #[serde(default)]
    pub hard_evidence: HardEvidenceConfig,

    /// Risk penalty rules
    #[serde(default)]
    pub risk: RiskConfig,

    /// Deal-screening thresholds
    #[serde(default)]
    pub deal_screening: DealScreeningConfig,

    /// Tier cut-offs
    pub tiers: TierThresholds,

    /// Semantic enrichment settings
    #[serde(default)]
    pub semantic: SemanticConfig,

    /// Prompt templates
    pub prompts: PromptTemplates,

    #[serde(skip)]
    cert_index: HashMap<String, i32>,
}

impl ThesisConfig {
    /// Load and validate a thesis file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ThesisError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ThesisError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let thesis = Self::from_toml(&text)?;
        info!("Loaded thesis '{}' v{} from {}", thesis.name, thesis.version, path.display());
        Ok(thesis)
    }

    /// Parse and validate a thesis from TOML text
    pub fn from_toml(text: &str) -> Result<Self, ThesisError> {
        let mut thesis: ThesisConfig = toml::from_str(text)?;
        thesis.build_cert_index()?;
        thesis.validate()?;
        debug!(
            "Thesis '{}' has {} pillars and {} certification scores",
            thesis.name,
            thesis.pillars.len(),
            thesis.certifications.len()
        );
        Ok(thesis)
    }

    /// The bundled default thesis
    pub fn default_thesis() -> Result<Self, ThesisError> {
        Self::from_toml(DEFAULT_THESIS_TOML)
    }

    fn build_cert_index(&mut self) -> Result<(), ThesisError> {
        let mut index = HashMap::with_capacity(self.certifications.len());
        for (cert_type, score) in &self.certifications {
            let key = normalize_key(cert_type);
            if key.is_empty() {
                return Err(ThesisError::Invalid(format!(
                    "certification '{}' has no letters or digits",
                    cert_type
                )));
            }
            if index.insert(key, *score).is_some() {
                return Err(ThesisError::Invalid(format!(
                    "certification '{}' duplicates another entry after normalisation",
                    cert_type
                )));
            }
        }
        self.cert_index = index;
        Ok(())
    }

    /// Check every structural rule; called by the loaders
    pub fn validate(&self) -> Result<(), ThesisError> {
        if self.name.trim().is_empty() {
            return Err(ThesisError::Invalid("name is empty".to_string()));
        }
        if self.version.trim().is_empty() {
            return Err(ThesisError::Invalid("version is empty".to_string()));
        }
        if self.pillars.is_empty() {
            return Err(ThesisError::Invalid("at least one pillar is required".to_string()));
        }

        for (name, pillar) in &self.pillars {
            if name.is_empty()
                || !name
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            {
                return Err(ThesisError::Invalid(format!(
                    "pillar name '{}' must be non-empty lowercase [a-z0-9_]",
                    name
                )));
            }
            if !(pillar.weight > 0.0 && pillar.weight <= 1.0) {
                return Err(ThesisError::Invalid(format!(
                    "pillar '{}' weight {} must be in (0, 1]",
                    name, pillar.weight
                )));
            }
            if pillar.max_raw_score <= 0 {
                return Err(ThesisError::Invalid(format!(
                    "pillar '{}' max_raw_score must be positive",
                    name
                )));
            }
            if pillar.evidence_threshold < 0 || pillar.evidence_threshold > pillar.max_raw_score {
                return Err(ThesisError::Invalid(format!(
                    "pillar '{}' evidence_threshold {} must be within 0..={}",
                    name, pillar.evidence_threshold, pillar.max_raw_score
                )));
            }
        }

        let weight_sum: f64 = self.pillars.values().map(|p| p.weight).sum();
        if (weight_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ThesisError::Invalid(format!(
                "pillar weights sum to {:.3}, expected 1.0",
                weight_sum
            )));
        }

        let [standard, strong, top] = self.tiers.thresholds;
        if !(standard < strong && strong < top) {
            return Err(ThesisError::Invalid(format!(
                "tier thresholds {:?} must be strictly ascending",
                self.tiers.thresholds
            )));
        }

        let min_conf = self.semantic.min_effective_confidence;
        if !(0.0..=1.0).contains(&min_conf) {
            return Err(ThesisError::Invalid(format!(
                "semantic.min_effective_confidence {} must be within 0..=1",
                min_conf
            )));
        }

        let risk = &self.risk;
        if risk.keyword_penalty < 0 || risk.declining_revenue_penalty < 0 || risk.max_penalty < 0 {
            return Err(ThesisError::Invalid("risk penalties must not be negative".to_string()));
        }

        let deal = &self.deal_screening;
        if deal.revenue_sweet_spot_min >= deal.revenue_sweet_spot_max {
            return Err(ThesisError::Invalid(format!(
                "revenue sweet spot {}..{} is empty",
                deal.revenue_sweet_spot_min, deal.revenue_sweet_spot_max
            )));
        }
        if deal.max_competitors_strong > deal.max_competitors_moderate {
            return Err(ThesisError::Invalid(
                "max_competitors_strong exceeds max_competitors_moderate".to_string(),
            ));
        }
        for (label, bands) in [
            ("margin_bands", &deal.margin_bands),
            ("market_share_bands", &deal.market_share_bands),
            ("growth_bands", &deal.growth_bands),
        ] {
            if !bands.is_ordered() {
                return Err(ThesisError::Invalid(format!("{} must satisfy high >= mid >= low", label)));
            }
        }

        require_placeholders("semantic_batch", &self.prompts.semantic_batch, &["companies", "pillars"])?;
        require_placeholders("moat_analysis", &self.prompts.moat_analysis, &["company"])?;

        Ok(())
    }

    /// Pillar names in stable (alphabetical) order
    pub fn pillar_names(&self) -> Vec<&str> {
        self.pillars.keys().map(String::as_str).collect()
    }

    /// Look up a pillar
    pub fn pillar(&self, name: &str) -> Option<&PillarConfig> {
        self.pillars.get(name)
    }

    /// Pillar name to weight
    pub fn weights(&self) -> BTreeMap<String, f64> {
        self.pillars
            .iter()
            .map(|(name, p)| (name.clone(), p.weight))
            .collect()
    }

    /// Score for a certification type; unknown types score 0
    ///
    /// Matching ignores case, spaces and punctuation.
    pub fn get_cert_score(&self, cert_type: &str) -> i32 {
        self.cert_index
            .get(&normalize_key(cert_type))
            .copied()
            .unwrap_or(0)
    }

    /// Whether a certification type is on the sovereignty list
    pub fn is_sovereignty_cert(&self, cert_type: &str) -> bool {
        let key = normalize_key(cert_type);
        !key.is_empty()
            && self
                .sovereignty_certifications
                .iter()
                .any(|c| normalize_key(c) == key)
    }

    /// Tier for a final score; scores below the first cut-off (negative included) are waitlist
    pub fn tier_for(&self, score: i32) -> Tier {
        let [standard, strong, top] = self.tiers.thresholds;
        if score >= top {
            Tier::Top
        } else if score >= strong {
            Tier::Strong
        } else if score >= standard {
            Tier::Standard
        } else {
            Tier::Waitlist
        }
    }

    /// One line per pillar for prompt templates
    pub fn pillar_summary(&self) -> String {
        self.pillars
            .iter()
            .map(|(name, p)| {
                if p.description.is_empty() {
                    format!("- {} (0-{})", name, p.max_raw_score)
                } else {
                    format!("- {} (0-{}): {}", name, p.max_raw_score, p.description)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Lowercase alphanumerics only, so "ISO 27001" and "iso-27001" match
pub fn normalize_key(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Substitute `{key}` placeholders in a single pass
///
/// Braces that do not enclose a known key are left untouched, so JSON
/// examples inside templates survive. Substituted text is never rescanned.
pub fn render_prompt(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replacement = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (close, *value))
        });
        match replacement {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn require_placeholders(label: &str, template: &str, keys: &[&str]) -> Result<(), ThesisError> {
    if template.trim().is_empty() {
        return Err(ThesisError::Invalid(format!("prompt '{}' is empty", label)));
    }
    for key in keys {
        if !template.contains(&format!("{{{}}}", key)) {
            return Err(ThesisError::Invalid(format!(
                "prompt '{}' is missing the {{{}}} placeholder",
                label, key
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal(pillars: &str, tiers: &str) -> String {
        format!(
            r#"
name = "t"
version = "1"

{pillars}

[tiers]
thresholds = {tiers}

[prompts]
moat_analysis = "Analyse {{company}}"
semantic_batch = "Score {{companies}} on {{pillars}}"
"#
        )
    }

    const ONE_PILLAR: &str = r#"
[pillars.regulatory]
weight = 1.0
evidence_threshold = 30
max_raw_score = 100
hard_evidence = "certifications"
"#;

    #[test]
    fn test_default_thesis_loads() {
        let thesis = ThesisConfig::default_thesis().unwrap();
        assert_eq!(thesis.name, "sovereign-niche");
        assert_eq!(thesis.pillars.len(), 6);
        let sum: f64 = thesis.weights().values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert_eq!(
            thesis.pillar("regulatory").unwrap().hard_evidence,
            Some(HardEvidenceSource::Certifications)
        );
        assert_eq!(thesis.pillar("data").unwrap().hard_evidence, None);
    }

    #[test]
    fn test_minimal_thesis_uses_section_defaults() {
        let thesis = ThesisConfig::from_toml(&minimal(ONE_PILLAR, "[10, 20, 30]")).unwrap();
        assert_eq!(thesis.risk, RiskConfig::default());
        assert_eq!(thesis.semantic.min_effective_confidence, 0.5);
        assert_eq!(thesis.pillar_names(), vec!["regulatory"]);
        assert_eq!(thesis.term_matching, TermMatching::WholeWord);
    }

    #[test]
    fn test_substring_term_matching_opt_in() {
        let text = format!("term_matching = \"substring\"\n{}", minimal(ONE_PILLAR, "[10, 20, 30]"));
        let thesis = ThesisConfig::from_toml(&text).unwrap();
        assert_eq!(thesis.term_matching, TermMatching::Substring);

        let bad = format!("term_matching = \"fuzzy\"\n{}", minimal(ONE_PILLAR, "[10, 20, 30]"));
        assert!(matches!(ThesisConfig::from_toml(&bad), Err(ThesisError::Parse(_))));
    }

    #[test]
    fn test_cert_score_normalisation() {
        let thesis = ThesisConfig::default_thesis().unwrap();
        assert_eq!(thesis.get_cert_score("ISO 27001"), 60);
        assert_eq!(thesis.get_cert_score("iso27001"), 60);
        assert_eq!(thesis.get_cert_score("  Iso-27001 "), 60);
        assert_eq!(thesis.get_cert_score("Cyber Essentials Plus"), 45);
        assert_eq!(thesis.get_cert_score("ISO 99999"), 0);
        assert_eq!(thesis.get_cert_score(""), 0);
    }

    #[test]
    fn test_sovereignty_certs() {
        let thesis = ThesisConfig::default_thesis().unwrap();
        assert!(thesis.is_sovereignty_cert("secnumcloud"));
        assert!(thesis.is_sovereignty_cert("LIST-X"));
        assert!(!thesis.is_sovereignty_cert("ISO 9001"));
        assert!(!thesis.is_sovereignty_cert(""));
    }

    #[test]
    fn test_tier_for_boundaries() {
        let thesis = ThesisConfig::default_thesis().unwrap();
        assert_eq!(thesis.tier_for(-12), Tier::Waitlist);
        assert_eq!(thesis.tier_for(29), Tier::Waitlist);
        assert_eq!(thesis.tier_for(30), Tier::Standard);
        assert_eq!(thesis.tier_for(50), Tier::Strong);
        assert_eq!(thesis.tier_for(69), Tier::Strong);
        assert_eq!(thesis.tier_for(70), Tier::Top);
        assert_eq!(thesis.tier_for(100), Tier::Top);
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let pillars = r#"
[pillars.a]
weight = 0.5
evidence_threshold = 10
max_raw_score = 100

[pillars.b]
weight = 0.3
evidence_threshold = 10
max_raw_score = 100
"#;
        let err = ThesisConfig::from_toml(&minimal(pillars, "[10, 20, 30]")).unwrap_err();
        assert!(matches!(err, ThesisError::Invalid(msg) if msg.contains("sum")));
    }

    #[test]
    fn test_no_pillars_rejected() {
        let err = ThesisConfig::from_toml(&minimal("[pillars]", "[10, 20, 30]")).unwrap_err();
        assert!(matches!(err, ThesisError::Invalid(_)));
    }

    #[test]
    fn test_tier_thresholds_must_ascend() {
        let err = ThesisConfig::from_toml(&minimal(ONE_PILLAR, "[10, 30, 30]")).unwrap_err();
        assert!(matches!(err, ThesisError::Invalid(msg) if msg.contains("ascending")));
    }

    #[test]
    fn test_threshold_above_max_rejected() {
        let pillars = r#"
[pillars.a]
weight = 1.0
evidence_threshold = 120
max_raw_score = 100
"#;
        assert!(ThesisConfig::from_toml(&minimal(pillars, "[10, 20, 30]")).is_err());
    }

    #[test]
    fn test_bad_pillar_name_rejected() {
        let pillars = r#"
[pillars.Regulatory]
weight = 1.0
evidence_threshold = 10
max_raw_score = 100
"#;
        assert!(ThesisConfig::from_toml(&minimal(pillars, "[10, 20, 30]")).is_err());
    }

    #[test]
    fn test_unknown_hard_evidence_source_is_parse_error() {
        let pillars = r#"
[pillars.a]
weight = 1.0
evidence_threshold = 10
max_raw_score = 100
hard_evidence = "astrology"
"#;
        let err = ThesisConfig::from_toml(&minimal(pillars, "[10, 20, 30]")).unwrap_err();
        assert!(matches!(err, ThesisError::Parse(_)));
    }

    #[test]
    fn test_missing_placeholder_rejected() {
        let text = minimal(ONE_PILLAR, "[10, 20, 30]").replace("{companies}", "the companies");
        let err = ThesisConfig::from_toml(&text).unwrap_err();
        assert!(matches!(err, ThesisError::Invalid(msg) if msg.contains("{companies}")));
    }

    #[test]
    fn test_duplicate_normalised_cert_rejected() {
        let text = format!(
            "{}\n[certifications]\n\"ISO 9001\" = 30\n\"iso-9001\" = 40\n",
            minimal(ONE_PILLAR, "[10, 20, 30]")
        );
        assert!(ThesisConfig::from_toml(&text).is_err());
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let err = ThesisConfig::from_toml("this is = = not toml").unwrap_err();
        assert!(matches!(err, ThesisError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file_fails_fast() {
        let err = ThesisConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ThesisError::Io { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thesis.toml");
        std::fs::write(&path, DEFAULT_THESIS_TOML).unwrap();
        let thesis = ThesisConfig::load(&path).unwrap();
        assert_eq!(thesis, ThesisConfig::default_thesis().unwrap());
    }

    #[test]
    fn test_render_prompt() {
        let rendered = render_prompt(
            "Rate {company} as {\"score\": 1} using {pillars}; {unknown} stays",
            &[("company", "Acme {pillars}"), ("pillars", "- a")],
        );
        assert_eq!(rendered, "Rate Acme {pillars} as {\"score\": 1} using - a; {unknown} stays");
    }

    #[test]
    fn test_bands_grade() {
        let bands = Bands {
            high: 60.0,
            mid: 40.0,
            low: 20.0,
        };
        assert_eq!(bands.grade(75.0), 3);
        assert_eq!(bands.grade(40.0), 2);
        assert_eq!(bands.grade(20.0), 1);
        assert_eq!(bands.grade(-5.0), 0);
    }
}
