//! Company module - the record every pipeline stage reads and mutates

use crate::{
    Certification, LlmMoatAnalysis, MoatAnalysis, PillarAttribute, RevenueSource,
    SemanticEvidence, Tier,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Minimum trimmed description length that counts as scorable input
pub const MIN_DESCRIPTION_CHARS: usize = 30;

/// Unique identifier for a company based on UUIDv7
///
/// UUIDv7 keeps identifiers chronologically sortable, so listing companies
/// by id is listing them in discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CompanyId(u128);

impl CompanyId {
    /// Generate a new UUIDv7-based CompanyId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a CompanyId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a CompanyId from its UUID string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid company id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for CompanyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl From<CompanyId> for String {
    fn from(id: CompanyId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for CompanyId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_string(&value)
    }
}

/// Outcome of the last scoring attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStatus {
    /// A score and tier were assigned
    Scored,
    /// Not enough input to score; `moat_score` is `None`
    InsufficientData,
}

impl ScoringStatus {
    /// Stable string tag
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringStatus::Scored => "scored",
            ScoringStatus::InsufficientData => "insufficient_data",
        }
    }
}

/// Filed-accounts metadata from a company registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiledAccounts {
    /// Account type as filed (e.g. "micro-entity", "small", "full", "dormant")
    pub account_type: String,

    /// Turnover when the filing discloses it
    #[serde(default)]
    pub turnover_gbp: Option<i64>,
}

/// Raw record handed over by a discovery source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredCompany {
    /// Company name as discovered
    pub name: String,
    /// Website URL
    #[serde(default)]
    pub website: Option<String>,
    /// Postal address
    #[serde(default)]
    pub address: Option<String>,
    /// Headquarters country (ISO-3166 alpha-2)
    #[serde(default)]
    pub hq_country: Option<String>,
    /// Certification number listed by the source
    #[serde(default)]
    pub certification_number: Option<String>,
    /// Certification type listed by the source
    #[serde(default)]
    pub certification_type: Option<String>,
    /// Discovery source tag
    pub source: String,
}

/// A company and every fact the pipeline has accumulated about it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Unique identifier
    pub id: CompanyId,
    /// Registered or trading name
    pub name: String,
    /// Headquarters country (ISO-3166 alpha-2; "GB"/"UK" for the United Kingdom)
    pub hq_country: Option<String>,
    /// Postal address
    pub address: Option<String>,
    /// Website URL
    pub website: Option<String>,
    /// Discovery source tag
    pub source: String,

    /// Companies House number
    pub company_number: Option<String>,
    /// SIRENE identifier
    pub siren: Option<String>,
    /// Certification number from discovery
    pub certification_number: Option<String>,

    /// Resolved revenue in GBP
    pub revenue_gbp: Option<i64>,
    /// Provenance of `revenue_gbp`
    pub revenue_source: Option<RevenueSource>,
    /// Last revenue estimate scraped from the website, before resolution
    #[serde(default)]
    pub llm_revenue_estimate_gbp: Option<i64>,
    /// Employee headcount
    pub employee_count: Option<u32>,
    /// Registered officer count
    pub officer_count: Option<u32>,
    /// Registry filed-accounts metadata
    pub filed_accounts: Option<FiledAccounts>,
    /// Annual revenue, oldest first
    #[serde(default)]
    pub revenue_history: Vec<i64>,
    /// Gross margin percentage
    pub gross_margin_pct: Option<f64>,
    /// Year-over-year revenue growth percentage
    pub revenue_growth_pct: Option<f64>,
    /// Estimated market share percentage
    pub market_share_pct: Option<f64>,
    /// Number of named competitors
    pub competitor_count: Option<u32>,
    /// Graph-centrality signal [0.0, 1.0]
    pub network_centrality: Option<f64>,

    /// Free-text description
    pub description: Option<String>,
    /// Sector label
    pub sector: Option<String>,
    /// Raw scraped website text
    pub raw_website_text: Option<String>,
    /// Certifications held
    #[serde(default)]
    pub certifications: Vec<Certification>,

    /// Semantic enrichment sub-object
    pub semantic_evidence: Option<SemanticEvidence>,
    /// Parsed LLM moat analysis
    pub llm_analysis: Option<LlmMoatAnalysis>,

    /// Moat score; `None` means "not yet scorable"
    pub moat_score: Option<i32>,
    /// Tier; `None` when unscored
    pub tier: Option<Tier>,
    /// Pillar name → attribute
    #[serde(default)]
    pub moat_attributes: BTreeMap<String, PillarAttribute>,
    /// Full scoring rationale
    pub moat_analysis: Option<MoatAnalysis>,
    /// Outcome of the last scoring attempt
    pub scoring_status: Option<ScoringStatus>,

    /// When the record was created
    pub discovered_at: u64,
    /// Extraction completion marker
    pub extraction_completed_at: Option<u64>,
    /// Semantic enrichment completion marker
    pub semantically_enriched_at: Option<u64>,
    /// Last time upstream facts changed
    pub facts_updated_at: Option<u64>,
    /// Last scoring attempt
    pub scored_at: Option<u64>,
    /// Failures recorded during the last extraction attempt
    #[serde(default)]
    pub extraction_errors: Vec<String>,
    /// Soft-exclusion reason; excluded companies are skipped by every stage
    pub exclusion_reason: Option<String>,
}

impl Company {
    /// Create a freshly discovered company
    pub fn new(name: impl Into<String>, source: impl Into<String>, discovered_at: u64) -> Self {
        Self {
            id: CompanyId::new(),
            name: name.into(),
            hq_country: None,
            address: None,
            website: None,
            source: source.into(),
            company_number: None,
            siren: None,
            certification_number: None,
            revenue_gbp: None,
            revenue_source: None,
            llm_revenue_estimate_gbp: None,
            employee_count: None,
            officer_count: None,
            filed_accounts: None,
            revenue_history: Vec::new(),
            gross_margin_pct: None,
            revenue_growth_pct: None,
            market_share_pct: None,
            competitor_count: None,
            network_centrality: None,
            description: None,
            sector: None,
            raw_website_text: None,
            certifications: Vec::new(),
            semantic_evidence: None,
            llm_analysis: None,
            moat_score: None,
            tier: None,
            moat_attributes: BTreeMap::new(),
            moat_analysis: None,
            scoring_status: None,
            discovered_at,
            extraction_completed_at: None,
            semantically_enriched_at: None,
            facts_updated_at: None,
            scored_at: None,
            extraction_errors: Vec::new(),
            exclusion_reason: None,
        }
    }

    /// Build a record from a discovery source's raw output
    pub fn from_discovered(raw: &DiscoveredCompany, discovered_at: u64) -> Self {
        let mut company = Self::new(raw.name.trim(), raw.source.clone(), discovered_at);
        company.website = raw.website.clone();
        company.address = raw.address.clone();
        company.hq_country = raw.hq_country.as_ref().map(|c| c.trim().to_uppercase());
        company.certification_number = raw.certification_number.clone();
        if let Some(cert_type) = &raw.certification_type {
            company.certifications.push(Certification::new(cert_type.clone()));
        }
        company
    }

    /// Key used to recognise the same company across discovery sources
    pub fn dedupe_key(&self) -> String {
        dedupe_key(&self.name, self.hq_country.as_deref())
    }

    /// Whether there is enough text to score: website text, or a
    /// description of at least [`MIN_DESCRIPTION_CHARS`] characters
    pub fn has_sufficient_input(&self) -> bool {
        let has_website_text = self
            .raw_website_text
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false);
        let has_description = self
            .description
            .as_deref()
            .map(|d| d.trim().chars().count() >= MIN_DESCRIPTION_CHARS)
            .unwrap_or(false);
        has_website_text || has_description
    }

    /// Latest time any scoring input changed
    pub fn inputs_updated_at(&self) -> Option<u64> {
        match (self.facts_updated_at, self.semantically_enriched_at) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    /// Whether the company has been soft-excluded
    pub fn is_excluded(&self) -> bool {
        self.exclusion_reason.is_some()
    }

    /// Lower-cased description and website text, for keyword matching
    pub fn searchable_text(&self) -> String {
        let mut text = String::new();
        if let Some(description) = &self.description {
            text.push_str(description);
            text.push('\n');
        }
        if let Some(website) = &self.raw_website_text {
            text.push_str(website);
        }
        text.to_lowercase()
    }

    /// Serialize the record for collaborators
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Normalised name + country key
pub fn dedupe_key(name: &str, country: Option<&str>) -> String {
    let mut normalized: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();
    for suffix in ["limited", "ltd", "plc", "sas", "sarl", "gmbh", "bv", "inc"] {
        if normalized.len() > suffix.len() && normalized.ends_with(suffix) {
            normalized.truncate(normalized.len() - suffix.len());
            break;
        }
    }
    let country = country.map(|c| c.trim().to_uppercase()).unwrap_or_default();
    let country = if country == "UK" { "GB".to_string() } else { country };
    format!("{}|{}", normalized, country)
}
