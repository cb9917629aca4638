//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the scoring core and its
//! collaborators. Implementations live in other crates (or in tests).

use crate::{
    Certification, Company, CompanyId, FiledAccounts, ScoringEvent,
};
use serde::{Deserialize, Serialize};

/// Trait for storing and retrieving company records
///
/// Implemented by the infrastructure layer (moat-store)
pub trait CompanyStore {
    /// Error type for store operations
    type Error;

    /// Insert or replace a company record
    fn upsert_company(&mut self, company: &Company) -> Result<(), Self::Error>;

    /// Get a company by ID
    fn get_company(&self, id: CompanyId) -> Result<Option<Company>, Self::Error>;

    /// List every company, in discovery order
    fn list_companies(&self) -> Result<Vec<Company>, Self::Error>;
}

/// Trait for the append-only scoring audit log
///
/// Implemented by the infrastructure layer (moat-store)
pub trait AuditLog {
    /// Error type for audit operations
    type Error;

    /// Append a scoring event
    fn append_event(&mut self, event: &ScoringEvent) -> Result<(), Self::Error>;

    /// Most recent event for a company
    fn latest_event(&self, company_id: CompanyId) -> Result<Option<ScoringEvent>, Self::Error>;

    /// Every event for a company, oldest first
    fn events_for(&self, company_id: CompanyId) -> Result<Vec<ScoringEvent>, Self::Error>;

    /// Total number of events stored
    fn event_count(&self) -> Result<usize, Self::Error>;
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (moat-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate text completion
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Generate with structured output (if supported)
    fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error>;

    /// Provider family (e.g. "anthropic", "ollama"), used to size batches
    fn provider_name(&self) -> &str {
        "unknown"
    }

    /// Model identifier, used for cost accounting
    fn model_name(&self) -> &str {
        "unknown"
    }
}

/// Registry facts returned by a registry lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryFacts {
    /// Companies House number
    #[serde(default)]
    pub company_number: Option<String>,
    /// SIRENE identifier
    #[serde(default)]
    pub siren: Option<String>,
    /// Filed-accounts metadata
    #[serde(default)]
    pub filed_accounts: Option<FiledAccounts>,
    /// Registered officer count
    #[serde(default)]
    pub officer_count: Option<u32>,
    /// Employee headcount
    #[serde(default)]
    pub employee_count: Option<u32>,
    /// Annual revenue, oldest first
    #[serde(default)]
    pub revenue_history: Vec<i64>,
    /// Registered address
    #[serde(default)]
    pub address: Option<String>,
}

/// Facts scraped from a company website
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebsiteFacts {
    /// Raw page text
    #[serde(default)]
    pub text: Option<String>,
    /// Extracted description
    #[serde(default)]
    pub description: Option<String>,
    /// Extracted sector
    #[serde(default)]
    pub sector: Option<String>,
    /// LLM-estimated revenue
    #[serde(default)]
    pub estimated_revenue_gbp: Option<i64>,
    /// Stated headcount
    #[serde(default)]
    pub employee_count: Option<u32>,
    /// Certifications mentioned
    #[serde(default)]
    pub certifications: Vec<Certification>,
    /// Gross margin, when stated
    #[serde(default)]
    pub gross_margin_pct: Option<f64>,
    /// Growth, when stated
    #[serde(default)]
    pub revenue_growth_pct: Option<f64>,
    /// Market share, when stated
    #[serde(default)]
    pub market_share_pct: Option<f64>,
    /// Named competitors
    #[serde(default)]
    pub competitor_count: Option<u32>,
}

/// Trait for the extraction collaborators (registry APIs and scrapers)
///
/// Implemented outside the core; every failure is reported as a string and
/// recorded on the company rather than aborting the run.
pub trait ExtractionSource {
    /// Look up the company in its jurisdiction's registry
    fn lookup_registry(&self, company: &Company) -> Result<Option<RegistryFacts>, String>;

    /// Find the company's website
    fn discover_website(&self, company: &Company) -> Result<Option<String>, String>;

    /// Scrape the company's website
    fn scrape_website(&self, company: &Company, url: &str) -> Result<WebsiteFacts, String>;
}
