//! Offline extraction source backed by a JSON facts file.
//!
//! The file maps company names to the facts a registry client and scraper
//! would have returned:
//!
//! ```json
//! {
//!   "Acme Ltd": {
//!     "registry": { "company_number": "01234567" },
//!     "website": "https://acme.example",
//!     "site": { "text": "Acme builds secure gateways", "certifications": [] }
//!   }
//! }
//! ```
//!
//! Names are matched the way discovery matches them, ignoring case,
//! punctuation and legal suffixes.

use crate::error::Result;
use moat_domain::company::dedupe_key;
use moat_domain::traits::{ExtractionSource, RegistryFacts, WebsiteFacts};
use moat_domain::Company;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Facts recorded for one company.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactsEntry {
    /// Registry lookup result; absent means "not found in the registry"
    #[serde(default)]
    pub registry: Option<RegistryFacts>,

    /// Website returned by discovery when the company has none
    #[serde(default)]
    pub website: Option<String>,

    /// Scraped website facts
    #[serde(default)]
    pub site: Option<WebsiteFacts>,
}

/// Extraction source answering from a facts file.
#[derive(Debug, Default)]
pub struct FileExtractionSource {
    entries: HashMap<String, FactsEntry>,
}

impl FileExtractionSource {
    /// A source with no facts; every company extracts to nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a facts file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse facts from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: HashMap<String, FactsEntry> = serde_json::from_str(text)?;
        let entries = raw
            .into_iter()
            .map(|(name, entry)| (name_key(&name), entry))
            .collect::<HashMap<_, _>>();
        debug!("Loaded facts for {} companies", entries.len());
        Ok(Self { entries })
    }

    /// Number of companies with facts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the source has no facts.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, company: &Company) -> Option<&FactsEntry> {
        self.entries.get(&name_key(&company.name))
    }
}

fn name_key(name: &str) -> String {
    dedupe_key(name.trim(), None)
}

impl ExtractionSource for FileExtractionSource {
    fn lookup_registry(&self, company: &Company) -> std::result::Result<Option<RegistryFacts>, String> {
        Ok(self.entry(company).and_then(|e| e.registry.clone()))
    }

    fn discover_website(&self, company: &Company) -> std::result::Result<Option<String>, String> {
        Ok(self.entry(company).and_then(|e| e.website.clone()))
    }

    fn scrape_website(&self, company: &Company, url: &str) -> std::result::Result<WebsiteFacts, String> {
        self.entry(company)
            .and_then(|e| e.site.clone())
            .ok_or_else(|| format!("no scraped content for {}", url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FACTS: &str = r#"{
        "Acme Ltd": {
            "registry": {
                "company_number": "01234567",
                "filed_accounts": { "account_type": "small" }
            },
            "website": "https://acme.example",
            "site": {
                "text": "Acme builds secure gateways",
                "certifications": [{ "cert_type": "ISO 27001" }]
            }
        },
        "Bare SAS": {}
    }"#;

    #[test]
    fn test_lookup_ignores_case_and_suffix() {
        let source = FileExtractionSource::from_json(FACTS).unwrap();
        assert_eq!(source.len(), 2);

        let company = Company::new("ACME Limited", "test", 0);
        let registry = source.lookup_registry(&company).unwrap().unwrap();
        assert_eq!(registry.company_number.as_deref(), Some("01234567"));
        assert_eq!(
            source.discover_website(&company).unwrap().as_deref(),
            Some("https://acme.example")
        );

        let site = source.scrape_website(&company, "https://acme.example").unwrap();
        assert_eq!(site.certifications.len(), 1);
    }

    #[test]
    fn test_missing_site_is_a_scrape_failure() {
        let source = FileExtractionSource::from_json(FACTS).unwrap();
        let company = Company::new("Bare", "test", 0);
        assert_eq!(source.lookup_registry(&company).unwrap(), None);
        assert!(source
            .scrape_website(&company, "https://bare.example")
            .unwrap_err()
            .contains("https://bare.example"));
    }

    #[test]
    fn test_empty_source() {
        let source = FileExtractionSource::empty();
        assert!(source.is_empty());
        let company = Company::new("Acme", "test", 0);
        assert_eq!(source.discover_website(&company).unwrap(), None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.json");
        fs::write(&path, FACTS).unwrap();
        assert_eq!(FileExtractionSource::load(&path).unwrap().len(), 2);
        assert!(FileExtractionSource::from_json("[1, 2]").is_err());
    }
}
