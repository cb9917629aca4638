//! Extraction stage: registry lookup, website discovery and scraping

use moat_domain::traits::{ExtractionSource, RegistryFacts, WebsiteFacts};
use moat_domain::{Certification, Company, FiledAccounts, RevenueSource};
use moat_scorer::revenue::{resolve, RevenueInput};
use moat_thesis::normalize_key;
use tracing::{debug, warn};

/// What one extraction pass produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionOutcome {
    /// Steps that failed
    pub failed_steps: usize,
    /// Whether any fact differs from before the pass
    pub facts_changed: bool,
}

/// Run every extraction step against a company
///
/// Each step is attempted regardless of the others. Failures are written
/// to `extraction_errors` and counted; `extraction_completed_at` is set to
/// `now` either way, so a permanently failing step is only retried once the
/// skip window has passed. `facts_updated_at` only moves when a fact
/// actually changed (or on the first pass), so an unchanged re-extraction
/// triggers no enrichment or scoring.
///
/// A failed or skipped scrape keeps the previously scraped revenue estimate.
pub fn extract<E: ExtractionSource>(
    company: &mut Company,
    source: &E,
    now: u64,
) -> ExtractionOutcome {
    let before = FactSnapshot::of(company);
    company.extraction_errors.clear();

    match source.lookup_registry(company) {
        Ok(Some(facts)) => apply_registry(company, facts),
        Ok(None) => debug!("No registry entry for '{}'", company.name),
        Err(e) => record_failure(company, "registry", e),
    }

    if company.website.is_none() {
        match source.discover_website(company) {
            Ok(Some(url)) => {
                debug!("Discovered website {} for '{}'", url, company.name);
                company.website = Some(url);
            }
            Ok(None) => debug!("No website found for '{}'", company.name),
            Err(e) => record_failure(company, "website discovery", e),
        }
    }

    if let Some(url) = company.website.clone() {
        match source.scrape_website(company, &url) {
            Ok(facts) => {
                company.llm_revenue_estimate_gbp = facts.estimated_revenue_gbp;
                apply_website(company, facts);
            }
            Err(e) => record_failure(company, "scrape", e),
        }
    }

    let resolved = resolve(&RevenueInput::from_company(company, company.llm_revenue_estimate_gbp));
    debug!(
        "Revenue for '{}': {:?} ({:?})",
        company.name, resolved.revenue_gbp, resolved.source
    );
    company.revenue_gbp = resolved.revenue_gbp;
    company.revenue_source = resolved.source;

    let facts_changed = FactSnapshot::of(company) != before;
    company.extraction_completed_at = Some(now);
    if facts_changed || company.facts_updated_at.is_none() {
        company.facts_updated_at = Some(now);
    } else {
        debug!("Facts for '{}' unchanged", company.name);
    }
    ExtractionOutcome {
        failed_steps: company.extraction_errors.len(),
        facts_changed,
    }
}

/// Every fact extraction can write, for change detection
#[derive(Debug, Clone, PartialEq)]
struct FactSnapshot {
    website: Option<String>,
    address: Option<String>,
    company_number: Option<String>,
    siren: Option<String>,
    filed_accounts: Option<FiledAccounts>,
    officer_count: Option<u32>,
    employee_count: Option<u32>,
    revenue_history: Vec<i64>,
    raw_website_text: Option<String>,
    description: Option<String>,
    sector: Option<String>,
    certifications: Vec<Certification>,
    gross_margin_pct: Option<f64>,
    revenue_growth_pct: Option<f64>,
    market_share_pct: Option<f64>,
    competitor_count: Option<u32>,
    llm_revenue_estimate_gbp: Option<i64>,
    revenue_gbp: Option<i64>,
    revenue_source: Option<RevenueSource>,
}

impl FactSnapshot {
    fn of(company: &Company) -> Self {
        Self {
            website: company.website.clone(),
            address: company.address.clone(),
            company_number: company.company_number.clone(),
            siren: company.siren.clone(),
            filed_accounts: company.filed_accounts.clone(),
            officer_count: company.officer_count,
            employee_count: company.employee_count,
            revenue_history: company.revenue_history.clone(),
            raw_website_text: company.raw_website_text.clone(),
            description: company.description.clone(),
            sector: company.sector.clone(),
            certifications: company.certifications.clone(),
            gross_margin_pct: company.gross_margin_pct,
            revenue_growth_pct: company.revenue_growth_pct,
            market_share_pct: company.market_share_pct,
            competitor_count: company.competitor_count,
            llm_revenue_estimate_gbp: company.llm_revenue_estimate_gbp,
            revenue_gbp: company.revenue_gbp,
            revenue_source: company.revenue_source,
        }
    }
}

fn record_failure(company: &mut Company, step: &str, error: String) {
    warn!("Extraction step '{}' failed for '{}': {}", step, company.name, error);
    company.extraction_errors.push(format!("{}: {}", step, error));
}

fn apply_registry(company: &mut Company, facts: RegistryFacts) {
    if facts.company_number.is_some() {
        company.company_number = facts.company_number;
    }
    if facts.siren.is_some() {
        company.siren = facts.siren;
    }
    if facts.filed_accounts.is_some() {
        company.filed_accounts = facts.filed_accounts;
    }
    if facts.officer_count.is_some() {
        company.officer_count = facts.officer_count;
    }
    // registry headcount wins over anything scraped
    if facts.employee_count.is_some() {
        company.employee_count = facts.employee_count;
    }
    if !facts.revenue_history.is_empty() {
        company.revenue_history = facts.revenue_history;
    }
    if company.address.is_none() {
        company.address = facts.address;
    }
}

fn apply_website(company: &mut Company, facts: WebsiteFacts) {
    if facts.text.is_some() {
        company.raw_website_text = facts.text;
    }
    if facts.description.is_some() {
        company.description = facts.description;
    }
    if facts.sector.is_some() {
        company.sector = facts.sector;
    }
    if company.employee_count.is_none() {
        company.employee_count = facts.employee_count;
    }
    for cert in facts.certifications {
        let key = normalize_key(&cert.cert_type);
        if !company
            .certifications
            .iter()
            .any(|c| normalize_key(&c.cert_type) == key)
        {
            company.certifications.push(cert);
        }
    }
    if facts.gross_margin_pct.is_some() {
        company.gross_margin_pct = facts.gross_margin_pct;
    }
    if facts.revenue_growth_pct.is_some() {
        company.revenue_growth_pct = facts.revenue_growth_pct;
    }
    if facts.market_share_pct.is_some() {
        company.market_share_pct = facts.market_share_pct;
    }
    if facts.competitor_count.is_some() {
        company.competitor_count = facts.competitor_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct StubSource {
        registry: Option<RegistryFacts>,
        registry_error: Option<String>,
        website: Option<String>,
        site: Option<WebsiteFacts>,
    }

    impl ExtractionSource for StubSource {
        fn lookup_registry(&self, _company: &Company) -> Result<Option<RegistryFacts>, String> {
            match &self.registry_error {
                Some(e) => Err(e.clone()),
                None => Ok(self.registry.clone()),
            }
        }

        fn discover_website(&self, _company: &Company) -> Result<Option<String>, String> {
            Ok(self.website.clone())
        }

        fn scrape_website(&self, _company: &Company, url: &str) -> Result<WebsiteFacts, String> {
            self.site
                .clone()
                .ok_or_else(|| format!("connection refused: {}", url))
        }
    }

    fn uk_company() -> Company {
        let mut c = Company::new("Acme", "test", 0);
        c.hq_country = Some("GB".to_string());
        c
    }

    #[test]
    fn test_full_extraction_with_band_midpoint() {
        let source = StubSource {
            registry: Some(RegistryFacts {
                company_number: Some("01234567".to_string()),
                filed_accounts: Some(FiledAccounts {
                    account_type: "micro-entity".to_string(),
                    turnover_gbp: None,
                }),
                ..Default::default()
            }),
            website: Some("https://acme.example".to_string()),
            site: Some(WebsiteFacts {
                text: Some("Acme builds secure gateways".to_string()),
                estimated_revenue_gbp: Some(9_000_000),
                certifications: vec![Certification::new("ISO 27001")],
                ..Default::default()
            }),
            ..Default::default()
        };
        let mut c = uk_company();
        c.certifications.push(Certification::new("iso27001"));

        let failures = extract(&mut c, &source, 50).failed_steps;
        assert_eq!(failures, 0);
        assert_eq!(c.company_number.as_deref(), Some("01234567"));
        assert_eq!(c.website.as_deref(), Some("https://acme.example"));
        assert_eq!(c.revenue_gbp, Some(750_000));
        assert_eq!(c.revenue_source, Some(RevenueSource::ChBandMidpoint));
        assert_eq!(c.certifications.len(), 1);
        assert_eq!(c.extraction_completed_at, Some(50));
        assert_eq!(c.facts_updated_at, Some(50));
    }

    #[test]
    fn test_failures_recorded_and_marker_still_set() {
        let source = StubSource {
            registry_error: Some("503 from registry".to_string()),
            ..Default::default()
        };
        let mut c = uk_company();
        c.website = Some("https://acme.example".to_string());

        let failures = extract(&mut c, &source, 70).failed_steps;
        assert_eq!(failures, 2);
        assert!(c.extraction_errors[0].starts_with("registry:"));
        assert!(c.extraction_errors[1].starts_with("scrape:"));
        assert_eq!(c.extraction_completed_at, Some(70));
    }

    #[test]
    fn test_hallucinated_revenue_rejected() {
        let source = StubSource {
            website: Some("https://acme.example".to_string()),
            site: Some(WebsiteFacts {
                estimated_revenue_gbp: Some(900_000_000),
                ..Default::default()
            }),
            ..Default::default()
        };
        let mut c = Company::new("Acme", "test", 0);
        extract(&mut c, &source, 1);
        assert_eq!(c.revenue_gbp, None);
        assert_eq!(c.revenue_source, None);
    }

    fn estimating_source(estimate: i64) -> StubSource {
        StubSource {
            website: Some("https://acme.example".to_string()),
            site: Some(WebsiteFacts {
                text: Some("Acme builds secure gateways".to_string()),
                estimated_revenue_gbp: Some(estimate),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_unchanged_facts_keep_update_marker() {
        let source = estimating_source(900_000);
        let mut c = Company::new("Acme", "test", 0);

        let first = extract(&mut c, &source, 10);
        assert!(first.facts_changed);
        assert_eq!(c.facts_updated_at, Some(10));

        let second = extract(&mut c, &source, 20);
        assert!(!second.facts_changed);
        assert_eq!(c.extraction_completed_at, Some(20));
        assert_eq!(c.facts_updated_at, Some(10));
    }

    #[test]
    fn test_first_pass_sets_marker_even_without_facts() {
        let mut c = Company::new("Blank", "test", 0);
        let outcome = extract(&mut c, &StubSource::default(), 5);
        assert!(!outcome.facts_changed);
        assert_eq!(c.facts_updated_at, Some(5));

        extract(&mut c, &StubSource::default(), 9);
        assert_eq!(c.facts_updated_at, Some(5));
    }

    #[test]
    fn test_changed_facts_advance_marker() {
        let mut c = Company::new("Acme", "test", 0);
        extract(&mut c, &estimating_source(900_000), 10);

        let outcome = extract(&mut c, &estimating_source(1_200_000), 20);
        assert!(outcome.facts_changed);
        assert_eq!(c.facts_updated_at, Some(20));
        assert_eq!(c.revenue_gbp, Some(1_200_000));
    }

    #[test]
    fn test_failed_scrape_keeps_previous_estimate() {
        let mut c = Company::new("Acme", "test", 0);
        extract(&mut c, &estimating_source(900_000), 10);
        assert_eq!(c.revenue_gbp, Some(900_000));
        assert_eq!(c.revenue_source, Some(RevenueSource::LlmWebsite));

        let failing = StubSource {
            website: Some("https://acme.example".to_string()),
            ..Default::default()
        };
        let outcome = extract(&mut c, &failing, 20);
        assert_eq!(outcome.failed_steps, 1);
        assert!(c.extraction_errors[0].starts_with("scrape:"));
        assert_eq!(c.llm_revenue_estimate_gbp, Some(900_000));
        assert_eq!(c.revenue_gbp, Some(900_000));
        assert_eq!(c.revenue_source, Some(RevenueSource::LlmWebsite));
        assert!(!outcome.facts_changed);
        assert_eq!(c.facts_updated_at, Some(10));
    }

    #[test]
    fn test_failed_scrape_estimate_still_checked_against_band() {
        let mut c = uk_company();
        extract(&mut c, &estimating_source(5_000_000), 10);
        assert_eq!(c.revenue_gbp, Some(5_000_000));

        let registry_only = StubSource {
            registry: Some(RegistryFacts {
                filed_accounts: Some(FiledAccounts {
                    account_type: "micro-entity".to_string(),
                    turnover_gbp: None,
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        let outcome = extract(&mut c, &registry_only, 20);
        assert_eq!(outcome.failed_steps, 1);
        assert_eq!(c.revenue_gbp, Some(750_000));
        assert_eq!(c.revenue_source, Some(RevenueSource::ChBandMidpoint));
        assert!(outcome.facts_changed);
    }
}
