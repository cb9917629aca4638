//! End-to-end pipeline runs against an in-memory SQLite store

use moat_domain::traits::{AuditLog, CompanyStore, ExtractionSource, RegistryFacts, WebsiteFacts};
use moat_domain::{Certification, Company, DiscoveredCompany, ScoringStatus, ScoringTrigger, Tier};
use moat_llm::MockProvider;
use moat_pipeline::{Pipeline, PipelineConfig, PipelineMetrics, PipelineStage};
use moat_store::SqliteStore;
use moat_thesis::ThesisConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const DAY: u64 = 86_400;

/// Website facts keyed by company name; companies without facts have no site
#[derive(Default)]
struct FakeWeb {
    sites: Mutex<HashMap<String, WebsiteFacts>>,
}

impl FakeWeb {
    fn set(&self, name: &str, facts: WebsiteFacts) {
        self.sites.lock().unwrap().insert(name.to_string(), facts);
    }
}

impl ExtractionSource for FakeWeb {
    fn lookup_registry(&self, _company: &Company) -> Result<Option<RegistryFacts>, String> {
        Ok(None)
    }

    fn discover_website(&self, company: &Company) -> Result<Option<String>, String> {
        let sites = self.sites.lock().unwrap();
        Ok(sites
            .get(&company.name)
            .map(|_| format!("https://{}.example", company.name.to_lowercase().replace(' ', "-"))))
    }

    fn scrape_website(&self, company: &Company, _url: &str) -> Result<WebsiteFacts, String> {
        self.sites
            .lock()
            .unwrap()
            .get(&company.name)
            .cloned()
            .ok_or_else(|| "404".to_string())
    }
}

fn discovered(name: &str, cert: Option<&str>) -> DiscoveredCompany {
    DiscoveredCompany {
        name: name.to_string(),
        website: None,
        address: None,
        hq_country: Some("gb".to_string()),
        certification_number: None,
        certification_type: cert.map(str::to_string),
        source: "fca-register".to_string(),
    }
}

fn acme_site(extra: &str) -> WebsiteFacts {
    WebsiteFacts {
        text: Some(format!(
            "Acme Secure provides managed security operations for regulated financial institutions.{}",
            extra
        )),
        sector: Some("Cybersecurity".to_string()),
        employee_count: Some(40),
        ..Default::default()
    }
}

fn thesis() -> Arc<ThesisConfig> {
    Arc::new(ThesisConfig::default_thesis().unwrap())
}

fn pipeline(web: FakeWeb) -> Pipeline<SqliteStore, FakeWeb, MockProvider> {
    let store = SqliteStore::new(":memory:").unwrap();
    Pipeline::new(store, web, thesis(), PipelineConfig::default()).unwrap()
}

fn company_named(pipeline: &Pipeline<SqliteStore, FakeWeb, MockProvider>, name: &str) -> Company {
    pipeline
        .store()
        .list_companies()
        .unwrap()
        .into_iter()
        .find(|c| c.name == name)
        .unwrap()
}

#[tokio::test]
async fn test_discovery_dedupes_on_name_and_country() {
    let mut p = pipeline(FakeWeb::default());
    let mut metrics = PipelineMetrics::new();

    let raw = vec![
        discovered("Acme Secure Ltd", None),
        discovered("ACME SECURE LIMITED", Some("ISO 27001")),
        discovered("Blank Holdings", None),
    ];
    assert_eq!(p.discover_at(&raw, 1, &mut metrics).unwrap(), 2);
    assert_eq!(metrics.duplicates, 1);

    // a second import of the same records adds nothing
    assert_eq!(p.discover_at(&raw, 2, &mut metrics).unwrap(), 0);
    assert_eq!(p.store().list_companies().unwrap().len(), 2);
}

#[tokio::test]
async fn test_run_scores_and_second_run_is_a_no_op() {
    let web = FakeWeb::default();
    web.set("Acme Secure", acme_site(""));
    let mut p = pipeline(web);
    let mut metrics = PipelineMetrics::new();
    p.discover_at(
        &[discovered("Acme Secure", Some("FCA Authorised")), discovered("Blank Holdings", None)],
        1,
        &mut metrics,
    )
    .unwrap();

    let first = p.run_at(1_000).await.unwrap();
    assert_eq!(first.metrics.extracted, 2);
    assert_eq!(first.metrics.scored, 1);
    assert_eq!(first.metrics.insufficient_data, 1);
    assert_eq!(first.metrics.events_appended, 1);
    assert_eq!(first.report.new_entries().len(), 1);

    let acme = company_named(&p, "Acme Secure");
    assert_eq!(PipelineStage::of(&acme), PipelineStage::Scored);
    assert_eq!(acme.moat_score, Some(20));
    assert_eq!(acme.tier, Some(Tier::Waitlist));
    assert!(acme.website.is_some());

    let blank = company_named(&p, "Blank Holdings");
    assert_eq!(blank.scoring_status, Some(ScoringStatus::InsufficientData));
    assert_eq!(blank.moat_score, None);
    assert_eq!(blank.extraction_errors.len(), 0);

    let second = p.run_at(1_000 + DAY).await.unwrap();
    assert_eq!(second.metrics.extracted, 0);
    assert_eq!(second.metrics.scored, 0);
    assert_eq!(second.metrics.insufficient_data, 0);
    assert_eq!(second.metrics.events_appended, 0);
    assert!(second.report.is_empty());
    assert_eq!(p.store().event_count().unwrap(), 1);
}

#[tokio::test]
async fn test_rescan_after_skip_window_promotes() {
    let web = FakeWeb::default();
    web.set("Acme Secure", acme_site(""));
    let mut p = pipeline(web);
    let mut metrics = PipelineMetrics::new();
    p.discover_at(&[discovered("Acme Secure", Some("FCA Authorised"))], 1, &mut metrics)
        .unwrap();
    p.run_at(1_000).await.unwrap();

    // new upstream facts only show up once the skip window has passed
    let mut richer = acme_site(" Integrates with Salesforce. Products tested by Intertek.");
    richer.certifications.push(Certification::new("SecNumCloud"));
    p.source().set("Acme Secure", richer);

    let early = p.run_at(1_000 + 3 * DAY).await.unwrap();
    assert_eq!(early.metrics.events_appended, 0);

    let later = p.run_at(1_000 + 8 * DAY).await.unwrap();
    assert_eq!(later.metrics.extracted, 1);
    assert_eq!(later.metrics.events_appended, 1);

    let promotions = later.report.promotions();
    assert_eq!(promotions.len(), 1);
    assert_eq!(promotions[0].old_tier, Some(Tier::Waitlist));
    assert_eq!(promotions[0].new_tier, Tier::Strong);
    assert!(promotions[0].is_notable());
    assert_eq!(later.report.notable_changes().len(), 1);

    let acme = company_named(&p, "Acme Secure");
    let events = p.store().events_for(acme.id).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].trigger, ScoringTrigger::Rescan);
    assert_eq!(events[1].previous_score, Some(20));
    assert_eq!(events[1].score_delta, events[1].moat_score - 20);
    assert!(events[1].pillar_changes.contains_key("network"));
    assert!(events[1].pillar_changes.contains_key("regulatory"));
}

#[tokio::test]
async fn test_unchanged_rescan_after_window_does_not_rescore() {
    let web = FakeWeb::default();
    web.set("Acme Secure", acme_site(""));
    let mut p = pipeline(web);
    let mut metrics = PipelineMetrics::new();
    p.discover_at(
        &[discovered("Acme Secure", Some("FCA Authorised")), discovered("Blank Holdings", None)],
        1,
        &mut metrics,
    )
    .unwrap();
    p.run_at(1_000).await.unwrap();

    let rescan = p.run_at(1_000 + 8 * DAY).await.unwrap();
    assert_eq!(rescan.metrics.extracted, 2);
    assert_eq!(rescan.metrics.facts_unchanged, 2);
    assert_eq!(rescan.metrics.scored, 0);
    assert_eq!(rescan.metrics.insufficient_data, 0);
    assert_eq!(rescan.metrics.events_appended, 0);
    assert_eq!(p.store().event_count().unwrap(), 1);

    let blank = company_named(&p, "Blank Holdings");
    assert_eq!(blank.extraction_completed_at, Some(1_000 + 8 * DAY));
    assert_eq!(blank.facts_updated_at, Some(1_000));
    assert_eq!(blank.scored_at, Some(1_000));
}

#[tokio::test]
async fn test_unchanged_rescan_makes_no_llm_calls() {
    let web = FakeWeb::default();
    web.set("Acme Secure", acme_site(""));

    let mut llm = MockProvider::new(r#"{"overall_moat_score": 20, "reasoning": "thin"}"#);
    llm.add_response(
        "Companies in this batch",
        r#"[{"data": {"score": 60, "confidence": 0.9, "band": [50, 70], "justification": "Telemetry"}}]"#,
    );
    let llm = Arc::new(llm);

    let store = SqliteStore::new(":memory:").unwrap();
    let mut p = Pipeline::new(store, web, thesis(), PipelineConfig::default())
        .unwrap()
        .with_llm(Arc::clone(&llm));
    let mut metrics = PipelineMetrics::new();
    p.discover_at(&[discovered("Acme Secure", None)], 1, &mut metrics).unwrap();

    p.run_at(1_000).await.unwrap();
    let calls = llm.call_count();
    assert!(calls > 0);

    let rescan = p.run_at(1_000 + 8 * DAY).await.unwrap();
    assert_eq!(rescan.metrics.extracted, 1);
    assert_eq!(rescan.metrics.llm_calls, 0);
    assert_eq!(rescan.metrics.events_appended, 0);
    assert_eq!(llm.call_count(), calls);
}

#[tokio::test]
async fn test_forced_run_rescores_everything() {
    let web = FakeWeb::default();
    web.set("Acme Secure", acme_site(""));
    let store = SqliteStore::new(":memory:").unwrap();
    let mut p: Pipeline<_, _, MockProvider> =
        Pipeline::new(store, web, thesis(), PipelineConfig::default()).unwrap();
    let mut metrics = PipelineMetrics::new();
    p.discover_at(&[discovered("Acme Secure", Some("FCA Authorised"))], 1, &mut metrics)
        .unwrap();
    p.run_at(1_000).await.unwrap();

    let store = p.into_store();
    let config = PipelineConfig {
        force: true,
        ..Default::default()
    };
    let web = FakeWeb::default();
    web.set("Acme Secure", acme_site(""));
    let mut forced: Pipeline<_, _, MockProvider> = Pipeline::new(store, web, thesis(), config).unwrap();

    let summary = forced.run_at(1_001).await.unwrap();
    assert_eq!(summary.metrics.extracted, 1);
    assert_eq!(summary.metrics.events_appended, 1);
    // same facts, same tier: rescored without a tier change
    assert!(summary.report.is_empty());
    assert_eq!(forced.store().event_count().unwrap(), 2);
}

#[tokio::test]
async fn test_excluded_companies_are_skipped() {
    let web = FakeWeb::default();
    web.set("Acme Secure", acme_site(""));
    let mut p = pipeline(web);
    let mut metrics = PipelineMetrics::new();
    p.discover_at(&[discovered("Acme Secure", None)], 1, &mut metrics).unwrap();

    let mut acme = company_named(&p, "Acme Secure");
    acme.exclusion_reason = Some("acquired".to_string());
    p.store_mut().upsert_company(&acme).unwrap();

    let summary = p.run_at(1_000).await.unwrap();
    assert_eq!(summary.metrics.excluded, 1);
    assert_eq!(summary.metrics.extracted, 0);
    assert_eq!(PipelineStage::of(&company_named(&p, "Acme Secure")), PipelineStage::Discovered);
}

#[tokio::test]
async fn test_llm_stages_feed_scoring() {
    let web = FakeWeb::default();
    web.set("Acme Secure", acme_site(""));

    let mut llm = MockProvider::new(
        r#"{"switching_costs": {"score": 60, "evidence": "Multi-year managed service contracts"}, "overall_moat_score": 40, "recommended_tier": "standard", "reasoning": "Sticky contracts"}"#,
    );
    llm.add_response(
        "Companies in this batch",
        r#"[{"data": {"score": 60, "confidence": 0.9, "band": [50, 70], "justification": "Proprietary threat telemetry"}}]"#,
    );
    let llm = Arc::new(llm);

    let store = SqliteStore::new(":memory:").unwrap();
    let mut p = Pipeline::new(store, web, thesis(), PipelineConfig::default())
        .unwrap()
        .with_llm(Arc::clone(&llm));
    let mut metrics = PipelineMetrics::new();
    p.discover_at(&[discovered("Acme Secure", Some("FCA Authorised"))], 1, &mut metrics)
        .unwrap();

    let summary = p.run_at(1_000).await.unwrap();
    assert_eq!(summary.metrics.enriched, 1);
    assert_eq!(summary.metrics.analysed, 1);
    assert_eq!(summary.metrics.llm_calls, 2);
    assert_eq!(llm.call_count(), 2);

    let acme = company_named(&p, "Acme Secure");
    assert_eq!(acme.semantically_enriched_at, Some(1_000));
    assert!(acme.semantic_evidence.as_ref().unwrap().enrichment_successful);
    assert!(acme.moat_attributes["data"].present);
    assert!(acme.moat_attributes["switching_costs"].present);
    // regulatory 20 + data 6 + switching costs 9
    assert_eq!(acme.moat_score, Some(35));
    assert_eq!(acme.tier, Some(Tier::Standard));

    let again = p.run_at(1_000 + DAY).await.unwrap();
    assert_eq!(again.metrics.llm_calls, 0);
    assert_eq!(llm.call_count(), 2);
}

#[tokio::test]
async fn test_llm_failure_still_marks_enrichment() {
    let web = FakeWeb::default();
    web.set("Acme Secure", acme_site(""));

    let mut llm = MockProvider::new("{}");
    llm.add_error("Acme Secure");
    let llm = Arc::new(llm);

    let store = SqliteStore::new(":memory:").unwrap();
    let mut p = Pipeline::new(store, web, thesis(), PipelineConfig::default())
        .unwrap()
        .with_llm(Arc::clone(&llm));
    let mut metrics = PipelineMetrics::new();
    p.discover_at(&[discovered("Acme Secure", Some("FCA Authorised"))], 1, &mut metrics)
        .unwrap();

    let summary = p.run_at(1_000).await.unwrap();
    assert_eq!(summary.metrics.enrichment_failures, 1);
    assert_eq!(summary.metrics.analysis_failures, 1);
    // the hard evidence still scores
    assert_eq!(summary.metrics.scored, 1);

    let acme = company_named(&p, "Acme Secure");
    let evidence = acme.semantic_evidence.unwrap();
    assert!(!evidence.enrichment_successful);
    assert!(evidence.error.is_some());
    assert_eq!(acme.semantically_enriched_at, Some(1_000));
    assert_eq!(acme.moat_score, Some(20));
}
