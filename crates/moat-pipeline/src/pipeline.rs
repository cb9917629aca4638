//! Pipeline orchestrator

use crate::extraction::extract;
use crate::state::{needs_enrichment, needs_extraction, needs_scoring};
use crate::{PipelineConfig, PipelineError, PipelineMetrics};
use moat_audit::{build_scoring_event, detect_tier_change, TierChangeReport};
use moat_domain::traits::{AuditLog, CompanyStore, ExtractionSource, LlmProvider};
use moat_domain::{current_timestamp, Company, CompanyId, DiscoveredCompany};
use moat_enricher::{CompanySummary, SemanticBatcher};
use moat_llm::CostTracker;
use moat_scorer::{MoatAnalyst, MoatScorer};
use moat_thesis::ThesisConfig;
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// What one run produced
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Counts for every stage
    pub metrics: PipelineMetrics,
    /// Tier movements detected while scoring
    pub report: TierChangeReport,
}

/// Drives companies through extraction, enrichment and scoring
///
/// Each run loads every stored company and advances the ones whose
/// completion markers say there is work to do. Stages run one after the
/// other; a company's failure is logged and counted, never fatal to the run.
///
/// # Examples
///
/// ```no_run
/// use moat_llm::MockProvider;
/// use moat_pipeline::{Pipeline, PipelineConfig};
/// # use moat_domain::traits::{ExtractionSource, RegistryFacts, WebsiteFacts};
/// # use moat_domain::Company;
/// # struct NoSource;
/// # impl ExtractionSource for NoSource {
/// #     fn lookup_registry(&self, _: &Company) -> Result<Option<RegistryFacts>, String> { Ok(None) }
/// #     fn discover_website(&self, _: &Company) -> Result<Option<String>, String> { Ok(None) }
/// #     fn scrape_website(&self, _: &Company, _: &str) -> Result<WebsiteFacts, String> { Ok(WebsiteFacts::default()) }
/// # }
/// use moat_store::SqliteStore;
/// use moat_thesis::ThesisConfig;
/// use std::sync::Arc;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let store = SqliteStore::new("moat.db")?;
/// let thesis = Arc::new(ThesisConfig::default_thesis()?);
/// let mut pipeline = Pipeline::<_, _, MockProvider>::new(store, NoSource, thesis, PipelineConfig::default())?;
///
/// let summary = pipeline.run().await?;
/// println!("{}", summary.metrics.summary());
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<S, E, L>
where
    L: LlmProvider,
{
    store: S,
    source: E,
    thesis: Arc<ThesisConfig>,
    scorer: MoatScorer,
    batcher: Option<SemanticBatcher<L>>,
    analyst: Option<MoatAnalyst<L>>,
    costs: Arc<CostTracker>,
    config: PipelineConfig,
}

impl<S, E, L> Pipeline<S, E, L>
where
    S: CompanyStore + AuditLog,
    <S as CompanyStore>::Error: Display,
    <S as AuditLog>::Error: Display,
    E: ExtractionSource,
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    /// Create a pipeline without LLM stages
    pub fn new(
        store: S,
        source: E,
        thesis: Arc<ThesisConfig>,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        config.validate().map_err(PipelineError::Config)?;
        Ok(Self {
            store,
            source,
            scorer: MoatScorer::new(Arc::clone(&thesis)),
            thesis,
            batcher: None,
            analyst: None,
            costs: Arc::new(CostTracker::new()),
            config,
        })
    }

    /// Enable the LLM stages the configuration asks for
    pub fn with_llm(mut self, llm: Arc<L>) -> Self {
        if self.config.enrichment_enabled {
            self.batcher = Some(
                SemanticBatcher::new(
                    Arc::clone(&llm),
                    Arc::clone(&self.thesis),
                    self.config.enricher.clone(),
                )
                .with_cost_tracker(Arc::clone(&self.costs)),
            );
        }
        if self.config.analysis_enabled {
            self.analyst = Some(
                MoatAnalyst::new(llm, Arc::clone(&self.thesis))
                    .with_timeout(self.config.enricher.call_timeout_secs)
                    .with_cost_tracker(Arc::clone(&self.costs)),
            );
        }
        self
    }

    /// Share an existing cost tracker
    ///
    /// Call before [`with_llm`](Self::with_llm) so the LLM stages record on it.
    pub fn with_cost_tracker(mut self, costs: Arc<CostTracker>) -> Self {
        self.costs = costs;
        self
    }

    /// The cost tracker every LLM stage records on
    pub fn costs(&self) -> &Arc<CostTracker> {
        &self.costs
    }

    /// Get a reference to the extraction source
    pub fn source(&self) -> &E {
        &self.source
    }

    /// Get a reference to the store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a mutable reference to the store
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consume the pipeline, returning the store
    pub fn into_store(self) -> S {
        self.store
    }

    /// Store newly discovered companies, skipping ones already known
    ///
    /// Companies are matched on normalised name + country, both against the
    /// store and within `raw`. Returns the number of new companies.
    pub fn discover(
        &mut self,
        raw: &[DiscoveredCompany],
        metrics: &mut PipelineMetrics,
    ) -> Result<usize, PipelineError> {
        self.discover_at(raw, current_timestamp(), metrics)
    }

    /// Like [`discover`](Self::discover) with an explicit clock
    pub fn discover_at(
        &mut self,
        raw: &[DiscoveredCompany],
        now: u64,
        metrics: &mut PipelineMetrics,
    ) -> Result<usize, PipelineError> {
        let mut known: HashSet<String> = self
            .store
            .list_companies()
            .map_err(|e| PipelineError::Store(e.to_string()))?
            .iter()
            .map(Company::dedupe_key)
            .collect();

        let mut added = 0;
        for record in raw {
            let company = Company::from_discovered(record, now);
            if !known.insert(company.dedupe_key()) {
                debug!("Duplicate discovery record '{}' from {}", record.name, record.source);
                metrics.duplicates += 1;
                continue;
            }
            match self.store.upsert_company(&company) {
                Ok(()) => added += 1,
                Err(e) => {
                    error!("Failed to store discovered company '{}': {}", company.name, e);
                    metrics.store_failures += 1;
                }
            }
        }

        metrics.discovered += added;
        info!("Discovery: {} new, {} duplicates", added, metrics.duplicates);
        Ok(added)
    }

    /// Run every stage once, using the current time
    pub async fn run(&mut self) -> Result<RunSummary, PipelineError> {
        self.run_at(current_timestamp()).await
    }

    /// Run every stage once at `now`
    ///
    /// Only a failure to list the stored companies aborts the run.
    pub async fn run_at(&mut self, now: u64) -> Result<RunSummary, PipelineError> {
        let start = Instant::now();
        let calls_before = self.costs.total_calls();
        let cost_before = self.costs.total_cost_usd();
        let mut summary = RunSummary::default();

        let mut companies = self
            .store
            .list_companies()
            .map_err(|e| PipelineError::Store(e.to_string()))?;
        summary.metrics.excluded = companies.iter().filter(|c| c.is_excluded()).count();

        info!(
            "Pipeline run over {} companies ({} excluded){}",
            companies.len(),
            summary.metrics.excluded,
            if self.config.force { ", forced" } else { "" }
        );

        self.extract_stage(&mut companies, now, &mut summary.metrics);
        self.llm_stage(&mut companies, now, &mut summary.metrics).await;
        self.scoring_stage(&mut companies, now, &mut summary);

        summary.metrics.llm_calls = self.costs.total_calls() - calls_before;
        summary.metrics.llm_cost_usd = self.costs.total_cost_usd() - cost_before;
        summary.metrics.total_runtime_secs = start.elapsed().as_secs();

        info!(
            "Pipeline run complete: {} scored, {} events, {} tier changes",
            summary.metrics.scored,
            summary.metrics.events_appended,
            summary.report.len()
        );
        Ok(summary)
    }

    fn extract_stage(&mut self, companies: &mut [Company], now: u64, metrics: &mut PipelineMetrics) {
        let window = self.config.skip_window().as_secs();
        for company in companies.iter_mut() {
            if !needs_extraction(company, now, window, self.config.force) {
                continue;
            }
            let outcome = extract(company, &self.source, now);
            metrics.extraction_step_failures += outcome.failed_steps;
            metrics.extracted += 1;
            if !outcome.facts_changed {
                metrics.facts_unchanged += 1;
            }
            self.save(company, metrics);
        }
    }

    async fn llm_stage(&mut self, companies: &mut [Company], now: u64, metrics: &mut PipelineMetrics) {
        if self.batcher.is_none() && self.analyst.is_none() {
            return;
        }

        let due: Vec<usize> = companies
            .iter()
            .enumerate()
            .filter(|(_, c)| needs_enrichment(c, self.config.force))
            .map(|(i, _)| i)
            .collect();
        if due.is_empty() {
            return;
        }

        if let Some(batcher) = &self.batcher {
            let summaries = due
                .iter()
                .map(|&i| CompanySummary::from_company(&companies[i]))
                .collect();
            let results = batcher.enrich_at(summaries, now).await;

            let mut by_id: HashMap<CompanyId, usize> = HashMap::new();
            for &i in &due {
                by_id.insert(companies[i].id, i);
            }
            for result in results {
                let Some(&i) = by_id.get(&result.company_id) else {
                    warn!("Enrichment result for unknown company {}", result.company_id);
                    continue;
                };
                if result.retried {
                    metrics.enrichment_retries += 1;
                }
                if result.is_success() {
                    metrics.enriched += 1;
                } else {
                    metrics.enrichment_failures += 1;
                }
                companies[i].semantic_evidence = Some(result.evidence);
            }
        }

        if let Some(analyst) = &self.analyst {
            for &i in &due {
                let company = &companies[i];
                if !company.has_sufficient_input() {
                    continue;
                }
                match analyst.analyse(company).await {
                    Ok(analysis) => {
                        companies[i].llm_analysis = Some(analysis);
                        metrics.analysed += 1;
                    }
                    Err(e) => {
                        warn!("Moat analysis failed for '{}': {}", company.name, e);
                        metrics.analysis_failures += 1;
                    }
                }
            }
        }

        // Marker is set even when the LLM failed; the error stays on the evidence
        for &i in &due {
            companies[i].semantically_enriched_at = Some(now);
            self.save(&companies[i], metrics);
        }
    }

    fn scoring_stage(&mut self, companies: &mut [Company], now: u64, summary: &mut RunSummary) {
        for company in companies.iter_mut() {
            if !needs_scoring(company, self.config.force) {
                continue;
            }

            let previous = match self.store.latest_event(company.id) {
                Ok(previous) => previous,
                Err(e) => {
                    error!("Failed to load scoring history for '{}': {}", company.name, e);
                    summary.metrics.store_failures += 1;
                    continue;
                }
            };

            let outcome = self.scorer.score(company, previous.as_ref());
            let Some(event) =
                build_scoring_event(company.id, &outcome, &self.thesis, previous.as_ref(), now)
            else {
                debug!("'{}' lacks input, marked insufficient_data", company.name);
                outcome.apply(company, now);
                summary.metrics.insufficient_data += 1;
                self.save(company, &mut summary.metrics);
                continue;
            };

            // Leave the company unscored if the event cannot be recorded
            if let Err(e) = self.store.append_event(&event) {
                error!("Failed to append scoring event for '{}': {}", company.name, e);
                summary.metrics.store_failures += 1;
                continue;
            }
            summary.metrics.events_appended += 1;
            summary.metrics.scored += 1;

            if let Some(change) = detect_tier_change(
                company.id,
                &company.name,
                previous.as_ref().map(|p| p.tier.as_str()),
                outcome.tier,
                previous.as_ref().map(|p| p.moat_score),
                outcome.moat_score,
                &outcome.attributes,
            ) {
                info!(
                    "Tier change for '{}': {} -> {} ({})",
                    company.name,
                    change.old_tier.map(|t| t.as_str()).unwrap_or("none"),
                    change.new_tier,
                    change.direction
                );
                summary.report.push(change);
            }

            outcome.apply(company, now);
            self.save(company, &mut summary.metrics);
        }
    }

    fn save(&mut self, company: &Company, metrics: &mut PipelineMetrics) {
        if let Err(e) = self.store.upsert_company(company) {
            error!("Failed to store company '{}': {}", company.name, e);
            metrics.store_failures += 1;
        }
    }
}
