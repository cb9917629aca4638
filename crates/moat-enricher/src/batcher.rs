//! Semantic Enrichment Batcher

use crate::config::EnricherConfig;
use crate::error::EnricherError;
use crate::parser::{pillar_scores, records_from_value};
use crate::prompt::BatchPromptBuilder;
use crate::types::{CompanySummary, EnrichmentResult};
use moat_domain::traits::LlmProvider;
use moat_domain::{current_timestamp, SemanticEvidence, SemanticPillarScore};
use moat_llm::{parse_tolerant, CostTracker, ProviderProfile};
use moat_thesis::ThesisConfig;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

type PillarScores = BTreeMap<String, SemanticPillarScore>;

/// Scores companies on the thesis pillars, several per LLM call
///
/// Every input company gets exactly one [`EnrichmentResult`], in input
/// order. A batch whose response cannot be turned into one valid record per
/// company is retried company by company, so one bad answer only costs that
/// company its evidence.
pub struct SemanticBatcher<L>
where
    L: LlmProvider,
{
    llm: Arc<L>,
    thesis: Arc<ThesisConfig>,
    config: EnricherConfig,
    costs: Option<Arc<CostTracker>>,
}

impl<L> SemanticBatcher<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Create a new batcher
    pub fn new(llm: Arc<L>, thesis: Arc<ThesisConfig>, config: EnricherConfig) -> Self {
        Self {
            llm,
            thesis,
            config,
            costs: None,
        }
    }

    /// Record the cost of every call on a shared tracker
    pub fn with_cost_tracker(mut self, costs: Arc<CostTracker>) -> Self {
        self.costs = Some(costs);
        self
    }

    /// Companies per prompt: configured override, else the provider profile
    pub fn batch_size(&self) -> usize {
        self.config
            .batch_size
            .unwrap_or_else(|| ProviderProfile::for_provider(self.llm.provider_name()).batch_size)
            .max(1)
    }

    /// Enrich companies, stamping results with the current time
    pub async fn enrich(&self, companies: Vec<CompanySummary>) -> Vec<EnrichmentResult> {
        self.enrich_at(companies, current_timestamp()).await
    }

    /// Enrich companies, stamping results with `now`
    pub async fn enrich_at(&self, companies: Vec<CompanySummary>, now: u64) -> Vec<EnrichmentResult> {
        let summaries: Vec<CompanySummary> = companies
            .iter()
            .map(|c| c.truncated(&self.config))
            .collect();
        let batch_size = self.batch_size();

        info!(
            "Enriching {} companies in batches of {} with {}/{}",
            summaries.len(),
            batch_size,
            self.llm.provider_name(),
            self.llm.model_name()
        );

        let mut results = Vec::with_capacity(summaries.len());
        for batch in summaries.chunks(batch_size) {
            results.extend(self.process_batch(batch, now).await);
        }

        let failed = results.iter().filter(|r| !r.is_success()).count();
        info!(
            "Enrichment complete: {} succeeded, {} failed",
            results.len() - failed,
            failed
        );
        results
    }

    async fn process_batch(&self, batch: &[CompanySummary], now: u64) -> Vec<EnrichmentResult> {
        match self.score_batch(batch).await {
            Ok(records) => batch
                .iter()
                .zip(records)
                .map(|(summary, pillars)| self.success(summary, pillars, false, now))
                .collect(),
            Err(e) if batch.len() > 1 => {
                warn!(
                    "Batch of {} failed ({}); retrying companies individually",
                    batch.len(),
                    e
                );
                let mut results = Vec::with_capacity(batch.len());
                for summary in batch {
                    let single = std::slice::from_ref(summary);
                    let result = match self.score_batch(single).await {
                        Ok(mut records) => match records.pop() {
                            Some(pillars) => self.success(summary, pillars, true, now),
                            None => self.failure(summary, "empty response".to_string(), true, now),
                        },
                        Err(e) => self.failure(summary, e.to_string(), true, now),
                    };
                    results.push(result);
                }
                results
            }
            Err(e) => batch
                .iter()
                .map(|summary| self.failure(summary, e.to_string(), false, now))
                .collect(),
        }
    }

    /// One LLM call for the batch, yielding pillar scores per company in order
    async fn score_batch(&self, batch: &[CompanySummary]) -> Result<Vec<PillarScores>, EnricherError> {
        let prompt = BatchPromptBuilder::new(&self.thesis, batch).build();
        debug!("Batch prompt for {} companies: {} chars", batch.len(), prompt.len());

        let response = self.call_llm(&prompt).await?;
        if let Some(costs) = &self.costs {
            costs.record_call(self.llm.provider_name(), self.llm.model_name(), &prompt, &response);
        }

        let parsed = parse_tolerant(&response)?;
        let records = records_from_value(parsed.value)?;
        if records.len() != batch.len() {
            return Err(EnricherError::InvalidFormat(format!(
                "expected {} records, got {}",
                batch.len(),
                records.len()
            )));
        }

        batch
            .iter()
            .zip(records.iter())
            .map(|(summary, record)| {
                let pillars = pillar_scores(record, &self.thesis, summary.input_quality());
                if pillars.is_empty() {
                    Err(EnricherError::InvalidFormat(format!(
                        "no usable pillar scores for '{}'",
                        summary.name
                    )))
                } else {
                    Ok(pillars)
                }
            })
            .collect()
    }

    async fn call_llm(&self, prompt: &str) -> Result<String, EnricherError> {
        let llm = Arc::clone(&self.llm);
        let prompt = prompt.to_string();

        // Providers are blocking; keep them off the async workers
        let task = tokio::task::spawn_blocking(move || {
            llm.generate(&prompt)
                .map_err(|e| EnricherError::Llm(e.to_string()))
        });

        timeout(self.config.call_timeout(), task)
            .await
            .map_err(|_| EnricherError::Timeout(self.config.call_timeout_secs))?
            .map_err(|e| EnricherError::Llm(format!("Task join error: {}", e)))?
    }

    fn success(&self, summary: &CompanySummary, pillars: PillarScores, retried: bool, now: u64) -> EnrichmentResult {
        EnrichmentResult {
            company_id: summary.company_id,
            evidence: SemanticEvidence {
                pillars,
                input_quality: summary.input_quality(),
                enrichment_successful: true,
                error: None,
                model: self.llm.model_name().to_string(),
                enriched_at: now,
            },
            retried,
        }
    }

    fn failure(&self, summary: &CompanySummary, error: String, retried: bool, now: u64) -> EnrichmentResult {
        warn!("Enrichment failed for '{}': {}", summary.name, error);
        EnrichmentResult {
            company_id: summary.company_id,
            evidence: SemanticEvidence::failed(
                error,
                summary.input_quality(),
                self.llm.model_name(),
                now,
            ),
            retried,
        }
    }
}
