//! LLM moat analysis for a single company

use crate::error::ScorerError;
use moat_domain::traits::LlmProvider;
use moat_domain::{Company, LlmMoatAnalysis, LlmPillarScore, Tier};
use moat_llm::{parse_tolerant, CostTracker};
use moat_thesis::{render_prompt, ThesisConfig};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

const MAX_DESCRIPTION_CHARS: usize = 1500;
const MAX_WEBSITE_CHARS: usize = 3000;

/// Asks the LLM for a whole-company moat assessment
///
/// The result becomes the fallback soft evidence for pillars the semantic
/// batcher did not cover with enough confidence.
pub struct MoatAnalyst<L>
where
    L: LlmProvider,
{
    llm: Arc<L>,
    thesis: Arc<ThesisConfig>,
    timeout_secs: u64,
    costs: Option<Arc<CostTracker>>,
}

impl<L> MoatAnalyst<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Create an analyst with a 120 second call timeout
    pub fn new(llm: Arc<L>, thesis: Arc<ThesisConfig>) -> Self {
        Self {
            llm,
            thesis,
            timeout_secs: 120,
            costs: None,
        }
    }

    /// Override the call timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs.max(1);
        self
    }

    /// Record the cost of every call on a shared tracker
    pub fn with_cost_tracker(mut self, costs: Arc<CostTracker>) -> Self {
        self.costs = Some(costs);
        self
    }

    /// Render the thesis moat-analysis prompt for a company
    pub fn build_prompt(&self, company: &Company) -> String {
        let pillars = self.thesis.pillar_summary();
        let block = company_block(company);
        render_prompt(
            &self.thesis.prompts.moat_analysis,
            &[
                ("thesis", self.thesis.name.as_str()),
                ("pillars", pillars.as_str()),
                ("company", block.as_str()),
            ],
        )
    }

    /// Analyse one company
    pub async fn analyse(&self, company: &Company) -> Result<LlmMoatAnalysis, ScorerError> {
        let prompt = self.build_prompt(company);
        debug!("Moat analysis prompt for '{}': {} chars", company.name, prompt.len());

        let llm = Arc::clone(&self.llm);
        let request = prompt.clone();
        let task = tokio::task::spawn_blocking(move || {
            llm.generate(&request).map_err(|e| ScorerError::Llm(e.to_string()))
        });
        let response = timeout(Duration::from_secs(self.timeout_secs), task)
            .await
            .map_err(|_| ScorerError::Timeout(self.timeout_secs))?
            .map_err(|e| ScorerError::Llm(format!("Task join error: {}", e)))??;

        if let Some(costs) = &self.costs {
            costs.record_call(self.llm.provider_name(), self.llm.model_name(), &prompt, &response);
        }

        let parsed = parse_tolerant(&response)?;
        let analysis = parse_moat_analysis(&parsed.value, &self.thesis)?;
        info!(
            "Moat analysis for '{}': {} pillars, overall {:?}",
            company.name,
            analysis.pillars.len(),
            analysis.overall_moat_score
        );
        Ok(analysis)
    }
}

/// Interpret a recovered JSON value as a moat analysis
///
/// Pillar entries may be `{score, evidence}` objects or bare numbers; scores
/// are clamped to the pillar range. At least one thesis pillar must be
/// present. A one-element array is unwrapped.
pub fn parse_moat_analysis(value: &Value, thesis: &ThesisConfig) -> Result<LlmMoatAnalysis, ScorerError> {
    let object = match value {
        Value::Object(map) => map,
        Value::Array(items) if items.len() == 1 => items[0]
            .as_object()
            .ok_or_else(|| ScorerError::InvalidFormat("array element is not an object".to_string()))?,
        _ => {
            return Err(ScorerError::InvalidFormat(
                "expected a single JSON object".to_string(),
            ))
        }
    };

    let mut pillars = BTreeMap::new();
    for (name, pillar) in &thesis.pillars {
        let Some(entry) = object.get(name) else {
            continue;
        };
        let (score, evidence) = match entry {
            Value::Object(fields) => (
                fields.get("score").and_then(number),
                fields
                    .get("evidence")
                    .or_else(|| fields.get("justification"))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
            ),
            other => (number(other), String::new()),
        };
        if let Some(score) = score {
            pillars.insert(
                name.clone(),
                LlmPillarScore {
                    score: clamp(score, pillar.max_raw_score),
                    evidence,
                },
            );
        }
    }

    if pillars.is_empty() {
        return Err(ScorerError::InvalidFormat(
            "no thesis pillar scores in response".to_string(),
        ));
    }

    Ok(LlmMoatAnalysis {
        pillars,
        overall_moat_score: object
            .get("overall_moat_score")
            .and_then(number)
            .map(|s| clamp(s, 100)),
        recommended_tier: object
            .get("recommended_tier")
            .and_then(Value::as_str)
            .and_then(Tier::parse),
        reasoning: object
            .get("reasoning")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

fn clamp(value: f64, max: i32) -> i32 {
    (value.round() as i64).clamp(0, max as i64) as i32
}

fn company_block(company: &Company) -> String {
    let mut block = format!("Name: {}\n", company.name);
    if let Some(country) = &company.hq_country {
        block.push_str(&format!("Country: {}\n", country));
    }
    if let Some(sector) = &company.sector {
        block.push_str(&format!("Sector: {}\n", sector));
    }
    if let Some(revenue) = company.revenue_gbp {
        block.push_str(&format!("Revenue (GBP): {}\n", revenue));
    }
    if !company.certifications.is_empty() {
        let certs: Vec<&str> = company
            .certifications
            .iter()
            .map(|c| c.cert_type.as_str())
            .collect();
        block.push_str(&format!("Certifications: {}\n", certs.join(", ")));
    }
    if let Some(description) = &company.description {
        block.push_str(&format!(
            "Description: {}\n",
            truncate(description, MAX_DESCRIPTION_CHARS)
        ));
    }
    if let Some(text) = &company.raw_website_text {
        block.push_str(&format!(
            "Website text:\n{}\n",
            truncate(text, MAX_WEBSITE_CHARS)
        ));
    }
    block
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
