//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use moat_audit::TierChangeReport;
use moat_domain::{Company, ScoringStatus, Tier};
use moat_llm::CostTracker;
use moat_pipeline::RunSummary;
use moat_thesis::ThesisConfig;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format scored companies.
    pub fn format_companies(&self, companies: &[Company]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let records: Vec<serde_json::Value> = companies.iter().map(company_json).collect();
                Ok(serde_json::to_string_pretty(&records)?)
            }
            OutputFormat::Table => Ok(self.format_companies_table(companies)),
            OutputFormat::Quiet => Ok(companies
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn format_companies_table(&self, companies: &[Company]) -> String {
        if companies.is_empty() {
            return self.colorize("No companies found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Name", "Country", "Score", "Tier", "Status", "Revenue"]);

        for company in companies {
            let score = company
                .moat_score
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string());
            let tier = company
                .tier
                .map(|t| self.tier_label(t))
                .unwrap_or_else(|| "-".to_string());
            let status = match (company.is_excluded(), company.scoring_status) {
                (true, _) => "excluded",
                (false, Some(status)) => status.as_str(),
                (false, None) => "pending",
            };
            let revenue = match (company.revenue_gbp, company.revenue_source) {
                (Some(gbp), Some(source)) => format!("£{} ({})", gbp, source),
                (Some(gbp), None) => format!("£{}", gbp),
                _ => "-".to_string(),
            };
            builder.push_record([
                company.name.as_str(),
                company.hq_country.as_deref().unwrap_or("-"),
                score.as_str(),
                tier.as_str(),
                status,
                revenue.as_str(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format a tier change report.
    pub fn format_report(&self, report: &TierChangeReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&report.to_json())?),
            OutputFormat::Table => Ok(report.render_markdown()),
            OutputFormat::Quiet => Ok(report
                .notable_changes()
                .iter()
                .map(|c| c.company_name.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Format the outcome of a pipeline run with its LLM usage.
    pub fn format_run(&self, summary: &RunSummary, costs: &CostTracker) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let usage: Vec<serde_json::Value> = costs
                    .snapshot()
                    .into_iter()
                    .map(|((provider, model), entry)| {
                        serde_json::json!({
                            "provider": provider,
                            "model": model,
                            "calls": entry.calls,
                            "input_tokens": entry.input_tokens,
                            "output_tokens": entry.output_tokens,
                            "cost_usd": entry.cost_usd,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&serde_json::json!({
                    "metrics": summary.metrics,
                    "llm_usage": usage,
                    "tier_changes": summary.report.to_json(),
                }))?)
            }
            OutputFormat::Table => {
                let mut out = summary.metrics.summary();
                out.push('\n');
                out.push_str(&costs.summary());
                if !summary.report.is_empty() {
                    out.push_str("\n\n");
                    out.push_str(&summary.report.render_markdown());
                }
                Ok(out)
            }
            OutputFormat::Quiet => Ok(summary.metrics.scored.to_string()),
        }
    }

    /// Format a thesis overview.
    pub fn format_thesis(&self, thesis: &ThesisConfig) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(thesis)?),
            OutputFormat::Quiet => Ok(format!("{} {}", thesis.name, thesis.version)),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Pillar", "Weight", "Threshold", "Max", "Hard evidence"]);
                for (name, pillar) in &thesis.pillars {
                    let hard = pillar
                        .hard_evidence
                        .as_ref()
                        .map(|h| format!("{:?}", h))
                        .unwrap_or_else(|| "-".to_string());
                    builder.push_record([
                        name.clone(),
                        format!("{:.2}", pillar.weight),
                        pillar.evidence_threshold.to_string(),
                        pillar.max_raw_score.to_string(),
                        hard,
                    ]);
                }
                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));

                let [standard, strong, top] = thesis.tiers.thresholds;
                Ok(format!(
                    "{} v{}\n{}\nTiers: standard >= {}, strong >= {}, top >= {}\nCertifications scored: {}",
                    self.colorize(&thesis.name, "cyan"),
                    thesis.version,
                    table,
                    standard,
                    strong,
                    top,
                    thesis.certifications.len()
                ))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Tier name, coloured by rank.
    pub fn tier_label(&self, tier: Tier) -> String {
        let color = match tier {
            Tier::Top => "magenta",
            Tier::Strong => "green",
            Tier::Standard => "cyan",
            Tier::Waitlist => "yellow",
        };
        self.colorize(tier.as_str(), color)
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

fn company_json(company: &Company) -> serde_json::Value {
    serde_json::json!({
        "id": company.id.to_string(),
        "name": company.name,
        "hq_country": company.hq_country,
        "moat_score": company.moat_score,
        "tier": company.tier,
        "scoring_status": company.scoring_status.map(|s: ScoringStatus| s.as_str()),
        "revenue_gbp": company.revenue_gbp,
        "revenue_source": company.revenue_source,
        "moat_attributes": company.moat_attributes,
        "scored_at": company.scored_at,
        "exclusion_reason": company.exclusion_reason,
    })
}
