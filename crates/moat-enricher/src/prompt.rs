//! Batch prompt construction

use crate::types::CompanySummary;
use moat_thesis::{render_prompt, ThesisConfig};

/// Builds one prompt for a batch of companies from the thesis template
pub struct BatchPromptBuilder<'a> {
    thesis: &'a ThesisConfig,
    companies: &'a [CompanySummary],
}

impl<'a> BatchPromptBuilder<'a> {
    /// Create a builder for already-truncated summaries
    pub fn new(thesis: &'a ThesisConfig, companies: &'a [CompanySummary]) -> Self {
        Self { thesis, companies }
    }

    /// Render the complete prompt
    pub fn build(&self) -> String {
        let blocks = self
            .companies
            .iter()
            .enumerate()
            .map(|(i, c)| company_block(i + 1, c))
            .collect::<Vec<_>>()
            .join("\n");
        let count = self.companies.len().to_string();
        let pillars = self.thesis.pillar_summary();

        render_prompt(
            &self.thesis.prompts.semantic_batch,
            &[
                ("thesis", self.thesis.name.as_str()),
                ("pillars", pillars.as_str()),
                ("count", count.as_str()),
                ("companies", blocks.as_str()),
            ],
        )
    }
}

fn company_block(position: usize, company: &CompanySummary) -> String {
    let mut block = format!("Company {}:\nName: {}\n", position, company.name);
    block.push_str(&format!(
        "Country: {}\n",
        company.country.as_deref().unwrap_or("unknown")
    ));
    if let Some(sector) = &company.sector {
        block.push_str(&format!("Sector: {}\n", sector));
    }
    if let Some(employees) = company.employee_count {
        block.push_str(&format!("Employees: {}\n", employees));
    }
    if !company.certifications.is_empty() {
        block.push_str(&format!("Certifications: {}\n", company.certifications.join(", ")));
    }
    if let Some(description) = &company.description {
        block.push_str(&format!("Description: {}\n", description));
    }
    if let Some(text) = &company.website_text {
        block.push_str("Website text:\n---\n");
        block.push_str(text);
        block.push_str("\n---\n");
    }
    block
}
