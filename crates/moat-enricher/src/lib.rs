//! Moat Enricher
//!
//! Semantic enrichment asks an LLM to score companies on the thesis pillars
//! and turns whatever comes back into per-company [`SemanticEvidence`].
//!
//! # Pipeline
//!
//! 1. **Summaries**: each company is reduced to a [`CompanySummary`] and
//!    truncated to the configured limits
//! 2. **Batching**: summaries are grouped by the provider's batch size
//!    (capable hosted models take five per prompt, small local models two)
//! 3. **Parsing**: responses go through the tolerant parse cascade in
//!    [`moat_llm::json`] and are normalised to one record per company
//! 4. **Fallback**: a batch that cannot be matched up is retried one
//!    company at a time
//! 5. **Confidence capping**: each pillar's effective confidence is capped by
//!    the company's input quality
//!
//! The batcher never returns an error: every company gets a result, and
//! failures are recorded on the evidence itself.
//!
//! # Usage
//!
//! ```no_run
//! use moat_enricher::{CompanySummary, EnricherConfig, SemanticBatcher};
//! use moat_llm::OllamaProvider;
//! use moat_thesis::ThesisConfig;
//! use std::sync::Arc;
//!
//! # async fn example(summaries: Vec<CompanySummary>) -> Result<(), Box<dyn std::error::Error>> {
//! let llm = Arc::new(OllamaProvider::new("http://localhost:11434", "llama3.1")?);
//! let thesis = Arc::new(ThesisConfig::default_thesis()?);
//! let batcher = SemanticBatcher::new(llm, thesis, EnricherConfig::default());
//!
//! for result in batcher.enrich(summaries).await {
//!     println!("{}: {}", result.company_id, result.evidence.enrichment_successful);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`SemanticEvidence`]: moat_domain::SemanticEvidence

#![warn(missing_docs)]

mod batcher;
mod config;
mod error;
mod parser;
mod prompt;
mod types;


pub use batcher::SemanticBatcher;
pub use config::EnricherConfig;
pub use error::EnricherError;
pub use parser::{pillar_scores, records_from_value, Record};
pub use prompt::BatchPromptBuilder;
pub use types::{truncate_chars, CompanySummary, EnrichmentResult, INPUT_SIGNALS};
