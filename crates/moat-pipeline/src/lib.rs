//! Moat Pipeline
//!
//! Incremental orchestration of the scoring pipeline.
//!
//! # Overview
//!
//! Every company moves through the same stages:
//!
//! | Stage | Runs when | Marker |
//! |-------|-----------|--------|
//! | **Discovery** | A new name + country is seen | `discovered_at` |
//! | **Extraction** | Never extracted, skip window elapsed, or forced | `extraction_completed_at`, `facts_updated_at` |
//! | **Semantic enrichment** | Facts changed since the last enrichment | `semantically_enriched_at` |
//! | **Scoring** | Facts or evidence changed since the last score | `scored_at` |
//!
//! Markers are set after a stage is attempted, not only when it succeeds,
//! so a permanently failing step is retried once per skip window rather
//! than on every run. Running twice with no new upstream data produces no
//! new scoring events.
//!
//! # Usage
//!
//! ```no_run
//! use moat_llm::OllamaProvider;
//! use moat_pipeline::{Pipeline, PipelineConfig};
//! # use moat_domain::traits::{ExtractionSource, RegistryFacts, WebsiteFacts};
//! # use moat_domain::Company;
//! # struct Scrapers;
//! # impl ExtractionSource for Scrapers {
//! #     fn lookup_registry(&self, _: &Company) -> Result<Option<RegistryFacts>, String> { Ok(None) }
//! #     fn discover_website(&self, _: &Company) -> Result<Option<String>, String> { Ok(None) }
//! #     fn scrape_website(&self, _: &Company, _: &str) -> Result<WebsiteFacts, String> { Ok(WebsiteFacts::default()) }
//! # }
//! use moat_store::SqliteStore;
//! use moat_thesis::ThesisConfig;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::new("moat.db")?;
//! let thesis = Arc::new(ThesisConfig::load("theses/sovereign.toml")?);
//! let llm = Arc::new(OllamaProvider::new("http://localhost:11434", "llama3")?);
//!
//! let mut pipeline = Pipeline::new(store, Scrapers, thesis, PipelineConfig::default())?
//!     .with_llm(llm);
//! let summary = pipeline.run().await?;
//!
//! println!("{}", summary.metrics.summary());
//! println!("{}", summary.report.render_markdown());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod extraction;
pub mod metrics;
pub mod pipeline;
pub mod state;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use metrics::PipelineMetrics;
pub use pipeline::{Pipeline, RunSummary};
pub use state::PipelineStage;
