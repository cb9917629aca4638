//! Moat Scorer
//!
//! Turns a company record into a moat score and tier under a thesis.
//!
//! # Overview
//!
//! For every thesis pillar the engine combines:
//! - **Hard evidence**: certifications, known platform or testing-firm
//!   names, sovereignty certifications and keywords, graph centrality
//! - **Soft evidence**: the semantic pillar score when its effective
//!   confidence clears the thesis minimum, else the LLM moat analysis
//!
//! The pillar's raw score is the larger of the two, so deterministic
//! evidence is a floor the LLM cannot lower. Present pillars contribute
//! `min(raw * weight, weight * 100)`; risk penalties are then subtracted and
//! the tier assigned from the thesis cut-offs.
//!
//! The crate also hosts the [`revenue`] resolver used during extraction and
//! the [`MoatAnalyst`], which produces the LLM moat analysis.
//!
//! # Example
//!
//! ```
//! use moat_domain::Company;
//! use moat_scorer::MoatScorer;
//! use moat_thesis::ThesisConfig;
//! use std::sync::Arc;
//!
//! let scorer = MoatScorer::new(Arc::new(ThesisConfig::default_thesis().unwrap()));
//! let mut company = Company::new("Acme", "registry", 0);
//! company.description = Some("Too short".to_string());
//!
//! // Not enough text: no score rather than a zero score
//! assert_eq!(scorer.score(&company, None).moat_score, None);
//! ```

#![warn(missing_docs)]

pub mod analyst;
pub mod delta;
pub mod engine;
pub mod error;
pub mod hard_evidence;
pub mod penalties;
pub mod revenue;
pub mod screening;

pub use analyst::{parse_moat_analysis, MoatAnalyst};
pub use delta::{diff_attributes, ScoreDelta};
pub use engine::{MoatScorer, ScoringOutcome};
pub use error::ScorerError;
pub use revenue::{resolve as resolve_revenue, ResolvedRevenue, RevenueBand, RevenueInput};
