//! Moat Thesis
//!
//! The investment thesis is the versioned ruleset that parameterises scoring:
//! pillars and their weights, certification scores, keyword lists, risk
//! penalties, deal-screening thresholds, tier cut-offs and prompt templates.
//!
//! A thesis is loaded once per process, validated up front, and shared
//! read-only (usually behind an `Arc`). A broken thesis fails at load time
//! with a [`ThesisError`], never halfway through a scoring run.
//!
//! # Usage
//!
//! ```
//! use moat_thesis::{render_prompt, ThesisConfig};
//!
//! let thesis = ThesisConfig::default_thesis().unwrap();
//! assert!(thesis.pillar_names().contains(&"regulatory"));
//!
//! let pillars = thesis.pillar_summary();
//! let prompt = render_prompt(&thesis.prompts.moat_analysis, &[
//!     ("thesis", thesis.name.as_str()),
//!     ("pillars", pillars.as_str()),
//!     ("company", "Name: Acme Ltd"),
//! ]);
//! assert!(prompt.contains("Name: Acme Ltd"));
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;

pub use config::{
    normalize_key, render_prompt, Bands, DealScreeningConfig, HardEvidenceConfig, HardEvidenceSource,
    PillarConfig, PromptTemplates, RiskConfig, SemanticConfig, TermMatching, ThesisConfig,
    TierThresholds, DEFAULT_THESIS_TOML,
};
pub use error::ThesisError;
