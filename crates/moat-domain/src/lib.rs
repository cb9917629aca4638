//! Moat Domain Layer
//!
//! Core data model for the moat scoring engine. Every other crate in the
//! workspace depends on the types and trait boundaries defined here.
//!
//! ## Key Concepts
//!
//! - **Company**: identity and facts accumulated over the pipeline's lifetime
//! - **Pillar**: a named, thesis-defined dimension of defensibility
//! - **Tier**: one of four ordered classes (waitlist → standard → strong → top)
//! - **Scoring Event**: immutable audit record of one scoring pass
//! - **Revenue Source**: provenance of a resolved revenue figure
//!
//! ## Architecture
//!
//! - Pure data and small invariants only (no I/O)
//! - Trait definitions for every external collaborator (LLM, storage, scrapers)
//! - Infrastructure implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod certification;
pub mod company;
pub mod event;
pub mod evidence;
pub mod revenue;
pub mod tier;
pub mod traits;

// Re-exports for convenience
pub use analysis::{DealScreening, MoatAnalysis, Penalty, PillarBreakdown, SoftEvidenceSource};
pub use certification::Certification;
pub use company::{Company, CompanyId, DiscoveredCompany, FiledAccounts, ScoringStatus};
pub use event::{EventId, PillarChange, ScoringEvent, ScoringTrigger};
pub use evidence::{
    LlmMoatAnalysis, LlmPillarScore, PillarAttribute, SemanticEvidence, SemanticPillarScore,
};
pub use revenue::RevenueSource;
pub use tier::Tier;

/// Current timestamp in seconds since Unix epoch
pub fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
