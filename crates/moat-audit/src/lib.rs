//! Moat Audit
//!
//! The audit trail of scoring: every scored outcome becomes an append-only
//! [`ScoringEvent`](moat_domain::ScoringEvent) carrying the thesis version,
//! weights and per-pillar changes since the previous event, and every tier
//! movement within a run is collected into a [`TierChangeReport`].
//!
//! # Example
//!
//! ```
//! use moat_audit::{detect_tier_change, ChangeDirection, TierChangeReport};
//! use moat_domain::{CompanyId, Tier};
//! use std::collections::BTreeMap;
//!
//! let change = detect_tier_change(
//!     CompanyId::new(),
//!     "Acme Ltd",
//!     Some("standard"),
//!     Some(Tier::Top),
//!     Some(45),
//!     Some(74),
//!     &BTreeMap::new(),
//! )
//! .unwrap();
//! assert_eq!(change.direction, ChangeDirection::Promoted);
//!
//! let mut report = TierChangeReport::new();
//! report.push(change);
//! assert_eq!(report.notable_changes().len(), 1);
//! ```

#![warn(missing_docs)]

pub mod event;
pub mod report;
pub mod tier_change;

pub use event::build_scoring_event;
pub use report::TierChangeReport;
pub use tier_change::{detect_tier_change, top_pillar, ChangeDirection, TierChange};
