//! Report command implementation.

use crate::cli::ReportArgs;
use crate::commands::Session;
use crate::error::Result;
use crate::output::Formatter;
use moat_audit::{detect_tier_change, TierChange, TierChangeReport};
use moat_domain::traits::{AuditLog, CompanyStore};
use moat_domain::{Company, ScoringEvent};

/// Execute the report command.
///
/// Rebuilds the tier change report from the audit log: each company's
/// latest event is compared with the one before it.
pub fn execute_report(args: ReportArgs, session: &Session, formatter: &Formatter) -> Result<()> {
    let store = session.open_store()?;

    let mut report = TierChangeReport::new();
    for company in store.list_companies()? {
        let events = store.events_for(company.id)?;
        if let Some(change) = latest_change(&company, &events, args.since) {
            report.push(change);
        }
    }

    println!("{}", formatter.format_report(&report)?);
    Ok(())
}

/// Tier movement recorded by the company's latest event, if it was created
/// at or after `since`.
///
/// `events` must be oldest first, as the audit log returns them.
pub fn latest_change(company: &Company, events: &[ScoringEvent], since: u64) -> Option<TierChange> {
    let (latest, earlier) = events.split_last()?;
    if latest.created_at < since {
        return None;
    }
    let previous = earlier.last();
    detect_tier_change(
        company.id,
        &company.name,
        previous.map(|e| e.tier.as_str()),
        Some(latest.tier),
        previous.map(|e| e.moat_score),
        Some(latest.moat_score),
        &latest.moat_attributes,
    )
}
