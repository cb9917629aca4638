//! Revenue Resolver
//!
//! Chooses between an LLM revenue estimate and registry signals. Precedence:
//!
//! 1. Filed turnover is taken as filed
//! 2. A UK account type or an EU headcount band bounds the estimate: figures
//!    under the band cap are kept, figures over it are replaced by the band
//!    midpoint
//! 3. Without any registry signal the estimate is kept unless it is
//!    implausibly large

use moat_domain::{Company, FiledAccounts, RevenueSource};
use serde::Serialize;
use tracing::debug;

/// Estimates above this (GBP) are treated as hallucinated when nothing bounds them
pub const HALLUCINATION_CEILING_GBP: i64 = 500_000_000;

/// EU member states (ISO 3166 alpha-2; Greece also as `EL`)
pub const EU_MEMBER_STATES: &[&str] = &[
    "AT", "BE", "BG", "HR", "CY", "CZ", "DK", "EE", "FI", "FR", "DE", "GR", "EL", "HU", "IE",
    "IT", "LV", "LT", "LU", "MT", "NL", "PL", "PT", "RO", "SK", "SI", "ES", "SE",
];

/// Revenue range implied by a filing category or SME size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RevenueBand {
    /// Band label, e.g. "micro-entity" or "eu-small"
    pub label: &'static str,
    /// Largest plausible revenue; `None` means unbounded
    pub cap: Option<i64>,
    /// Substitute when the estimate exceeds the cap or is missing
    pub midpoint: Option<i64>,
    /// Provenance recorded when the midpoint is used
    pub midpoint_source: RevenueSource,
}

impl RevenueBand {
    const fn uk(label: &'static str, cap: Option<i64>, midpoint: Option<i64>) -> Self {
        Self {
            label,
            cap,
            midpoint,
            midpoint_source: RevenueSource::ChBandMidpoint,
        }
    }

    const fn eu(label: &'static str, cap: Option<i64>, midpoint: Option<i64>) -> Self {
        Self {
            label,
            cap,
            midpoint,
            midpoint_source: RevenueSource::EuBandMidpoint,
        }
    }
}

const UK_MICRO: RevenueBand = RevenueBand::uk("micro-entity", Some(1_500_000), Some(750_000));
const UK_SMALL: RevenueBand = RevenueBand::uk("small", Some(15_000_000), Some(8_250_000));
const UK_MEDIUM: RevenueBand = RevenueBand::uk("medium", Some(54_000_000), Some(34_500_000));
const UK_FULL: RevenueBand = RevenueBand::uk("full", None, None);
const UK_DORMANT: RevenueBand = RevenueBand::uk("dormant", Some(0), None);

const EU_MICRO: RevenueBand = RevenueBand::eu("eu-micro", Some(1_700_000), Some(850_000));
const EU_SMALL: RevenueBand = RevenueBand::eu("eu-small", Some(8_500_000), Some(5_100_000));
const EU_MEDIUM: RevenueBand = RevenueBand::eu("eu-medium", Some(42_500_000), Some(25_500_000));
const EU_LARGE: RevenueBand = RevenueBand::eu("eu-large", None, None);

/// Signals the resolver works from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevenueInput {
    /// Estimate scraped or inferred from the website
    pub llm_estimate_gbp: Option<i64>,
    /// ISO country code
    pub jurisdiction: Option<String>,
    /// Latest filed accounts
    pub filed_accounts: Option<FiledAccounts>,
    /// Headcount
    pub employee_count: Option<u32>,
    /// Registered officers
    pub officer_count: Option<u32>,
}

impl RevenueInput {
    /// Gather the resolver inputs from a company and a fresh estimate
    pub fn from_company(company: &Company, llm_estimate_gbp: Option<i64>) -> Self {
        Self {
            llm_estimate_gbp,
            jurisdiction: company.hq_country.clone(),
            filed_accounts: company.filed_accounts.clone(),
            employee_count: company.employee_count,
            officer_count: company.officer_count,
        }
    }
}

/// Chosen figure, its provenance and the band that constrained it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedRevenue {
    /// Revenue in GBP, if any figure survived
    pub revenue_gbp: Option<i64>,
    /// Provenance of `revenue_gbp`
    pub source: Option<RevenueSource>,
    /// Band applied, if any
    pub band: Option<RevenueBand>,
}

impl ResolvedRevenue {
    fn none(band: Option<RevenueBand>) -> Self {
        Self {
            revenue_gbp: None,
            source: None,
            band,
        }
    }

    fn of(value: i64, source: RevenueSource, band: Option<RevenueBand>) -> Self {
        Self {
            revenue_gbp: Some(value),
            source: Some(source),
            band,
        }
    }
}

/// Resolve a revenue figure
///
/// # Examples
///
/// ```
/// use moat_domain::{FiledAccounts, RevenueSource};
/// use moat_scorer::revenue::{resolve, RevenueInput};
///
/// let input = RevenueInput {
///     llm_estimate_gbp: Some(5_000_000),
///     jurisdiction: Some("GB".to_string()),
///     filed_accounts: Some(FiledAccounts { account_type: "micro-entity".to_string(), turnover_gbp: None }),
///     ..Default::default()
/// };
/// let resolved = resolve(&input);
/// assert_eq!(resolved.revenue_gbp, Some(750_000));
/// assert_eq!(resolved.source, Some(RevenueSource::ChBandMidpoint));
/// ```
pub fn resolve(input: &RevenueInput) -> ResolvedRevenue {
    if let Some(turnover) = input.filed_accounts.as_ref().and_then(|a| a.turnover_gbp) {
        return ResolvedRevenue::of(turnover, RevenueSource::RegistryFiling, None);
    }

    // Negative estimates carry no information
    let estimate = input.llm_estimate_gbp.filter(|v| *v >= 0);

    let band = match input.jurisdiction.as_deref() {
        Some(country) if is_uk(country) => input
            .filed_accounts
            .as_ref()
            .and_then(|a| uk_band(&a.account_type)),
        Some(country) if is_eu(country) => eu_band(input.employee_count, input.officer_count),
        _ => None,
    };

    let resolved = match band {
        Some(band) => apply_band(estimate, band),
        None => match estimate {
            Some(value) if value > HALLUCINATION_CEILING_GBP => {
                debug!("Rejecting unbounded revenue estimate of {}", value);
                ResolvedRevenue::none(None)
            }
            Some(value) => ResolvedRevenue::of(value, RevenueSource::LlmWebsite, None),
            None => ResolvedRevenue::none(None),
        },
    };

    debug!(
        "Resolved revenue {:?} ({:?}) via band {:?}",
        resolved.revenue_gbp,
        resolved.source,
        resolved.band.map(|b| b.label)
    );
    resolved
}

fn apply_band(estimate: Option<i64>, band: RevenueBand) -> ResolvedRevenue {
    match (band.cap, band.midpoint, estimate) {
        (None, _, Some(value)) => ResolvedRevenue::of(value, RevenueSource::LlmWebsite, Some(band)),
        (None, _, None) => ResolvedRevenue::none(Some(band)),
        // A cap with no midpoint (dormant) admits no revenue at all
        (Some(_), None, _) => ResolvedRevenue::none(Some(band)),
        (Some(cap), Some(_), Some(value)) if value <= cap => {
            ResolvedRevenue::of(value, RevenueSource::LlmWebsite, Some(band))
        }
        (Some(_), Some(midpoint), _) => ResolvedRevenue::of(midpoint, band.midpoint_source, Some(band)),
    }
}

/// UK filing band from a Companies House account type
pub fn uk_band(account_type: &str) -> Option<RevenueBand> {
    let normalized: String = account_type
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '_' || c == ' ' { '-' } else { c })
        .collect();
    match normalized.as_str() {
        "micro-entity" | "micro" => Some(UK_MICRO),
        "small" | "total-exemption-small" => Some(UK_SMALL),
        "medium" => Some(UK_MEDIUM),
        "full" | "group" | "large" => Some(UK_FULL),
        "dormant" => Some(UK_DORMANT),
        _ => None,
    }
}

/// EU SME band from headcount, falling back to officer count
pub fn eu_band(employee_count: Option<u32>, officer_count: Option<u32>) -> Option<RevenueBand> {
    if let Some(employees) = employee_count {
        return Some(match employees {
            0..=9 => EU_MICRO,
            10..=49 => EU_SMALL,
            50..=249 => EU_MEDIUM,
            _ => EU_LARGE,
        });
    }
    match officer_count? {
        0..=2 => Some(EU_MICRO),
        3..=5 => Some(EU_SMALL),
        6..=10 => Some(EU_MEDIUM),
        _ => None,
    }
}

fn is_uk(country: &str) -> bool {
    let c = country.trim();
    c.eq_ignore_ascii_case("GB") || c.eq_ignore_ascii_case("UK")
}

fn is_eu(country: &str) -> bool {
    let c = country.trim().to_uppercase();
    EU_MEMBER_STATES.contains(&c.as_str())
}
