//! Risk penalties

use crate::hard_evidence::contains_term;
use moat_domain::Penalty;
use moat_thesis::{RiskConfig, TermMatching};

/// Penalties for a company, declining-revenue signals first, then risk
/// keywords, stopping once the ceiling is reached
///
/// `revenue_history` is oldest first; every year-on-year drop is one
/// signal. The returned total never exceeds `risk.max_penalty`.
pub fn assess(
    revenue_history: &[i64],
    text: &str,
    risk: &RiskConfig,
    matching: TermMatching,
) -> (Vec<Penalty>, i32) {
    let declines = revenue_history
        .windows(2)
        .filter(|w| w[1] < w[0])
        .count();

    let signals = (0..declines)
        .map(|i| {
            (
                format!("Revenue decline #{}", i + 1),
                risk.declining_revenue_penalty,
            )
        })
        .chain(
            risk.keywords
                .iter()
                .filter(|k| contains_term(text, k, matching))
                .map(|k| (format!("Risk keyword '{}'", k), risk.keyword_penalty)),
        );

    let mut penalties = Vec::new();
    let mut total = 0;
    for (reason, amount) in signals {
        if total >= risk.max_penalty {
            break;
        }
        let amount = amount.min(risk.max_penalty - total);
        if amount <= 0 {
            continue;
        }
        total += amount;
        penalties.push(Penalty { reason, amount });
    }

    (penalties, total)
}
