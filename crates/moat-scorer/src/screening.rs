//! Deal screening sub-scores
//!
//! Informational only: stored on the analysis, never added to the moat score.

use moat_domain::{Company, DealScreening};
use moat_thesis::DealScreeningConfig;

/// Financial fit (revenue sweet spot, gross margin) and competitive
/// position (market share, competitor count, growth), each 0..=100
pub fn screen(company: &Company, config: &DealScreeningConfig) -> DealScreening {
    let mut notes = Vec::new();

    let revenue_points = match company.revenue_gbp {
        Some(revenue)
            if revenue >= config.revenue_sweet_spot_min && revenue <= config.revenue_sweet_spot_max =>
        {
            notes.push(format!("Revenue £{} inside sweet spot", revenue));
            50
        }
        Some(revenue)
            if revenue >= config.revenue_sweet_spot_min / 2
                && revenue <= config.revenue_sweet_spot_max.saturating_mul(2) =>
        {
            notes.push(format!("Revenue £{} near sweet spot", revenue));
            25
        }
        Some(revenue) => {
            notes.push(format!("Revenue £{} outside sweet spot", revenue));
            0
        }
        None => {
            notes.push("Revenue unknown".to_string());
            0
        }
    };

    let margin_points = graded(
        company.gross_margin_pct,
        |m| config.margin_bands.grade(m),
        [0, 20, 35, 50],
        "Gross margin",
        &mut notes,
    );

    let share_points = graded(
        company.market_share_pct,
        |s| config.market_share_bands.grade(s),
        [0, 16, 28, 40],
        "Market share",
        &mut notes,
    );

    let competitor_points = match company.competitor_count {
        Some(n) if n <= config.max_competitors_strong => 30,
        Some(n) if n <= config.max_competitors_moderate => 15,
        Some(_) => 0,
        None => 0,
    };
    if let Some(n) = company.competitor_count {
        notes.push(format!("{} competitors", n));
    }

    let growth_points = graded(
        company.revenue_growth_pct,
        |g| config.growth_bands.grade(g),
        [0, 10, 20, 30],
        "Revenue growth",
        &mut notes,
    );

    DealScreening {
        financial_fit: (revenue_points + margin_points).clamp(0, 100),
        competitive_position: (share_points + competitor_points + growth_points).clamp(0, 100),
        notes,
    }
}

fn graded(
    value: Option<f64>,
    grade: impl Fn(f64) -> u8,
    points: [i32; 4],
    label: &str,
    notes: &mut Vec<String>,
) -> i32 {
    match value.filter(|v| v.is_finite()) {
        Some(v) => {
            notes.push(format!("{} {:.1}%", label, v));
            points[grade(v) as usize]
        }
        None => 0,
    }
}
