//! Scores command implementation.

use crate::cli::ScoresArgs;
use crate::commands::Session;
use crate::error::Result;
use crate::output::Formatter;
use moat_domain::traits::CompanyStore;
use moat_domain::{Company, Tier};

/// Execute the scores command.
pub fn execute_scores(args: ScoresArgs, session: &Session, formatter: &Formatter) -> Result<()> {
    let store = session.open_store()?;
    let companies = select(
        store.list_companies()?,
        args.tier.map(Tier::from),
        args.all,
        args.limit,
    );
    println!("{}", formatter.format_companies(&companies)?);
    Ok(())
}

/// Filter and rank companies: highest score first, unscored last, then by name.
pub fn select(companies: Vec<Company>, tier: Option<Tier>, all: bool, limit: Option<usize>) -> Vec<Company> {
    let mut selected: Vec<Company> = companies
        .into_iter()
        .filter(|c| all || c.moat_score.is_some())
        .filter(|c| tier.map_or(true, |t| c.tier == Some(t)))
        .collect();

    selected.sort_by(|a, b| {
        b.moat_score
            .cmp(&a.moat_score)
            .then_with(|| a.name.cmp(&b.name))
    });

    if let Some(limit) = limit {
        selected.truncate(limit);
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(name: &str, score: Option<i32>, tier: Option<Tier>) -> Company {
        let mut c = Company::new(name, "test", 0);
        c.moat_score = score;
        c.tier = tier;
        c
    }

    fn fixtures() -> Vec<Company> {
        vec![
            company("Beta", Some(40), Some(Tier::Standard)),
            company("Pending", None, None),
            company("Alpha", Some(72), Some(Tier::Top)),
            company("Gamma", Some(40), Some(Tier::Standard)),
        ]
    }

    #[test]
    fn test_ranked_by_score_then_name() {
        let names: Vec<String> = select(fixtures(), None, false, None)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn test_all_includes_unscored_last() {
        let selected = select(fixtures(), None, true, None);
        assert_eq!(selected.len(), 4);
        assert_eq!(selected[3].name, "Pending");
    }

    #[test]
    fn test_tier_filter_and_limit() {
        let selected = select(fixtures(), Some(Tier::Standard), false, Some(1));
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "Beta");
    }
}
