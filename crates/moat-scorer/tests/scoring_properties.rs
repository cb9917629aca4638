//! Property tests for the scoring engine

use moat_domain::{Certification, Company, LlmMoatAnalysis, LlmPillarScore};
use moat_scorer::MoatScorer;
use moat_thesis::ThesisConfig;
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

fn thesis() -> Arc<ThesisConfig> {
    Arc::new(ThesisConfig::default_thesis().unwrap())
}

fn company_with(llm_scores: &BTreeMap<String, i32>, certs: &[&str], history: Vec<i64>) -> Company {
    let mut c = Company::new("Prop Ltd", "proptest", 0);
    c.description = Some("Industrial software vendor serving European utilities".to_string());
    c.certifications = certs.iter().map(|t| Certification::new(*t)).collect();
    c.revenue_history = history;
    c.llm_analysis = Some(LlmMoatAnalysis {
        pillars: llm_scores
            .iter()
            .map(|(k, v)| {
                (
                    k.clone(),
                    LlmPillarScore {
                        score: *v,
                        evidence: String::new(),
                    },
                )
            })
            .collect(),
        overall_moat_score: None,
        recommended_tier: None,
        reasoning: String::new(),
    });
    c
}

fn pillar_scores() -> impl Strategy<Value = BTreeMap<String, i32>> {
    (
        -50i32..200,
        -50i32..200,
        -50i32..200,
        -50i32..200,
        -50i32..200,
        -50i32..200,
    )
        .prop_map(|(a, b, c, d, e, f)| {
            BTreeMap::from([
                ("regulatory".to_string(), a),
                ("network".to_string(), b),
                ("geographic".to_string(), c),
                ("liability".to_string(), d),
                ("switching_costs".to_string(), e),
                ("data".to_string(), f),
            ])
        })
}

const CERTS: &[&str] = &["ISO 9001", "ISO 27001", "FCA Authorised", "SecNumCloud", "Unknown Cert"];

proptest! {
    #[test]
    fn tier_is_monotonic_in_score(a in -200i32..300, b in -200i32..300) {
        let thesis = thesis();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(thesis.tier_for(lo) <= thesis.tier_for(hi));
    }

    #[test]
    fn raw_score_never_below_hard_evidence(
        scores in pillar_scores(),
        cert_mask in 0usize..32,
    ) {
        let certs: Vec<&str> = CERTS
            .iter()
            .enumerate()
            .filter(|(i, _)| cert_mask & (1 << i) != 0)
            .map(|(_, c)| *c)
            .collect();
        let company = company_with(&scores, &certs, Vec::new());
        let outcome = MoatScorer::new(thesis()).score(&company, None);
        let analysis = outcome.analysis.unwrap();

        for (name, p) in &analysis.pillars {
            prop_assert!(p.raw_score >= p.hard_score.min(100), "{}: raw {} < hard {}", name, p.raw_score, p.hard_score);
            prop_assert!(p.raw_score >= 0 && p.raw_score <= 100);
            prop_assert!(p.contribution <= p.weight * 100.0 + 1e-9);
            prop_assert_eq!(p.present, p.raw_score >= p.evidence_threshold);
        }
    }

    #[test]
    fn score_within_bounds_and_tier_matches(
        scores in pillar_scores(),
        history in proptest::collection::vec(0i64..1_000_000, 0..6),
    ) {
        let thesis = thesis();
        let company = company_with(&scores, &[], history);
        let outcome = MoatScorer::new(Arc::clone(&thesis)).score(&company, None);
        let score = outcome.moat_score.unwrap();
        let analysis = outcome.analysis.unwrap();

        prop_assert!(score <= 100);
        prop_assert!(score >= -thesis.risk.max_penalty);
        prop_assert!(analysis.total_penalty <= thesis.risk.max_penalty);
        prop_assert_eq!(outcome.tier, Some(thesis.tier_for(score)));
    }

    #[test]
    fn higher_llm_evidence_never_lowers_score(scores in pillar_scores(), bump in 0i32..50) {
        let thesis = thesis();
        let scorer = MoatScorer::new(thesis);
        let base = scorer.score(&company_with(&scores, &[], Vec::new()), None).moat_score.unwrap();
        let raised: BTreeMap<String, i32> = scores.iter().map(|(k, v)| (k.clone(), v + bump)).collect();
        let higher = scorer.score(&company_with(&raised, &[], Vec::new()), None).moat_score.unwrap();
        prop_assert!(higher >= base);
    }
}
