use proptest::prelude::*;

use skill_planner::catalog::Category;
use skill_planner::planner::{optimize, Candidate, ScoringMode};

fn candidate(id: &str, cost: u32, rating: u32) -> Candidate {
    Candidate {
        id: id.to_string(),
        name: id.to_string(),
        category: Category::Yellow,
        cost,
        rating,
        aptitude: 400,
        required: false,
        prerequisite: None,
        cost_includes_prerequisite: false,
    }
}

/// Exhaustive reference: best rating over all subsets within budget.
/// Only valid for candidates without dependency edges.
fn brute_force_best(candidates: &[Candidate], budget: u32) -> u64 {
    let n = candidates.len();
    let mut best = 0u64;
    for mask in 0u32..(1 << n) {
        let mut cost = 0u64;
        let mut rating = 0u64;
        for (i, c) in candidates.iter().enumerate() {
            if mask & (1 << i) != 0 {
                cost += u64::from(c.cost);
                rating += u64::from(c.rating);
            }
        }
        if cost <= u64::from(budget) && rating > best {
            best = rating;
        }
    }
    best
}

#[test]
fn dependency_pair_degrades_when_budget_cuts_off_the_upgrade() {
    let lower = candidate("lower", 150, 180);
    let mut gold = candidate("gold", 300, 500);
    gold.category = Category::Gold;
    gold.prerequisite = Some(0);

    let full = optimize(&[lower.clone(), gold.clone()], 450, ScoringMode::Rating);
    assert!(full.feasible);
    assert_eq!(full.used_cost, 450);
    assert_eq!(full.total_rating, 500);
    assert_eq!(full.purchased_count(), 1);

    let short = optimize(&[lower, gold], 200, ScoringMode::Rating);
    assert_eq!(short.used_cost, 150);
    assert_eq!(short.total_rating, 180);
    assert_eq!(short.chosen.len(), 1);
    assert_eq!(short.chosen[0].id, "lower");
}

#[test]
fn required_skill_consumes_budget_before_optional_picks() {
    let mut forced = candidate("forced", 80, 40);
    forced.required = true;
    let big = candidate("big", 50, 90);
    let small = candidate("small", 20, 35);

    // 100 total, 20 left after the forced pick: only the small one fits.
    let result = optimize(&[forced, big, small], 100, ScoringMode::Rating);
    assert!(result.feasible);
    assert_eq!(result.used_cost, 100);
    assert_eq!(result.total_rating, 75);
    let ids: Vec<&str> = result.chosen.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["forced", "small"]);
    assert!(result.chosen[0].forced);
}

#[test]
fn aptitude_mode_counts_premium_triple() {
    let mut gold = candidate("gold", 100, 10);
    gold.category = Category::Gold;
    gold.aptitude = 1200;
    let plain = candidate("plain", 100, 400);

    let by_rating = optimize(&[gold.clone(), plain.clone()], 100, ScoringMode::Rating);
    assert_eq!(by_rating.chosen[0].id, "plain");

    let by_aptitude = optimize(&[gold, plain], 100, ScoringMode::Aptitude);
    assert_eq!(by_aptitude.chosen[0].id, "gold");
    assert_eq!(by_aptitude.total_aptitude, 1200);
}

#[test]
fn matches_brute_force_on_a_fixed_instance() {
    let candidates = vec![
        candidate("a", 60, 100),
        candidate("b", 50, 80),
        candidate("c", 110, 150),
        candidate("d", 10, 15),
    ];
    let result = optimize(&candidates, 120, ScoringMode::Rating);
    assert_eq!(
        u64::from(result.total_rating),
        brute_force_best(&candidates, 120)
    );
}

fn arb_candidates() -> impl Strategy<Value = Vec<Candidate>> {
    prop::collection::vec((1u32..60, 0u32..200), 1..8).prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(i, (cost, rating))| candidate(&format!("c{i}"), cost, rating))
            .collect()
    })
}

proptest! {
    #[test]
    fn never_exceeds_budget(candidates in arb_candidates(), budget in 0u32..300) {
        let result = optimize(&candidates, budget, ScoringMode::Rating);
        prop_assert!(result.used_cost <= budget);
    }

    #[test]
    fn optimal_against_brute_force(candidates in arb_candidates(), budget in 0u32..300) {
        let result = optimize(&candidates, budget, ScoringMode::Rating);
        prop_assert_eq!(
            u64::from(result.total_rating),
            brute_force_best(&candidates, budget)
        );
    }

    #[test]
    fn value_is_monotone_in_budget(candidates in arb_candidates(), budget in 0u32..250) {
        let smaller = optimize(&candidates, budget, ScoringMode::Rating);
        let larger = optimize(&candidates, budget + 50, ScoringMode::Rating);
        prop_assert!(larger.total_rating >= smaller.total_rating);
    }

    #[test]
    fn identical_input_gives_identical_output(
        candidates in arb_candidates(),
        budget in 0u32..300,
    ) {
        let first = optimize(&candidates, budget, ScoringMode::Rating);
        let second = optimize(&candidates, budget, ScoringMode::Rating);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn totals_equal_sum_over_purchased_entries(
        candidates in arb_candidates(),
        budget in 0u32..300,
    ) {
        let result = optimize(&candidates, budget, ScoringMode::Rating);
        let cost: u32 = result.chosen.iter().filter(|c| !c.subsumed).map(|c| c.cost).sum();
        let rating: u32 = result.chosen.iter().filter(|c| !c.subsumed).map(|c| c.rating).sum();
        prop_assert_eq!(cost, result.used_cost);
        prop_assert_eq!(rating, result.total_rating);
    }
}

proptest! {
    // Dependency-shaped instances: index 0 is a prerequisite of index 1.
    #[test]
    fn combo_accounting_never_double_counts(
        lower_cost in 1u32..100,
        lower_rating in 0u32..200,
        gold_cost in 1u32..200,
        gold_rating in 0u32..400,
        combined_price in proptest::bool::ANY,
        budget in 0u32..400,
    ) {
        let lower = candidate("lower", lower_cost, lower_rating);
        let mut gold = candidate("gold", gold_cost, gold_rating);
        gold.category = Category::Gold;
        gold.aptitude = 1200;
        gold.prerequisite = Some(0);
        gold.cost_includes_prerequisite = combined_price;

        let result = optimize(&[lower, gold], budget, ScoringMode::Rating);
        prop_assert!(result.used_cost <= budget);

        let cost: u32 = result.chosen.iter().filter(|c| !c.subsumed).map(|c| c.cost).sum();
        prop_assert_eq!(cost, result.used_cost);

        // The upgrade never appears without its prerequisite.
        let has_gold = result.chosen.iter().any(|c| c.id == "gold");
        let has_lower = result.chosen.iter().any(|c| c.id == "lower");
        if has_gold {
            prop_assert!(has_lower);
            prop_assert_eq!(result.total_rating, gold_rating);
        }
    }
}
