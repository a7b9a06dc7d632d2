use std::fs;

use skill_planner::catalog::{load_catalog_with_costs, AffinityGrades};
use skill_planner::planner::extract::extract_candidates;
use skill_planner::planner::{optimize, ScoringMode};
use skill_planner::rows::parse_rows;

const CATALOG_CSV: &str = "\
skill_type,name,base,base_value,s_a,b_c,d_e_f,g,affinity_role,skill_id
golden,Professor of Curvature,508,508,508,415,369,323,end,200451
yellow,Corner Recovery,217,217,217,177,158,138,end,200452
blue,Stealth Mode,195,195,195,159,142,124,late,200551
green,Lone Wolf,170,170,170,139,124,108,,200651
";

const COST_MAP_JSON: &str = r#"[
    {
        "name": "Professor of Curvature",
        "cost": 457,
        "id": "200451",
        "versions": ["200452"]
    }
]"#;

#[test]
fn catalog_rows_budget_plan_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = dir.path().join("skills.csv");
    let cost_map_path = dir.path().join("costs.json");
    fs::write(&catalog_path, CATALOG_CSV).unwrap();
    fs::write(&cost_map_path, COST_MAP_JSON).unwrap();

    let catalog = load_catalog_with_costs(&catalog_path, Some(&cost_map_path)).unwrap();
    assert_eq!(catalog.len(), 4);
    // Cost map overrides the CSV base cost.
    assert_eq!(
        catalog
            .find_by_name("Professor of Curvature")
            .unwrap()
            .base_cost,
        Some(457)
    );

    let rows = parse_rows(
        "Professor of Curvature=\nCorner Recovery=195\nStealth Mode=|H2\nLone Wolf=170\n",
    )
    .unwrap();
    let candidates = extract_candidates(&rows, &catalog, &AffinityGrades::default(), false);
    assert_eq!(candidates.len(), 4);

    // The gold upgrade is linked to its lower version through the cost map.
    let gold = &candidates[0];
    assert_eq!(gold.prerequisite, Some(1));
    assert!(gold.cost_includes_prerequisite);
    assert_eq!(gold.cost, 457);
    // Lv2 hint knocks 20% off Stealth Mode's 195 base.
    assert_eq!(candidates[2].cost, 156);

    // Big budget takes everything; the lower version rides inside the gold.
    let plan = optimize(&candidates, 1000, ScoringMode::Rating);
    assert!(plan.feasible);
    assert_eq!(plan.used_cost, 457 + 156 + 170);
    assert_eq!(plan.chosen.len(), 4);
    let lower = plan.chosen.iter().find(|c| c.id == "200452").unwrap();
    assert!(lower.subsumed);
    assert_eq!(
        lower.combined_with.as_deref(),
        Some("Professor of Curvature")
    );

    // A tight budget drops the combo and keeps the cheap standalone picks.
    let tight = optimize(&candidates, 400, ScoringMode::Rating);
    assert!(tight.used_cost <= 400);
    assert!(tight
        .chosen
        .iter()
        .all(|c| c.name != "Professor of Curvature"));
}

#[test]
fn fast_learner_stacks_with_hint_discounts() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = dir.path().join("skills.csv");
    fs::write(&catalog_path, CATALOG_CSV).unwrap();
    let catalog = load_catalog_with_costs(&catalog_path, None).unwrap();

    let rows = parse_rows("Stealth Mode=|H2\n").unwrap();
    let candidates = extract_candidates(&rows, &catalog, &AffinityGrades::default(), true);
    // 20% hint + 10% fast learner = 30% off 195.
    assert_eq!(candidates[0].cost, 136);
}

#[test]
fn affinity_grades_move_bucketed_ratings() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = dir.path().join("skills.csv");
    fs::write(&catalog_path, CATALOG_CSV).unwrap();
    let catalog = load_catalog_with_costs(&catalog_path, None).unwrap();

    let rows = parse_rows("Stealth Mode=195\n").unwrap();

    let good = extract_candidates(&rows, &catalog, &AffinityGrades::default(), false);
    assert_eq!(good[0].rating, 195);

    let mut grades = AffinityGrades::default();
    grades.late = "G".parse().unwrap();
    let terrible = extract_candidates(&rows, &catalog, &grades, false);
    assert_eq!(terrible[0].rating, 124);
}
