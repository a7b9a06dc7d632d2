use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::catalog::SkillCatalog;
use crate::history::PlanRecord;
use crate::planner::PlanResult;
use crate::rows::RawRow;

pub fn render_plan_table(result: &PlanResult) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Skill", "Category", "Cost", "Rating", "Aptitude", "Notes"]);

    for skill in &result.chosen {
        let mut notes = Vec::new();
        if skill.forced {
            notes.push("required".to_string());
        }
        if let Some(partner) = &skill.combined_with {
            notes.push(format!("included in {partner}"));
        }
        let name_cell = if skill.subsumed {
            Cell::new(&skill.name).fg(Color::DarkGrey)
        } else if skill.category.is_premium() {
            Cell::new(&skill.name).fg(Color::Yellow)
        } else {
            Cell::new(&skill.name)
        };
        table.add_row(Row::from(vec![
            name_cell,
            Cell::new(skill.category.to_string()),
            Cell::new(if skill.subsumed {
                "-".to_string()
            } else {
                skill.cost.to_string()
            }),
            Cell::new(if skill.subsumed {
                "-".to_string()
            } else {
                skill.rating.to_string()
            }),
            Cell::new(if skill.subsumed {
                "-".to_string()
            } else {
                skill.aptitude.to_string()
            }),
            Cell::new(notes.join(", ")),
        ]));
    }

    let mut out = table.to_string();
    if result.feasible {
        out.push_str(&format!(
            "\nBudget: {}  Used: {}  Remaining: {}\nTotal rating: {}  Total aptitude: {}",
            result.budget,
            result.used_cost,
            result.remaining(),
            result.total_rating,
            result.total_aptitude
        ));
    } else {
        out.push_str(&format!(
            "\nINFEASIBLE: required skills exceed the budget of {}",
            result.budget
        ));
    }
    out
}

pub fn render_rows_table(rows: &[RawRow]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Skill", "Cost", "Hint", "Required"]);
    for row in rows {
        table.add_row(vec![
            row.name.clone(),
            row.cost
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string()),
            format!("Lv{}", row.hint.as_u8()),
            if row.required { "yes" } else { "" }.to_string(),
        ]);
    }
    table.to_string()
}

pub fn render_catalog_table(catalog: &SkillCatalog) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Category", "Skills"]);
    for (category, count) in catalog.count_by_category() {
        table.add_row(vec![category.to_string(), count.to_string()]);
    }
    let mut out = table.to_string();
    out.push_str(&format!(
        "\nSource: {}  Entries: {}  Hash: {}",
        catalog.source,
        catalog.len(),
        &catalog.raw_hash[..12.min(catalog.raw_hash.len())]
    ));
    out
}

pub fn render_history_table(records: &[PlanRecord]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Captured At",
        "Mode",
        "Budget",
        "Used",
        "Rating",
        "Aptitude",
        "Skills",
        "Feasible",
    ]);
    for record in records {
        table.add_row(vec![
            record.captured_at.to_rfc3339(),
            record.mode.to_string(),
            record.plan.budget.to_string(),
            record.plan.used_cost.to_string(),
            record.plan.total_rating.to_string(),
            record.plan.total_aptitude.to_string(),
            record.plan.purchased_count().to_string(),
            record.plan.feasible.to_string(),
        ]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;
    use crate::planner::ChosenSkill;

    #[test]
    fn plan_table_marks_infeasible_runs() {
        let rendered = render_plan_table(&PlanResult::infeasible(300));
        assert!(rendered.contains("INFEASIBLE"));
        assert!(rendered.contains("300"));
    }

    #[test]
    fn plan_table_shows_totals_and_combos() {
        let result = PlanResult {
            feasible: true,
            budget: 600,
            used_cost: 450,
            total_rating: 500,
            total_aptitude: 1200,
            chosen: vec![
                ChosenSkill {
                    id: "lower".to_string(),
                    name: "Focus".to_string(),
                    category: Category::Yellow,
                    cost: 0,
                    rating: 0,
                    aptitude: 0,
                    subsumed: true,
                    forced: false,
                    combined_with: Some("Deep Focus".to_string()),
                },
                ChosenSkill {
                    id: "gold".to_string(),
                    name: "Deep Focus".to_string(),
                    category: Category::Gold,
                    cost: 450,
                    rating: 500,
                    aptitude: 1200,
                    subsumed: false,
                    forced: false,
                    combined_with: None,
                },
            ],
        };
        let rendered = render_plan_table(&result);
        assert!(rendered.contains("included in Deep Focus"));
        assert!(rendered.contains("Remaining: 150"));
    }
}
