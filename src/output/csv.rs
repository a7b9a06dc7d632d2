use anyhow::Result;

use crate::history::PlanRecord;
use crate::planner::PlanResult;

pub fn plan_to_csv(result: &PlanResult) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "name",
        "category",
        "cost",
        "rating",
        "aptitude",
        "required",
        "subsumed",
        "combined_with",
    ])?;
    for skill in &result.chosen {
        writer.write_record([
            skill.name.clone(),
            skill.category.as_slug().to_string(),
            skill.cost.to_string(),
            skill.rating.to_string(),
            skill.aptitude.to_string(),
            skill.forced.to_string(),
            skill.subsumed.to_string(),
            skill.combined_with.clone().unwrap_or_default(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn history_to_csv(records: &[PlanRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "captured_at",
        "mode",
        "budget",
        "used_cost",
        "total_rating",
        "total_aptitude",
        "skills",
        "feasible",
    ])?;
    for record in records {
        writer.write_record([
            record.captured_at.to_rfc3339(),
            record.mode.to_string(),
            record.plan.budget.to_string(),
            record.plan.used_cost.to_string(),
            record.plan.total_rating.to_string(),
            record.plan.total_aptitude.to_string(),
            record.plan.purchased_count().to_string(),
            record.plan.feasible.to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}
