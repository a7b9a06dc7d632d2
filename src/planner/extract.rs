use std::collections::HashMap;

use tracing::debug;

use crate::catalog::{normalize_key, AffinityGrades, SkillCatalog, SkillEntry};
use crate::planner::Candidate;
use crate::pricing::effective_cost;
use crate::rows::RawRow;

/// Aptitude-test points per purchased skill: premium skills count triple.
pub const APTITUDE_PREMIUM: u32 = 1200;
pub const APTITUDE_ORDINARY: u32 = 400;

/// Resolves raw purchase rows against the catalog into planner candidates.
///
/// Rows that match no catalog entry, or that carry no cost and no catalog
/// base cost to fall back on, are dropped with a debug log; planning runs on
/// whatever survives. Dependency edges are resolved here exactly once, into
/// indices over the returned slice.
pub fn extract_candidates(
    rows: &[RawRow],
    catalog: &SkillCatalog,
    grades: &AffinityGrades,
    fast_learner: bool,
) -> Vec<Candidate> {
    let mut candidates = Vec::with_capacity(rows.len());
    let mut entries: Vec<&SkillEntry> = Vec::with_capacity(rows.len());
    let mut seen: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let Some(entry) = catalog.find_by_name(&row.name) else {
            debug!(name = %row.name, "dropping row: no catalog match");
            continue;
        };
        let cost = match row.cost {
            Some(cost) => cost,
            None => match entry.base_cost {
                Some(base) => effective_cost(base, row.hint, fast_learner),
                None => {
                    debug!(name = %row.name, "dropping row: no cost and no catalog base cost");
                    continue;
                }
            },
        };

        let rating = entry.score.resolve(grades.bucket(entry.facet));
        let aptitude = if entry.category.is_premium() {
            APTITUDE_PREMIUM
        } else {
            APTITUDE_ORDINARY
        };

        // Stable per row instance: a repeated skill gets a numbered id so
        // the plan output can tell the copies apart.
        let base_id = entry
            .skill_id
            .clone()
            .unwrap_or_else(|| normalize_key(&entry.name));
        let n = seen.entry(base_id.clone()).or_insert(0);
        let id = if *n == 0 {
            base_id
        } else {
            format!("{base_id}#{n}")
        };
        *n += 1;

        candidates.push(Candidate {
            id,
            name: entry.name.clone(),
            category: entry.category,
            cost,
            rating,
            aptitude,
            required: row.required,
            prerequisite: None,
            cost_includes_prerequisite: false,
        });
        entries.push(entry);
    }

    resolve_edges(&mut candidates, &entries);
    candidates
}

/// Turns the catalog's string cross-references into typed candidate edges.
/// `parent_ids` links first, then the premium `lower_id` link; the first
/// reference that lands on another extracted candidate wins.
fn resolve_edges(candidates: &mut [Candidate], entries: &[&SkillEntry]) {
    let mut by_skill_id: HashMap<&str, usize> = HashMap::new();
    for (idx, entry) in entries.iter().enumerate() {
        if let Some(id) = entry.skill_id.as_deref() {
            by_skill_id.entry(id).or_insert(idx);
        }
    }

    for (idx, entry) in entries.iter().enumerate() {
        let parent = entry
            .parent_ids
            .iter()
            .filter_map(|id| by_skill_id.get(id.as_str()).copied())
            .find(|&other| other != idx);
        if let Some(other) = parent {
            candidates[idx].prerequisite = Some(other);
            continue;
        }

        let lower = entry
            .lower_id
            .as_deref()
            .and_then(|id| by_skill_id.get(id).copied())
            .filter(|&other| other != idx);
        if let Some(other) = lower {
            candidates[idx].prerequisite = Some(other);
            // A premium upgrade's stored price already includes its lower
            // version.
            candidates[idx].cost_includes_prerequisite = entry.category.is_premium();
        }
    }
}
