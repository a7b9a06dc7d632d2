use crate::planner::groups::DecisionGroup;
use crate::planner::knapsack::{trace_choices, DpSolution};
use crate::planner::required::RequiredClosure;
use crate::planner::{Candidate, ChosenSkill, PlanResult};

/// Turns the DP trace plus the required closure into a finished plan.
///
/// Forced picks come first in candidate order, then the optional picks in
/// group order. Inside a combo the primary member carries the choice's cost
/// and score; the other member is listed subsumed with zeroed numbers and a
/// pointer at its partner, so the plan's totals never double-count.
pub fn assemble(
    candidates: &[Candidate],
    groups: &[DecisionGroup],
    solution: &DpSolution,
    closure: &RequiredClosure,
    budget: u32,
) -> PlanResult {
    let mut chosen = Vec::new();
    let mut used_cost = closure.cost;
    let mut total_rating = closure.rating;
    let mut total_aptitude = closure.aptitude;

    for &idx in &closure.indices {
        let candidate = &candidates[idx];
        if closure.folded.contains(&idx) {
            chosen.push(subsumed_entry(candidate, folded_partner(candidates, closure, idx)));
            continue;
        }
        chosen.push(ChosenSkill {
            id: candidate.id.clone(),
            name: candidate.name.clone(),
            category: candidate.category,
            cost: candidate.cost,
            rating: candidate.rating,
            aptitude: candidate.aptitude,
            subsumed: false,
            forced: true,
            combined_with: None,
        });
    }

    for (group, k) in groups.iter().zip(trace_choices(groups, solution)) {
        let option = &group.choices[k];
        if option.is_none() {
            continue;
        }
        used_cost = used_cost.saturating_add(option.cost);
        total_rating = total_rating.saturating_add(option.rating);
        total_aptitude = total_aptitude.saturating_add(option.aptitude);

        let primary = option
            .primary
            .unwrap_or_else(|| *option.members.last().unwrap_or(&0));
        for &idx in &option.members {
            let candidate = &candidates[idx];
            if idx != primary {
                chosen.push(subsumed_entry(candidate, Some(&candidates[primary].name)));
                continue;
            }
            chosen.push(ChosenSkill {
                id: candidate.id.clone(),
                name: candidate.name.clone(),
                category: candidate.category,
                cost: option.cost,
                rating: option.rating,
                aptitude: option.aptitude,
                subsumed: false,
                forced: false,
                combined_with: None,
            });
        }
    }

    debug_assert!(used_cost <= budget, "plan cost must stay within budget");
    PlanResult {
        feasible: true,
        budget,
        used_cost,
        total_rating,
        total_aptitude,
        chosen,
    }
}

fn subsumed_entry(candidate: &Candidate, partner: Option<&str>) -> ChosenSkill {
    ChosenSkill {
        id: candidate.id.clone(),
        name: candidate.name.clone(),
        category: candidate.category,
        cost: 0,
        rating: 0,
        aptitude: 0,
        subsumed: true,
        forced: candidate.required,
        combined_with: partner.map(str::to_string),
    }
}

/// The closure member whose combined price already covers `folded_idx`.
fn folded_partner<'a>(
    candidates: &'a [Candidate],
    closure: &RequiredClosure,
    folded_idx: usize,
) -> Option<&'a str> {
    closure
        .indices
        .iter()
        .find(|&&idx| {
            candidates[idx].cost_includes_prerequisite
                && candidates[idx].prerequisite == Some(folded_idx)
        })
        .map(|&idx| candidates[idx].name.as_str())
}
