pub mod extract;
pub mod groups;
pub mod knapsack;
pub mod reconstruct;
pub mod required;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Category;

/// Multiplier that lifts the aptitude score above any reachable rating sum,
/// making the blended value lexicographic: aptitude decides, rating breaks
/// ties. Ratings top out in the hundreds per skill, so even a few hundred
/// candidates stay well below this.
pub const SCORE_SCALE: i64 = 100_000;

/// Objective selection for a planning run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Maximize the rating score alone.
    #[default]
    Rating,
    /// Maximize aptitude-test score first, rating as tie-break.
    Aptitude,
}

impl ScoringMode {
    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Rating => "rating",
            Self::Aptitude => "aptitude",
        }
    }
}

impl Display for ScoringMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

#[derive(Debug, Error)]
#[error("unknown scoring mode (expected rating|aptitude): {0}")]
pub struct ScoringModeParseError(pub String);

impl FromStr for ScoringMode {
    type Err = ScoringModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rating" => Ok(Self::Rating),
            "aptitude" | "aptitude-test" => Ok(Self::Aptitude),
            _ => Err(ScoringModeParseError(s.to_string())),
        }
    }
}

/// A validated, catalog-resolved purchasable option. `prerequisite` is a
/// typed edge (index into the same candidate slice), resolved exactly once
/// during extraction; nothing downstream resolves names again.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    /// Stable per row instance, not per catalog entry: two rows naming the
    /// same skill are distinct candidates.
    pub id: String,
    pub name: String,
    pub category: Category,
    /// Discount-adjusted cost in skill points.
    pub cost: u32,
    pub rating: u32,
    pub aptitude: u32,
    pub required: bool,
    pub prerequisite: Option<usize>,
    /// True when `cost` already covers the prerequisite (a premium skill
    /// paired through its lower-version link); the combined choice then
    /// charges this cost alone instead of summing both.
    pub cost_includes_prerequisite: bool,
}

impl Candidate {
    /// Blended objective value under the given mode.
    pub fn value(&self, mode: ScoringMode) -> i64 {
        match mode {
            ScoringMode::Rating => i64::from(self.rating),
            ScoringMode::Aptitude => i64::from(self.aptitude) * SCORE_SCALE + i64::from(self.rating),
        }
    }
}

/// One selected skill in a finished plan. Subsumed entries are combo
/// members whose cost and value already count inside their partner's
/// totals; they are listed for completeness with zeroed numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChosenSkill {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub cost: u32,
    pub rating: u32,
    pub aptitude: u32,
    pub subsumed: bool,
    pub forced: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined_with: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanResult {
    pub feasible: bool,
    pub budget: u32,
    pub used_cost: u32,
    pub total_rating: u32,
    pub total_aptitude: u32,
    pub chosen: Vec<ChosenSkill>,
}

impl PlanResult {
    /// Required skills alone exceed the budget: empty plan, zero totals.
    pub fn infeasible(budget: u32) -> Self {
        Self {
            feasible: false,
            budget,
            used_cost: 0,
            total_rating: 0,
            total_aptitude: 0,
            chosen: Vec::new(),
        }
    }

    pub fn remaining(&self) -> u32 {
        self.budget.saturating_sub(self.used_cost)
    }

    pub fn purchased_count(&self) -> usize {
        self.chosen.iter().filter(|c| !c.subsumed).count()
    }
}

/// Plans the optimal purchase set. Pure and synchronous: one call owns all
/// of its state and either finishes with a full result or is not started.
pub fn optimize(candidates: &[Candidate], budget: u32, mode: ScoringMode) -> PlanResult {
    let closure = required::expand_required(candidates);
    if closure.cost > budget {
        return PlanResult::infeasible(budget);
    }

    let optional: Vec<usize> = (0..candidates.len())
        .filter(|idx| !closure.indices.contains(idx))
        .collect();
    let groups = groups::build_groups(candidates, &optional);
    let solution = knapsack::solve(&groups, budget - closure.cost, mode);
    reconstruct::assemble(candidates, &groups, &solution, &closure, budget)
}
