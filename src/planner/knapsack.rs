use crate::planner::groups::DecisionGroup;
use crate::planner::ScoringMode;

/// DP outcome over the optional decision groups: the best blended value and
/// the full choice trace needed to walk the selection back out.
#[derive(Debug, Clone)]
pub struct DpSolution {
    pub best: i64,
    /// `choice[g][b]` is the choice index taken for group `g` at budget `b`
    /// on the optimal path through the first `g + 1` groups.
    pub choice: Vec<Vec<usize>>,
    pub budget: u32,
}

impl DpSolution {
    pub fn empty(budget: u32) -> Self {
        Self {
            best: 0,
            choice: Vec::new(),
            budget,
        }
    }
}

/// Grouped 0/1 knapsack over mutually exclusive choices. Two rolling value
/// rows keep memory at O(budget); the choice table stays full-size for
/// reconstruction. Every group carries a zero-cost `none` choice at index 0,
/// so every state is reachable and no sentinel is needed.
///
/// Ties resolve to the lowest choice index: a later choice must strictly
/// beat the incumbent to replace it, which also means `none` wins any
/// all-equal tie and the output is deterministic for identical input order.
pub fn solve(groups: &[DecisionGroup], budget: u32, mode: ScoringMode) -> DpSolution {
    if groups.is_empty() {
        return DpSolution::empty(budget);
    }

    let width = budget as usize + 1;
    let mut prev = vec![0i64; width];
    let mut next = vec![0i64; width];
    let mut choice = vec![vec![0usize; width]; groups.len()];

    for (g, group) in groups.iter().enumerate() {
        for b in 0..width {
            let mut best = i64::MIN;
            let mut best_choice = 0;
            for (k, option) in group.choices.iter().enumerate() {
                let cost = option.cost as usize;
                if cost > b {
                    continue;
                }
                let total = prev[b - cost] + option.value(mode);
                if total > best {
                    best = total;
                    best_choice = k;
                }
            }
            next[b] = best;
            choice[g][b] = best_choice;
        }
        std::mem::swap(&mut prev, &mut next);
    }

    DpSolution {
        best: prev[budget as usize],
        choice,
        budget,
    }
}

/// Walks the trace table backwards and returns the choice index taken per
/// group, in group order.
pub fn trace_choices(groups: &[DecisionGroup], solution: &DpSolution) -> Vec<usize> {
    let mut taken = vec![0usize; groups.len()];
    let mut b = solution.budget as usize;
    for g in (0..groups.len()).rev() {
        let k = solution.choice[g][b];
        taken[g] = k;
        b -= groups[g].choices[k].cost as usize;
    }
    taken
}
