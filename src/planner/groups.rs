use crate::planner::{Candidate, ScoringMode, SCORE_SCALE};

/// One mutually exclusive option within a decision group. `members` are
/// candidate indices; the empty choice is "buy nothing". For combined
/// choices, `primary` is the member whose score counts (the upgrade); the
/// other member's value is superseded, not summed.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub members: Vec<usize>,
    pub primary: Option<usize>,
    pub cost: u32,
    pub rating: u32,
    pub aptitude: u32,
}

impl Choice {
    pub fn none() -> Self {
        Self {
            members: Vec::new(),
            primary: None,
            cost: 0,
            rating: 0,
            aptitude: 0,
        }
    }

    pub fn is_none(&self) -> bool {
        self.members.is_empty()
    }

    pub fn value(&self, mode: ScoringMode) -> i64 {
        match mode {
            ScoringMode::Rating => i64::from(self.rating),
            ScoringMode::Aptitude => i64::from(self.aptitude) * SCORE_SCALE + i64::from(self.rating),
        }
    }
}

/// Mutually exclusive choice set over one or more related candidates.
/// Choice 0 is always the `none` choice.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionGroup {
    pub choices: Vec<Choice>,
}

/// Partitions the optional candidates into decision groups.
///
/// A candidate whose resolved prerequisite is also optional and not yet
/// consumed forms a 3-choice dependency group (none / prerequisite only /
/// combined); everything else becomes a take-or-leave singleton. Pairing is
/// first-seen in candidate order, so output is deterministic for identical
/// input order. Every optional candidate lands in exactly one group.
pub fn build_groups(candidates: &[Candidate], optional: &[usize]) -> Vec<DecisionGroup> {
    let mut used = vec![false; candidates.len()];
    let mut optional_set = vec![false; candidates.len()];
    for &idx in optional {
        optional_set[idx] = true;
    }

    // First dependent (in candidate order) claiming each prerequisite, so a
    // pair groups together even when the prerequisite row comes first.
    let mut dependent_of: Vec<Option<usize>> = vec![None; candidates.len()];
    for &i in optional {
        if let Some(j) = candidates[i].prerequisite {
            if j != i && optional_set[j] && dependent_of[j].is_none() {
                dependent_of[j] = Some(i);
            }
        }
    }

    let mut groups = Vec::new();
    for &i in optional {
        if used[i] {
            continue;
        }

        if let Some(j) = candidates[i].prerequisite {
            if j != i && optional_set[j] && !used[j] && dependent_of[j] == Some(i) {
                groups.push(dependency_group(candidates, j, i));
                used[j] = true;
                used[i] = true;
                continue;
            }
        }

        if let Some(d) = dependent_of[i] {
            if !used[d] {
                groups.push(dependency_group(candidates, i, d));
                used[i] = true;
                used[d] = true;
                continue;
            }
        }

        groups.push(singleton_group(candidates, i));
        used[i] = true;
    }

    debug_assert!(
        optional.iter().all(|&idx| used[idx]),
        "every optional candidate must be consumed by exactly one group"
    );
    groups
}

fn singleton_group(candidates: &[Candidate], i: usize) -> DecisionGroup {
    let candidate = &candidates[i];
    DecisionGroup {
        choices: vec![
            Choice::none(),
            Choice {
                members: vec![i],
                primary: Some(i),
                cost: candidate.cost,
                rating: candidate.rating,
                aptitude: candidate.aptitude,
            },
        ],
    }
}

fn dependency_group(candidates: &[Candidate], prereq: usize, dependent: usize) -> DecisionGroup {
    let lower = &candidates[prereq];
    let upper = &candidates[dependent];
    let combined_cost = if upper.cost_includes_prerequisite {
        upper.cost
    } else {
        lower.cost.saturating_add(upper.cost)
    };
    DecisionGroup {
        choices: vec![
            Choice::none(),
            Choice {
                members: vec![prereq],
                primary: Some(prereq),
                cost: lower.cost,
                rating: lower.rating,
                aptitude: lower.aptitude,
            },
            // The upgrade supersedes the prerequisite's score in both
            // dimensions; only the cost may sum.
            Choice {
                members: vec![prereq, dependent],
                primary: Some(dependent),
                cost: combined_cost,
                rating: upper.rating,
                aptitude: upper.aptitude,
            },
        ],
    }
}
