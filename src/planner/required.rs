use std::collections::BTreeSet;

use crate::planner::Candidate;

/// Transitive closure of must-buy candidates, with its pre-paid totals.
/// `folded` members ride inside a combined-price partner: their cost and
/// score are already covered by the partner's numbers and must not be
/// counted again.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequiredClosure {
    pub indices: BTreeSet<usize>,
    pub folded: BTreeSet<usize>,
    pub cost: u32,
    pub rating: u32,
    pub aptitude: u32,
}

impl RequiredClosure {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Expands the required flags to a fixed point: a required candidate pulls
/// in its prerequisite, transitively. A required lower version does not
/// force its upgrade; forcing flows down the dependency, not up.
pub fn expand_required(candidates: &[Candidate]) -> RequiredClosure {
    let mut indices: BTreeSet<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| c.required)
        .map(|(idx, _)| idx)
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        let current: Vec<usize> = indices.iter().copied().collect();
        for idx in current {
            if let Some(prereq) = candidates[idx].prerequisite {
                if prereq != idx && indices.insert(prereq) {
                    changed = true;
                }
            }
        }
    }

    // A combined-price upgrade already pays for its prerequisite; when both
    // sit in the closure, the prerequisite's numbers fold into the upgrade.
    let mut folded = BTreeSet::new();
    for &idx in &indices {
        let candidate = &candidates[idx];
        if !candidate.cost_includes_prerequisite {
            continue;
        }
        if let Some(prereq) = candidate.prerequisite {
            if prereq != idx && indices.contains(&prereq) {
                folded.insert(prereq);
            }
        }
    }

    let mut cost: u32 = 0;
    let mut rating: u32 = 0;
    let mut aptitude: u32 = 0;
    for &idx in &indices {
        if folded.contains(&idx) {
            continue;
        }
        let candidate = &candidates[idx];
        cost = cost.saturating_add(candidate.cost);
        rating = rating.saturating_add(candidate.rating);
        aptitude = aptitude.saturating_add(candidate.aptitude);
    }

    RequiredClosure {
        indices,
        folded,
        cost,
        rating,
        aptitude,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;

    fn candidate(id: &str, cost: u32, rating: u32, required: bool) -> Candidate {
        Candidate {
            id: id.to_string(),
            name: id.to_string(),
            category: Category::Yellow,
            cost,
            rating,
            aptitude: 400,
            required,
            prerequisite: None,
            cost_includes_prerequisite: false,
        }
    }

    #[test]
    fn empty_when_nothing_required() {
        let candidates = vec![candidate("a", 100, 50, false)];
        let closure = expand_required(&candidates);
        assert!(closure.is_empty());
        assert_eq!(closure.cost, 0);
    }

    #[test]
    fn required_upgrade_pulls_prerequisite() {
        let lower = candidate("lower", 150, 180, false);
        let mut gold = candidate("gold", 300, 500, true);
        gold.prerequisite = Some(0);
        let closure = expand_required(&[lower, gold]);
        assert_eq!(closure.indices, BTreeSet::from([0, 1]));
        assert_eq!(closure.cost, 450);
        assert_eq!(closure.rating, 680);
    }

    #[test]
    fn required_lower_does_not_force_upgrade() {
        let lower = candidate("lower", 150, 180, true);
        let mut gold = candidate("gold", 300, 500, false);
        gold.prerequisite = Some(0);
        let closure = expand_required(&[lower, gold]);
        assert_eq!(closure.indices, BTreeSet::from([0]));
        assert_eq!(closure.cost, 150);
    }

    #[test]
    fn transitive_prerequisite_chain_closes() {
        let base = candidate("base", 100, 80, false);
        let mut mid = candidate("mid", 120, 100, false);
        mid.prerequisite = Some(0);
        let mut top = candidate("top", 140, 130, true);
        top.prerequisite = Some(1);
        let closure = expand_required(&[base, mid, top]);
        assert_eq!(closure.indices, BTreeSet::from([0, 1, 2]));
        assert_eq!(closure.cost, 360);
    }

    #[test]
    fn combined_price_prerequisite_is_not_double_counted() {
        let lower = candidate("lower", 150, 180, false);
        let mut gold = candidate("gold", 457, 500, true);
        gold.category = Category::Gold;
        gold.prerequisite = Some(0);
        gold.cost_includes_prerequisite = true;
        let closure = expand_required(&[lower, gold]);
        assert_eq!(closure.indices, BTreeSet::from([0, 1]));
        assert_eq!(closure.folded, BTreeSet::from([0]));
        // Only the gold's stored cost counts; the lower rides inside it.
        assert_eq!(closure.cost, 457);
        assert_eq!(closure.rating, 500);
        assert_eq!(closure.aptitude, 400);
    }
}
