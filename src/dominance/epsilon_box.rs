//! Additive epsilon-box dominance.
//!
//! Solutions are compared on their box keys rather than their raw
//! objectives. Because `floor(x / epsilon)` is monotone, box-key dominance is
//! a faithful proxy for epsilon-dominance. Two solutions in the same box are
//! ranked by their squared distance to the box corner nearest the ideal
//! point; the strictly closer one wins and a tie goes to the incumbent.
//!
//! Constraint violation is compared before any box arithmetic.

use crate::archive::box_key::{BoxKey, Epsilons};
use crate::error::{ensure_len, Result};
use crate::solution::Solution;

use super::{compare_vectors, compare_violation, Dominance, DominanceComparator};

/// Detailed outcome of an epsilon-box comparison of a candidate against an incumbent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxDominance {
    /// The candidate dominates the incumbent (by feasibility or by box).
    Dominates,
    /// The incumbent dominates the candidate (by feasibility or by box).
    DominatedBy,
    /// The boxes are mutually non-dominated.
    NonDominated,
    /// Both occupy the same box; `candidate_closer` is true when the
    /// candidate is strictly nearer to the box's ideal corner.
    SameBox { candidate_closer: bool },
}

/// Epsilon-box dominance with the constraint ordering applied first.
#[derive(Debug, Clone, PartialEq)]
pub struct EpsilonBoxDominance {
    epsilons: Epsilons,
}

impl EpsilonBoxDominance {
    pub fn new(epsilons: Epsilons) -> Self {
        Self { epsilons }
    }

    pub fn epsilons(&self) -> &Epsilons {
        &self.epsilons
    }

    /// Compares two box keys component-wise.
    pub fn compare_keys(a: &BoxKey, b: &BoxKey) -> Dominance {
        compare_vectors(a.components(), b.components())
    }

    /// Compares `candidate` against `incumbent` given their precomputed keys.
    pub fn compare_with_keys(
        &self,
        candidate: &Solution,
        candidate_key: &BoxKey,
        incumbent: &Solution,
        incumbent_key: &BoxKey,
    ) -> BoxDominance {
        match compare_violation(candidate, incumbent) {
            Dominance::Dominates => return BoxDominance::Dominates,
            Dominance::DominatedBy => return BoxDominance::DominatedBy,
            Dominance::NonDominated => {}
        }

        if candidate_key == incumbent_key {
            let candidate_distance = self
                .epsilons
                .corner_distance(candidate.objectives(), candidate_key);
            let incumbent_distance = self
                .epsilons
                .corner_distance(incumbent.objectives(), incumbent_key);

            return BoxDominance::SameBox {
                candidate_closer: candidate_distance < incumbent_distance,
            };
        }

        match Self::compare_keys(candidate_key, incumbent_key) {
            Dominance::Dominates => BoxDominance::Dominates,
            Dominance::DominatedBy => BoxDominance::DominatedBy,
            Dominance::NonDominated => BoxDominance::NonDominated,
        }
    }

    /// Compares `candidate` against `incumbent`, computing both box keys.
    pub fn compare_detailed(&self, candidate: &Solution, incumbent: &Solution) -> Result<BoxDominance> {
        ensure_len(
            "objectives",
            candidate.num_objectives(),
            incumbent.num_objectives(),
        )?;
        let candidate_key = self.epsilons.box_key(candidate.objectives())?;
        let incumbent_key = self.epsilons.box_key(incumbent.objectives())?;

        Ok(self.compare_with_keys(candidate, &candidate_key, incumbent, &incumbent_key))
    }
}

impl DominanceComparator for EpsilonBoxDominance {
    fn compare(&self, a: &Solution, b: &Solution) -> Result<Dominance> {
        Ok(match self.compare_detailed(a, b)? {
            BoxDominance::Dominates | BoxDominance::SameBox { candidate_closer: true } => {
                Dominance::Dominates
            }
            BoxDominance::DominatedBy | BoxDominance::SameBox { candidate_closer: false } => {
                Dominance::DominatedBy
            }
            BoxDominance::NonDominated => Dominance::NonDominated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparator(epsilon: f64, n: usize) -> EpsilonBoxDominance {
        EpsilonBoxDominance::new(Epsilons::uniform(epsilon, n).unwrap())
    }

    #[test]
    fn test_box_dominance() {
        let cmp = comparator(0.5, 2);
        let a = Solution::with_objectives(&[0.1, 0.1]);
        let b = Solution::with_objectives(&[0.6, 0.6]);

        assert_eq!(cmp.compare_detailed(&a, &b).unwrap(), BoxDominance::Dominates);
        assert_eq!(cmp.compare_detailed(&b, &a).unwrap(), BoxDominance::DominatedBy);
    }

    #[test]
    fn test_same_box_closer_wins() {
        let cmp = comparator(0.5, 1);
        let near = Solution::with_objectives(&[0.1]);
        let far = Solution::with_objectives(&[0.4]);

        assert_eq!(
            cmp.compare_detailed(&near, &far).unwrap(),
            BoxDominance::SameBox { candidate_closer: true }
        );
        assert_eq!(
            cmp.compare_detailed(&far, &near).unwrap(),
            BoxDominance::SameBox { candidate_closer: false }
        );
        assert_eq!(
            cmp.compare_detailed(&near, &near).unwrap(),
            BoxDominance::SameBox { candidate_closer: false }
        );
    }

    #[test]
    fn test_non_dominated_boxes() {
        let cmp = comparator(0.5, 2);
        let a = Solution::with_objectives(&[0.1, 0.9]);
        let b = Solution::with_objectives(&[0.9, 0.1]);

        assert_eq!(cmp.compare(&a, &b).unwrap(), Dominance::NonDominated);
    }

    #[test]
    fn test_feasibility_checked_before_boxes() {
        let cmp = comparator(0.5, 1);
        let infeasible = Solution::from_parts(vec![], vec![0.0], vec![1.0]);
        let feasible = Solution::from_parts(vec![], vec![10.0], vec![0.0]);

        assert_eq!(
            cmp.compare_detailed(&infeasible, &feasible).unwrap(),
            BoxDominance::DominatedBy
        );
    }
}
