//! # Dominance Relations
//!
//! Pairwise orderings of candidate solutions in the Pareto sense. Every
//! comparator is a pure function of its two arguments: no hidden state, no
//! side effects, and one of three outcomes for any pair of well-formed
//! solutions. Handing over solutions with different objective counts is a
//! programming error and is reported as [`EpsBoxError::DimensionMismatch`].
//!
//! - [`ParetoDominance`] compares objectives only.
//! - [`ConstraintDominance`] compares aggregate constraint violation only.
//! - [`ConstrainedParetoDominance`] applies the constraint ordering first and
//!   falls back to objectives only when the violations tie.
//! - [`EpsilonBoxDominance`] compares epsilon-box keys and breaks same-box ties
//!   by the distance to the box corner nearest the ideal point.
//!
//! [`EpsBoxError::DimensionMismatch`]: crate::error::EpsBoxError::DimensionMismatch

pub mod epsilon_box;

use std::fmt::Debug;

use crate::error::{ensure_len, Result};
use crate::solution::Solution;

pub use epsilon_box::{BoxDominance, EpsilonBoxDominance};

/// Outcome of comparing solution `a` against solution `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dominance {
    /// `a` dominates `b`.
    Dominates,
    /// `b` dominates `a`.
    DominatedBy,
    /// Neither dominates the other (incomparable or equal).
    NonDominated,
}

impl Dominance {
    /// The outcome seen from the other solution's point of view.
    pub fn reverse(self) -> Self {
        match self {
            Dominance::Dominates => Dominance::DominatedBy,
            Dominance::DominatedBy => Dominance::Dominates,
            Dominance::NonDominated => Dominance::NonDominated,
        }
    }
}

/// A pure, total dominance relation between two solutions.
pub trait DominanceComparator: Debug + Send + Sync {
    /// Compares `a` against `b`.
    ///
    /// # Errors
    ///
    /// Returns [`EpsBoxError::DimensionMismatch`](crate::error::EpsBoxError::DimensionMismatch)
    /// if the solutions do not have the same number of objectives.
    fn compare(&self, a: &Solution, b: &Solution) -> Result<Dominance>;
}

/// Compares two equal-length vectors where smaller is better in every component.
pub(crate) fn compare_vectors<T: PartialOrd>(a: &[T], b: &[T]) -> Dominance {
    let mut a_better = false;
    let mut b_better = false;

    for (x, y) in a.iter().zip(b) {
        if x < y {
            a_better = true;
        } else if y < x {
            b_better = true;
        }

        if a_better && b_better {
            return Dominance::NonDominated;
        }
    }

    match (a_better, b_better) {
        (true, false) => Dominance::Dominates,
        (false, true) => Dominance::DominatedBy,
        _ => Dominance::NonDominated,
    }
}

/// Plain Pareto dominance on the objective vectors (minimization).
#[derive(Debug, Clone, Copy, Default)]
pub struct ParetoDominance;

impl DominanceComparator for ParetoDominance {
    fn compare(&self, a: &Solution, b: &Solution) -> Result<Dominance> {
        ensure_len("objectives", a.num_objectives(), b.num_objectives())?;
        Ok(compare_vectors(a.objectives(), b.objectives()))
    }
}

/// Orders solutions by aggregate constraint violation.
///
/// A feasible solution dominates any infeasible one; between two infeasible
/// solutions the smaller violation dominates. Two feasible solutions, or two
/// with identical violation, are non-dominated.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintDominance;

impl DominanceComparator for ConstraintDominance {
    fn compare(&self, a: &Solution, b: &Solution) -> Result<Dominance> {
        Ok(compare_violation(a, b))
    }
}

pub(crate) fn compare_violation(a: &Solution, b: &Solution) -> Dominance {
    let va = a.constraint_violation();
    let vb = b.constraint_violation();

    if (va != 0.0 || vb != 0.0) && va != vb {
        if va < vb {
            Dominance::Dominates
        } else {
            Dominance::DominatedBy
        }
    } else {
        Dominance::NonDominated
    }
}

/// Constraint ordering first; objectives decide only when violations tie.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstrainedParetoDominance;

impl DominanceComparator for ConstrainedParetoDominance {
    fn compare(&self, a: &Solution, b: &Solution) -> Result<Dominance> {
        ensure_len("objectives", a.num_objectives(), b.num_objectives())?;

        match compare_violation(a, b) {
            Dominance::NonDominated => Ok(compare_vectors(a.objectives(), b.objectives())),
            decided => Ok(decided),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EpsBoxError;

    fn solution(objectives: &[f64], constraints: &[f64]) -> Solution {
        Solution::from_parts(vec![], objectives.to_vec(), constraints.to_vec())
    }

    #[test]
    fn test_pareto_dominance() {
        let pareto = ParetoDominance;
        let a = Solution::with_objectives(&[0.0, 1.0]);
        let b = Solution::with_objectives(&[1.0, 1.0]);
        let c = Solution::with_objectives(&[1.0, 0.0]);

        assert_eq!(pareto.compare(&a, &b).unwrap(), Dominance::Dominates);
        assert_eq!(pareto.compare(&b, &a).unwrap(), Dominance::DominatedBy);
        assert_eq!(pareto.compare(&a, &c).unwrap(), Dominance::NonDominated);
        assert_eq!(pareto.compare(&a, &a).unwrap(), Dominance::NonDominated);
    }

    #[test]
    fn test_pareto_dominance_length_mismatch() {
        let a = Solution::with_objectives(&[0.0, 1.0]);
        let b = Solution::with_objectives(&[0.0]);

        assert!(matches!(
            ParetoDominance.compare(&a, &b),
            Err(EpsBoxError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_constraint_dominance() {
        let feasible = solution(&[5.0], &[0.0]);
        let slightly = solution(&[0.0], &[0.5]);
        let badly = solution(&[0.0], &[-2.0]);

        let cmp = ConstraintDominance;
        assert_eq!(cmp.compare(&feasible, &slightly).unwrap(), Dominance::Dominates);
        assert_eq!(cmp.compare(&badly, &slightly).unwrap(), Dominance::DominatedBy);
        assert_eq!(cmp.compare(&feasible, &feasible).unwrap(), Dominance::NonDominated);
    }

    #[test]
    fn test_infeasibility_short_circuits_objectives() {
        let feasible = solution(&[10.0, 10.0], &[0.0]);
        let infeasible = solution(&[0.0, 0.0], &[1.0]);

        let cmp = ConstrainedParetoDominance;
        assert_eq!(cmp.compare(&feasible, &infeasible).unwrap(), Dominance::Dominates);
        assert_eq!(cmp.compare(&infeasible, &feasible).unwrap(), Dominance::DominatedBy);
    }

    #[test]
    fn test_equal_violation_falls_back_to_objectives() {
        let a = solution(&[0.0, 0.0], &[1.0]);
        let b = solution(&[1.0, 1.0], &[-1.0]);

        assert_eq!(
            ConstrainedParetoDominance.compare(&a, &b).unwrap(),
            Dominance::Dominates
        );
    }

    #[test]
    fn test_reverse() {
        assert_eq!(Dominance::Dominates.reverse(), Dominance::DominatedBy);
        assert_eq!(Dominance::NonDominated.reverse(), Dominance::NonDominated);
    }
}
