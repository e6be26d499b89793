//! # NondominatedArchive
//!
//! An unbounded archive of mutually non-dominated solutions under any
//! [`DominanceComparator`]. Unlike the epsilon-box archive it keeps every
//! non-dominated point, so its size is not bounded; it is the right container
//! for collecting the final result of a run or a reference front.

use serde::{Deserialize, Serialize};

use crate::dominance::{ConstrainedParetoDominance, Dominance, DominanceComparator};
use crate::error::Result;
use crate::solution::Solution;

/// Distances below this value are treated as identical.
pub const DUPLICATE_TOLERANCE: f64 = 1e-10;

/// How solutions that are non-dominated but (nearly) identical are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DuplicateMode {
    /// Reject a candidate whose objectives match a member's.
    #[default]
    NoDuplicates,
    /// Reject a candidate only if its variables also match a member's.
    AllowDuplicateObjectives,
    /// Keep every non-dominated candidate.
    AllowDuplicates,
}

#[derive(Debug, Clone)]
pub struct NondominatedArchive<C = ConstrainedParetoDominance>
where
    C: DominanceComparator,
{
    comparator: C,
    duplicate_mode: DuplicateMode,
    solutions: Vec<Solution>,
}

impl NondominatedArchive<ConstrainedParetoDominance> {
    /// An archive using constrained Pareto dominance without duplicates.
    pub fn pareto() -> Self {
        Self::new(ConstrainedParetoDominance, DuplicateMode::NoDuplicates)
    }
}

impl<C> NondominatedArchive<C>
where
    C: DominanceComparator,
{
    pub fn new(comparator: C, duplicate_mode: DuplicateMode) -> Self {
        Self {
            comparator,
            duplicate_mode,
            solutions: Vec::new(),
        }
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    pub fn duplicate_mode(&self) -> DuplicateMode {
        self.duplicate_mode
    }

    /// Adds the candidate unless a member dominates or duplicates it; members
    /// the candidate dominates are removed. Returns `Ok(true)` if added.
    pub fn add(&mut self, candidate: Solution) -> Result<bool> {
        let mut dominated = Vec::new();

        for (index, member) in self.solutions.iter().enumerate() {
            match self.comparator.compare(&candidate, member)? {
                Dominance::Dominates => dominated.push(index),
                Dominance::DominatedBy => return Ok(false),
                Dominance::NonDominated => {
                    if self.is_duplicate(&candidate, member) {
                        return Ok(false);
                    }
                }
            }
        }

        for index in dominated.into_iter().rev() {
            self.solutions.remove(index);
        }

        self.solutions.push(candidate);
        Ok(true)
    }

    pub fn add_all<I>(&mut self, solutions: I) -> Result<bool>
    where
        I: IntoIterator<Item = Solution>,
    {
        let mut changed = false;
        for solution in solutions {
            changed |= self.add(solution)?;
        }
        Ok(changed)
    }

    fn is_duplicate(&self, candidate: &Solution, member: &Solution) -> bool {
        match self.duplicate_mode {
            DuplicateMode::NoDuplicates => {
                candidate.objective_distance(member) < DUPLICATE_TOLERANCE
            }
            DuplicateMode::AllowDuplicateObjectives => {
                candidate.objective_distance(member) < DUPLICATE_TOLERANCE
                    && candidate.variable_distance(member) < DUPLICATE_TOLERANCE
            }
            DuplicateMode::AllowDuplicates => false,
        }
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    pub fn as_slice(&self) -> &[Solution] {
        &self.solutions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Solution> {
        self.solutions.iter()
    }

    pub fn into_vec(self) -> Vec<Solution> {
        self.solutions
    }
}
