//! # EpsilonBoxArchive
//!
//! A bounded approximation of the Pareto front fed one solution at a time.
//! The objective space is cut into boxes of width `epsilon[i]`; at most one
//! solution occupies any box, and no two members dominate each other once
//! compared on their box keys.
//!
//! Two counters record epsilon-progress:
//!
//! - `number_of_improvements` grows on every insertion that changes the archive;
//! - `number_of_dominating_improvements` grows only when the insertion removes
//!   at least one member by strict dominance (a better box, better
//!   feasibility, or a same-box winner that Pareto-dominates the occupant).
//!
//! Both counters never decrease.
//!
//! ## Example
//!
//! ```rust
//! use epsbox::archive::{ArchiveOptions, EpsilonBoxArchive, Epsilons};
//! use epsbox::solution::Solution;
//!
//! let options = ArchiveOptions::new(Epsilons::uniform(0.5, 2).unwrap());
//! let mut archive = EpsilonBoxArchive::new(options);
//!
//! assert!(archive.add(Solution::with_objectives(&[0.1, 0.9])).unwrap());
//! assert!(archive.add(Solution::with_objectives(&[0.9, 0.1])).unwrap());
//! // Same box as the first member but farther from the box corner.
//! assert!(!archive.add(Solution::with_objectives(&[0.4, 0.7])).unwrap());
//!
//! assert_eq!(archive.len(), 2);
//! assert_eq!(archive.number_of_improvements(), 2);
//! ```

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::trace;

use super::box_key::{BoxKey, Epsilons};
use super::options::ArchiveOptions;
use crate::dominance::{
    BoxDominance, ConstrainedParetoDominance, Dominance, DominanceComparator, EpsilonBoxDominance,
};
use crate::error::{EpsBoxError, Result};
use crate::solution::Solution;

/// Grid-indexed nondominated archive using additive epsilon-box dominance.
#[derive(Debug, Clone)]
pub struct EpsilonBoxArchive {
    options: ArchiveOptions,
    dominance: EpsilonBoxDominance,
    /// Members in insertion order; `keys[i]` is the box of `solutions[i]`
    solutions: Vec<Solution>,
    keys: Vec<BoxKey>,
    occupied: HashMap<BoxKey, usize>,
    improvements: u64,
    dominating_improvements: u64,
}

impl EpsilonBoxArchive {
    /// Creates an empty archive.
    pub fn new(options: ArchiveOptions) -> Self {
        let dominance = EpsilonBoxDominance::new(options.epsilons().clone());
        Self {
            options,
            dominance,
            solutions: Vec::new(),
            keys: Vec::new(),
            occupied: HashMap::new(),
            improvements: 0,
            dominating_improvements: 0,
        }
    }

    /// Creates an empty archive from an epsilon vector with default options.
    pub fn with_epsilons(values: Vec<f64>) -> Result<Self> {
        Ok(Self::new(ArchiveOptions::new(Epsilons::new(values)?)))
    }

    pub fn options(&self) -> &ArchiveOptions {
        &self.options
    }

    pub fn epsilons(&self) -> &Epsilons {
        self.options.epsilons()
    }

    pub fn num_objectives(&self) -> usize {
        self.epsilons().num_objectives()
    }

    /// Offers a solution to the archive.
    ///
    /// Returns `Ok(true)` iff the archive contents changed. A candidate that
    /// loses a same-box tie, or that is dominated by a member, is rejected
    /// with `Ok(false)`; that is the normal rejection path, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`EpsBoxError::DimensionMismatch`] if the candidate's objective
    /// count differs from the epsilon count, and
    /// [`EpsBoxError::InvalidNumericValue`] for NaN objectives or constraints.
    pub fn add(&mut self, candidate: Solution) -> Result<bool> {
        let key = self.epsilons().solution_key(&candidate)?;
        let relations = self.relations(&candidate, &key);

        let mut removed = Vec::new();
        let mut dominating = false;

        for (index, relation) in relations.into_iter().enumerate() {
            match relation {
                BoxDominance::Dominates => {
                    removed.push(index);
                    dominating = true;
                }
                BoxDominance::SameBox {
                    candidate_closer: true,
                } => {
                    removed.push(index);
                    if ConstrainedParetoDominance.compare(&candidate, &self.solutions[index])?
                        == Dominance::Dominates
                    {
                        dominating = true;
                    }
                }
                BoxDominance::DominatedBy
                | BoxDominance::SameBox {
                    candidate_closer: false,
                } => {
                    trace!(box_key = ?key.components(), "Candidate rejected by archive member {}", index);
                    return Ok(false);
                }
                BoxDominance::NonDominated => {}
            }
        }

        if !removed.is_empty() {
            self.remove_indices(&removed);
        }

        self.occupied.insert(key.clone(), self.solutions.len());
        self.solutions.push(candidate);
        self.keys.push(key);

        self.improvements += 1;
        if dominating {
            self.dominating_improvements += 1;
        }

        trace!(
            removed = removed.len(),
            dominating,
            size = self.solutions.len(),
            "Archive improved"
        );

        Ok(true)
    }

    /// Adds every solution in order. Returns `Ok(true)` if any insertion
    /// changed the archive.
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

    /// Relation of the candidate to every member, in member order.
    fn relations(&self, candidate: &Solution, key: &BoxKey) -> Vec<BoxDominance> {
        let compare = |(solution, member_key): (&Solution, &BoxKey)| {
            self.dominance
                .compare_with_keys(candidate, key, solution, member_key)
        };

        if self.solutions.len() >= self.options.get_parallel_threshold() {
            self.solutions
                .par_iter()
                .zip(self.keys.par_iter())
                .map(compare)
                .collect()
        } else {
            self.solutions.iter().zip(self.keys.iter()).map(compare).collect()
        }
    }

    /// Removes the members at the given ascending indices and reindexes boxes.
    fn remove_indices(&mut self, indices: &[usize]) {
        let mut next = indices.iter().peekable();
        let mut position = 0;
        let solutions = std::mem::take(&mut self.solutions);
        let keys = std::mem::take(&mut self.keys);

        for (solution, key) in solutions.into_iter().zip(keys) {
            if next.peek() == Some(&&position) {
                next.next();
            } else {
                self.solutions.push(solution);
                self.keys.push(key);
            }
            position += 1;
        }

        self.occupied = self
            .keys
            .iter()
            .enumerate()
            .map(|(index, key)| (key.clone(), index))
            .collect();
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    pub fn number_of_improvements(&self) -> u64 {
        self.improvements
    }

    pub fn number_of_dominating_improvements(&self) -> u64 {
        self.dominating_improvements
    }

    pub fn get(&self, index: usize) -> Option<&Solution> {
        self.solutions.get(index)
    }

    /// Members in archive order.
    pub fn as_slice(&self) -> &[Solution] {
        &self.solutions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Solution> {
        self.solutions.iter()
    }

    /// Members paired with the box each one occupies.
    pub fn entries(&self) -> impl Iterator<Item = (&BoxKey, &Solution)> {
        self.keys.iter().zip(self.solutions.iter())
    }

    /// The member occupying `key`, if any.
    pub fn occupant(&self, key: &BoxKey) -> Option<&Solution> {
        self.occupied.get(key).map(|&index| &self.solutions[index])
    }

    pub fn contains(&self, solution: &Solution) -> bool {
        self.solutions.iter().any(|member| member == solution)
    }

    /// Rebuilds an archive from stored members and counters without replaying
    /// insertions. Used when resuming from a checkpoint.
    ///
    /// # Errors
    ///
    /// Returns [`EpsBoxError::CorruptCheckpoint`] if a member does not fit the
    /// epsilon configuration, two members share a box, two members dominate
    /// each other, or the counters cannot have produced the stored members.
    pub(crate) fn restore(
        options: ArchiveOptions,
        solutions: Vec<Solution>,
        improvements: u64,
        dominating_improvements: u64,
    ) -> Result<Self> {
        let mut archive = Self::new(options);

        for solution in solutions {
            let key = archive
                .epsilons()
                .solution_key(&solution)
                .map_err(|e| EpsBoxError::CorruptCheckpoint(format!("archive member: {}", e)))?;

            if archive.occupied.contains_key(&key) {
                return Err(EpsBoxError::CorruptCheckpoint(format!(
                    "two archive members occupy box {:?}",
                    key.components()
                )));
            }

            for (member, member_key) in archive.solutions.iter().zip(&archive.keys) {
                let relation = archive
                    .dominance
                    .compare_with_keys(&solution, &key, member, member_key);
                if relation != BoxDominance::NonDominated {
                    return Err(EpsBoxError::CorruptCheckpoint(
                        "archive members dominate each other".to_string(),
                    ));
                }
            }

            archive.occupied.insert(key.clone(), archive.solutions.len());
            archive.solutions.push(solution);
            archive.keys.push(key);
        }

        if dominating_improvements > improvements || (archive.len() as u64) > improvements {
            return Err(EpsBoxError::CorruptCheckpoint(format!(
                "inconsistent archive counters ({} improvements, {} dominating, {} members)",
                improvements,
                dominating_improvements,
                archive.len()
            )));
        }

        archive.improvements = improvements;
        archive.dominating_improvements = dominating_improvements;
        Ok(archive)
    }
}

impl<'a> IntoIterator for &'a EpsilonBoxArchive {
    type Item = &'a Solution;
    type IntoIter = std::slice::Iter<'a, Solution>;

    fn into_iter(self) -> Self::IntoIter {
        self.solutions.iter()
    }
}
