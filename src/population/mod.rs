//! # Population
//!
//! The working set of an evolutionary search: an ordered sequence of
//! solutions. Order carries no meaning except as the tie-break for sorting
//! and truncation, which are stable so that equal-ranked solutions keep their
//! insertion order. Value duplicates are allowed.
//!
//! ## Example
//!
//! ```rust
//! use epsbox::population::{ObjectiveComparator, Population};
//! use epsbox::solution::Solution;
//!
//! let mut population: Population = [3.0, 1.0, 2.0]
//!     .iter()
//!     .map(|&f| Solution::with_objectives(&[f]))
//!     .collect();
//!
//! population.truncate(&ObjectiveComparator::new(0), 2);
//!
//! let kept: Vec<f64> = population.iter().map(|s| s.objective(0)).collect();
//! assert_eq!(kept, vec![1.0, 2.0]);
//! ```

pub mod comparator;
pub mod sorting;

use serde::{Deserialize, Serialize};

use crate::error::{EpsBoxError, Result};
use crate::solution::Solution;

pub use comparator::{
    AggregateConstraintComparator, AttributeComparator, ChainedComparator, ObjectiveComparator,
    RankAndCrowding, SolutionComparator, SortOrder,
};
pub use sorting::NondominatedSorting;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Population {
    solutions: Vec<Solution>,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            solutions: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Solution> {
        self.solutions.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Solution> {
        self.solutions.get_mut(index)
    }

    pub fn add(&mut self, solution: Solution) {
        self.solutions.push(solution);
    }

    /// Appends every solution, in iteration order.
    pub fn add_all<I>(&mut self, solutions: I)
    where
        I: IntoIterator<Item = Solution>,
    {
        self.solutions.extend(solutions);
    }

    /// Removes and returns the solution at `index`, shifting later ones down.
    ///
    /// # Errors
    ///
    /// Returns [`EpsBoxError::EmptyPopulation`] on an empty population and
    /// [`EpsBoxError::IndexOutOfBounds`] if `index >= len()`.
    pub fn remove(&mut self, index: usize) -> Result<Solution> {
        self.check_index(index)?;
        Ok(self.solutions.remove(index))
    }

    /// Replaces the solution at `index` and returns the previous one.
    pub fn replace(&mut self, index: usize, solution: Solution) -> Result<Solution> {
        self.check_index(index)?;
        Ok(std::mem::replace(&mut self.solutions[index], solution))
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if self.solutions.is_empty() {
            return Err(EpsBoxError::EmptyPopulation);
        }
        if index >= self.solutions.len() {
            return Err(EpsBoxError::IndexOutOfBounds {
                index,
                len: self.solutions.len(),
            });
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.solutions.clear();
    }

    pub fn contains(&self, solution: &Solution) -> bool {
        self.solutions.contains(solution)
    }

    /// Removes every solution matching `predicate`; returns how many were removed.
    pub fn remove_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Solution) -> bool,
    {
        let before = self.solutions.len();
        self.solutions.retain(|solution| !predicate(solution));
        before - self.solutions.len()
    }

    /// A new population holding clones of the solutions matching `predicate`.
    pub fn filter<F>(&self, mut predicate: F) -> Population
    where
        F: FnMut(&Solution) -> bool,
    {
        self.solutions
            .iter()
            .filter(|solution| predicate(solution))
            .cloned()
            .collect()
    }

    /// Stable sort, best first.
    pub fn sort<C>(&mut self, comparator: &C)
    where
        C: SolutionComparator + ?Sized,
    {
        self.solutions.sort_by(|a, b| comparator.compare(a, b));
    }

    /// Removes the worst solutions until `len() == target_size`.
    ///
    /// Leaves the population sorted best first. Among equal-ranked solutions
    /// the later-inserted ones are removed first. No-op when `target_size`
    /// is at least the current size.
    pub fn truncate<C>(&mut self, comparator: &C, target_size: usize)
    where
        C: SolutionComparator + ?Sized,
    {
        if target_size >= self.solutions.len() {
            return;
        }
        self.sort(comparator);
        self.solutions.truncate(target_size);
    }

    /// Component-wise minimum of the objective vectors.
    pub fn lower_bounds(&self) -> Result<Vec<f64>> {
        self.bounds(f64::min)
    }

    /// Component-wise maximum of the objective vectors.
    pub fn upper_bounds(&self) -> Result<Vec<f64>> {
        self.bounds(f64::max)
    }

    fn bounds(&self, pick: fn(f64, f64) -> f64) -> Result<Vec<f64>> {
        let mut iter = self.solutions.iter();
        let first = iter.next().ok_or(EpsBoxError::EmptyPopulation)?;
        let mut bounds = first.objectives().to_vec();

        for solution in iter {
            crate::error::ensure_len("objectives", bounds.len(), solution.num_objectives())?;
            for (bound, &value) in bounds.iter_mut().zip(solution.objectives()) {
                *bound = pick(*bound, value);
            }
        }
        Ok(bounds)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Solution> {
        self.solutions.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Solution> {
        self.solutions.iter_mut()
    }

    pub fn as_slice(&self) -> &[Solution] {
        &self.solutions
    }

    pub fn into_vec(self) -> Vec<Solution> {
        self.solutions
    }
}

impl From<Vec<Solution>> for Population {
    fn from(solutions: Vec<Solution>) -> Self {
        Self { solutions }
    }
}

impl FromIterator<Solution> for Population {
    fn from_iter<I: IntoIterator<Item = Solution>>(iter: I) -> Self {
        Self {
            solutions: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Population {
    type Item = Solution;
    type IntoIter = std::vec::IntoIter<Solution>;

    fn into_iter(self) -> Self::IntoIter {
        self.solutions.into_iter()
    }
}

impl<'a> IntoIterator for &'a Population {
    type Item = &'a Solution;
    type IntoIter = std::slice::Iter<'a, Solution>;

    fn into_iter(self) -> Self::IntoIter {
        self.solutions.iter()
    }
}
