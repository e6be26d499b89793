//! Epsilon vectors and the integer box coordinates derived from them.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_len, EpsBoxError, Result};
use crate::solution::Solution;

/// One strictly positive box width per objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Epsilons(Vec<f64>);

impl Epsilons {
    /// Creates an epsilon vector.
    ///
    /// # Errors
    ///
    /// Returns [`EpsBoxError::InvalidConfiguration`] if the vector is empty or
    /// any value is not a finite positive number.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(EpsBoxError::InvalidConfiguration(
                "At least one epsilon value is required".to_string(),
            ));
        }

        if let Some((index, value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !(v.is_finite() && **v > 0.0))
        {
            return Err(EpsBoxError::InvalidConfiguration(format!(
                "Epsilon for objective {} must be positive and finite, got {}",
                index, value
            )));
        }

        Ok(Self(values))
    }

    /// The same epsilon for `num_objectives` objectives.
    pub fn uniform(epsilon: f64, num_objectives: usize) -> Result<Self> {
        Self::new(vec![epsilon; num_objectives])
    }

    pub fn num_objectives(&self) -> usize {
        self.0.len()
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Computes `floor(objective[i] / epsilon[i])` for every objective.
    ///
    /// # Errors
    ///
    /// Returns [`EpsBoxError::DimensionMismatch`] if the objective count differs
    /// from the epsilon count and [`EpsBoxError::InvalidNumericValue`] for NaN
    /// objectives. Infinite objectives saturate to the extreme box.
    pub fn box_key(&self, objectives: &[f64]) -> Result<BoxKey> {
        ensure_len("objectives", self.0.len(), objectives.len())?;

        let mut key = Vec::with_capacity(objectives.len());
        for (i, (&value, &epsilon)) in objectives.iter().zip(&self.0).enumerate() {
            if value.is_nan() {
                return Err(EpsBoxError::InvalidNumericValue(format!(
                    "Objective {} is NaN",
                    i
                )));
            }
            key.push((value / epsilon).floor() as i64);
        }

        Ok(BoxKey(key))
    }

    /// Box key of a solution about to enter an archive.
    ///
    /// On top of [`box_key`](Epsilons::box_key), rejects NaN constraint values:
    /// a NaN violation compares neither smaller nor larger than any other, so a
    /// member carrying one would reject every later candidate.
    ///
    /// # Errors
    ///
    /// Same as [`box_key`](Epsilons::box_key), plus
    /// [`EpsBoxError::InvalidNumericValue`] for NaN constraints.
    pub fn solution_key(&self, solution: &Solution) -> Result<BoxKey> {
        if let Some(index) = solution.constraints().iter().position(|c| c.is_nan()) {
            return Err(EpsBoxError::InvalidNumericValue(format!(
                "Constraint {} is NaN",
                index
            )));
        }
        self.box_key(solution.objectives())
    }

    /// Squared Euclidean distance from `objectives` to the ideal corner of `key`.
    pub fn corner_distance(&self, objectives: &[f64], key: &BoxKey) -> f64 {
        objectives
            .iter()
            .zip(&self.0)
            .zip(&key.0)
            .map(|((&value, &epsilon), &index)| (value - index as f64 * epsilon).powi(2))
            .sum()
    }
}

/// Integer coordinates of an epsilon box, one component per objective.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoxKey(Vec<i64>);

impl BoxKey {
    pub fn new(components: Vec<i64>) -> Self {
        Self(components)
    }

    pub fn components(&self) -> &[i64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
