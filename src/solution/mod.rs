//! # Solution
//!
//! A `Solution` is a candidate point of the search: decision variables, the
//! objective values computed for them (minimization convention) and the
//! constraint violations (0 means satisfied). The three vector lengths are
//! fixed at construction and never change.
//!
//! Algorithms attach bookkeeping to solutions through a keyed attribute bag
//! (rank, crowding distance, fitness). Attributes are stored in a `BTreeMap`
//! so that serialized solutions are byte-identical across runs.
//!
//! ## Example
//!
//! ```rust
//! use epsbox::solution::{AttributeValue, Solution, RANK};
//!
//! let mut solution = Solution::new(2, 2, 0);
//! solution.set_objectives(&[0.25, 0.75]).unwrap();
//! solution.set_attribute(RANK, AttributeValue::Int(0));
//!
//! assert!(solution.is_feasible());
//! assert_eq!(solution.attribute(RANK).and_then(|a| a.as_int()), Some(0));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_len, Result};

/// Attribute key holding the nondominated rank (0 is the first front).
pub const RANK: &str = "rank";

/// Attribute key holding the crowding distance within a front.
pub const CROWDING_DISTANCE: &str = "crowding_distance";

/// Attribute key holding a scalar fitness value.
pub const FITNESS: &str = "fitness";

/// A typed value stored in a solution's attribute bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Int(i64),
    Real(f64),
    Bool(bool),
    Text(String),
    Reals(Vec<f64>),
}

impl AttributeValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value as a double; integers are widened.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            AttributeValue::Real(value) => Some(*value),
            AttributeValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

/// A candidate solution with fixed-length variables, objectives and constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    variables: Vec<f64>,
    objectives: Vec<f64>,
    constraints: Vec<f64>,
    attributes: BTreeMap<String, AttributeValue>,
}

impl Solution {
    /// Creates a solution with all variables, objectives and constraints set to zero.
    pub fn new(num_variables: usize, num_objectives: usize, num_constraints: usize) -> Self {
        Self {
            variables: vec![0.0; num_variables],
            objectives: vec![0.0; num_objectives],
            constraints: vec![0.0; num_constraints],
            attributes: BTreeMap::new(),
        }
    }

    /// Creates a variable-less, unconstrained solution with the given objectives.
    ///
    /// Mostly useful for tests and for archiving externally evaluated points.
    pub fn with_objectives(objectives: &[f64]) -> Self {
        Self {
            variables: Vec::new(),
            objectives: objectives.to_vec(),
            constraints: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Creates a solution from its three vectors.
    pub fn from_parts(variables: Vec<f64>, objectives: Vec<f64>, constraints: Vec<f64>) -> Self {
        Self {
            variables,
            objectives,
            constraints,
            attributes: BTreeMap::new(),
        }
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_objectives(&self) -> usize {
        self.objectives.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn variables(&self) -> &[f64] {
        &self.variables
    }

    pub fn objectives(&self) -> &[f64] {
        &self.objectives
    }

    pub fn constraints(&self) -> &[f64] {
        &self.constraints
    }

    pub fn variable(&self, index: usize) -> f64 {
        self.variables[index]
    }

    pub fn objective(&self, index: usize) -> f64 {
        self.objectives[index]
    }

    pub fn constraint(&self, index: usize) -> f64 {
        self.constraints[index]
    }

    /// Gives mutable access to the variables; the length cannot change.
    pub fn variables_mut(&mut self) -> &mut [f64] {
        &mut self.variables
    }

    /// Gives mutable access to the objectives; the length cannot change.
    pub fn objectives_mut(&mut self) -> &mut [f64] {
        &mut self.objectives
    }

    /// Gives mutable access to the constraints; the length cannot change.
    pub fn constraints_mut(&mut self) -> &mut [f64] {
        &mut self.constraints
    }

    pub fn set_variables(&mut self, values: &[f64]) -> Result<()> {
        ensure_len("variables", self.variables.len(), values.len())?;
        self.variables.copy_from_slice(values);
        Ok(())
    }

    pub fn set_objectives(&mut self, values: &[f64]) -> Result<()> {
        ensure_len("objectives", self.objectives.len(), values.len())?;
        self.objectives.copy_from_slice(values);
        Ok(())
    }

    pub fn set_constraints(&mut self, values: &[f64]) -> Result<()> {
        ensure_len("constraints", self.constraints.len(), values.len())?;
        self.constraints.copy_from_slice(values);
        Ok(())
    }

    /// Sum of the magnitudes of all constraint violations.
    pub fn constraint_violation(&self) -> f64 {
        self.constraints.iter().map(|c| c.abs()).sum()
    }

    pub fn is_feasible(&self) -> bool {
        self.constraints.iter().all(|&c| c == 0.0)
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.attributes.insert(key.into(), value);
    }

    pub fn remove_attribute(&mut self, key: &str) -> Option<AttributeValue> {
        self.attributes.remove(key)
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn attributes(&self) -> &BTreeMap<String, AttributeValue> {
        &self.attributes
    }

    pub fn clear_attributes(&mut self) {
        self.attributes.clear();
    }

    /// Euclidean distance between the objective vectors of two solutions.
    pub fn objective_distance(&self, other: &Solution) -> f64 {
        self.objectives
            .iter()
            .zip(&other.objectives)
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    /// Euclidean distance between the variable vectors of two solutions.
    pub fn variable_distance(&self, other: &Solution) -> f64 {
        self.variables
            .iter()
            .zip(&other.variables)
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    /// Returns `true` if both solutions have the same shape.
    pub fn same_shape(&self, other: &Solution) -> bool {
        self.variables.len() == other.variables.len()
            && self.objectives.len() == other.objectives.len()
            && self.constraints.len() == other.constraints.len()
    }
}
