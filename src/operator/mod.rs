//! # Operators
//!
//! Capability traits for the collaborators the core calls but does not
//! implement: the problem that evaluates solutions, the selection operator
//! that picks parents and the variation operator that turns parents into
//! offspring. The restart controller invokes them only while injecting new
//! solutions after a restart.
//!
//! Reference implementations used by restarts are included:
//! [`UniformSelection`], [`TournamentSelection`] and [`UniformMutation`].
//!
//! ## Example
//!
//! ```rust
//! use epsbox::error::Result;
//! use epsbox::operator::Problem;
//! use epsbox::solution::Solution;
//!
//! /// Schaffer's problem: minimize x^2 and (x - 2)^2.
//! struct Schaffer;
//!
//! impl Problem for Schaffer {
//!     fn num_variables(&self) -> usize { 1 }
//!     fn num_objectives(&self) -> usize { 2 }
//!     fn bounds(&self) -> Vec<(f64, f64)> { vec![(-10.0, 10.0)] }
//!
//!     fn evaluate(&self, solution: &mut Solution) -> Result<()> {
//!         let x = solution.variable(0);
//!         solution.set_objectives(&[x * x, (x - 2.0) * (x - 2.0)])
//!     }
//! }
//!
//! let mut solution = Schaffer.new_solution();
//! solution.set_variables(&[1.0]).unwrap();
//! Schaffer.evaluate(&mut solution).unwrap();
//! assert_eq!(solution.objectives(), &[1.0, 1.0]);
//! ```

pub mod selection;
pub mod variation;

use std::fmt::Debug;

use crate::error::Result;
use crate::rng::RandomNumberGenerator;
use crate::solution::Solution;

pub use selection::{TournamentSelection, UniformSelection};
pub use variation::UniformMutation;

/// An optimization problem: fills in objectives and constraints of a solution.
pub trait Problem: Send + Sync {
    fn num_variables(&self) -> usize;

    fn num_objectives(&self) -> usize;

    fn num_constraints(&self) -> usize {
        0
    }

    /// Lower and upper bound of every decision variable.
    fn bounds(&self) -> Vec<(f64, f64)>;

    /// Evaluates the solution in place.
    ///
    /// # Errors
    ///
    /// Implementations report failures as
    /// [`EpsBoxError::Evaluation`](crate::error::EpsBoxError::Evaluation);
    /// the core propagates them unchanged.
    fn evaluate(&self, solution: &mut Solution) -> Result<()>;

    /// A zeroed solution with this problem's shape.
    fn new_solution(&self) -> Solution {
        Solution::new(
            self.num_variables(),
            self.num_objectives(),
            self.num_constraints(),
        )
    }
}

/// Picks parents from a pool of solutions.
pub trait Selection: Debug + Send + Sync {
    /// Selects `arity` solutions from `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if `source` is empty.
    fn select(
        &self,
        arity: usize,
        source: &[Solution],
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Solution>>;

    /// Called after a restart with the new population size, for operators
    /// whose parameters scale with it.
    fn adapt_to_population_size(&mut self, _population_size: usize) {}
}

/// Produces offspring from a fixed number of parents.
pub trait Variation: Debug + Send + Sync {
    /// Number of parents consumed by [`evolve`](Variation::evolve).
    fn arity(&self) -> usize;

    /// Creates offspring. Offspring are unevaluated.
    fn evolve(&self, parents: &[Solution], rng: &mut RandomNumberGenerator) -> Result<Vec<Solution>>;
}
