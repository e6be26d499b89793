//! # Algorithms
//!
//! The [`EpsilonBoxAlgorithm`] trait is the seam between a search loop and
//! the restart and checkpoint machinery: an algorithm owns its population,
//! archive and problem, and lends them out one step at a time.
//!
//! [`EpsilonMoea`] is a steady-state reference algorithm, and
//! [`AdaptiveRestart`] wraps any algorithm with a
//! [`RestartController`](crate::restart::RestartController), an explicit
//! random number generator and checkpoint support.

pub mod adaptive;
pub mod epsilon_moea;

use crate::archive::EpsilonBoxArchive;
use crate::checkpoint::CheckpointShape;
use crate::error::Result;
use crate::operator::Problem;
use crate::population::Population;
use crate::rng::RandomNumberGenerator;
use crate::solution::Solution;

pub use adaptive::{AdaptiveRestart, RunSummary};
pub use epsilon_moea::EpsilonMoea;

/// Mutable view of an algorithm's state, valid for one call.
pub struct Components<'a> {
    pub population: &'a mut Population,
    pub archive: &'a mut EpsilonBoxArchive,
    pub problem: &'a dyn Problem,
    pub evaluations: &'a mut u64,
}

/// A search algorithm built around an [`EpsilonBoxArchive`].
pub trait EpsilonBoxAlgorithm {
    /// Runs one generation. Every draw of randomness goes through `rng`.
    fn step(&mut self, rng: &mut RandomNumberGenerator) -> Result<()>;

    fn population(&self) -> &Population;

    fn archive(&self) -> &EpsilonBoxArchive;

    fn problem(&self) -> &dyn Problem;

    /// Number of problem evaluations so far, including those spent by restarts.
    fn evaluations(&self) -> u64;

    fn components(&mut self) -> Components<'_>;

    /// The archive members: the current approximation of the Pareto front.
    fn result(&self) -> &[Solution] {
        self.archive().as_slice()
    }

    /// Shape recorded in and checked against checkpoints.
    fn shape(&self) -> CheckpointShape {
        let problem = self.problem();
        CheckpointShape::new(
            self.archive().epsilons(),
            problem.num_variables(),
            problem.num_constraints(),
        )
    }
}
