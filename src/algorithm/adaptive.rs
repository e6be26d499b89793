//! # AdaptiveRestart
//!
//! Wraps an [`EpsilonBoxAlgorithm`] with a [`RestartController`] and owns the
//! random number generator of the run, so that a checkpoint captures every
//! piece of state that influences later decisions.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::atomic::AtomicBool;
//!
//! use epsbox::algorithm::{AdaptiveRestart, EpsilonBoxAlgorithm, EpsilonMoea};
//! use epsbox::archive::{ArchiveOptions, Epsilons};
//! use epsbox::error::Result;
//! use epsbox::operator::{Problem, UniformMutation};
//! use epsbox::restart::{RestartController, RestartOptions};
//! use epsbox::rng::RandomNumberGenerator;
//! use epsbox::solution::Solution;
//!
//! struct Schaffer;
//!
//! impl Problem for Schaffer {
//!     fn num_variables(&self) -> usize { 1 }
//!     fn num_objectives(&self) -> usize { 2 }
//!     fn bounds(&self) -> Vec<(f64, f64)> { vec![(-10.0, 10.0)] }
//!     fn evaluate(&self, solution: &mut Solution) -> Result<()> {
//!         let x = solution.variable(0);
//!         solution.set_objectives(&[x * x, (x - 2.0) * (x - 2.0)])
//!     }
//! }
//!
//! let options = ArchiveOptions::new(Epsilons::uniform(0.1, 2).unwrap());
//! let mutation = UniformMutation::new(1.0, Schaffer.bounds()).unwrap();
//! let moea = EpsilonMoea::new(Schaffer, options, 20, Box::new(mutation)).unwrap();
//!
//! let restarts = RestartOptions::builder()
//!     .window_size(10)
//!     .population_size_bounds(10, 100)
//!     .build()
//!     .unwrap();
//! let controller = RestartController::for_problem(restarts, &Schaffer).unwrap();
//!
//! let mut run = AdaptiveRestart::new(moea, controller, RandomNumberGenerator::from_seed(3));
//! let summary = run.run(500, &AtomicBool::new(false)).unwrap();
//!
//! assert!(summary.evaluations >= 500);
//! assert!(!run.algorithm().result().is_empty());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use super::EpsilonBoxAlgorithm;
use crate::checkpoint::{CheckpointState, Checkpoints, Counters};
use crate::error::Result;
use crate::restart::{RestartController, StepOutcome};
use crate::rng::RandomNumberGenerator;

/// What a call to [`AdaptiveRestart::run`] achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub generations: u64,
    pub evaluations: u64,
    pub restarts: u64,
    /// The cancellation flag stopped the run before the budget was spent.
    pub cancelled: bool,
}

#[derive(Debug)]
pub struct AdaptiveRestart<A: EpsilonBoxAlgorithm> {
    algorithm: A,
    controller: RestartController,
    rng: RandomNumberGenerator,
    generation: u64,
}

impl<A: EpsilonBoxAlgorithm> AdaptiveRestart<A> {
    pub fn new(algorithm: A, controller: RestartController, rng: RandomNumberGenerator) -> Self {
        Self {
            algorithm,
            controller,
            rng,
            generation: 0,
        }
    }

    pub fn algorithm(&self) -> &A {
        &self.algorithm
    }

    pub fn controller(&self) -> &RestartController {
        &self.controller
    }

    /// Mutable access, e.g. to register restart listeners.
    pub fn controller_mut(&mut self) -> &mut RestartController {
        &mut self.controller
    }

    pub fn rng(&self) -> &RandomNumberGenerator {
        &self.rng
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn into_inner(self) -> A {
        self.algorithm
    }

    /// Runs one generation of the algorithm, then one restart step.
    pub fn step(&mut self) -> Result<StepOutcome> {
        self.algorithm.step(&mut self.rng)?;
        self.generation += 1;

        let components = self.algorithm.components();
        let outcome = self.controller.on_step(
            components.population,
            components.archive,
            components.problem,
            &mut self.rng,
        )?;

        if let StepOutcome::Restarted { evaluations, .. } = outcome {
            *components.evaluations += evaluations;
        }

        Ok(outcome)
    }

    /// Steps until at least `max_evaluations` evaluations were spent or
    /// `cancel` is set. The flag is read between steps only.
    pub fn run(&mut self, max_evaluations: u64, cancel: &AtomicBool) -> Result<RunSummary> {
        let start = self.generation;
        let cancelled = self.run_until(max_evaluations, cancel, |_| Ok(()))?;
        Ok(self.summary(start, cancelled))
    }

    /// Like [`run`](AdaptiveRestart::run), resuming from the checkpoint file
    /// if it exists and saving to it every `frequency` generations and when
    /// the run ends.
    ///
    /// # Errors
    ///
    /// An existing but unusable checkpoint file fails the run with one of the
    /// checkpoint rejection errors; the file is left in place.
    pub fn run_with_checkpoints(
        &mut self,
        max_evaluations: u64,
        cancel: &AtomicBool,
        checkpoints: &Checkpoints,
    ) -> Result<RunSummary> {
        if checkpoints.exists() {
            let state = CheckpointState::load_from_path(checkpoints.path())?;
            self.restore(state)?;
            info!(
                path = %checkpoints.path().display(),
                generation = self.generation,
                evaluations = self.algorithm.evaluations(),
                "Resumed from checkpoint"
            );
        }

        let start = self.generation;
        let mut last_save = None;
        let cancelled = self.run_until(max_evaluations, cancel, |run| {
            if checkpoints.is_due(run.generation, last_save.unwrap_or(start)) {
                run.save().save_to_path(checkpoints.path())?;
                last_save = Some(run.generation);
            }
            Ok(())
        })?;

        if last_save != Some(self.generation) {
            self.save().save_to_path(checkpoints.path())?;
        }

        Ok(self.summary(start, cancelled))
    }

    fn run_until<F>(&mut self, max_evaluations: u64, cancel: &AtomicBool, mut after_step: F) -> Result<bool>
    where
        F: FnMut(&mut Self) -> Result<()>,
    {
        while self.algorithm.evaluations() < max_evaluations {
            if cancel.load(Ordering::Relaxed) {
                debug!(generation = self.generation, "Run cancelled");
                return Ok(true);
            }
            self.step()?;
            after_step(self)?;
        }
        Ok(false)
    }

    fn summary(&self, start: u64, cancelled: bool) -> RunSummary {
        let summary = RunSummary {
            generations: self.generation - start,
            evaluations: self.algorithm.evaluations(),
            restarts: self.controller.number_of_restarts(),
            cancelled,
        };
        info!(
            generations = summary.generations,
            evaluations = summary.evaluations,
            restarts = summary.restarts,
            archive = self.algorithm.archive().len(),
            cancelled,
            "Run finished"
        );
        summary
    }

    /// Snapshot of the run. The snapshot owns copies of everything.
    pub fn save(&self) -> CheckpointState {
        CheckpointState::capture(
            self.algorithm.shape(),
            &self.rng,
            self.algorithm.population(),
            self.algorithm.archive(),
            *self.controller.state(),
            Counters {
                generation: self.generation,
                evaluations: self.algorithm.evaluations(),
            },
        )
    }

    /// Replaces the run state with a snapshot taken by [`save`](AdaptiveRestart::save).
    /// On error the current state is left untouched.
    pub fn restore(&mut self, state: CheckpointState) -> Result<()> {
        let shape = self.algorithm.shape();
        let options = self.algorithm.archive().options().clone();
        let restored = state.restore(options, &shape)?;

        let components = self.algorithm.components();
        *components.population = restored.population;
        *components.archive = restored.archive;
        *components.evaluations = restored.counters.evaluations;

        self.controller.restore_state(restored.restart);
        self.rng = restored.rng;
        self.generation = restored.counters.generation;
        Ok(())
    }
}
