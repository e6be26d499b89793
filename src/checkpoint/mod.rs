//! # Checkpoints
//!
//! A [`CheckpointState`] is a self-contained snapshot of a running search:
//! the random number generator, the population, the archive (box keys,
//! members and counters), the restart counters and the generation and
//! evaluation counters. Restoring it and continuing produces exactly the same
//! decisions as the uninterrupted run, given the same external operators.
//!
//! Snapshots carry a [`CheckpointShape`] (epsilon vector and variable,
//! objective and constraint counts). Restoring into a configuration with a
//! different shape fails with
//! [`EpsBoxError::IncompatibleCheckpoint`](crate::error::EpsBoxError::IncompatibleCheckpoint).
//!
//! The binary layout is defined in [`codec`]; [`Checkpoints`] decides when a
//! running algorithm writes one.
//!
//! ## Example
//!
//! ```rust
//! use epsbox::archive::{ArchiveOptions, EpsilonBoxArchive, Epsilons};
//! use epsbox::checkpoint::{CheckpointShape, CheckpointState, Counters};
//! use epsbox::population::Population;
//! use epsbox::restart::RestartState;
//! use epsbox::rng::RandomNumberGenerator;
//! use epsbox::solution::Solution;
//!
//! let options = ArchiveOptions::new(Epsilons::uniform(0.1, 2).unwrap());
//! let mut archive = EpsilonBoxArchive::new(options.clone());
//! archive.add(Solution::from_parts(vec![0.5], vec![0.2, 0.8], vec![])).unwrap();
//! let population: Population = archive.iter().cloned().collect();
//! let shape = CheckpointShape::new(options.epsilons(), 1, 0);
//!
//! let state = CheckpointState::capture(
//!     shape.clone(),
//!     &RandomNumberGenerator::from_seed(1),
//!     &population,
//!     &archive,
//!     RestartState::default(),
//!     Counters { generation: 3, evaluations: 30 },
//! );
//! let bytes = state.to_bytes().unwrap();
//!
//! let restored = CheckpointState::from_bytes(&bytes)
//!     .unwrap()
//!     .restore(options, &shape)
//!     .unwrap();
//! assert_eq!(restored.population, population);
//! assert_eq!(restored.archive.as_slice(), archive.as_slice());
//! assert_eq!(restored.counters.evaluations, 30);
//! ```

pub mod codec;
pub mod policy;

use serde::{Deserialize, Serialize};

use crate::archive::{ArchiveOptions, BoxKey, EpsilonBoxArchive, Epsilons};
use crate::error::{EpsBoxError, Result};
use crate::population::Population;
use crate::restart::RestartState;
use crate::rng::RandomNumberGenerator;
use crate::solution::Solution;

pub use codec::{CHECKPOINT_MAGIC, CHECKPOINT_VERSION, HEADER_LEN};
pub use policy::Checkpoints;

/// Configuration a checkpoint was written for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointShape {
    pub epsilons: Vec<f64>,
    pub num_variables: usize,
    pub num_objectives: usize,
    pub num_constraints: usize,
}

impl CheckpointShape {
    pub fn new(epsilons: &Epsilons, num_variables: usize, num_constraints: usize) -> Self {
        Self {
            epsilons: epsilons.values().to_vec(),
            num_variables,
            num_objectives: epsilons.num_objectives(),
            num_constraints,
        }
    }

    /// Describes the first difference to `expected`, if any.
    fn mismatch(&self, expected: &CheckpointShape) -> Option<String> {
        if self.num_objectives != expected.num_objectives {
            return Some(format!(
                "written for {} objectives, configured for {}",
                self.num_objectives, expected.num_objectives
            ));
        }
        if self.epsilons.len() != expected.epsilons.len()
            || self
                .epsilons
                .iter()
                .zip(&expected.epsilons)
                .any(|(a, b)| a.to_bits() != b.to_bits())
        {
            return Some(format!(
                "written for epsilons {:?}, configured for {:?}",
                self.epsilons, expected.epsilons
            ));
        }
        if self.num_variables != expected.num_variables {
            return Some(format!(
                "written for {} variables, configured for {}",
                self.num_variables, expected.num_variables
            ));
        }
        if self.num_constraints != expected.num_constraints {
            return Some(format!(
                "written for {} constraints, configured for {}",
                self.num_constraints, expected.num_constraints
            ));
        }
        None
    }

    fn fits(&self, solution: &Solution) -> bool {
        solution.num_variables() == self.num_variables
            && solution.num_objectives() == self.num_objectives
            && solution.num_constraints() == self.num_constraints
    }
}

/// Archive contents as stored in a checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveSnapshot {
    pub keys: Vec<BoxKey>,
    pub members: Vec<Solution>,
    pub improvements: u64,
    pub dominating_improvements: u64,
}

impl ArchiveSnapshot {
    pub fn of(archive: &EpsilonBoxArchive) -> Self {
        let (keys, members) = archive
            .entries()
            .map(|(key, member)| (key.clone(), member.clone()))
            .unzip();
        Self {
            keys,
            members,
            improvements: archive.number_of_improvements(),
            dominating_improvements: archive.number_of_dominating_improvements(),
        }
    }
}

/// Generation and evaluation counters of the algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub generation: u64,
    pub evaluations: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointState {
    pub shape: CheckpointShape,
    pub rng: RandomNumberGenerator,
    pub population: Population,
    pub archive: ArchiveSnapshot,
    pub restart: RestartState,
    pub counters: Counters,
}

/// Everything recovered from a checkpoint, ready to be moved back into an
/// algorithm.
#[derive(Debug, Clone)]
pub struct RestoredState {
    pub rng: RandomNumberGenerator,
    pub population: Population,
    pub archive: EpsilonBoxArchive,
    pub restart: RestartState,
    pub counters: Counters,
}

impl CheckpointState {
    /// Copies the given state into a new snapshot. Nothing is borrowed past
    /// this call.
    pub fn capture(
        shape: CheckpointShape,
        rng: &RandomNumberGenerator,
        population: &Population,
        archive: &EpsilonBoxArchive,
        restart: RestartState,
        counters: Counters,
    ) -> Self {
        Self {
            shape,
            rng: rng.clone(),
            population: population.clone(),
            archive: ArchiveSnapshot::of(archive),
            restart,
            counters,
        }
    }

    /// Rebuilds the live state for an archive configured with `options`.
    ///
    /// # Errors
    ///
    /// - [`EpsBoxError::InvalidConfiguration`] if `options` and `expected`
    ///   disagree on the epsilon vector.
    /// - [`EpsBoxError::IncompatibleCheckpoint`] if the snapshot was written
    ///   for a different shape.
    /// - [`EpsBoxError::CorruptCheckpoint`] if the contents are inconsistent:
    ///   solutions of the wrong shape, stored box keys that do not match the
    ///   members, members dominating each other or impossible counters.
    pub fn restore(self, options: ArchiveOptions, expected: &CheckpointShape) -> Result<RestoredState> {
        if options.epsilons().values() != expected.epsilons.as_slice() {
            return Err(EpsBoxError::InvalidConfiguration(
                "Archive epsilons differ from the expected checkpoint shape".to_string(),
            ));
        }

        if let Some(reason) = self.shape.mismatch(expected) {
            return Err(EpsBoxError::IncompatibleCheckpoint(reason));
        }

        if let Some(index) = self.population.iter().position(|s| !self.shape.fits(s)) {
            return Err(EpsBoxError::CorruptCheckpoint(format!(
                "population member {} does not match the checkpoint shape",
                index
            )));
        }

        let ArchiveSnapshot {
            keys,
            members,
            improvements,
            dominating_improvements,
        } = self.archive;

        if keys.len() != members.len() {
            return Err(EpsBoxError::CorruptCheckpoint(format!(
                "{} box keys stored for {} archive members",
                keys.len(),
                members.len()
            )));
        }
        if let Some(index) = members.iter().position(|s| !self.shape.fits(s)) {
            return Err(EpsBoxError::CorruptCheckpoint(format!(
                "archive member {} does not match the checkpoint shape",
                index
            )));
        }

        let archive =
            EpsilonBoxArchive::restore(options, members, improvements, dominating_improvements)?;

        if archive.entries().zip(&keys).any(|((actual, _), stored)| actual != stored) {
            return Err(EpsBoxError::CorruptCheckpoint(
                "stored box keys do not match the archive members".to_string(),
            ));
        }

        let restart = self.restart;
        if restart.iterations_at_last_check > restart.iteration
            || restart.iterations_at_last_restart > restart.iteration
        {
            return Err(EpsBoxError::CorruptCheckpoint(
                "restart counters are ahead of the iteration".to_string(),
            ));
        }

        Ok(RestoredState {
            rng: self.rng,
            population: self.population,
            archive,
            restart,
            counters: self.counters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ArchiveOptions {
        ArchiveOptions::new(Epsilons::new(vec![0.1, 0.2]).unwrap())
    }

    fn shape() -> CheckpointShape {
        CheckpointShape::new(options().epsilons(), 1, 1)
    }

    fn solution(x: f64, f1: f64, f2: f64) -> Solution {
        Solution::from_parts(vec![x], vec![f1, f2], vec![0.0])
    }

    fn state() -> CheckpointState {
        let mut archive = EpsilonBoxArchive::new(options());
        archive.add(solution(0.1, 0.05, 0.95)).unwrap();
        archive.add(solution(0.9, 0.95, 0.05)).unwrap();
        let population: Population = vec![solution(0.5, 0.5, 0.5)].into();

        CheckpointState::capture(
            shape(),
            &RandomNumberGenerator::from_seed(11),
            &population,
            &archive,
            RestartState {
                iteration: 12,
                iterations_at_last_check: 10,
                improvements_at_last_check: 2,
                ..RestartState::default()
            },
            Counters {
                generation: 12,
                evaluations: 120,
            },
        )
    }

    #[test]
    fn test_restore_roundtrip() {
        let original = state();
        let restored = original.clone().restore(options(), &shape()).unwrap();

        assert_eq!(restored.population, original.population);
        assert_eq!(restored.archive.as_slice(), original.archive.members.as_slice());
        assert_eq!(restored.archive.number_of_improvements(), 2);
        assert_eq!(restored.restart, original.restart);
        assert_eq!(restored.rng, original.rng);
        assert_eq!(restored.counters.evaluations, 120);
    }

    #[test]
    fn test_shape_mismatch_is_incompatible() {
        let mut expected = shape();
        expected.num_variables = 2;
        assert!(matches!(
            state().restore(options(), &expected),
            Err(EpsBoxError::IncompatibleCheckpoint(_))
        ));

        let other = ArchiveOptions::new(Epsilons::new(vec![0.1, 0.3]).unwrap());
        let other_shape = CheckpointShape::new(other.epsilons(), 1, 1);
        assert!(matches!(
            state().restore(other, &other_shape),
            Err(EpsBoxError::IncompatibleCheckpoint(_))
        ));
    }

    #[test]
    fn test_inconsistent_contents_are_corrupt() {
        let mut tampered = state();
        tampered.archive.keys.swap(0, 1);
        assert!(matches!(
            tampered.restore(options(), &shape()),
            Err(EpsBoxError::CorruptCheckpoint(_))
        ));

        let mut tampered = state();
        tampered.archive.improvements = 1;
        assert!(matches!(
            tampered.restore(options(), &shape()),
            Err(EpsBoxError::CorruptCheckpoint(_))
        ));

        let mut tampered = state();
        tampered.population.add(Solution::with_objectives(&[0.0, 0.0]));
        assert!(matches!(
            tampered.restore(options(), &shape()),
            Err(EpsBoxError::CorruptCheckpoint(_))
        ));
    }

    #[test]
    fn test_options_must_match_expected_shape() {
        let other = ArchiveOptions::new(Epsilons::new(vec![0.5, 0.5]).unwrap());
        assert!(matches!(
            state().restore(other, &shape()),
            Err(EpsBoxError::InvalidConfiguration(_))
        ));
    }
}
