//! # Adaptive restarts
//!
//! The [`RestartController`] watches epsilon-progress and the ratio between
//! population and archive size over a sliding window of steps. When the
//! search stagnates it empties the population, reseeds it from the archive,
//! and fills it back up with evaluated offspring of archive members. The new
//! size tracks the archive size through the injection rate.
//!
//! The controller never owns the population or the archive: both are
//! borrowed for the duration of a single [`RestartController::on_step`].
//!
//! ```text
//! Running --(window elapsed)--> Checking --(stagnation)--> Restarting --> Running
//!                                   \--(progress)-------------------------^
//! ```

pub mod controller;
pub mod options;

use serde::{Deserialize, Serialize};

use crate::archive::EpsilonBoxArchive;

pub use controller::{RestartController, RestartListener, RestartListenerId};
pub use options::{RestartOptions, RestartOptionsBuilder};

/// Which conditions may trigger a restart at a check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RestartMode {
    /// Restart on the max-window ceiling or a disproportionately small population.
    AdaptiveTime,
    /// Additionally restart when the archive made no progress since the last check.
    #[default]
    EpsilonProgress,
}

/// Which archive counter measures progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImprovementMetric {
    #[default]
    AllImprovements,
    DominatingImprovements,
}

impl ImprovementMetric {
    /// Reads the selected counter from the archive.
    pub fn count(&self, archive: &EpsilonBoxArchive) -> u64 {
        match self {
            ImprovementMetric::AllImprovements => archive.number_of_improvements(),
            ImprovementMetric::DominatingImprovements => {
                archive.number_of_dominating_improvements()
            }
        }
    }
}

/// Counters of the restart state machine.
///
/// `iterations_at_last_check` and `improvements_at_last_check` are rewritten
/// at every check; the iteration and restart counters only grow.
/// `population_size_at_last_restart` is 0 until the first restart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartState {
    pub iteration: u64,
    pub iterations_at_last_check: u64,
    pub improvements_at_last_check: u64,
    pub iterations_at_last_restart: u64,
    pub number_of_restarts: u64,
    pub population_size_at_last_restart: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    Running,
    Checking,
    Restarting,
}

/// Why a check decided to restart. Reported in order of precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RestartReason {
    /// `max_window_size` steps passed since the last restart.
    MaxWindow,
    /// The improvement counter did not grow since the last check.
    NoProgress,
    /// The population fell below `(1 - slack)` of its target size.
    PopulationRatio,
}

/// Result of one [`RestartController::on_step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// No check was due.
    Continued,
    /// A check ran and found progress.
    Checked,
    Restarted {
        reason: RestartReason,
        new_population_size: usize,
        /// Offspring evaluated while refilling the population.
        evaluations: u64,
    },
}

impl StepOutcome {
    pub fn is_restart(&self) -> bool {
        matches!(self, StepOutcome::Restarted { .. })
    }
}

/// Delivered to listeners once per restart, after the population is refilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartEvent {
    pub restart_count: u64,
    pub new_population_size: usize,
    pub iteration: u64,
    pub reason: RestartReason,
}
