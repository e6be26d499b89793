//! # Archives
//!
//! Containers that keep the best solutions seen so far while a search streams
//! candidates into them.
//!
//! - [`EpsilonBoxArchive`] bounds its size with an epsilon grid and counts
//!   epsilon-progress; it feeds the restart controller.
//! - [`NondominatedArchive`] keeps every non-dominated solution.
pub mod box_key;
pub mod epsilon_box;
pub mod nondominated;
pub mod options;

pub use box_key::{BoxKey, Epsilons};
pub use epsilon_box::EpsilonBoxArchive;
pub use nondominated::{DuplicateMode, NondominatedArchive};
pub use options::{ArchiveOptions, ArchiveOptionsBuilder};
