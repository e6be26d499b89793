pub mod algorithm;
pub mod archive;
pub mod checkpoint;
pub mod dominance;
pub mod error;
pub mod operator;
pub mod population;
pub mod restart;
pub mod rng;
pub mod solution;

// Re-export commonly used types for convenience
pub use archive::{ArchiveOptions, EpsilonBoxArchive, Epsilons};
pub use checkpoint::{CheckpointState, Checkpoints};
pub use error::{EpsBoxError, OptionExt, Result, ResultExt};
pub use population::Population;
pub use restart::{RestartController, RestartOptions};
pub use solution::Solution;
