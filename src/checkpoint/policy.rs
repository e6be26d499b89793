use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EpsBoxError, Result};

/// Where and how often a running algorithm writes checkpoints.
///
/// A checkpoint is written after every `frequency` steps. If the file already
/// exists when a run starts, the run resumes from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoints {
    path: PathBuf,
    frequency: u64,
}

impl Checkpoints {
    /// # Errors
    ///
    /// Returns [`EpsBoxError::InvalidConfiguration`] if `frequency` is 0.
    pub fn new<P: Into<PathBuf>>(path: P, frequency: u64) -> Result<Self> {
        if frequency == 0 {
            return Err(EpsBoxError::InvalidConfiguration(
                "Checkpoint frequency must be positive".to_string(),
            ));
        }
        Ok(Self {
            path: path.into(),
            frequency,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    /// True once `frequency` steps have passed since the last save.
    pub fn is_due(&self, steps: u64, steps_at_last_save: u64) -> bool {
        steps.saturating_sub(steps_at_last_save) >= self.frequency
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}
