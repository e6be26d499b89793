//! # ArchiveOptions
//!
//! Configuration of an [`EpsilonBoxArchive`](super::EpsilonBoxArchive).
//!
//! ## Example
//!
//! ```rust
//! use epsbox::archive::{ArchiveOptions, Epsilons};
//!
//! let options = ArchiveOptions::builder()
//!     .epsilons(vec![0.01, 0.01])
//!     .parallel_threshold(500)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(options.epsilons().num_objectives(), 2);
//! ```

use serde::{Deserialize, Serialize};

use super::box_key::Epsilons;
use crate::error::{EpsBoxError, Result};

/// Default archive size from which dominance scans run on the rayon pool.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveOptions {
    epsilons: Epsilons,
    /// Minimum number of archive members scanned in parallel
    #[serde(default = "default_parallel_threshold")]
    parallel_threshold: usize,
}

fn default_parallel_threshold() -> usize {
    DEFAULT_PARALLEL_THRESHOLD
}

impl ArchiveOptions {
    pub fn new(epsilons: Epsilons) -> Self {
        Self {
            epsilons,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    pub fn builder() -> ArchiveOptionsBuilder {
        ArchiveOptionsBuilder::default()
    }

    pub fn epsilons(&self) -> &Epsilons {
        &self.epsilons
    }

    pub fn get_parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// Sets the parallel threshold.
    pub fn set_parallel_threshold(&mut self, threshold: usize) {
        self.parallel_threshold = threshold;
    }

    /// Re-checks options that did not go through a validating constructor,
    /// such as options deserialized from a configuration file.
    pub fn validate(&self) -> Result<()> {
        Epsilons::new(self.epsilons.values().to_vec())?;
        if self.parallel_threshold == 0 {
            return Err(EpsBoxError::InvalidConfiguration(
                "Parallel threshold cannot be zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for `ArchiveOptions`.
#[derive(Debug, Clone, Default)]
pub struct ArchiveOptionsBuilder {
    epsilons: Option<Vec<f64>>,
    parallel_threshold: Option<usize>,
}

impl ArchiveOptionsBuilder {
    /// Sets one epsilon per objective.
    pub fn epsilons(mut self, values: Vec<f64>) -> Self {
        self.epsilons = Some(values);
        self
    }

    /// Sets the parallel threshold.
    pub fn parallel_threshold(mut self, value: usize) -> Self {
        self.parallel_threshold = Some(value);
        self
    }

    /// Builds the `ArchiveOptions` instance.
    ///
    /// # Errors
    ///
    /// Returns [`EpsBoxError::InvalidConfiguration`] if no epsilons were given,
    /// any epsilon is not positive, or the threshold is zero.
    pub fn build(self) -> Result<ArchiveOptions> {
        let values = self.epsilons.ok_or_else(|| {
            EpsBoxError::InvalidConfiguration("Epsilons must be specified".to_string())
        })?;

        let options = ArchiveOptions {
            epsilons: Epsilons::new(values)?,
            parallel_threshold: self.parallel_threshold.unwrap_or(DEFAULT_PARALLEL_THRESHOLD),
        };
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_epsilons() {
        assert!(matches!(
            ArchiveOptions::builder().build(),
            Err(EpsBoxError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_builder_rejects_zero_threshold() {
        let result = ArchiveOptions::builder()
            .epsilons(vec![0.1])
            .parallel_threshold(0)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialized_options_are_validated() {
        let options: ArchiveOptions = serde_json::from_str(r#"{"epsilons":[0.1,-1.0]}"#).unwrap();
        assert!(options.validate().is_err());

        let options: ArchiveOptions = serde_json::from_str(r#"{"epsilons":[0.1,0.2]}"#).unwrap();
        assert!(options.validate().is_ok());
        assert_eq!(options.get_parallel_threshold(), DEFAULT_PARALLEL_THRESHOLD);
    }
}
