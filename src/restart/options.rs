//! # RestartOptions
//!
//! Configuration of the [`RestartController`](super::RestartController).
//!
//! ## Fields
//!
//! - `window_size`: number of steps between two checks.
//! - `max_window_size`: a restart is forced once this many steps have passed
//!   since the last restart. Evaluated at checks only.
//! - `injection_rate`: the restarted population is sized
//!   `archive.len() / injection_rate`, so a rate of 0.25 makes the archive a
//!   quarter of the new population.
//! - `min_population_size`, `max_population_size`: clamp for the new size.
//! - `slack`: a check restarts when the population is smaller than
//!   `(1 - slack)` times the target size.
//! - `mode`: whether a lack of epsilon-progress alone triggers a restart.
//! - `metric`: which archive counter measures progress.
//!
//! ## Example
//!
//! ```rust
//! use epsbox::restart::{ImprovementMetric, RestartMode, RestartOptions};
//!
//! let options = RestartOptions::builder()
//!     .window_size(10)
//!     .max_window_size(100)
//!     .population_size_bounds(10, 1000)
//!     .mode(RestartMode::AdaptiveTime)
//!     .metric(ImprovementMetric::DominatingImprovements)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(options.target_population_size(40), 160);
//! assert_eq!(options.target_population_size(1), 10);
//! ```

use serde::{Deserialize, Serialize};

use super::{ImprovementMetric, RestartMode};
use crate::error::{EpsBoxError, Result};

pub const DEFAULT_WINDOW_SIZE: u64 = 100;
pub const DEFAULT_MAX_WINDOW_SIZE: u64 = 100;
pub const DEFAULT_INJECTION_RATE: f64 = 0.25;
pub const DEFAULT_MIN_POPULATION_SIZE: usize = 100;
pub const DEFAULT_MAX_POPULATION_SIZE: usize = 10_000;
pub const DEFAULT_SLACK: f64 = 0.25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestartOptions {
    window_size: u64,
    max_window_size: u64,
    injection_rate: f64,
    min_population_size: usize,
    max_population_size: usize,
    slack: f64,
    #[serde(default)]
    mode: RestartMode,
    #[serde(default)]
    metric: ImprovementMetric,
}

impl RestartOptions {
    /// Returns a builder starting from the default options.
    pub fn builder() -> RestartOptionsBuilder {
        RestartOptionsBuilder::default()
    }

    pub fn window_size(&self) -> u64 {
        self.window_size
    }

    pub fn max_window_size(&self) -> u64 {
        self.max_window_size
    }

    pub fn injection_rate(&self) -> f64 {
        self.injection_rate
    }

    pub fn min_population_size(&self) -> usize {
        self.min_population_size
    }

    pub fn max_population_size(&self) -> usize {
        self.max_population_size
    }

    pub fn slack(&self) -> f64 {
        self.slack
    }

    pub fn mode(&self) -> RestartMode {
        self.mode
    }

    pub fn metric(&self) -> ImprovementMetric {
        self.metric
    }

    /// Population size implied by an archive of `archive_size` members,
    /// `round(archive_size / injection_rate)` clamped to the size bounds.
    pub fn target_population_size(&self, archive_size: usize) -> usize {
        let raw = (archive_size as f64 / self.injection_rate).round();
        let raw = if raw >= usize::MAX as f64 {
            usize::MAX
        } else {
            raw as usize
        };
        raw.clamp(self.min_population_size, self.max_population_size)
    }

    /// Checks the invariants the builder enforces. Call after deserializing.
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(EpsBoxError::InvalidConfiguration(
                "Window size must be positive".to_string(),
            ));
        }
        if self.max_window_size == 0 {
            return Err(EpsBoxError::InvalidConfiguration(
                "Max window size must be positive".to_string(),
            ));
        }
        if !(self.injection_rate.is_finite() && self.injection_rate > 0.0) {
            return Err(EpsBoxError::InvalidConfiguration(format!(
                "Injection rate must be positive, got {}",
                self.injection_rate
            )));
        }
        if self.min_population_size == 0 {
            return Err(EpsBoxError::InvalidConfiguration(
                "Min population size must be positive".to_string(),
            ));
        }
        if self.min_population_size > self.max_population_size {
            return Err(EpsBoxError::InvalidConfiguration(format!(
                "Min population size {} exceeds max population size {}",
                self.min_population_size, self.max_population_size
            )));
        }
        if !(0.0..1.0).contains(&self.slack) {
            return Err(EpsBoxError::InvalidConfiguration(format!(
                "Slack must be in [0, 1), got {}",
                self.slack
            )));
        }
        Ok(())
    }
}

impl Default for RestartOptions {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            max_window_size: DEFAULT_MAX_WINDOW_SIZE,
            injection_rate: DEFAULT_INJECTION_RATE,
            min_population_size: DEFAULT_MIN_POPULATION_SIZE,
            max_population_size: DEFAULT_MAX_POPULATION_SIZE,
            slack: DEFAULT_SLACK,
            mode: RestartMode::default(),
            metric: ImprovementMetric::default(),
        }
    }
}

/// Builder for `RestartOptions`.
///
/// Unset fields take their default values.
#[derive(Debug, Clone, Default)]
pub struct RestartOptionsBuilder {
    window_size: Option<u64>,
    max_window_size: Option<u64>,
    injection_rate: Option<f64>,
    min_population_size: Option<usize>,
    max_population_size: Option<usize>,
    slack: Option<f64>,
    mode: Option<RestartMode>,
    metric: Option<ImprovementMetric>,
}

impl RestartOptionsBuilder {
    pub fn window_size(mut self, value: u64) -> Self {
        self.window_size = Some(value);
        self
    }

    pub fn max_window_size(mut self, value: u64) -> Self {
        self.max_window_size = Some(value);
        self
    }

    pub fn injection_rate(mut self, value: f64) -> Self {
        self.injection_rate = Some(value);
        self
    }

    pub fn min_population_size(mut self, value: usize) -> Self {
        self.min_population_size = Some(value);
        self
    }

    pub fn max_population_size(mut self, value: usize) -> Self {
        self.max_population_size = Some(value);
        self
    }

    /// Sets both population size bounds.
    pub fn population_size_bounds(self, min: usize, max: usize) -> Self {
        self.min_population_size(min).max_population_size(max)
    }

    pub fn slack(mut self, value: f64) -> Self {
        self.slack = Some(value);
        self
    }

    pub fn mode(mut self, value: RestartMode) -> Self {
        self.mode = Some(value);
        self
    }

    pub fn metric(mut self, value: ImprovementMetric) -> Self {
        self.metric = Some(value);
        self
    }

    /// Builds and validates the options.
    ///
    /// # Errors
    ///
    /// Returns [`EpsBoxError::InvalidConfiguration`] on zero window sizes, a
    /// non-positive injection rate, inverted or zero population bounds, or a
    /// slack outside `[0, 1)`.
    pub fn build(self) -> Result<RestartOptions> {
        let defaults = RestartOptions::default();
        let options = RestartOptions {
            window_size: self.window_size.unwrap_or(defaults.window_size),
            max_window_size: self.max_window_size.unwrap_or(defaults.max_window_size),
            injection_rate: self.injection_rate.unwrap_or(defaults.injection_rate),
            min_population_size: self
                .min_population_size
                .unwrap_or(defaults.min_population_size),
            max_population_size: self
                .max_population_size
                .unwrap_or(defaults.max_population_size),
            slack: self.slack.unwrap_or(defaults.slack),
            mode: self.mode.unwrap_or(defaults.mode),
            metric: self.metric.unwrap_or(defaults.metric),
        };
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RestartOptions::default();
        assert_eq!(options.window_size(), 100);
        assert_eq!(options.max_window_size(), 100);
        assert_eq!(options.injection_rate(), 0.25);
        assert_eq!(options.min_population_size(), 100);
        assert_eq!(options.max_population_size(), 10_000);
        assert_eq!(options.slack(), 0.25);
        assert_eq!(options.mode(), RestartMode::EpsilonProgress);
        assert_eq!(options.metric(), ImprovementMetric::AllImprovements);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_builder_rejects_invalid_values() {
        assert!(RestartOptions::builder().window_size(0).build().is_err());
        assert!(RestartOptions::builder().max_window_size(0).build().is_err());
        assert!(RestartOptions::builder().injection_rate(0.0).build().is_err());
        assert!(RestartOptions::builder().injection_rate(f64::NAN).build().is_err());
        assert!(RestartOptions::builder().population_size_bounds(0, 10).build().is_err());
        assert!(RestartOptions::builder().population_size_bounds(20, 10).build().is_err());
        assert!(RestartOptions::builder().slack(1.0).build().is_err());
        assert!(RestartOptions::builder().slack(-0.1).build().is_err());
    }

    #[test]
    fn test_target_population_size() {
        let options = RestartOptions::builder()
            .population_size_bounds(4, 20)
            .injection_rate(0.5)
            .build()
            .unwrap();

        assert_eq!(options.target_population_size(0), 4);
        assert_eq!(options.target_population_size(3), 6);
        assert_eq!(options.target_population_size(100), 20);
    }

    #[test]
    fn test_deserialize_and_validate() {
        let json = r#"{
            "window_size": 10,
            "max_window_size": 50,
            "injection_rate": 0.5,
            "min_population_size": 8,
            "max_population_size": 4,
            "slack": 0.1
        }"#;
        let options: RestartOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.mode(), RestartMode::EpsilonProgress);
        assert!(matches!(
            options.validate(),
            Err(EpsBoxError::InvalidConfiguration(_))
        ));
    }
}
