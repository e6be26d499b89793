//! # Error Types
//!
//! This module defines the error type shared by every component of the crate:
//! the archive, the population container, the restart controller and the
//! checkpoint codec.
//!
//! Configuration problems are reported when an object is constructed and are
//! never silently clamped. Contract violations (mismatched vector lengths,
//! removing from an empty population, restarting from an empty archive) are
//! returned to the caller instead of being swallowed, because continuing would
//! produce silently incorrect search results.
//!
//! Checkpoint failures are split into three variants so a caller can decide
//! whether to start fresh or abort:
//!
//! - [`EpsBoxError::NotACheckpoint`]: the input is empty or foreign.
//! - [`EpsBoxError::CorruptCheckpoint`]: the header is recognised but the data is truncated or damaged.
//! - [`EpsBoxError::IncompatibleCheckpoint`]: the data is valid but was written for another configuration.
//!
//! Generic I/O failures (permission denied, missing directory) stay in
//! [`EpsBoxError::Io`].
//!
//! ## Examples
//!
//! Using the `ResultExt` trait to add context to errors:
//!
//! ```rust
//! use epsbox::error::{Result, ResultExt};
//! use std::fs::File;
//!
//! fn open_run_log(path: &str) -> Result<()> {
//!     File::open(path).context("Failed to open run log")
//!         .and_then(|_file| Ok(()))
//! }
//! ```
//!
//! Using the `OptionExt` trait to convert `Option` to `Result`:
//!
//! ```rust
//! use epsbox::error::{EpsBoxError, OptionExt};
//!
//! fn first_member(members: &[f64]) -> epsbox::error::Result<f64> {
//!     members.first().copied().ok_or_else_eps(|| EpsBoxError::EmptyArchive)
//! }
//! ```

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Represents errors that can occur while archiving, restarting or checkpointing.
#[derive(Error, Debug)]
pub enum EpsBoxError {
    /// Error that occurs when an invalid configuration is provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Error that occurs when two vectors that must agree in length do not.
    #[error("Dimension mismatch: expected {expected} {what}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Error that occurs when NaN values are encountered.
    #[error("Invalid numeric value: {0}")]
    InvalidNumericValue(String),

    /// Error that occurs when an element is removed from an empty population.
    #[error("Empty population error: Cannot operate on an empty population")]
    EmptyPopulation,

    /// Error that occurs when an index is outside of the population.
    #[error("Index {index} is out of bounds for a population of size {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Error that occurs when a restart needs archive members but there are none.
    #[error("Empty archive error: Cannot select restart parents from an empty archive")]
    EmptyArchive,

    /// Error reported by the problem while evaluating a solution.
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Error reported by a selection or variation operator.
    #[error("Operator error: {0}")]
    Operator(String),

    /// The data is empty or does not start with the checkpoint magic tag.
    #[error("Not a valid checkpoint: {0}")]
    NotACheckpoint(String),

    /// The checkpoint header is valid but the payload is truncated or damaged.
    #[error("Corrupt checkpoint: {0}")]
    CorruptCheckpoint(String),

    /// The checkpoint is well formed but does not match the current configuration.
    #[error("Incompatible checkpoint: {0}")]
    IncompatibleCheckpoint(String),

    /// Error that occurs when an I/O operation fails.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

impl EpsBoxError {
    /// Returns `true` for the errors that describe unusable checkpoint data,
    /// as opposed to I/O failures while reaching it.
    pub fn is_checkpoint_rejection(&self) -> bool {
        matches!(
            self,
            EpsBoxError::NotACheckpoint(_)
                | EpsBoxError::CorruptCheckpoint(_)
                | EpsBoxError::IncompatibleCheckpoint(_)
        )
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, EpsBoxError>;

/// Extension trait for Result to add context to errors.
///
/// ## Examples
///
/// ```rust
/// use epsbox::error::ResultExt;
/// use std::fs::File;
///
/// fn read_file(path: &str) -> epsbox::error::Result<()> {
///     File::open(path).context("Failed to open file")?;
///     Ok(())
/// }
/// ```
pub trait ResultExt<T, E> {
    /// Converts the error to an [`EpsBoxError::Other`] prefixed with `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| EpsBoxError::Other(format!("{}: {}", context, e)))
    }
}

/// Extension trait for Option to convert to Result with a custom error.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T>` using a closure to build the error.
    fn ok_or_else_eps<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> EpsBoxError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_eps<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> EpsBoxError,
    {
        self.ok_or_else(err_fn)
    }
}

/// Checks that a vector has the expected length.
pub(crate) fn ensure_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(EpsBoxError::DimensionMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}
