// crates/pcg_runtime/src/error.rs

//! Solver error types
//!
//! `PcgError` covers the fatal conditions of both conjugate gradient drivers.
//! Running out of iterations is not an error: callers judge the reported
//! residual against their own tolerance.
//!
//! ```
//! use pcg_runtime::{PcgError, PcgResult};
//!
//! fn check(len: usize) -> PcgResult<()> {
//!     if len != 3 {
//!         return Err(PcgError::size_mismatch("x_init", 3, len));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check(2).is_err());
//! ```

use thiserror::Error;

use crate::scalar::RuntimeScalar;

/// Result alias used across the solver crates
pub type PcgResult<T> = Result<T, PcgError>;

/// Fatal solver errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PcgError {
    /// A construction or call precondition does not hold
    #[error("precondition violated: {message}")]
    PreconditionViolation {
        /// What was violated
        message: String,
    },

    /// A supplied vector or operator has the wrong size
    #[error("size mismatch: {name} expected {expected}, got {actual}")]
    SizeMismatch {
        /// Name of the offending input
        name: &'static str,
        /// Problem dimension
        expected: usize,
        /// Supplied length
        actual: usize,
    },

    /// The worker pool could not be built
    #[error("thread pool error: {message}")]
    ThreadPool {
        /// Builder error text
        message: String,
    },
}

impl PcgError {
    /// Builds a [`PcgError::PreconditionViolation`].
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::PreconditionViolation {
            message: message.into(),
        }
    }

    /// Builds a [`PcgError::SizeMismatch`].
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// Checks `actual == expected`.
    #[inline]
    pub fn check_len(name: &'static str, expected: usize, actual: usize) -> PcgResult<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::size_mismatch(name, expected, actual))
        }
    }

    /// Checks that every entry of `data` is finite.
    pub fn check_finite<S: RuntimeScalar>(name: &'static str, data: &[S]) -> PcgResult<()> {
        S::validate_slice(data).map_err(|(index, value)| {
            Self::precondition(format!("{}[{}] is not finite: {}", name, index, value))
        })
    }

    /// Whether this is a precondition violation
    pub fn is_precondition_violation(&self) -> bool {
        matches!(self, Self::PreconditionViolation { .. })
    }

    /// Whether this is a size mismatch
    pub fn is_size_mismatch(&self) -> bool {
        matches!(self, Self::SizeMismatch { .. })
    }
}
