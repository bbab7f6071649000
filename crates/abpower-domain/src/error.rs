//! Domain error types

use thiserror::Error;

/// Errors raised by the power and sample-size engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// An input lies outside its valid interval
    #[error("{field} must be in {expected}, got {value}")]
    OutOfRange {
        /// Name of the offending input
        field: &'static str,
        /// The rejected value
        value: f64,
        /// Human-readable description of the valid interval
        expected: &'static str,
    },

    /// A distribution could not be built from the derived parameters
    #[error("Numerical error: {0}")]
    Numerical(String),
}

impl DomainError {
    pub(crate) fn out_of_range(field: &'static str, value: f64, expected: &'static str) -> Self {
        DomainError::OutOfRange {
            field,
            value,
            expected,
        }
    }
}

/// Result alias used throughout the domain crate
pub type DomainResult<T> = Result<T, DomainError>;
