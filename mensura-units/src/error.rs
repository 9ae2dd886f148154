//! Measurement failure conditions
//!
//! Every failure is a well-defined, recoverable condition tied to a
//! specific operand pairing. Errors are detected eagerly at the point of
//! the operation; no partial results or NaN propagation.

use mensura_core::NumberError;
use thiserror::Error;

/// Errors raised by unit and measure operations
#[derive(Debug, Clone, Error)]
pub enum MeasureError {
    /// Operand units do not share a canonical decomposition
    #[error("incompatible units: {left} vs {right}")]
    IncompatibleUnit { left: String, right: String },

    /// A unit symbol resolves differently in the active definition sets
    #[error("ambiguous unit symbol: {0}")]
    AmbiguousUnit(String),

    /// A denominator, logarithm argument, or zero-base exponent made the
    /// result undefined
    #[error("division by zero")]
    DivisionByZero,

    /// Mathematically undefined outside division-by-zero (e.g. ln of a
    /// negative number)
    #[error("domain error: {0}")]
    Domain(String),

    /// Malformed measure or unit text
    #[error("parse error: {0}")]
    Parse(String),
}

impl MeasureError {
    /// Incompatibility between two displayable unit-like things
    pub(crate) fn incompatible(left: impl ToString, right: impl ToString) -> Self {
        MeasureError::IncompatibleUnit {
            left: left.to_string(),
            right: right.to_string(),
        }
    }
}

impl From<NumberError> for MeasureError {
    fn from(err: NumberError) -> Self {
        match err {
            NumberError::ParseError(s) => MeasureError::Parse(s),
            NumberError::DivisionByZero => MeasureError::DivisionByZero,
            NumberError::DomainError(s) => MeasureError::Domain(s),
        }
    }
}
