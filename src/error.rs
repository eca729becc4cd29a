//! Error taxonomy for fitting, uncertainty, and planning.
//!
//! Input and configuration errors abort the call. Convergence problems never
//! do: they are carried as `converged` flags on the results. A singular
//! information matrix is reported inside [`crate::uncertainty::UncertaintyReport`]
//! as a [`ReliabilityError::NonIdentifiable`] value rather than returned.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by the reliability engine.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ReliabilityError {
    /// A malformed observation or argument (e.g. non-positive duration).
    #[error("invalid input `{field}`: {reason}")]
    InvalidInput { field: String, reason: String },

    /// Too few observed failures to identify both parameters.
    #[error("insufficient data: {failures} observed failures, need at least {required}")]
    InsufficientData { failures: usize, required: usize },

    /// The observed information matrix could not be inverted.
    #[error("parameters not identifiable: {reason}")]
    NonIdentifiable { reason: String },

    /// An out-of-range or missing configuration value.
    #[error("invalid configuration `{field}`: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// Cost-rate minimization has no interior minimum for this model.
    #[error("no interior optimum: {reason}")]
    NoInteriorOptimum { reason: String },
}

impl ReliabilityError {
    pub(crate) fn input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error aborts a call (input and configuration errors).
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::NonIdentifiable { .. })
    }
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, ReliabilityError>;

/// Checks that `value` lies strictly inside (0, 1).
pub(crate) fn require_open_unit(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(ReliabilityError::config(
            field,
            format!("must lie strictly between 0 and 1, got {value}"),
        ))
    }
}

/// Checks that `value` is finite and strictly positive.
pub(crate) fn require_positive(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ReliabilityError::config(
            field,
            format!("must be finite and positive, got {value}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_field_and_constraint() {
        let err = ReliabilityError::config("service_level", "must lie strictly between 0 and 1, got 1.5");
        let msg = err.to_string();
        assert!(msg.contains("service_level"), "{msg}");
        assert!(msg.contains("between 0 and 1"), "{msg}");

        let err = ReliabilityError::InsufficientData {
            failures: 2,
            required: 3,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data: 2 observed failures, need at least 3"
        );
    }

    #[test]
    fn test_require_open_unit() {
        assert!(require_open_unit("p", 0.5).is_ok());
        assert!(require_open_unit("p", 0.0).is_err());
        assert!(require_open_unit("p", 1.0).is_err());
        assert!(require_open_unit("p", f64::NAN).is_err());
    }

    #[test]
    fn test_require_positive() {
        assert!(require_positive("c", 1e-9).is_ok());
        assert!(require_positive("c", 0.0).is_err());
        assert!(require_positive("c", -3.0).is_err());
        assert!(require_positive("c", f64::INFINITY).is_err());
    }

    #[test]
    fn test_fatality() {
        assert!(ReliabilityError::input("x", "bad").is_fatal());
        assert!(!ReliabilityError::NonIdentifiable {
            reason: "singular".into()
        }
        .is_fatal());
    }
}
