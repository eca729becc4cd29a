//! Lifetime observations: failure times and right-censored exposure times.

use serde::{Deserialize, Serialize};

use crate::error::{ReliabilityError, Result};

/// Minimum number of observed failures required to identify shape and scale.
pub const MIN_FAILURES: usize = 3;

/// A single lifetime record.
///
/// `is_censored == false` means the unit failed at `duration`; `true` means
/// the unit was still running at `duration` and its failure time is unknown
/// (right-censored).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifetimeObservation {
    /// Failure or exposure time, strictly positive.
    pub duration: f64,
    /// Whether the unit survived past `duration` (suspension).
    pub is_censored: bool,
}

impl LifetimeObservation {
    /// An observed failure at `duration`.
    pub fn failure(duration: f64) -> Self {
        Self {
            duration,
            is_censored: false,
        }
    }

    /// A unit that survived at least `duration`.
    pub fn censored(duration: f64) -> Self {
        Self {
            duration,
            is_censored: true,
        }
    }

    /// Whether this record is an observed failure.
    pub fn is_failure(&self) -> bool {
        !self.is_censored
    }
}

/// Failure/suspension counts of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleCounts {
    pub n_failures: usize,
    pub n_censored: usize,
}

impl SampleCounts {
    /// Counts failures and suspensions without validating durations.
    pub fn of(observations: &[LifetimeObservation]) -> Self {
        let n_failures = observations.iter().filter(|o| o.is_failure()).count();
        Self {
            n_failures,
            n_censored: observations.len() - n_failures,
        }
    }

    /// Total number of observations.
    pub fn total(&self) -> usize {
        self.n_failures + self.n_censored
    }

    /// Fraction of observations that are censored.
    pub fn censoring_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.n_censored as f64 / self.total() as f64
        }
    }
}

/// Validates a sample and returns its counts.
///
/// # Errors
/// - [`ReliabilityError::InvalidInput`] if the sample is empty or any
///   duration is non-finite or non-positive. The field names the offending
///   index.
pub fn validate_observations(observations: &[LifetimeObservation]) -> Result<SampleCounts> {
    if observations.is_empty() {
        return Err(ReliabilityError::input(
            "observations",
            "at least one observation is required",
        ));
    }
    for (i, obs) in observations.iter().enumerate() {
        if !obs.duration.is_finite() || obs.duration <= 0.0 {
            return Err(ReliabilityError::input(
                format!("observations[{i}].duration"),
                format!("must be finite and positive, got {}", obs.duration),
            ));
        }
    }
    Ok(SampleCounts::of(observations))
}

/// Validates a sample and additionally requires [`MIN_FAILURES`] failures.
///
/// # Errors
/// As [`validate_observations`], plus [`ReliabilityError::InsufficientData`].
pub fn validate_fittable(observations: &[LifetimeObservation]) -> Result<SampleCounts> {
    let counts = validate_observations(observations)?;
    if counts.n_failures < MIN_FAILURES {
        return Err(ReliabilityError::InsufficientData {
            failures: counts.n_failures,
            required: MIN_FAILURES,
        });
    }
    Ok(counts)
}

/// Durations of the observed failures, in input order.
pub(crate) fn failure_times(observations: &[LifetimeObservation]) -> Vec<f64> {
    observations
        .iter()
        .filter(|o| o.is_failure())
        .map(|o| o.duration)
        .collect()
}
