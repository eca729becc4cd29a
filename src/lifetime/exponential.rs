//! Exponential lifetime model (constant hazard).

use serde::{Deserialize, Serialize};

use super::{CensoredFit, Family, LifetimeDistribution};
use crate::error::{ReliabilityError, Result};
use crate::observation::{validate_observations, LifetimeObservation};

/// Exponential distribution with failure rate λ.
///
/// - R(t) = exp(−λt), h(t) = λ, MTTF = 1/λ
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Exponential {
    rate: f64,
}

impl Exponential {
    /// Returns `None` unless `rate` is finite and positive.
    pub fn new(rate: f64) -> Option<Self> {
        if rate.is_finite() && rate > 0.0 {
            Some(Self { rate })
        } else {
            None
        }
    }

    /// Failure rate λ.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Closed-form censored MLE: λ = r / Σ tᵢ over all units.
    ///
    /// # Errors
    /// Invalid observations, or [`ReliabilityError::InsufficientData`] when
    /// no failure was observed.
    pub fn fit_censored(observations: &[LifetimeObservation]) -> Result<CensoredFit<Self>> {
        let counts = validate_observations(observations)?;
        if counts.n_failures == 0 {
            return Err(ReliabilityError::InsufficientData {
                failures: 0,
                required: 1,
            });
        }
        let exposure: f64 = observations.iter().map(|o| o.duration).sum();
        let rate = counts.n_failures as f64 / exposure;
        let model = Self::new(rate).ok_or_else(|| {
            ReliabilityError::input("observations", "total exposure overflowed")
        })?;
        Ok(CensoredFit {
            log_likelihood: model.log_likelihood(observations),
            model,
            converged: true,
            iterations: 0,
        })
    }
}

impl LifetimeDistribution for Exponential {
    fn family(&self) -> Family {
        Family::Exponential
    }

    fn parameter_count(&self) -> usize {
        1
    }

    fn reliability(&self, t: f64) -> f64 {
        if t <= 0.0 {
            1.0
        } else {
            (-self.rate * t).exp()
        }
    }

    fn pdf(&self, t: f64) -> f64 {
        if t < 0.0 {
            0.0
        } else {
            self.rate * (-self.rate * t).exp()
        }
    }

    fn ln_pdf(&self, t: f64) -> f64 {
        if t < 0.0 {
            f64::NEG_INFINITY
        } else {
            self.rate.ln() - self.rate * t
        }
    }

    fn ln_reliability(&self, t: f64) -> f64 {
        if t <= 0.0 {
            0.0
        } else {
            -self.rate * t
        }
    }

    fn hazard(&self, t: f64) -> f64 {
        if t <= 0.0 {
            0.0
        } else {
            self.rate
        }
    }

    fn mean_life(&self) -> f64 {
        1.0 / self.rate
    }

    fn has_increasing_hazard(&self) -> bool {
        false
    }

    fn time_to_reliability(&self, p: f64) -> Option<f64> {
        if !(p > 0.0 && p < 1.0) {
            return None;
        }
        Some(-p.ln() / self.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_invalid() {
        assert!(Exponential::new(0.0).is_none());
        assert!(Exponential::new(-1.0).is_none());
        assert!(Exponential::new(f64::NAN).is_none());
    }

    #[test]
    fn test_censored_mle() {
        // 3 failures, total exposure 10 + 20 + 30 + 40 = 100
        let data = [
            LifetimeObservation::failure(10.0),
            LifetimeObservation::failure(20.0),
            LifetimeObservation::failure(30.0),
            LifetimeObservation::censored(40.0),
        ];
        let fit = Exponential::fit_censored(&data).expect("fit should succeed");
        assert!((fit.model.rate() - 0.03).abs() < 1e-12);
        let expected_ll = 3.0 * 0.03_f64.ln() - 0.03 * 100.0;
        assert!((fit.log_likelihood - expected_ll).abs() < 1e-10);
        assert!((fit.model.mean_life() - 100.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_no_failures() {
        let data = [LifetimeObservation::censored(10.0)];
        assert!(matches!(
            Exponential::fit_censored(&data),
            Err(ReliabilityError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_closed_form_matches_default_quantile() {
        let m = Exponential::new(0.02).expect("valid rate");
        let t = m.time_to_reliability(0.9).expect("valid p");
        assert!((m.reliability(t) - 0.9).abs() < 1e-12);
        assert!(!m.has_increasing_hazard());
        assert!((m.hazard(123.0) - 0.02).abs() < 1e-15);
    }
}
