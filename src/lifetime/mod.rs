//! Lifetime distribution abstraction.
//!
//! Planners and estimators depend on [`LifetimeDistribution`] rather than on a
//! concrete family, so the Weibull model can be swapped for any distribution
//! exposing reliability, density, and hazard at time `t`.
//!
//! # Families
//!
//! - [`crate::weibull::Weibull`] — the primary model
//! - [`Exponential`] — constant hazard, the β = 1 special case
//! - [`Lognormal`] — used when comparing families on the same sample
//!
//! # References
//!
//! - Meeker & Escobar (1998), *Statistical Methods for Reliability Data*,
//!   Wiley, Chapters 4 and 8.

mod exponential;
mod lognormal;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::observation::LifetimeObservation;

pub use exponential::Exponential;
pub use lognormal::Lognormal;

/// Bisection steps used by the default quantile search.
const QUANTILE_BISECTIONS: usize = 200;

/// Distribution family tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Weibull,
    Exponential,
    Lognormal,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weibull => write!(f, "weibull"),
            Self::Exponential => write!(f, "exponential"),
            Self::Lognormal => write!(f, "lognormal"),
        }
    }
}

/// A continuous lifetime distribution on `t > 0`.
///
/// Only [`reliability`](Self::reliability), [`pdf`](Self::pdf),
/// [`mean_life`](Self::mean_life), and
/// [`has_increasing_hazard`](Self::has_increasing_hazard) are required; the
/// remaining functions are derived from them and may be overridden with
/// closed forms.
pub trait LifetimeDistribution {
    /// Family tag.
    fn family(&self) -> Family;

    /// Number of free parameters (for information criteria).
    fn parameter_count(&self) -> usize;

    /// Survival function R(t) = P(T > t). Equals 1 for t ≤ 0.
    fn reliability(&self, t: f64) -> f64;

    /// Density f(t). Equals 0 for t ≤ 0.
    fn pdf(&self, t: f64) -> f64;

    /// Mean time to failure.
    fn mean_life(&self) -> f64;

    /// Whether the hazard rate strictly increases with age (wear-out).
    fn has_increasing_hazard(&self) -> bool;

    /// Failure probability F(t) = 1 − R(t).
    fn cdf(&self, t: f64) -> f64 {
        1.0 - self.reliability(t)
    }

    /// Hazard rate h(t) = f(t) / R(t).
    fn hazard(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        let r = self.reliability(t);
        if r <= 0.0 {
            f64::INFINITY
        } else {
            self.pdf(t) / r
        }
    }

    /// Cumulative hazard H(t) = −ln R(t).
    fn cumulative_hazard(&self, t: f64) -> f64 {
        -self.ln_reliability(t)
    }

    /// ln f(t).
    fn ln_pdf(&self, t: f64) -> f64 {
        self.pdf(t).ln()
    }

    /// ln R(t).
    fn ln_reliability(&self, t: f64) -> f64 {
        self.reliability(t).ln()
    }

    /// Time at which reliability drops to `p`, for `p ∈ (0, 1)`.
    ///
    /// The default brackets the root by doubling from the mean life and then
    /// bisects, relying on R being non-increasing.
    fn time_to_reliability(&self, p: f64) -> Option<f64> {
        if !(p > 0.0 && p < 1.0) {
            return None;
        }
        let mut hi = self.mean_life().max(f64::MIN_POSITIVE);
        let mut guard = 0;
        while self.reliability(hi) > p {
            hi *= 2.0;
            guard += 1;
            if guard > 2000 || !hi.is_finite() {
                return None;
            }
        }
        let mut lo = 0.0;
        for _ in 0..QUANTILE_BISECTIONS {
            let mid = 0.5 * (lo + hi);
            if self.reliability(mid) > p {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Some(0.5 * (lo + hi))
    }

    /// B-life: time by which `fraction_failed` of the population has failed.
    fn b_life(&self, fraction_failed: f64) -> Option<f64> {
        if !(fraction_failed > 0.0 && fraction_failed < 1.0) {
            return None;
        }
        self.time_to_reliability(1.0 - fraction_failed)
    }

    /// Time by which ≈63.2% of units have failed (R = e⁻¹).
    fn characteristic_life(&self) -> f64 {
        self.time_to_reliability((-1.0_f64).exp())
            .unwrap_or_else(|| self.mean_life())
    }

    /// Right-censored log-likelihood of a sample under this model.
    ///
    /// Failures contribute ln f(t); suspensions contribute ln R(t).
    fn log_likelihood(&self, observations: &[LifetimeObservation]) -> f64 {
        observations
            .iter()
            .map(|o| {
                if o.is_censored {
                    self.ln_reliability(o.duration)
                } else {
                    self.ln_pdf(o.duration)
                }
            })
            .sum()
    }
}

/// A model fitted to right-censored data by maximum likelihood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CensoredFit<D> {
    /// Fitted distribution.
    pub model: D,
    /// Log-likelihood at the fitted parameters.
    pub log_likelihood: f64,
    /// Whether the estimator met its stopping rule.
    pub converged: bool,
    /// Iterations used (0 for closed-form estimators).
    pub iterations: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Uniform lifetime on (0, 10) exercising only the required methods.
    struct Uniform10;

    impl LifetimeDistribution for Uniform10 {
        fn family(&self) -> Family {
            Family::Exponential
        }
        fn parameter_count(&self) -> usize {
            0
        }
        fn reliability(&self, t: f64) -> f64 {
            (1.0 - t / 10.0).clamp(0.0, 1.0)
        }
        fn pdf(&self, t: f64) -> f64 {
            if t > 0.0 && t < 10.0 {
                0.1
            } else {
                0.0
            }
        }
        fn mean_life(&self) -> f64 {
            5.0
        }
        fn has_increasing_hazard(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_default_quantile_by_bisection() {
        let t = Uniform10.time_to_reliability(0.25).expect("valid p");
        assert!((t - 7.5).abs() < 1e-9, "t = {t}");
        assert!(Uniform10.time_to_reliability(0.0).is_none());
        assert!(Uniform10.time_to_reliability(1.0).is_none());
    }

    #[test]
    fn test_default_hazard_and_b_life() {
        // h(t) = 0.1 / (1 - t/10)
        assert!((Uniform10.hazard(5.0) - 0.2).abs() < 1e-12);
        assert_eq!(Uniform10.hazard(0.0), 0.0);
        let b10 = Uniform10.b_life(0.10).expect("valid fraction");
        assert!((b10 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_characteristic_life() {
        let expected = 10.0 * (1.0 - (-1.0_f64).exp());
        assert!((Uniform10.characteristic_life() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_default_log_likelihood() {
        let data = [
            LifetimeObservation::failure(2.0),
            LifetimeObservation::censored(5.0),
        ];
        let expected = 0.1_f64.ln() + 0.5_f64.ln();
        assert!((Uniform10.log_likelihood(&data) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_family_display() {
        assert_eq!(Family::Weibull.to_string(), "weibull");
        assert_eq!(Family::Lognormal.to_string(), "lognormal");
    }
}
