//! Lognormal lifetime model.

use serde::{Deserialize, Serialize};
use u_numflow::special::{inverse_normal_cdf, standard_normal_cdf};
use u_numflow::stats;

use super::{CensoredFit, Family, LifetimeDistribution};
use crate::error::{ReliabilityError, Result};
use crate::observation::{failure_times, validate_fittable, LifetimeObservation};
use crate::optimize::{Bounds, Minimizer, NelderMead, OptimizerConfig};

/// ln(√(2π))
const LN_SQRT_2PI: f64 = 0.918_938_533_204_672_8;

/// Lognormal distribution: ln T ~ N(μ, σ²).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lognormal {
    mu: f64,
    sigma: f64,
}

impl Lognormal {
    /// Returns `None` unless `mu` is finite and `sigma` finite and positive.
    pub fn new(mu: f64, sigma: f64) -> Option<Self> {
        if mu.is_finite() && sigma.is_finite() && sigma > 0.0 {
            Some(Self { mu, sigma })
        } else {
            None
        }
    }

    /// Log-scale location μ.
    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Log-scale spread σ.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    fn standardized(&self, t: f64) -> f64 {
        (t.ln() - self.mu) / self.sigma
    }

    /// Censored MLE over (μ, ln σ) with Nelder-Mead, started from the mean
    /// and standard deviation of the log failure times.
    ///
    /// # Errors
    /// Invalid observations or fewer than three observed failures.
    pub fn fit_censored(
        observations: &[LifetimeObservation],
        config: &OptimizerConfig,
    ) -> Result<CensoredFit<Self>> {
        validate_fittable(observations)?;

        let logs: Vec<f64> = failure_times(observations).iter().map(|t| t.ln()).collect();
        let (mean, var) = stats::mean(&logs)
            .zip(stats::variance(&logs))
            .ok_or_else(|| ReliabilityError::input("observations", "log failure times are not finite"))?;
        let sigma0 = if var > 1e-12 { var.sqrt() } else { 1.0 };

        let objective = |p: &[f64]| match Self::new(p[0], p[1].exp()) {
            Some(m) => -m.log_likelihood(observations),
            None => f64::INFINITY,
        };
        let min = NelderMead::default().minimize(
            &objective,
            &[mean, sigma0.ln()],
            &Bounds::unbounded(),
            config,
        );

        let fitted = match min.point.as_slice() {
            &[mu, log_sigma, ..] => Self::new(mu, log_sigma.exp()),
            _ => None,
        };
        let model = fitted.ok_or_else(|| {
            ReliabilityError::input("observations", "lognormal likelihood has no finite maximum")
        })?;
        Ok(CensoredFit {
            log_likelihood: -min.value,
            model,
            converged: min.converged,
            iterations: min.iterations,
        })
    }
}

impl LifetimeDistribution for Lognormal {
    fn family(&self) -> Family {
        Family::Lognormal
    }

    fn parameter_count(&self) -> usize {
        2
    }

    fn reliability(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 1.0;
        }
        standard_normal_cdf(-self.standardized(t))
    }

    fn pdf(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        self.ln_pdf(t).exp()
    }

    fn ln_pdf(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return f64::NEG_INFINITY;
        }
        let z = self.standardized(t);
        -(t.ln() + self.sigma.ln() + LN_SQRT_2PI) - 0.5 * z * z
    }

    fn mean_life(&self) -> f64 {
        (self.mu + 0.5 * self.sigma * self.sigma).exp()
    }

    fn has_increasing_hazard(&self) -> bool {
        // The hazard rises then falls for every σ.
        false
    }

    fn time_to_reliability(&self, p: f64) -> Option<f64> {
        if !(p > 0.0 && p < 1.0) {
            return None;
        }
        Some((self.mu + self.sigma * inverse_normal_cdf(1.0 - p)).exp())
    }
}
