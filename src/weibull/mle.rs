//! Maximum likelihood estimation of Weibull parameters under right-censoring.
//!
//! No closed form exists once suspensions are present, so the negative
//! log-likelihood
//!
//! ```text
//! LL(β, η) = Σ_failures [ln β − ln η + (β−1)·ln(t/η) − (t/η)^β]
//!          − Σ_censored (t/η)^β
//! ```
//!
//! is minimized numerically over `(ln β, ln η)`, which keeps both parameters
//! positive without constraints. The search starts from median rank
//! regression on the observed failures.
//!
//! # Reference
//! Lawless (2003), *Statistical Models and Methods for Lifetime Data*, 2nd ed.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use u_numflow::stats;

use super::mrr::weibull_mrr;
use super::reliability::{Weibull, MAX_LOG_EXPOSURE};
use crate::error::{require_positive, ReliabilityError, Result};
use crate::lifetime::LifetimeDistribution;
use crate::observation::{failure_times, validate_fittable, LifetimeObservation, MIN_FAILURES};
use crate::optimize::{Bounds, Minimizer, NelderMead, OptimizerConfig};
use crate::uncertainty::covariance_at;

/// Smallest value either fitted parameter may take.
pub const MIN_PARAMETER: f64 = 1e-9;

/// Number of free parameters of the two-parameter Weibull.
const PARAMETERS: usize = 2;

/// Default search range for β.
pub const DEFAULT_SHAPE_RANGE: (f64, f64) = (1e-3, 1e3);

/// Default η range is `[min t / SCALE_SPAN, max t · SCALE_SPAN]`.
const SCALE_SPAN: f64 = 1e3;

/// Fraction of the log-space search width treated as touching a bound.
const BOUNDARY_SLACK: f64 = 1e-4;

/// Starting point for the likelihood search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialGuess {
    pub shape: f64,
    pub scale: f64,
}

/// Configuration of [`fit`].
///
/// # Examples
///
/// ```
/// use u_reliability::weibull::FitConfig;
///
/// let config = FitConfig::default();
/// assert_eq!(config.tolerance, 1e-6);
/// assert_eq!(config.max_iterations, 200);
/// assert!(config.initial_guess.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Stop once the relative change of the negative log-likelihood between
    /// consecutive iterations falls below this value.
    pub tolerance: f64,
    /// Iteration budget.
    pub max_iterations: usize,
    /// Overrides the median-rank-regression starting point.
    pub initial_guess: Option<InitialGuess>,
    /// `(lower, upper)` limits on β; [`DEFAULT_SHAPE_RANGE`] when unset.
    pub shape_bounds: Option<(f64, f64)>,
    /// `(lower, upper)` limits on η; three decades beyond the observed
    /// durations on either side when unset.
    pub scale_bounds: Option<(f64, f64)>,
    /// Wall-clock budget; the best point so far is returned when it expires.
    pub time_budget: Option<Duration>,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 200,
            initial_guess: None,
            shape_bounds: None,
            scale_bounds: None,
            time_budget: None,
        }
    }
}

impl FitConfig {
    /// Checks every field, naming the first one out of range.
    pub fn validate(&self) -> Result<()> {
        require_positive("tolerance", self.tolerance)?;
        if self.max_iterations == 0 {
            return Err(ReliabilityError::config("max_iterations", "must be at least 1"));
        }
        if let Some(guess) = &self.initial_guess {
            require_positive("initial_guess.shape", guess.shape)?;
            require_positive("initial_guess.scale", guess.scale)?;
        }
        check_limits("shape_bounds", self.shape_bounds)?;
        check_limits("scale_bounds", self.scale_bounds)?;
        Ok(())
    }

    pub(crate) fn optimizer(&self) -> OptimizerConfig {
        OptimizerConfig {
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
            time_budget: self.time_budget,
        }
    }

    /// Box in `(ln β, ln η)` space.
    fn log_bounds(&self, observations: &[LifetimeObservation]) -> Option<Bounds> {
        let shape = self.shape_bounds.unwrap_or(DEFAULT_SHAPE_RANGE);
        let scale = match self.scale_bounds {
            Some(limits) => limits,
            None => {
                let durations: Vec<f64> = observations.iter().map(|o| o.duration).collect();
                (stats::min(&durations)? / SCALE_SPAN, stats::max(&durations)? * SCALE_SPAN)
            }
        };
        Bounds::new(vec![log_limits(shape), log_limits(scale)])
    }
}

fn check_limits(field: &str, limits: Option<(f64, f64)>) -> Result<()> {
    match limits {
        Some((lo, hi)) if !(lo > 0.0 && lo.is_finite() && hi > lo) => Err(ReliabilityError::config(
            field,
            format!("need 0 < lower < upper, got ({lo}, {hi})"),
        )),
        _ => Ok(()),
    }
}

fn log_limits((lo, hi): (f64, f64)) -> (f64, f64) {
    (lo.ln().max(MIN_PARAMETER.ln()), hi.ln().min(MAX_LOG_EXPOSURE))
}

/// Whether any coordinate sits within [`BOUNDARY_SLACK`] of its limits.
fn on_search_bound(bounds: &Bounds, point: &[f64]) -> bool {
    point.iter().enumerate().any(|(i, &x)| match bounds.get(i) {
        Some((lo, hi)) => {
            let slack = BOUNDARY_SLACK * (hi - lo);
            x <= lo + slack || x >= hi - slack
        }
        None => false,
    })
}

fn log_point(guess: InitialGuess) -> [f64; 2] {
    [guess.shape.ln(), guess.scale.ln()]
}

/// Maps a log-space coordinate back to a parameter, never below the floor.
fn from_log(x: f64) -> f64 {
    if x.is_nan() {
        return MIN_PARAMETER;
    }
    x.clamp(MIN_PARAMETER.ln(), MAX_LOG_EXPOSURE).exp().max(MIN_PARAMETER)
}

/// Outcome of a Weibull fit.
///
/// `shape` and `scale` are always positive. When `converged` is false they
/// are the best point found and should be treated as unreliable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionFit {
    /// Shape parameter β.
    pub shape: f64,
    /// Scale parameter η.
    pub scale: f64,
    /// Log-likelihood at the fitted parameters.
    pub log_likelihood: f64,
    /// Whether the search met its stopping criterion within budget at an
    /// interior point with finite likelihood.
    pub converged: bool,
    /// Iterations used by the search.
    pub iterations: usize,
    /// Number of observed failures.
    pub n_failures: usize,
    /// Number of right-censored observations.
    pub n_censored: usize,
    /// Asymptotic covariance of (β, η), absent when the fit did not converge
    /// or the information matrix is singular.
    pub covariance: Option<[[f64; 2]; 2]>,
}

impl DistributionFit {
    /// The fitted model.
    ///
    /// # Errors
    /// [`ReliabilityError::InvalidInput`] if the record was built by hand
    /// with a non-positive parameter.
    pub fn model(&self) -> Result<Weibull> {
        Weibull::new(self.shape, self.scale).ok_or_else(|| {
            ReliabilityError::input(
                "fit",
                format!(
                    "shape and scale must be positive, got ({}, {})",
                    self.shape, self.scale
                ),
            )
        })
    }

    /// Total number of observations.
    pub fn sample_size(&self) -> usize {
        self.n_failures + self.n_censored
    }

    /// Fraction of observations that are suspensions.
    pub fn censoring_rate(&self) -> f64 {
        let n = self.sample_size();
        if n == 0 {
            0.0
        } else {
            self.n_censored as f64 / n as f64
        }
    }

    /// Akaike information criterion, `2k − 2·LL`.
    pub fn aic(&self) -> f64 {
        2.0 * PARAMETERS as f64 - 2.0 * self.log_likelihood
    }

    /// Bayesian information criterion over the total sample size.
    pub fn bic(&self) -> f64 {
        PARAMETERS as f64 * (self.sample_size() as f64).ln() - 2.0 * self.log_likelihood
    }

    /// Enough failures to identify both parameters.
    pub fn is_usable(&self) -> bool {
        self.n_failures >= MIN_FAILURES
    }
}

/// Right-censored Weibull log-likelihood.
///
/// Returns `-∞` for non-positive or non-finite parameters, and when
/// `(t/η)^β` overflows for any observation.
pub fn weibull_log_likelihood(shape: f64, scale: f64, observations: &[LifetimeObservation]) -> f64 {
    match Weibull::new(shape, scale) {
        Some(model) => model.log_likelihood(observations),
        None => f64::NEG_INFINITY,
    }
}

/// Fit a Weibull distribution to right-censored lifetimes by maximum
/// likelihood, using Nelder-Mead.
///
/// # Errors
/// - [`ReliabilityError::InvalidInput`] for an empty sample or a
///   non-positive duration.
/// - [`ReliabilityError::InsufficientData`] for fewer than three failures.
/// - [`ReliabilityError::InvalidConfiguration`] for a bad `config`.
///
/// Running out of iterations is not an error: the best point is returned
/// with `converged == false`. The same flag is cleared when the optimum lies
/// on the edge of the search box, as happens when every failure shares one
/// time and the likelihood grows without bound in β.
///
/// # Examples
///
/// ```
/// use u_reliability::observation::LifetimeObservation;
/// use u_reliability::weibull::{fit, FitConfig};
///
/// let data: Vec<_> = [72.0, 82.0, 97.0, 103.0, 113.0, 117.0, 126.0, 127.0, 127.0, 139.0]
///     .iter()
///     .map(|&t| LifetimeObservation::failure(t))
///     .chain([LifetimeObservation::censored(150.0), LifetimeObservation::censored(150.0)])
///     .collect();
///
/// let result = fit(&data, &FitConfig::default()).unwrap();
/// assert!(result.converged);
/// assert!(result.shape > 1.0);
/// assert_eq!(result.n_censored, 2);
/// ```
pub fn fit(observations: &[LifetimeObservation], config: &FitConfig) -> Result<DistributionFit> {
    fit_with(&NelderMead::default(), observations, config)
}

/// [`fit`] with a caller-supplied minimizer.
pub fn fit_with(
    minimizer: &dyn Minimizer,
    observations: &[LifetimeObservation],
    config: &FitConfig,
) -> Result<DistributionFit> {
    config.validate()?;
    let counts = validate_fittable(observations)?;
    let bounds = config
        .log_bounds(observations)
        .ok_or_else(|| ReliabilityError::config("shape_bounds", "bounds are empty after flooring"))?;

    let objective = |p: &[f64]| -weibull_log_likelihood(from_log(p[0]), from_log(p[1]), observations);

    let mut start = log_point(config.initial_guess.unwrap_or_else(|| data_start(observations)));
    bounds.clamp(&mut start);
    if !objective(&start).is_finite() {
        warn!(
            shape = from_log(start[0]),
            scale = from_log(start[1]),
            "initial guess gives the sample zero likelihood, starting from the data"
        );
        start = log_point(data_start(observations));
        bounds.clamp(&mut start);
    }

    let min = minimizer.minimize(&objective, &start, &bounds, &config.optimizer());
    let (log_shape, log_scale) = match min.point.as_slice() {
        &[a, b, ..] => (a, b),
        other => {
            return Err(ReliabilityError::config(
                "minimizer",
                format!("returned a {}-dimensional point for a 2-parameter search", other.len()),
            ))
        }
    };

    let shape = from_log(log_shape);
    let scale = from_log(log_scale);
    let log_likelihood = weibull_log_likelihood(shape, scale, observations);
    let on_bound = on_search_bound(&bounds, &[log_shape, log_scale]);
    let converged = min.converged && !on_bound && log_likelihood.is_finite();

    let covariance = if converged {
        Weibull::new(shape, scale).and_then(|model| covariance_at(&model, observations))
    } else {
        warn!(
            shape,
            scale,
            iterations = min.iterations,
            on_bound,
            "weibull fit stopped without converging"
        );
        None
    };

    debug!(
        shape,
        scale,
        log_likelihood,
        iterations = min.iterations,
        n_failures = counts.n_failures,
        n_censored = counts.n_censored,
        "weibull fit finished"
    );

    Ok(DistributionFit {
        shape,
        scale,
        log_likelihood,
        converged,
        iterations: min.iterations,
        n_failures: counts.n_failures,
        n_censored: counts.n_censored,
        covariance,
    })
}

/// Median rank regression, else an exponential model with the
/// censored-data rate estimate.
fn data_start(observations: &[LifetimeObservation]) -> InitialGuess {
    if let Some(mrr) = weibull_mrr(observations) {
        return InitialGuess {
            shape: mrr.shape,
            scale: mrr.scale,
        };
    }
    let exposure: f64 = observations.iter().map(|o| o.duration).sum();
    let failures = failure_times(observations).len().max(1) as f64;
    InitialGuess {
        shape: 1.0,
        scale: exposure / failures,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(40))]

        #[test]
        fn fitted_parameters_always_positive(
            times in proptest::collection::vec(0.1_f64..1e4, 3..30),
            censored in proptest::collection::vec(0.1_f64..1e4, 0..10),
        ) {
            let data: Vec<_> = times
                .iter()
                .map(|&t| LifetimeObservation::failure(t))
                .chain(censored.iter().map(|&t| LifetimeObservation::censored(t)))
                .collect();
            let result = fit(&data, &FitConfig::default()).expect("valid sample");
            prop_assert!(result.shape > 0.0 && result.shape.is_finite());
            prop_assert!(result.scale > 0.0 && result.scale.is_finite());
            prop_assert!(!result.log_likelihood.is_nan());
        }
    }
}
