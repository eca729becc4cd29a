//! Pluggable numerical minimizers.
//!
//! Both the likelihood maximization in [`crate::weibull`] and the cost-rate
//! search in [`crate::maintenance`] go through the [`Minimizer`] trait, so the
//! algorithm can be swapped without touching the call sites.
//!
//! - [`NelderMead`] — derivative-free simplex search for any dimension
//! - [`GoldenSection`] — bracketing line search, cycled over coordinates
//!
//! # References
//!
//! - Nelder & Mead (1965), "A Simplex Method for Function Minimization",
//!   *The Computer Journal* 7(4), pp. 308-313.
//! - Kiefer (1953), "Sequential Minimax Search for a Maximum",
//!   *Proceedings of the AMS* 4(3), pp. 502-506.

mod golden;
mod nelder_mead;

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

pub use golden::GoldenSection;
pub use nelder_mead::NelderMead;

/// Stopping rules shared by all minimizers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Relative change in objective (or bracket width) considered converged.
    pub tolerance: f64,
    /// Hard cap on iterations.
    pub max_iterations: usize,
    /// Optional wall-clock cap; exceeding it returns the best point so far.
    pub time_budget: Option<Duration>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 200,
            time_budget: None,
        }
    }
}

/// Per-coordinate box constraints. An empty set means unbounded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bounds {
    limits: Vec<(f64, f64)>,
}

impl Bounds {
    /// No constraints on any coordinate.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Box constraints, one `(lower, upper)` pair per coordinate.
    ///
    /// Infinite limits are allowed. Returns `None` if any pair is NaN or has
    /// `lower >= upper`.
    pub fn new(limits: Vec<(f64, f64)>) -> Option<Self> {
        if limits
            .iter()
            .any(|&(lo, hi)| lo.is_nan() || hi.is_nan() || lo >= hi)
        {
            return None;
        }
        Some(Self { limits })
    }

    /// A single closed interval for one-dimensional searches.
    pub fn interval(lower: f64, upper: f64) -> Option<Self> {
        Self::new(vec![(lower, upper)])
    }

    /// Limits for coordinate `i`, if constrained.
    pub fn get(&self, i: usize) -> Option<(f64, f64)> {
        self.limits.get(i).copied()
    }

    /// Whether no coordinate is constrained.
    pub fn is_unbounded(&self) -> bool {
        self.limits.is_empty()
    }

    /// Projects `point` into the box.
    pub fn clamp(&self, point: &mut [f64]) {
        for (x, &(lo, hi)) in point.iter_mut().zip(self.limits.iter()) {
            *x = x.clamp(lo, hi);
        }
    }
}

/// Outcome of a minimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Minimum {
    /// Best point found.
    pub point: Vec<f64>,
    /// Objective value at `point`.
    pub value: f64,
    /// Whether the stopping rule was met within the budget.
    pub converged: bool,
    /// Iterations consumed.
    pub iterations: usize,
}

/// A numerical minimizer over a box-constrained domain.
///
/// Implementations must be deterministic: the same objective, start, bounds,
/// and configuration always produce the same [`Minimum`]. When the budget runs
/// out they return the best point seen with `converged == false` instead of
/// failing.
pub trait Minimizer {
    fn minimize(
        &self,
        objective: &dyn Fn(&[f64]) -> f64,
        initial: &[f64],
        bounds: &Bounds,
        config: &OptimizerConfig,
    ) -> Minimum;
}

/// Evaluates the objective, mapping NaN to +∞ so comparisons stay total.
pub(crate) fn evaluate(objective: &dyn Fn(&[f64]) -> f64, x: &[f64]) -> f64 {
    let v = objective(x);
    if v.is_nan() {
        f64::INFINITY
    } else {
        v
    }
}

/// |a − b| scaled by the larger magnitude, floored at one so objectives near
/// zero fall back to an absolute comparison.
pub(crate) fn relative_change(a: f64, b: f64) -> f64 {
    if a == b {
        return 0.0;
    }
    (a - b).abs() / a.abs().max(b.abs()).max(1.0)
}

/// Wall-clock guard for [`OptimizerConfig::time_budget`].
pub(crate) struct Deadline(Option<Instant>);

impl Deadline {
    pub(crate) fn start(config: &OptimizerConfig) -> Self {
        Self(config.time_budget.map(|budget| Instant::now() + budget))
    }

    pub(crate) fn expired(&self) -> bool {
        self.0.is_some_and(|deadline| Instant::now() >= deadline)
    }
}
