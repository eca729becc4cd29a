//! Median rank regression and Weibull probability-plot coordinates.
//!
//! Least-squares regression on the linearized Weibull CDF gives a cheap,
//! robust estimate used to start the likelihood search.

use serde::{Deserialize, Serialize};

use crate::observation::{failure_times, LifetimeObservation};

/// Result of a median rank regression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeibullMrrResult {
    /// Shape parameter (β), the regression slope.
    pub shape: f64,
    /// Scale parameter (η).
    pub scale: f64,
    /// Coefficient of determination of the linearized fit.
    pub r_squared: f64,
}

/// One point of a Weibull probability plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    /// Failure time.
    pub time: f64,
    /// 1-based rank among the sorted failures.
    pub rank: usize,
    /// Median-rank estimate of F(t).
    pub probability: f64,
    /// x = ln t
    pub ln_time: f64,
    /// y = ln(−ln(1 − F))
    pub weibull_y: f64,
}

/// Bernard's approximation of the median rank: `(i − 0.3) / (n + 0.4)`.
pub fn median_rank(rank: usize, n: usize) -> f64 {
    (rank as f64 - 0.3) / (n as f64 + 0.4)
}

/// Probability-plot coordinates for the observed failures.
///
/// Suspensions are skipped; failures are sorted ascending and ranked with
/// [`median_rank`]. Non-positive or non-finite failure times are dropped.
///
/// # Examples
///
/// ```
/// use u_reliability::observation::LifetimeObservation;
/// use u_reliability::weibull::probability_plot;
///
/// let data = [
///     LifetimeObservation::failure(30.0),
///     LifetimeObservation::censored(45.0),
///     LifetimeObservation::failure(10.0),
/// ];
/// let points = probability_plot(&data);
/// assert_eq!(points.len(), 2);
/// assert_eq!(points[0].time, 10.0);
/// assert!(points[0].probability < points[1].probability);
/// ```
pub fn probability_plot(observations: &[LifetimeObservation]) -> Vec<PlotPoint> {
    let mut times: Vec<f64> = failure_times(observations)
        .into_iter()
        .filter(|t| t.is_finite() && *t > 0.0)
        .collect();
    times.sort_by(f64::total_cmp);

    let n = times.len();
    times
        .into_iter()
        .enumerate()
        .map(|(i, time)| {
            let probability = median_rank(i + 1, n);
            PlotPoint {
                time,
                rank: i + 1,
                probability,
                ln_time: time.ln(),
                weibull_y: (-(1.0 - probability).ln()).ln(),
            }
        })
        .collect()
}

/// Fit a Weibull distribution by median rank regression on failure times.
///
/// Regresses `y = ln(−ln(1 − F_i))` on `x = ln(t_i)`; the slope is β and the
/// intercept is `−β·ln η`.
///
/// # Returns
/// `None` for fewer than 2 valid failures, all-equal times, or a
/// non-positive slope.
///
/// # Reference
/// Abernethy (2006), *The New Weibull Handbook*, 5th ed.
pub fn weibull_mrr(observations: &[LifetimeObservation]) -> Option<WeibullMrrResult> {
    let points = probability_plot(observations);
    let n = points.len();
    if n < 2 {
        return None;
    }
    let n_f = n as f64;

    let sum_x: f64 = points.iter().map(|p| p.ln_time).sum();
    let sum_y: f64 = points.iter().map(|p| p.weibull_y).sum();
    let mean_x = sum_x / n_f;
    let mean_y = sum_y / n_f;

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for p in &points {
        let dx = p.ln_time - mean_x;
        let dy = p.weibull_y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    if sxx < 1e-30 {
        return None;
    }

    let shape = sxy / sxx;
    if !shape.is_finite() || shape <= 0.0 {
        return None;
    }
    let intercept = mean_y - shape * mean_x;
    let scale = (-intercept / shape).exp();
    if !scale.is_finite() || scale <= 0.0 {
        return None;
    }

    let r_squared = if syy < 1e-30 {
        1.0
    } else {
        (sxy * sxy) / (sxx * syy)
    };

    Some(WeibullMrrResult {
        shape,
        scale,
        r_squared,
    })
}
