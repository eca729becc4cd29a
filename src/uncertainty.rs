//! Asymptotic uncertainty of fitted Weibull parameters.
//!
//! The observed Fisher information is the Hessian of the negative
//! log-likelihood at the estimate, approximated by central differences.
//! Its inverse is the asymptotic covariance of (β, η), which gives Wald
//! intervals for the parameters and, by the delta method, for reliability at
//! a chosen time.
//!
//! A singular or indefinite information matrix does not fail the call: the
//! report carries the point estimates with absent interval limits and a
//! [`ReliabilityError::NonIdentifiable`] diagnostic.
//!
//! # References
//!
//! - Meeker, W.Q. & Escobar, L.A. (1998). *Statistical Methods for Reliability
//!   Data*, ch. 8.
//! - Nelson, W. (1982). *Applied Life Data Analysis*, ch. 8.

use serde::{Deserialize, Serialize};
use tracing::warn;
use u_numflow::special::inverse_normal_cdf;

use crate::error::{require_open_unit, require_positive, ReliabilityError, Result};
use crate::lifetime::LifetimeDistribution;
use crate::observation::{validate_observations, LifetimeObservation};
use crate::weibull::{weibull_log_likelihood, DistributionFit, Weibull};

/// Default two-sided confidence level.
pub const DEFAULT_LEVEL: f64 = 0.95;

/// Relative finite-difference step.
const RELATIVE_STEP: f64 = 1e-4;

/// An information matrix whose determinant is below this fraction of the
/// product of its diagonal is treated as singular.
const SINGULARITY_RATIO: f64 = 1e-10;

/// Quantity a band describes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BandParameter {
    Shape,
    Scale,
    /// R(t) at the given time.
    Reliability { time: f64 },
}

/// Normal-approximation interval for one quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBand {
    pub parameter: BandParameter,
    pub point_estimate: f64,
    /// Absent when the information matrix is singular.
    pub standard_error: Option<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    /// Two-sided confidence level in (0, 1).
    pub level: f64,
}

impl ConfidenceBand {
    /// `upper − lower`, if both limits exist.
    pub fn width(&self) -> Option<f64> {
        Some(self.upper? - self.lower?)
    }
}

/// Bands for a fit plus the diagnostics behind them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyReport {
    pub level: f64,
    /// Shape, scale, then the derived reliability band when requested.
    pub bands: Vec<ConfidenceBand>,
    /// Asymptotic covariance of (β, η).
    pub covariance: Option<[[f64; 2]; 2]>,
    /// Set when the information matrix could not be inverted.
    pub diagnostic: Option<ReliabilityError>,
    /// Copied from the fit; bands around a non-converged estimate are
    /// advisory only.
    pub fit_converged: bool,
}

impl UncertaintyReport {
    pub fn shape_band(&self) -> Option<&ConfidenceBand> {
        self.bands
            .iter()
            .find(|b| matches!(b.parameter, BandParameter::Shape))
    }

    pub fn scale_band(&self) -> Option<&ConfidenceBand> {
        self.bands
            .iter()
            .find(|b| matches!(b.parameter, BandParameter::Scale))
    }

    pub fn reliability_band(&self) -> Option<&ConfidenceBand> {
        self.bands
            .iter()
            .find(|b| matches!(b.parameter, BandParameter::Reliability { .. }))
    }

    /// Whether interval limits could be computed.
    pub fn is_identifiable(&self) -> bool {
        self.diagnostic.is_none()
    }
}

/// Hessian of the negative log-likelihood at `model`, in (β, η) order.
pub fn observed_information(model: &Weibull, observations: &[LifetimeObservation]) -> [[f64; 2]; 2] {
    let theta = [model.shape(), model.scale()];
    let nll = |p: [f64; 2]| -weibull_log_likelihood(p[0], p[1], observations);
    let h = [RELATIVE_STEP * theta[0], RELATIVE_STEP * theta[1]];
    let shifted = |di: f64, dj: f64| nll([theta[0] + di * h[0], theta[1] + dj * h[1]]);

    let f0 = nll(theta);
    let h00 = (shifted(1.0, 0.0) - 2.0 * f0 + shifted(-1.0, 0.0)) / (h[0] * h[0]);
    let h11 = (shifted(0.0, 1.0) - 2.0 * f0 + shifted(0.0, -1.0)) / (h[1] * h[1]);
    let h01 = (shifted(1.0, 1.0) - shifted(1.0, -1.0) - shifted(-1.0, 1.0) + shifted(-1.0, -1.0))
        / (4.0 * h[0] * h[1]);

    [[h00, h01], [h01, h11]]
}

/// Inverse of a 2×2 information matrix, if it is positive definite and
/// well conditioned.
fn invert_information(info: [[f64; 2]; 2]) -> Option<[[f64; 2]; 2]> {
    let [[a, b], [c, d]] = info;
    if !(a.is_finite() && b.is_finite() && c.is_finite() && d.is_finite()) {
        return None;
    }
    if a <= 0.0 || d <= 0.0 {
        return None;
    }
    let det = a * d - b * c;
    if det <= SINGULARITY_RATIO * a * d {
        return None;
    }
    Some([[d / det, -b / det], [-c / det, a / det]])
}

/// Asymptotic covariance of (β, η) at `model`.
///
/// # Returns
/// `None` when the observed information is singular or not positive
/// definite.
pub fn covariance_at(model: &Weibull, observations: &[LifetimeObservation]) -> Option<[[f64; 2]; 2]> {
    invert_information(observed_information(model, observations))
}

fn wald_band(parameter: BandParameter, estimate: f64, variance: Option<f64>, z: f64, level: f64) -> ConfidenceBand {
    let standard_error = variance.filter(|v| v.is_finite() && *v >= 0.0).map(f64::sqrt);
    let (lower, upper) = match standard_error {
        Some(se) => (Some(estimate - z * se), Some(estimate + z * se)),
        None => (None, None),
    };
    ConfidenceBand {
        parameter,
        point_estimate: estimate,
        standard_error,
        lower,
        upper,
        level,
    }
}

/// Confidence bands for β, η and optionally R(`derived_time`).
///
/// Parameter bands are `estimate ± z·se` with the lower limit floored at
/// zero. The reliability band uses the delta method with the analytic
/// gradient of R and is clipped to [0, 1].
///
/// # Errors
/// - [`ReliabilityError::InvalidConfiguration`] if `level` is outside (0, 1)
///   or `derived_time` is not positive.
/// - [`ReliabilityError::InvalidInput`] if the observations are malformed or
///   their failure/suspension counts differ from the fit's.
///
/// # Examples
///
/// ```
/// use u_reliability::observation::LifetimeObservation;
/// use u_reliability::uncertainty::confidence;
/// use u_reliability::weibull::{fit, FitConfig};
///
/// let data: Vec<_> = (1..=50)
///     .map(|i| {
///         let p = (i as f64 - 0.5) / 50.0;
///         LifetimeObservation::failure(1000.0 * (-(1.0 - p).ln()).sqrt())
///     })
///     .collect();
/// let result = fit(&data, &FitConfig::default()).unwrap();
/// let report = confidence(&result, &data, 0.95, Some(500.0)).unwrap();
///
/// let shape = report.shape_band().unwrap();
/// assert!(shape.lower.unwrap() < result.shape && result.shape < shape.upper.unwrap());
/// assert!(report.reliability_band().is_some());
/// ```
pub fn confidence(
    fit: &DistributionFit,
    observations: &[LifetimeObservation],
    level: f64,
    derived_time: Option<f64>,
) -> Result<UncertaintyReport> {
    require_open_unit("level", level)?;
    if let Some(t) = derived_time {
        require_positive("derived_time", t)?;
    }
    let counts = validate_observations(observations)?;
    if counts.n_failures != fit.n_failures || counts.n_censored != fit.n_censored {
        return Err(ReliabilityError::input(
            "observations",
            format!(
                "sample has {} failures and {} suspensions but the fit was made on {} and {}",
                counts.n_failures, counts.n_censored, fit.n_failures, fit.n_censored
            ),
        ));
    }
    let model = fit.model()?;
    if !fit.converged {
        warn!(
            shape = fit.shape,
            scale = fit.scale,
            "confidence bands requested for a non-converged fit"
        );
    }

    let covariance = covariance_at(&model, observations);
    let diagnostic = if covariance.is_none() {
        warn!(
            shape = fit.shape,
            scale = fit.scale,
            n_failures = fit.n_failures,
            "observed information is singular; interval limits omitted"
        );
        Some(ReliabilityError::NonIdentifiable {
            reason: "observed information matrix is singular or not positive definite".into(),
        })
    } else {
        None
    };

    let z = inverse_normal_cdf(0.5 + level / 2.0);
    let floor_at_zero = |mut band: ConfidenceBand| {
        band.lower = band.lower.map(|l| l.max(0.0));
        band
    };

    let mut bands = vec![
        floor_at_zero(wald_band(
            BandParameter::Shape,
            fit.shape,
            covariance.map(|c| c[0][0]),
            z,
            level,
        )),
        floor_at_zero(wald_band(
            BandParameter::Scale,
            fit.scale,
            covariance.map(|c| c[1][1]),
            z,
            level,
        )),
    ];

    if let Some(time) = derived_time {
        let r = model.reliability(time);
        let variance = covariance.map(|c| {
            let u = model.scaled_exposure(time);
            let d_shape = -r * u * (time / model.scale()).ln();
            let d_scale = r * u * model.shape() / model.scale();
            d_shape * d_shape * c[0][0] + 2.0 * d_shape * d_scale * c[0][1] + d_scale * d_scale * c[1][1]
        });
        let mut band = wald_band(BandParameter::Reliability { time }, r, variance, z, level);
        band.lower = band.lower.map(|l| l.clamp(0.0, 1.0));
        band.upper = band.upper.map(|u| u.clamp(0.0, 1.0));
        bands.push(band);
    }

    Ok(UncertaintyReport {
        level,
        bands,
        covariance,
        diagnostic,
        fit_converged: fit.converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weibull::{fit, FitConfig};

    fn quantile_sample(shape: f64, scale: f64, n: usize) -> Vec<LifetimeObservation> {
        (1..=n)
            .map(|i| {
                let p = (i as f64 - 0.5) / n as f64;
                LifetimeObservation::failure(scale * (-(1.0 - p).ln()).powf(1.0 / shape))
            })
            .collect()
    }

    fn fitted(data: &[LifetimeObservation]) -> DistributionFit {
        fit(data, &FitConfig::default()).expect("fit should succeed")
    }

    #[test]
    fn test_matches_asymptotic_variance() {
        // Complete samples: Var(β) ≈ 0.608·β²/n, Var(η) ≈ 1.109·η²/(n·β²)
        let n = 200;
        let data = quantile_sample(2.0, 1000.0, n);
        let result = fitted(&data);
        let cov = covariance_at(&result.model().expect("valid model"), &data).expect("invertible");

        let expected_shape = 0.608 * result.shape.powi(2) / n as f64;
        let expected_scale = 1.109 * result.scale.powi(2) / (n as f64 * result.shape.powi(2));
        assert!(
            (cov[0][0] / expected_shape - 1.0).abs() < 0.2,
            "var(shape) = {}, expected ≈ {expected_shape}",
            cov[0][0]
        );
        assert!(
            (cov[1][1] / expected_scale - 1.0).abs() < 0.2,
            "var(scale) = {}, expected ≈ {expected_scale}",
            cov[1][1]
        );
    }

    #[test]
    fn test_bands_contain_estimates() {
        let data = quantile_sample(2.0, 1000.0, 100);
        let result = fitted(&data);
        let report = confidence(&result, &data, DEFAULT_LEVEL, Some(800.0)).expect("valid request");

        assert!(report.is_identifiable());
        assert!(report.fit_converged);
        assert_eq!(report.bands.len(), 3);
        for band in &report.bands {
            let (lo, hi) = (band.lower.expect("lower"), band.upper.expect("upper"));
            assert!(lo < band.point_estimate && band.point_estimate < hi, "{band:?}");
            assert_eq!(band.level, 0.95);
        }
        let rel = report.reliability_band().expect("derived band");
        assert!(rel.lower.expect("lower") >= 0.0 && rel.upper.expect("upper") <= 1.0);
        let expected_r = result.model().expect("valid model").reliability(800.0);
        assert!((rel.point_estimate - expected_r).abs() < 1e-12);
    }

    #[test]
    fn test_bands_widen_with_fewer_failures() {
        let large = quantile_sample(2.0, 1000.0, 120);
        let small = quantile_sample(2.0, 1000.0, 15);
        let wide = confidence(&fitted(&small), &small, 0.95, Some(500.0)).expect("valid");
        let narrow = confidence(&fitted(&large), &large, 0.95, Some(500.0)).expect("valid");

        let width = |r: &UncertaintyReport, f: fn(&UncertaintyReport) -> Option<&ConfidenceBand>| {
            f(r).and_then(ConfidenceBand::width).expect("finite band")
        };
        assert!(width(&wide, UncertaintyReport::shape_band) > width(&narrow, UncertaintyReport::shape_band));
        assert!(width(&wide, UncertaintyReport::scale_band) > width(&narrow, UncertaintyReport::scale_band));
        assert!(
            width(&wide, UncertaintyReport::reliability_band)
                > width(&narrow, UncertaintyReport::reliability_band)
        );
    }

    #[test]
    fn test_higher_level_widens_bands() {
        let data = quantile_sample(1.5, 200.0, 40);
        let result = fitted(&data);
        let at_90 = confidence(&result, &data, 0.90, None).expect("valid");
        let at_99 = confidence(&result, &data, 0.99, None).expect("valid");
        let w90 = at_90.shape_band().and_then(ConfidenceBand::width).expect("band");
        let w99 = at_99.shape_band().and_then(ConfidenceBand::width).expect("band");
        assert!(w99 > w90);
        assert!(at_90.reliability_band().is_none());
    }

    #[test]
    fn test_singular_information_is_reported_not_raised() {
        // Far from the likelihood maximum the curvature in η is negative.
        let data = quantile_sample(2.0, 100.0, 10);
        let record = DistributionFit {
            shape: 2.0,
            scale: 1e9,
            log_likelihood: weibull_log_likelihood(2.0, 1e9, &data),
            converged: true,
            iterations: 1,
            n_failures: 10,
            n_censored: 0,
            covariance: None,
        };
        let report = confidence(&record, &data, 0.95, Some(50.0)).expect("call succeeds");
        assert!(matches!(report.diagnostic, Some(ReliabilityError::NonIdentifiable { .. })));
        assert!(report.covariance.is_none());
        for band in &report.bands {
            assert!(band.lower.is_none() && band.upper.is_none() && band.standard_error.is_none());
            assert!(band.point_estimate.is_finite());
        }
    }

    #[test]
    fn test_invert_information() {
        let cov = invert_information([[4.0, 1.0], [1.0, 2.0]]).expect("positive definite");
        // det = 7
        assert!((cov[0][0] - 2.0 / 7.0).abs() < 1e-15);
        assert!((cov[0][1] + 1.0 / 7.0).abs() < 1e-15);
        assert!((cov[1][1] - 4.0 / 7.0).abs() < 1e-15);

        assert!(invert_information([[1.0, 1.0], [1.0, 1.0]]).is_none());
        assert!(invert_information([[-1.0, 0.0], [0.0, 1.0]]).is_none());
        assert!(invert_information([[f64::NAN, 0.0], [0.0, 1.0]]).is_none());
    }

    #[test]
    fn test_rejects_bad_requests() {
        let data = quantile_sample(2.0, 100.0, 20);
        let result = fitted(&data);
        assert!(matches!(
            confidence(&result, &data, 1.0, None),
            Err(ReliabilityError::InvalidConfiguration { ref field, .. }) if field == "level"
        ));
        assert!(matches!(
            confidence(&result, &data, 0.95, Some(0.0)),
            Err(ReliabilityError::InvalidConfiguration { ref field, .. }) if field == "derived_time"
        ));
        assert!(matches!(
            confidence(&result, &data[..10], 0.95, None),
            Err(ReliabilityError::InvalidInput { ref field, .. }) if field == "observations"
        ));
    }
}
