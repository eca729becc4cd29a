//! The two-parameter Weibull lifetime model.
//!
//! Provides reliability, hazard, mean life, and B-life from a shape (β) and
//! scale (η) pair. R(t) and the hazard clip the exponent `(t/η)^β` so that
//! extreme parameters saturate instead of producing NaN. The log-density and
//! log-survival feed the likelihood and are left unclipped: they fall to `-∞`
//! when `(t/η)^β` overflows.

use serde::{Deserialize, Serialize};
use u_numflow::special::gamma;

use crate::lifetime::{Family, LifetimeDistribution};

/// Largest exponent passed to `exp` when evaluating `(t/η)^β`.
pub(crate) const MAX_LOG_EXPOSURE: f64 = 700.0;

/// `(t/η)^β` evaluated as `exp(β·ln(t/η))` with the exponent clipped to
/// `[-MAX_LOG_EXPOSURE, MAX_LOG_EXPOSURE]`.
pub(crate) fn exposure(t: f64, shape: f64, scale: f64) -> f64 {
    (shape * (t / scale).ln())
        .clamp(-MAX_LOG_EXPOSURE, MAX_LOG_EXPOSURE)
        .exp()
}

/// Weibull distribution with shape β > 0 and scale η > 0.
///
/// - Reliability: R(t) = exp(-(t/η)^β)
/// - Hazard rate: h(t) = (β/η) · (t/η)^(β-1)
/// - Mean life: η · Γ(1 + 1/β)
///
/// # Examples
///
/// ```
/// use u_reliability::lifetime::LifetimeDistribution;
/// use u_reliability::weibull::Weibull;
///
/// let w = Weibull::new(2.0, 100.0).unwrap();
/// assert!((w.reliability(0.0) - 1.0).abs() < 1e-10);
/// assert!(w.hazard(50.0) > 0.0);
/// let b10 = w.b_life(0.10).unwrap();
/// assert!(b10 > 0.0 && b10 < 100.0);
/// ```
///
/// # Reference
/// Meeker & Escobar (1998), *Statistical Methods for Reliability Data*, Wiley.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weibull {
    shape: f64,
    scale: f64,
}

impl Weibull {
    /// Creates a Weibull model.
    ///
    /// # Returns
    /// `None` if either parameter is non-positive or non-finite.
    ///
    /// ```
    /// use u_reliability::weibull::Weibull;
    /// assert!(Weibull::new(2.0, 100.0).is_some());
    /// assert!(Weibull::new(-1.0, 100.0).is_none());
    /// assert!(Weibull::new(2.0, 0.0).is_none());
    /// ```
    pub fn new(shape: f64, scale: f64) -> Option<Self> {
        if !shape.is_finite() || !scale.is_finite() || shape <= 0.0 || scale <= 0.0 {
            return None;
        }
        Some(Self { shape, scale })
    }

    /// Shape parameter β.
    pub fn shape(&self) -> f64 {
        self.shape
    }

    /// Scale parameter η (characteristic life).
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// `(t/η)^β` without clipping; `+∞` on overflow.
    fn exact_exposure(&self, t: f64) -> f64 {
        (self.shape * (t / self.scale).ln()).exp()
    }

    /// `(t/η)^β`, clipped. Zero for `t <= 0`.
    pub fn scaled_exposure(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        exposure(t, self.shape, self.scale)
    }
}

impl LifetimeDistribution for Weibull {
    fn family(&self) -> Family {
        Family::Weibull
    }

    fn parameter_count(&self) -> usize {
        2
    }

    /// R(t) = exp(-(t/η)^β); 1 for `t <= 0`.
    fn reliability(&self, t: f64) -> f64 {
        (-self.scaled_exposure(t)).exp()
    }

    fn pdf(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        self.hazard(t) * self.reliability(t)
    }

    /// h(t) = (β/η)(t/η)^(β-1); 0 for `t <= 0`.
    ///
    /// - β < 1: decreasing failure rate (infant mortality)
    /// - β = 1: constant failure rate
    /// - β > 1: increasing failure rate (wear-out)
    fn hazard(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        (self.shape / self.scale) * exposure(t, self.shape - 1.0, self.scale)
    }

    fn cumulative_hazard(&self, t: f64) -> f64 {
        self.scaled_exposure(t)
    }

    fn ln_reliability(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        -self.exact_exposure(t)
    }

    fn ln_pdf(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return f64::NEG_INFINITY;
        }
        let log_ratio = (t / self.scale).ln();
        self.shape.ln() - self.scale.ln() + (self.shape - 1.0) * log_ratio - self.exact_exposure(t)
    }

    /// η · Γ(1 + 1/β).
    fn mean_life(&self) -> f64 {
        self.scale * gamma(1.0 + 1.0 / self.shape)
    }

    fn has_increasing_hazard(&self) -> bool {
        self.shape > 1.0
    }

    /// t = η · (−ln p)^(1/β).
    fn time_to_reliability(&self, p: f64) -> Option<f64> {
        if p <= 0.0 || p >= 1.0 || p.is_nan() {
            return None;
        }
        Some(self.scale * (-p.ln()).powf(1.0 / self.shape))
    }

    fn characteristic_life(&self) -> f64 {
        self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_invalid() {
        assert!(Weibull::new(0.0, 50.0).is_none());
        assert!(Weibull::new(-1.0, 50.0).is_none());
        assert!(Weibull::new(2.0, 0.0).is_none());
        assert!(Weibull::new(2.0, -1.0).is_none());
        assert!(Weibull::new(f64::NAN, 50.0).is_none());
        assert!(Weibull::new(2.0, f64::INFINITY).is_none());
    }

    #[test]
    fn test_reliability_at_scale() {
        // R(η) = e⁻¹ for any β
        for shape in [0.5, 1.0, 2.0, 7.5] {
            let w = Weibull::new(shape, 50.0).expect("valid parameters");
            let r = w.reliability(50.0);
            assert!(
                (r - (-1.0_f64).exp()).abs() < 1e-12,
                "R(eta) = {r} for shape {shape}"
            );
        }
    }

    #[test]
    fn test_reliability_non_increasing() {
        let w = Weibull::new(2.0, 50.0).expect("valid parameters");
        let mut prev = 1.0;
        for i in 0..=200 {
            let r = w.reliability(i as f64);
            assert!(r <= prev + 1e-15, "R({i}) = {r} > {prev}");
            prev = r;
        }
        assert_eq!(w.reliability(-10.0), 1.0);
    }

    #[test]
    fn test_extreme_parameters_stay_finite() {
        let steep = Weibull::new(400.0, 1.0).expect("valid parameters");
        assert_eq!(steep.reliability(100.0), 0.0);
        assert!(steep.hazard(100.0).is_finite());
        // The likelihood terms do not saturate: an overflowing exposure is impossible data.
        assert_eq!(steep.ln_pdf(100.0), f64::NEG_INFINITY);
        assert_eq!(steep.ln_reliability(100.0), f64::NEG_INFINITY);
        assert!(!steep.ln_pdf(100.0).is_nan());

        let flat = Weibull::new(1e-3, 1e9).expect("valid parameters");
        assert!(flat.reliability(1e-300).is_finite());
        assert!(flat.ln_pdf(1e-300).is_finite());
    }

    #[test]
    fn test_hazard_regimes() {
        let exp = Weibull::new(1.0, 20.0).expect("valid parameters");
        for t in [5.0, 10.0, 50.0] {
            assert!((exp.hazard(t) - 0.05).abs() < 1e-12);
        }
        let wear = Weibull::new(3.0, 50.0).expect("valid parameters");
        assert!(wear.hazard(10.0) < wear.hazard(20.0));
        assert!(wear.has_increasing_hazard());

        let infant = Weibull::new(0.7, 50.0).expect("valid parameters");
        assert!(infant.hazard(10.0) > infant.hazard(20.0));
        assert!(!infant.has_increasing_hazard());
        assert!(!exp.has_increasing_hazard());
    }

    #[test]
    fn test_pdf_is_hazard_times_reliability() {
        let w = Weibull::new(2.5, 50.0).expect("valid parameters");
        for t in [5.0_f64, 20.0, 50.0, 80.0] {
            let z = t / 50.0;
            let pdf = (2.5 / 50.0) * z.powf(1.5) * (-z.powf(2.5)).exp();
            assert!((w.pdf(t) - pdf).abs() < 1e-12, "pdf({t})");
            assert!((w.ln_pdf(t) - pdf.ln()).abs() < 1e-10, "ln_pdf({t})");
        }
    }

    #[test]
    fn test_mean_life() {
        let exp = Weibull::new(1.0, 100.0).expect("valid parameters");
        assert!((exp.mean_life() - 100.0).abs() < 1e-8);
        let rayleigh = Weibull::new(2.0, 1.0).expect("valid parameters");
        assert!((rayleigh.mean_life() - std::f64::consts::PI.sqrt() / 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_time_to_reliability_roundtrip() {
        let w = Weibull::new(2.5, 100.0).expect("valid parameters");
        for p in [0.1, 0.25, 0.5, 0.75, 0.9] {
            let t = w.time_to_reliability(p).expect("valid p");
            assert!((w.reliability(t) - p).abs() < 1e-10);
        }
        assert!(w.time_to_reliability(0.0).is_none());
        assert!(w.time_to_reliability(1.0).is_none());
    }

    #[test]
    fn test_b_life_ordering() {
        let w = Weibull::new(2.0, 50.0).expect("valid parameters");
        let b5 = w.b_life(0.05).expect("valid");
        let b10 = w.b_life(0.10).expect("valid");
        let b50 = w.b_life(0.50).expect("valid");
        assert!(b5 < b10 && b10 < b50);
        assert!((b10 - w.time_to_reliability(0.9).expect("valid")).abs() < 1e-12);
        assert!(w.b_life(1.0).is_none());
    }

    #[test]
    fn test_characteristic_life_is_scale() {
        let w = Weibull::new(3.3, 4500.0).expect("valid parameters");
        assert_eq!(w.characteristic_life(), 4500.0);
        assert!((w.cdf(4500.0) - (1.0 - (-1.0_f64).exp())).abs() < 1e-12);
    }
}
