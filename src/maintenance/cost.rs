//! Renewal-reward cost rate of age replacement.
//!
//! A unit is replaced preventively at age `t` (cost `Cp`) or correctively on
//! failure (cost `Cf`), whichever comes first. Over one renewal cycle
//!
//! ```text
//! E[cost]   = Cp·R(t) + Cf·F(t)
//! E[length] = ∫₀ᵗ R(u) du
//! C(t)      = E[cost] / E[length]
//! ```
//!
//! # Reference
//! Barlow, R.E. & Proschan, F. (1965). *Mathematical Theory of Reliability*, ch. 4.

use crate::lifetime::LifetimeDistribution;

/// Simpson panels for the cycle-length integral (even).
const SIMPSON_PANELS: usize = 512;

/// Survival below which the integrand is dropped.
const NEGLIGIBLE_RELIABILITY: f64 = 1e-15;

/// Expected cycle length `∫₀ᵗ R(u) du`, by composite Simpson's rule.
///
/// The range is cut where R falls below 1e-15. Zero for `t <= 0`.
pub fn expected_cycle_length(model: &dyn LifetimeDistribution, t: f64) -> f64 {
    if !(t > 0.0) {
        return 0.0;
    }
    let upper = model
        .time_to_reliability(NEGLIGIBLE_RELIABILITY)
        .filter(|q| q.is_finite() && *q > 0.0)
        .map_or(t, |q| q.min(t));
    let h = upper / SIMPSON_PANELS as f64;
    let mut sum = model.reliability(0.0) + model.reliability(upper);
    for i in 1..SIMPSON_PANELS {
        let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * model.reliability(i as f64 * h);
    }
    sum * h / 3.0
}

/// Expected cost per unit time when replacing preventively at age `t`.
///
/// `+∞` for `t <= 0` or a zero-length cycle.
///
/// # Examples
///
/// ```
/// use u_reliability::maintenance::cost_rate;
/// use u_reliability::weibull::Weibull;
///
/// let model = Weibull::new(3.0, 1000.0).unwrap();
/// let early = cost_rate(&model, 50.0, 100.0, 2000.0);
/// let sensible = cost_rate(&model, 500.0, 100.0, 2000.0);
/// assert!(sensible < early);
/// ```
pub fn cost_rate(model: &dyn LifetimeDistribution, t: f64, cost_pm: f64, cost_failure: f64) -> f64 {
    let length = expected_cycle_length(model, t);
    if !(length > 0.0) {
        return f64::INFINITY;
    }
    let failed = model.cdf(t);
    (cost_pm * (1.0 - failed) + cost_failure * failed) / length
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifetime::Exponential;
    use crate::weibull::Weibull;

    #[test]
    fn test_cycle_length_exponential_closed_form() {
        // ∫₀ᵗ e^{-λu} du = (1 − e^{-λt}) / λ
        let model = Exponential::new(0.01).expect("valid rate");
        let t = 150.0;
        let expected = (1.0 - (-0.01_f64 * t).exp()) / 0.01;
        let got = expected_cycle_length(&model, t);
        assert!((got - expected).abs() < 1e-8, "got {got}, expected {expected}");
    }

    #[test]
    fn test_cycle_length_tends_to_mean_life() {
        let model = Weibull::new(2.0, 100.0).expect("valid parameters");
        let got = expected_cycle_length(&model, 1000.0);
        assert!((got - model.mean_life()).abs() < 1e-4, "got {got}");
        assert_eq!(expected_cycle_length(&model, 0.0), 0.0);
    }

    #[test]
    fn test_cost_rate_limits() {
        let model = Weibull::new(2.0, 100.0).expect("valid parameters");
        assert_eq!(cost_rate(&model, 0.0, 1.0, 10.0), f64::INFINITY);
        // Replacing very late approaches run-to-failure: Cf / MTTF.
        let late = cost_rate(&model, 5000.0, 1.0, 10.0);
        assert!((late - 10.0 / model.mean_life()).abs() < 1e-6, "late = {late}");
    }

    #[test]
    fn test_constant_hazard_has_no_benefit() {
        // With an exponential lifetime the rate decreases toward Cf·λ.
        let model = Exponential::new(0.02).expect("valid rate");
        let mut prev = f64::INFINITY;
        for t in [10.0, 50.0, 100.0, 250.0, 500.0] {
            let c = cost_rate(&model, t, 100.0, 1000.0);
            assert!(c < prev);
            prev = c;
        }
        assert!(prev > 1000.0 * 0.02);
    }
}
