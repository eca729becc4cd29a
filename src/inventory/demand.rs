//! Spare-part demand driven by expected failures.

use serde::{Deserialize, Serialize};

use crate::error::{require_positive, ReliabilityError, Result};
use crate::lifetime::LifetimeDistribution;

/// Default coefficient of variation for non-Poisson demand.
pub const DEFAULT_DEMAND_CV: f64 = 0.3;

/// How period demand scatters around its mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandVariability {
    /// Variance equals the mean.
    #[default]
    Poisson,
    /// Standard deviation is this multiple of the mean.
    CoefficientOfVariation(f64),
}

/// Demand per period implied by a lifetime model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandEstimate {
    /// Expected replacements per period across the fleet.
    pub mean: f64,
    /// Variance of replacements per period.
    pub variance: f64,
    /// Failures per operating hour of one unit, `1 / mean life`.
    pub failure_rate: f64,
}

impl DemandEstimate {
    /// Expected replacements per period for `fleet_size` units each running
    /// `hours_per_period`, at the long-run renewal rate `1 / mean life`.
    ///
    /// # Errors
    /// [`ReliabilityError::InvalidConfiguration`] for an empty fleet, a
    /// non-positive period, a negative coefficient of variation, or a model
    /// whose mean life is not finite and positive.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_reliability::inventory::{DemandEstimate, DemandVariability};
    /// use u_reliability::lifetime::Exponential;
    ///
    /// // MTBF of 2000 h, 10 units, 8760 h per year
    /// let model = Exponential::new(1.0 / 2000.0).unwrap();
    /// let demand = DemandEstimate::from_distribution(&model, 10, 8760.0, DemandVariability::Poisson).unwrap();
    /// assert!((demand.mean - 43.8).abs() < 1e-9);
    /// assert_eq!(demand.variance, demand.mean);
    /// ```
    pub fn from_distribution(
        model: &dyn LifetimeDistribution,
        fleet_size: usize,
        hours_per_period: f64,
        variability: DemandVariability,
    ) -> Result<Self> {
        if fleet_size == 0 {
            return Err(ReliabilityError::config("fleet_size", "must be at least 1"));
        }
        require_positive("hours_per_period", hours_per_period)?;
        let mean_life = model.mean_life();
        if !(mean_life.is_finite() && mean_life > 0.0) {
            return Err(ReliabilityError::config(
                "model",
                format!("mean life must be finite and positive, got {mean_life}"),
            ));
        }

        let failure_rate = 1.0 / mean_life;
        let mean = fleet_size as f64 * failure_rate * hours_per_period;
        let variance = match variability {
            DemandVariability::Poisson => mean,
            DemandVariability::CoefficientOfVariation(cv) => {
                if !(cv.is_finite() && cv >= 0.0) {
                    return Err(ReliabilityError::config(
                        "variability",
                        format!("coefficient of variation must be finite and non-negative, got {cv}"),
                    ));
                }
                (cv * mean).powi(2)
            }
        };

        Ok(Self {
            mean,
            variance,
            failure_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weibull::Weibull;

    #[test]
    fn test_weibull_demand() {
        let model = Weibull::new(2.0, 1000.0).expect("valid parameters");
        let demand = DemandEstimate::from_distribution(
            &model,
            5,
            8760.0,
            DemandVariability::CoefficientOfVariation(DEFAULT_DEMAND_CV),
        )
        .expect("valid demand");
        let mttf = model.mean_life();
        assert!((demand.failure_rate - 1.0 / mttf).abs() < 1e-15);
        assert!((demand.mean - 5.0 * 8760.0 / mttf).abs() < 1e-9);
        assert!((demand.variance - (0.3 * demand.mean).powi(2)).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let model = Weibull::new(2.0, 1000.0).expect("valid parameters");
        assert!(DemandEstimate::from_distribution(&model, 0, 8760.0, DemandVariability::Poisson).is_err());
        assert!(DemandEstimate::from_distribution(&model, 1, 0.0, DemandVariability::Poisson).is_err());
        assert!(DemandEstimate::from_distribution(
            &model,
            1,
            8760.0,
            DemandVariability::CoefficientOfVariation(-0.1)
        )
        .is_err());
    }
}
