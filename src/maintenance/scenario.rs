//! Mission reliability and what-if comparison of candidate intervals.

use serde::{Deserialize, Serialize};

use super::cost::cost_rate;
use super::RiskLevel;
use crate::error::{require_positive, ReliabilityError, Result};
use crate::lifetime::LifetimeDistribution;

/// Outcome of one candidate interval in [`scenario_analysis`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub interval: f64,
    pub reliability: f64,
    /// Renewal-reward cost per unit time.
    pub cost_rate: f64,
    pub pm_per_year: f64,
    pub pm_cost_per_year: f64,
    pub risk_level: RiskLevel,
}

/// Probability of surviving a mission of length `mission_time` when every
/// maintenance renews the unit.
///
/// Maintenance times are sorted; those at or beyond the mission end are
/// ignored. The result is the product of the segment reliabilities between
/// consecutive renewals.
///
/// # Errors
/// [`ReliabilityError::InvalidInput`] for a non-positive mission time or a
/// non-positive maintenance time.
///
/// # Examples
///
/// ```
/// use u_reliability::lifetime::LifetimeDistribution;
/// use u_reliability::maintenance::mission_reliability;
/// use u_reliability::weibull::Weibull;
///
/// let model = Weibull::new(3.0, 1000.0).unwrap();
/// let unmaintained = mission_reliability(&model, 1200.0, &[]).unwrap();
/// let maintained = mission_reliability(&model, 1200.0, &[400.0, 800.0]).unwrap();
/// assert!((unmaintained - model.reliability(1200.0)).abs() < 1e-12);
/// assert!(maintained > unmaintained);
/// ```
pub fn mission_reliability(
    model: &dyn LifetimeDistribution,
    mission_time: f64,
    maintenance_times: &[f64],
) -> Result<f64> {
    if !(mission_time.is_finite() && mission_time > 0.0) {
        return Err(ReliabilityError::input(
            "mission_time",
            format!("must be finite and positive, got {mission_time}"),
        ));
    }
    if let Some((i, t)) = maintenance_times
        .iter()
        .enumerate()
        .find(|(_, t)| !(t.is_finite() && **t > 0.0))
    {
        return Err(ReliabilityError::input(
            format!("maintenance_times[{i}]"),
            format!("must be finite and positive, got {t}"),
        ));
    }

    let mut renewals: Vec<f64> = maintenance_times
        .iter()
        .copied()
        .filter(|&t| t < mission_time)
        .collect();
    renewals.sort_by(f64::total_cmp);
    renewals.push(mission_time);

    let mut last = 0.0;
    let mut reliability = 1.0;
    for t in renewals {
        reliability *= model.reliability(t - last);
        last = t;
    }
    Ok(reliability)
}

/// Evaluates each candidate interval: reliability at the interval, cost rate,
/// preventive actions and their cost per year, and risk level.
///
/// `hours_per_year` converts the interval into a yearly frequency (8760 for
/// continuous operation).
///
/// # Errors
/// [`ReliabilityError::InvalidConfiguration`] for a non-positive cost or
/// `hours_per_year`; [`ReliabilityError::InvalidInput`] for a non-positive
/// interval.
pub fn scenario_analysis(
    model: &dyn LifetimeDistribution,
    intervals: &[f64],
    cost_pm: f64,
    cost_failure: f64,
    hours_per_year: f64,
) -> Result<Vec<Scenario>> {
    require_positive("cost_pm", cost_pm)?;
    require_positive("cost_failure", cost_failure)?;
    require_positive("hours_per_year", hours_per_year)?;

    intervals
        .iter()
        .enumerate()
        .map(|(i, &interval)| {
            if !(interval.is_finite() && interval > 0.0) {
                return Err(ReliabilityError::input(
                    format!("intervals[{i}]"),
                    format!("must be finite and positive, got {interval}"),
                ));
            }
            let reliability = model.reliability(interval);
            let pm_per_year = hours_per_year / interval;
            Ok(Scenario {
                interval,
                reliability,
                cost_rate: cost_rate(model, interval, cost_pm, cost_failure),
                pm_per_year,
                pm_cost_per_year: pm_per_year * cost_pm,
                risk_level: RiskLevel::from_reliability(reliability),
            })
        })
        .collect()
}
