//! Preventive-maintenance interval planning.
//!
//! Turns a fitted lifetime model into a recommended replacement interval.
//!
//! # Policies
//!
//! - [`PmPolicy::ReliabilityTarget`] — the age at which R(t) falls to a target
//! - [`PmPolicy::FractionOfLife`] — a fixed fraction of the characteristic life
//! - [`PmPolicy::CostOptimal`] — minimizes the age-replacement [`cost_rate`]
//!   with a bounded 1-D search
//!
//! Planning works against any [`LifetimeDistribution`] through [`plan_with`];
//! [`plan_maintenance`] is the entry point for a Weibull fit.
//!
//! # References
//!
//! - Barlow, R.E. & Proschan, F. (1965). *Mathematical Theory of Reliability*.
//! - Jardine, A.K.S. & Tsang, A.H.C. (2013). *Maintenance, Replacement, and
//!   Reliability*, 2nd ed.

mod cost;
mod scenario;

pub use cost::{cost_rate, expected_cycle_length};
pub use scenario::{mission_reliability, scenario_analysis, Scenario};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{require_open_unit, require_positive, ReliabilityError, Result};
use crate::lifetime::LifetimeDistribution;
use crate::optimize::{Bounds, GoldenSection, Minimizer, OptimizerConfig};
use crate::weibull::DistributionFit;

/// Lower end of the cost search, as a fraction of the characteristic life.
const SEARCH_FLOOR: f64 = 1e-6;

/// An optimum within this relative distance of the upper search bound is
/// treated as lying on the bound.
const BOUNDARY_SLACK: f64 = 1e-3;

/// How the interval is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PmPolicy {
    #[default]
    ReliabilityTarget,
    #[serde(alias = "fraction_of_eta")]
    FractionOfLife,
    CostOptimal,
}

impl PmPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReliabilityTarget => "reliability_target",
            Self::FractionOfLife => "fraction_of_life",
            Self::CostOptimal => "cost_optimal",
        }
    }
}

impl fmt::Display for PmPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PmPolicy {
    type Err = ReliabilityError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "reliability_target" => Ok(Self::ReliabilityTarget),
            "fraction_of_life" | "fraction_of_eta" => Ok(Self::FractionOfLife),
            "cost_optimal" => Ok(Self::CostOptimal),
            other => Err(ReliabilityError::config(
                "policy",
                format!(
                    "unknown policy `{other}`, expected reliability_target, fraction_of_life or cost_optimal"
                ),
            )),
        }
    }
}

/// Risk classification of an interval by the reliability it leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// R ≥ 0.9
    Low,
    /// 0.7 ≤ R < 0.9
    Medium,
    /// R < 0.7
    High,
}

impl RiskLevel {
    pub fn from_reliability(reliability: f64) -> Self {
        if reliability >= 0.9 {
            Self::Low
        } else if reliability >= 0.7 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

/// Planner configuration.
///
/// Only the fields of the selected policy are checked; costs are checked
/// whenever they are present.
///
/// # Examples
///
/// ```
/// use u_reliability::maintenance::{PlanConfig, PmPolicy};
///
/// let config: PlanConfig = serde_json::from_str(
///     r#"{"policy": "cost_optimal", "cost_pm": 500.0, "cost_failure": 5000.0}"#,
/// ).unwrap();
/// assert_eq!(config.policy, PmPolicy::CostOptimal);
/// assert_eq!(config.search_bound_multiplier, 3.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    pub policy: PmPolicy,
    /// Reliability to hold at the interval, in (0, 1).
    pub target_reliability: f64,
    /// Multiple of the characteristic life.
    pub fraction: f64,
    /// Cost of one preventive replacement.
    pub cost_pm: Option<f64>,
    /// Cost of one corrective replacement.
    pub cost_failure: Option<f64>,
    /// The cost search covers `(0, K·characteristic life]`.
    pub search_bound_multiplier: f64,
    /// Budget of the cost search.
    pub search: OptimizerConfig,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            policy: PmPolicy::ReliabilityTarget,
            target_reliability: 0.8,
            fraction: 0.75,
            cost_pm: None,
            cost_failure: None,
            search_bound_multiplier: 3.0,
            search: OptimizerConfig::default(),
        }
    }
}

impl PlanConfig {
    /// Reliability-target policy.
    pub fn reliability_target(target_reliability: f64) -> Self {
        Self {
            policy: PmPolicy::ReliabilityTarget,
            target_reliability,
            ..Self::default()
        }
    }

    /// Fraction-of-life policy.
    pub fn fraction_of_life(fraction: f64) -> Self {
        Self {
            policy: PmPolicy::FractionOfLife,
            fraction,
            ..Self::default()
        }
    }

    /// Cost-optimal policy.
    pub fn cost_optimal(cost_pm: f64, cost_failure: f64) -> Self {
        Self {
            policy: PmPolicy::CostOptimal,
            cost_pm: Some(cost_pm),
            cost_failure: Some(cost_failure),
            ..Self::default()
        }
    }

    /// Attaches costs so any policy also reports its cost rate.
    pub fn with_costs(mut self, cost_pm: f64, cost_failure: f64) -> Self {
        self.cost_pm = Some(cost_pm);
        self.cost_failure = Some(cost_failure);
        self
    }

    /// Both costs, validated, if either is present.
    fn costs(&self) -> Result<Option<(f64, f64)>> {
        match (self.cost_pm, self.cost_failure) {
            (None, None) => Ok(None),
            (Some(cp), Some(cf)) => Ok(Some((
                require_positive("cost_pm", cp)?,
                require_positive("cost_failure", cf)?,
            ))),
            (None, Some(_)) => Err(ReliabilityError::config(
                "cost_pm",
                "required when cost_failure is given",
            )),
            (Some(_), None) => Err(ReliabilityError::config(
                "cost_failure",
                "required when cost_pm is given",
            )),
        }
    }
}

/// A recommended preventive-maintenance interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PmStrategy {
    pub policy: PmPolicy,
    pub recommended_interval: f64,
    pub reliability_at_interval: f64,
    /// Renewal-reward cost per unit time, when costs were configured.
    pub expected_cost_rate: Option<f64>,
    pub risk_level: RiskLevel,
    /// False when planned from a non-converged fit; advisory only.
    pub fit_converged: bool,
    /// False when the cost search exhausted its budget. Always true for the
    /// closed-form policies.
    pub search_converged: bool,
}

impl PmStrategy {
    /// Both the fit and the interval search converged.
    pub fn is_reliable(&self) -> bool {
        self.fit_converged && self.search_converged
    }
}

/// Plans an interval from a Weibull fit.
///
/// # Errors
/// - [`ReliabilityError::InvalidConfiguration`] for out-of-range or missing
///   policy parameters.
/// - [`ReliabilityError::NoInteriorOptimum`] for the cost-optimal policy when
///   the hazard does not increase (β ≤ 1), when failures cost no more than
///   preventive work, or when the minimum lies on the search bound.
///
/// # Examples
///
/// ```
/// use u_reliability::maintenance::{plan_maintenance, PlanConfig};
/// use u_reliability::weibull::DistributionFit;
///
/// let fit = DistributionFit {
///     shape: 2.1,
///     scale: 4500.0,
///     log_likelihood: -120.0,
///     converged: true,
///     iterations: 40,
///     n_failures: 12,
///     n_censored: 3,
///     covariance: None,
/// };
/// let strategy = plan_maintenance(&fit, &PlanConfig::reliability_target(0.8)).unwrap();
/// let expected = 4500.0 * (-(0.8_f64).ln()).powf(1.0 / 2.1);
/// assert!((strategy.recommended_interval - expected).abs() < 1e-9);
/// assert!((strategy.reliability_at_interval - 0.8).abs() < 1e-6);
/// ```
pub fn plan_maintenance(fit: &DistributionFit, config: &PlanConfig) -> Result<PmStrategy> {
    let model = fit.model()?;
    plan_with(&model, fit.converged, config, &GoldenSection)
}

/// Plans an interval for any lifetime model with the given cost-search
/// minimizer.
pub fn plan_with(
    model: &dyn LifetimeDistribution,
    fit_converged: bool,
    config: &PlanConfig,
    minimizer: &dyn Minimizer,
) -> Result<PmStrategy> {
    if !fit_converged {
        warn!(policy = %config.policy, "planning from a non-converged fit");
    }
    let costs = config.costs()?;

    let (interval, search_converged) = match config.policy {
        PmPolicy::ReliabilityTarget => {
            let target = require_open_unit("target_reliability", config.target_reliability)?;
            let t = model.time_to_reliability(target).ok_or_else(|| {
                ReliabilityError::input(
                    "model",
                    format!("reliability never falls to {target}"),
                )
            })?;
            (t, true)
        }
        PmPolicy::FractionOfLife => {
            let fraction = require_positive("fraction", config.fraction)?;
            (fraction * model.characteristic_life(), true)
        }
        PmPolicy::CostOptimal => {
            let (cp, cf) = costs.ok_or_else(|| {
                ReliabilityError::config("cost_pm", "cost_optimal needs cost_pm and cost_failure")
            })?;
            optimal_interval(model, cp, cf, config, minimizer)?
        }
    };

    let reliability_at_interval = model.reliability(interval);
    let expected_cost_rate = costs.map(|(cp, cf)| cost_rate(model, interval, cp, cf));

    debug!(
        policy = %config.policy,
        interval,
        reliability = reliability_at_interval,
        search_converged,
        "maintenance interval planned"
    );

    Ok(PmStrategy {
        policy: config.policy,
        recommended_interval: interval,
        reliability_at_interval,
        expected_cost_rate,
        risk_level: RiskLevel::from_reliability(reliability_at_interval),
        fit_converged,
        search_converged,
    })
}

fn optimal_interval(
    model: &dyn LifetimeDistribution,
    cost_pm: f64,
    cost_failure: f64,
    config: &PlanConfig,
    minimizer: &dyn Minimizer,
) -> Result<(f64, bool)> {
    let multiplier = require_positive("search_bound_multiplier", config.search_bound_multiplier)?;
    if !model.has_increasing_hazard() {
        return Err(ReliabilityError::NoInteriorOptimum {
            reason: "hazard rate does not increase with age; preventive replacement cannot lower \
                     the cost rate, prefer condition-based or run-to-failure maintenance"
                .into(),
        });
    }
    if cost_failure <= cost_pm {
        return Err(ReliabilityError::NoInteriorOptimum {
            reason: format!(
                "failure cost {cost_failure} does not exceed preventive cost {cost_pm}"
            ),
        });
    }

    let life = model.characteristic_life();
    let (lower, upper) = (SEARCH_FLOOR * life, multiplier * life);
    let bounds = Bounds::interval(lower, upper).ok_or_else(|| {
        ReliabilityError::config("search_bound_multiplier", "search interval is empty")
    })?;

    let objective = |x: &[f64]| cost_rate(model, x[0], cost_pm, cost_failure);
    let min = minimizer.minimize(&objective, &[0.5 * (lower + upper)], &bounds, &config.search);
    let t = min.point.first().copied().ok_or_else(|| {
        ReliabilityError::config("minimizer", "returned an empty point for a 1-dimensional search")
    })?;

    if t >= upper * (1.0 - BOUNDARY_SLACK) {
        return Err(ReliabilityError::NoInteriorOptimum {
            reason: format!(
                "cost rate still falls at the search bound {upper}; widen search_bound_multiplier \
                 or use run-to-failure"
            ),
        });
    }
    if !min.converged {
        warn!(
            interval = t,
            iterations = min.iterations,
            "cost-rate search stopped without converging"
        );
    }
    Ok((t, min.converged))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn fit(shape: f64, scale: f64) -> DistributionFit {
        DistributionFit {
            shape,
            scale,
            log_likelihood: 0.0,
            converged: true,
            iterations: 1,
            n_failures: 10,
            n_censored: 0,
            covariance: None,
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn higher_target_gives_shorter_interval(
            shape in 0.3_f64..8.0,
            scale in 1.0_f64..1e5,
            a in 0.01_f64..0.98,
            gap in 0.005_f64..0.01,
        ) {
            let f = fit(shape, scale);
            let lo = plan_maintenance(&f, &PlanConfig::reliability_target(a)).expect("valid");
            let hi = plan_maintenance(&f, &PlanConfig::reliability_target(a + gap)).expect("valid");
            prop_assert!(hi.recommended_interval < lo.recommended_interval);
        }

        #[test]
        fn reliability_at_interval_hits_target(
            shape in 0.3_f64..8.0,
            scale in 1.0_f64..1e5,
            target in 0.01_f64..0.99,
        ) {
            let s = plan_maintenance(&fit(shape, scale), &PlanConfig::reliability_target(target))
                .expect("valid");
            prop_assert!((s.reliability_at_interval - target).abs() < 1e-6);
            prop_assert!(s.recommended_interval > 0.0);
        }
    }
}
