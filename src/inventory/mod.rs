//! Spare-parts inventory: order quantity, safety stock, reorder point.
//!
//! A continuous-review (Q, R) policy:
//!
//! ```text
//! Q   = √(2·D·S / (h·c))          economic order quantity
//! SS  = max(z_SL · √(Var·L), 0)   safety stock
//! ROP = D·L + SS                  reorder point
//! ```
//!
//! with demand `D` and its variance `Var` per period, lead time `L` in
//! periods, ordering cost `S`, holding rate `h` per period and unit cost `c`.
//! Demand can be supplied directly or derived from a fitted lifetime model
//! through [`DemandEstimate`].
//!
//! # References
//!
//! - Harris, F.W. (1913). "How Many Parts to Make at Once", *Factory* 10(2).
//! - Silver, E.A., Pyke, D.F. & Thomas, D.J. (2017). *Inventory and
//!   Production Management in Supply Chains*, 4th ed.

mod demand;
mod simulation;

pub use demand::{DemandEstimate, DemandVariability, DEFAULT_DEMAND_CV};
pub use simulation::{simulate_policy, SimulationReport};

use serde::{Deserialize, Serialize};
use tracing::debug;
use u_numflow::special::inverse_normal_cdf;

use crate::error::{require_open_unit, require_positive, ReliabilityError, Result};

/// Inputs of [`optimize_inventory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Demand per period.
    pub demand_mean: f64,
    /// Variance of demand per period.
    pub demand_variance: f64,
    /// Fixed cost per order.
    pub ordering_cost: f64,
    /// Holding cost per period as a fraction of unit cost.
    pub holding_rate: f64,
    pub unit_cost: f64,
    /// Probability of no stockout during a replenishment cycle, in (0, 1).
    pub service_level: f64,
    /// Replenishment lead time in periods.
    pub lead_time: f64,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            demand_mean: 0.0,
            demand_variance: 0.0,
            ordering_cost: 50.0,
            holding_rate: 0.2,
            unit_cost: 1000.0,
            service_level: 0.95,
            lead_time: 1.0,
        }
    }
}

impl InventoryConfig {
    /// Takes demand mean and variance from a failure-driven estimate.
    pub fn with_demand(mut self, demand: &DemandEstimate) -> Self {
        self.demand_mean = demand.mean;
        self.demand_variance = demand.variance;
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_positive("demand_mean", self.demand_mean)?;
        if !(self.demand_variance.is_finite() && self.demand_variance >= 0.0) {
            return Err(ReliabilityError::config(
                "demand_variance",
                format!("must be finite and non-negative, got {}", self.demand_variance),
            ));
        }
        require_positive("ordering_cost", self.ordering_cost)?;
        require_positive("holding_rate", self.holding_rate)?;
        require_positive("unit_cost", self.unit_cost)?;
        require_open_unit("service_level", self.service_level)?;
        require_positive("lead_time", self.lead_time)?;
        Ok(())
    }
}

/// Recommended (Q, R) policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryPolicy {
    pub order_quantity: f64,
    pub safety_stock: f64,
    pub reorder_point: f64,
    pub service_level: f64,
    /// Expected demand during the lead time.
    pub lead_time_demand: f64,
    pub expected_orders_per_period: f64,
    /// Holding plus ordering cost per period.
    pub total_cost_per_period: f64,
}

/// Whole-unit quantities, each rounded up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WholeUnits {
    pub order_quantity: u64,
    pub safety_stock: u64,
    pub reorder_point: u64,
}

impl InventoryPolicy {
    /// Rounds every quantity up to whole parts.
    pub fn whole_units(&self) -> WholeUnits {
        WholeUnits {
            order_quantity: self.order_quantity.ceil() as u64,
            safety_stock: self.safety_stock.ceil() as u64,
            reorder_point: self.reorder_point.ceil() as u64,
        }
    }
}

/// Computes the (Q, R) policy for `config`.
///
/// Safety stock is clamped at zero, which only matters for service levels
/// below one half.
///
/// # Errors
/// [`ReliabilityError::InvalidConfiguration`] naming the first field out of
/// range (non-positive demand, costs, holding rate or lead time; service level
/// outside (0, 1); negative variance).
///
/// # Examples
///
/// ```
/// use u_reliability::inventory::{optimize_inventory, InventoryConfig};
///
/// let config = InventoryConfig {
///     demand_mean: 1000.0,
///     demand_variance: 400.0,
///     ordering_cost: 50.0,
///     holding_rate: 0.2,
///     unit_cost: 10.0,
///     service_level: 0.95,
///     lead_time: 1.0,
/// };
/// let policy = optimize_inventory(&config).unwrap();
/// // √(2·1000·50 / (0.2·10)) = √50000
/// assert!((policy.order_quantity - 50_000f64.sqrt()).abs() < 1e-9);
/// assert!((policy.safety_stock - 1.6449 * 20.0).abs() < 1e-2);
/// assert!((policy.reorder_point - (1000.0 + policy.safety_stock)).abs() < 1e-9);
/// ```
pub fn optimize_inventory(config: &InventoryConfig) -> Result<InventoryPolicy> {
    config.validate()?;

    let holding = config.holding_rate * config.unit_cost;
    let order_quantity = (2.0 * config.demand_mean * config.ordering_cost / holding).sqrt();

    let z = inverse_normal_cdf(config.service_level);
    let lead_time_demand = config.demand_mean * config.lead_time;
    let safety_stock = (z * (config.demand_variance * config.lead_time).sqrt()).max(0.0);
    let reorder_point = lead_time_demand + safety_stock;

    let expected_orders_per_period = config.demand_mean / order_quantity;
    let total_cost_per_period =
        (order_quantity / 2.0 + safety_stock) * holding + expected_orders_per_period * config.ordering_cost;

    debug!(
        order_quantity,
        safety_stock,
        reorder_point,
        service_level = config.service_level,
        "inventory policy computed"
    );

    Ok(InventoryPolicy {
        order_quantity,
        safety_stock,
        reorder_point,
        service_level: config.service_level,
        lead_time_demand,
        expected_orders_per_period,
        total_cost_per_period,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn doubling_demand_scales_eoq_by_sqrt2(
            demand in 0.01_f64..1e6,
            variance in 0.0_f64..1e4,
            ordering in 0.1_f64..1e4,
            holding in 0.01_f64..1.0,
            unit_cost in 0.1_f64..1e5,
            service in 0.5_f64..0.999,
        ) {
            let base = InventoryConfig {
                demand_mean: demand,
                demand_variance: variance,
                ordering_cost: ordering,
                holding_rate: holding,
                unit_cost,
                service_level: service,
                lead_time: 1.0,
            };
            let doubled = InventoryConfig { demand_mean: 2.0 * demand, ..base.clone() };
            let q1 = optimize_inventory(&base).expect("valid").order_quantity;
            let q2 = optimize_inventory(&doubled).expect("valid").order_quantity;
            prop_assert!((q2 / q1 - std::f64::consts::SQRT_2).abs() < 1e-12);
        }

        #[test]
        fn quantities_are_non_negative(
            demand in 0.01_f64..1e6,
            variance in 0.0_f64..1e6,
            service in 0.001_f64..0.999,
            lead_time in 0.01_f64..10.0,
        ) {
            let policy = optimize_inventory(&InventoryConfig {
                demand_mean: demand,
                demand_variance: variance,
                service_level: service,
                lead_time,
                ..InventoryConfig::default()
            })
            .expect("valid");
            prop_assert!(policy.order_quantity > 0.0);
            prop_assert!(policy.safety_stock >= 0.0);
            prop_assert!(policy.reorder_point >= policy.lead_time_demand);
        }
    }
}
