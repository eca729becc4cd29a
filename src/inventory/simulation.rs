//! Monte-Carlo check of a (Q, R) policy against random lead-time demand.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal, Poisson};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{InventoryConfig, InventoryPolicy};
use crate::error::{ReliabilityError, Result};

/// Relative gap below which demand variance is treated as equal to the mean.
const POISSON_MATCH: f64 = 1e-9;

/// Simulated performance of a policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub runs: usize,
    /// Fraction of replenishment cycles without a stockout.
    pub service_level: f64,
    pub stockout_probability: f64,
    /// Mean of `Q/2 + max(ROP − lead-time demand, 0)` over the runs.
    pub average_inventory: f64,
}

enum LeadTimeDemand {
    Poisson(Poisson<f64>),
    Normal(Normal<f64>),
}

impl LeadTimeDemand {
    fn new(config: &InventoryConfig) -> Result<Self> {
        let mean = config.demand_mean * config.lead_time;
        let variance = config.demand_variance * config.lead_time;
        if (variance - mean).abs() <= POISSON_MATCH * mean.max(1.0) {
            Poisson::new(mean)
                .map(Self::Poisson)
                .map_err(|e| ReliabilityError::config("demand_mean", e.to_string()))
        } else {
            Normal::new(mean, variance.sqrt())
                .map(Self::Normal)
                .map_err(|e| ReliabilityError::config("demand_variance", e.to_string()))
        }
    }

    fn sample(&self, rng: &mut StdRng) -> f64 {
        match self {
            Self::Poisson(d) => d.sample(rng),
            Self::Normal(d) => d.sample(rng).max(0.0),
        }
    }
}

/// Replays `runs` replenishment cycles with lead-time demand drawn from a
/// Poisson law when the variance matches the mean, otherwise from a Normal
/// truncated at zero.
///
/// The same `seed` always reproduces the same report.
///
/// # Errors
/// [`ReliabilityError::InvalidConfiguration`] for zero runs or an invalid
/// `config`.
///
/// # Examples
///
/// ```
/// use u_reliability::inventory::{optimize_inventory, simulate_policy, InventoryConfig};
///
/// let config = InventoryConfig {
///     demand_mean: 30.0,
///     demand_variance: 30.0,
///     service_level: 0.95,
///     ..InventoryConfig::default()
/// };
/// let policy = optimize_inventory(&config).unwrap();
/// let report = simulate_policy(&policy, &config, 5000, 7).unwrap();
/// assert!(report.service_level > 0.9);
/// ```
pub fn simulate_policy(
    policy: &InventoryPolicy,
    config: &InventoryConfig,
    runs: usize,
    seed: u64,
) -> Result<SimulationReport> {
    if runs == 0 {
        return Err(ReliabilityError::config("runs", "must be at least 1"));
    }
    config.validate()?;

    let demand = LeadTimeDemand::new(config)?;
    let mut rng = StdRng::seed_from_u64(seed);

    let mut stockouts = 0usize;
    let mut inventory = 0.0;
    for _ in 0..runs {
        let d = demand.sample(&mut rng);
        if d > policy.reorder_point {
            stockouts += 1;
        }
        inventory += policy.order_quantity / 2.0 + (policy.reorder_point - d).max(0.0);
    }

    let stockout_probability = stockouts as f64 / runs as f64;
    debug!(runs, seed, stockout_probability, "inventory policy simulated");

    Ok(SimulationReport {
        runs,
        service_level: 1.0 - stockout_probability,
        stockout_probability,
        average_inventory: inventory / runs as f64,
    })
}
