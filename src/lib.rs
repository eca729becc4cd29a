//! # u-reliability
//!
//! Lifetime-data analysis for maintenance and spare-parts planning: Weibull
//! fitting under right-censoring, parameter uncertainty, preventive-maintenance
//! intervals, and reorder policies.
//!
//! Every operation is a pure function of its inputs and configuration. The
//! crate holds no state between calls and performs no I/O.
//!
//! ## Modules
//!
//! - [`observation`] — Failure and suspension records, input validation
//! - [`weibull`] — Censored maximum likelihood, median rank regression, the Weibull model
//! - [`uncertainty`] — Observed information, covariance, delta-method confidence bands
//! - [`maintenance`] — PM intervals (reliability target, fraction of life, cost optimal)
//! - [`inventory`] — EOQ, safety stock, reorder point, failure-driven demand
//! - [`comparison`] — AIC/BIC ranking, pooling decisions, family selection
//! - [`lifetime`] — Distribution abstraction with exponential and lognormal families
//! - [`optimize`] — Pluggable minimizers (Nelder-Mead, golden section)
//!
//! ## Example
//!
//! ```
//! use u_reliability::maintenance::{plan_maintenance, PlanConfig};
//! use u_reliability::observation::LifetimeObservation;
//! use u_reliability::weibull::{fit, FitConfig};
//!
//! let data: Vec<LifetimeObservation> = [410.0, 620.0, 770.0, 880.0, 990.0, 1120.0, 1250.0, 1430.0]
//!     .iter()
//!     .map(|&t| LifetimeObservation::failure(t))
//!     .chain([LifetimeObservation::censored(1500.0), LifetimeObservation::censored(1500.0)])
//!     .collect();
//!
//! let result = fit(&data, &FitConfig::default()).unwrap();
//! let plan = plan_maintenance(&result, &PlanConfig::reliability_target(0.9)).unwrap();
//! assert!(plan.recommended_interval < result.scale);
//! assert!((plan.reliability_at_interval - 0.9).abs() < 1e-6);
//! ```
//!
//! ## Design Philosophy
//!
//! - **Failures are values**: non-convergence and non-identifiability are
//!   flags on the result, not errors
//! - **Distribution-agnostic planning**: planners accept any [`lifetime::LifetimeDistribution`]
//! - **Research-backed**: All algorithms reference academic literature

pub mod comparison;
pub mod error;
pub mod inventory;
pub mod lifetime;
pub mod maintenance;
pub mod observation;
pub mod optimize;
pub mod uncertainty;
pub mod weibull;

pub use error::{ReliabilityError, Result};
pub use observation::LifetimeObservation;
