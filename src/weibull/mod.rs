//! Weibull model and its estimation from right-censored data.
//!
//! # Modules
//!
//! - [`fit`] — censored maximum likelihood over (β, η)
//! - [`weibull_mrr`] — median rank regression via Bernard's approximation,
//!   used as the starting point for [`fit`]
//! - [`probability_plot`] — linearized plot coordinates of the failures
//! - [`Weibull`] — R(t), hazard rate, MTBF, B-life from fitted parameters
//!
//! # References
//!
//! - Abernethy, R.B. (2006). *The New Weibull Handbook*, 5th ed.
//! - Meeker, W.Q. & Escobar, L.A. (1998). *Statistical Methods for Reliability Data*.

mod mle;
mod mrr;
mod reliability;

pub use mle::{
    fit, fit_with, weibull_log_likelihood, DistributionFit, FitConfig, InitialGuess, DEFAULT_SHAPE_RANGE,
    MIN_PARAMETER,
};
pub use mrr::{median_rank, probability_plot, weibull_mrr, PlotPoint, WeibullMrrResult};
pub use reliability::Weibull;
