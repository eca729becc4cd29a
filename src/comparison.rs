//! Model comparison by information criteria.
//!
//! Ranks fits by Akaike and Bayesian information criteria,
//!
//! ```text
//! AIC = 2k − 2·LL
//! BIC = k·ln(n) − 2·LL
//! ```
//!
//! and uses them to decide whether groups should share one Weibull model or
//! be modelled separately, and which lifetime family describes a sample best.
//!
//! # References
//!
//! - Akaike, H. (1974). "A new look at the statistical model identification",
//!   *IEEE Transactions on Automatic Control* 19(6), pp. 716-723.
//! - Burnham, K.P. & Anderson, D.R. (2002). *Model Selection and Multimodel
//!   Inference*, 2nd ed.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ReliabilityError, Result};
use crate::lifetime::{Exponential, Family, LifetimeDistribution, Lognormal};
use crate::observation::{validate_fittable, LifetimeObservation};
use crate::weibull::{fit, DistributionFit, FitConfig, Weibull};

/// Parameters of the two-parameter Weibull.
const WEIBULL_PARAMETERS: usize = 2;

fn aic(k: usize, log_likelihood: f64) -> f64 {
    2.0 * k as f64 - 2.0 * log_likelihood
}

fn bic(k: usize, n: usize, log_likelihood: f64) -> f64 {
    k as f64 * (n as f64).ln() - 2.0 * log_likelihood
}

/// Akaike weights `exp(−Δᵢ/2) / Σ exp(−Δⱼ/2)` from AIC differences.
fn akaike_weights(deltas: &[f64]) -> Vec<f64> {
    let raw: Vec<f64> = deltas.iter().map(|d| (-0.5 * d).exp()).collect();
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|w| w / total).collect()
}

/// One fit's position in a [`Comparison`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFit {
    /// Index into the slice passed to [`compare`].
    pub fit_index: usize,
    pub aic: f64,
    pub bic: f64,
    /// AIC minus the smallest AIC.
    pub delta_aic: f64,
    /// BIC minus the smallest BIC.
    pub delta_bic: f64,
    pub akaike_weight: f64,
    pub converged: bool,
}

/// Criterion differences between two fits, `first − second`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseDelta {
    pub first: usize,
    pub second: usize,
    pub delta_aic: f64,
    pub delta_bic: f64,
}

/// Outcome of [`compare`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Ascending AIC; ties keep input order.
    pub ranking: Vec<RankedFit>,
    /// Every pair `first < second`, in input order.
    pub pairwise: Vec<PairwiseDelta>,
}

impl Comparison {
    /// The fit with the smallest AIC.
    pub fn best(&self) -> Option<&RankedFit> {
        self.ranking.first()
    }
}

/// Ranks Weibull fits by AIC, with BIC computed over `sample_sizes`.
///
/// # Errors
/// [`ReliabilityError::InvalidInput`] for fewer than two fits, a length
/// mismatch between `fits` and `sample_sizes`, or a zero sample size.
///
/// # Examples
///
/// ```
/// use u_reliability::comparison::compare;
/// use u_reliability::weibull::DistributionFit;
///
/// let make = |ll: f64| DistributionFit {
///     shape: 2.0,
///     scale: 100.0,
///     log_likelihood: ll,
///     converged: true,
///     iterations: 10,
///     n_failures: 20,
///     n_censored: 0,
///     covariance: None,
/// };
/// let result = compare(&[make(-120.0), make(-110.0)], &[20, 20]).unwrap();
/// assert_eq!(result.best().unwrap().fit_index, 1);
/// assert!((result.ranking[1].delta_aic - 20.0).abs() < 1e-12);
/// ```
pub fn compare(fits: &[DistributionFit], sample_sizes: &[usize]) -> Result<Comparison> {
    if fits.len() < 2 {
        return Err(ReliabilityError::input(
            "fits",
            format!("need at least 2 fits to compare, got {}", fits.len()),
        ));
    }
    if fits.len() != sample_sizes.len() {
        return Err(ReliabilityError::input(
            "sample_sizes",
            format!("{} sizes for {} fits", sample_sizes.len(), fits.len()),
        ));
    }
    if let Some(i) = sample_sizes.iter().position(|&n| n == 0) {
        return Err(ReliabilityError::input(format!("sample_sizes[{i}]"), "must be positive"));
    }

    let aics: Vec<f64> = fits
        .iter()
        .map(|f| aic(WEIBULL_PARAMETERS, f.log_likelihood))
        .collect();
    let bics: Vec<f64> = fits
        .iter()
        .zip(sample_sizes)
        .map(|(f, &n)| bic(WEIBULL_PARAMETERS, n, f.log_likelihood))
        .collect();

    let min_aic = aics.iter().copied().fold(f64::INFINITY, f64::min);
    let min_bic = bics.iter().copied().fold(f64::INFINITY, f64::min);
    let deltas: Vec<f64> = aics.iter().map(|a| a - min_aic).collect();
    let weights = akaike_weights(&deltas);

    let mut ranking: Vec<RankedFit> = (0..fits.len())
        .map(|i| RankedFit {
            fit_index: i,
            aic: aics[i],
            bic: bics[i],
            delta_aic: deltas[i],
            delta_bic: bics[i] - min_bic,
            akaike_weight: weights[i],
            converged: fits[i].converged,
        })
        .collect();
    ranking.sort_by(|a, b| a.aic.total_cmp(&b.aic));

    let mut pairwise = Vec::with_capacity(fits.len() * (fits.len() - 1) / 2);
    for i in 0..fits.len() {
        for j in (i + 1)..fits.len() {
            pairwise.push(PairwiseDelta {
                first: i,
                second: j,
                delta_aic: aics[i] - aics[j],
                delta_bic: bics[i] - bics[j],
            });
        }
    }

    Ok(Comparison { ranking, pairwise })
}

/// Fits every group independently, in parallel.
///
/// Results keep the order of `groups` and equal what sequential calls to
/// [`fit`] would return.
pub fn fit_groups<G>(groups: &[G], config: &FitConfig) -> Vec<Result<DistributionFit>>
where
    G: AsRef<[LifetimeObservation]> + Sync,
{
    groups.par_iter().map(|g| fit(g.as_ref(), config)).collect()
}

/// Pooled versus separate Weibull models for a set of groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolingAssessment {
    /// One model over all observations (k = 2).
    pub pooled: DistributionFit,
    /// One model per group (k = 2 per group).
    pub separate: Vec<DistributionFit>,
    pub pooled_aic: f64,
    pub separate_aic: f64,
    pub pooled_bic: f64,
    pub separate_bic: f64,
}

impl PoolingAssessment {
    /// AIC favours one shared model.
    pub fn aic_prefers_pooling(&self) -> bool {
        self.pooled_aic <= self.separate_aic
    }

    /// BIC favours one shared model.
    pub fn bic_prefers_pooling(&self) -> bool {
        self.pooled_bic <= self.separate_bic
    }
}

/// Decides whether groups can share one Weibull model.
///
/// # Errors
/// [`ReliabilityError::InvalidInput`] for fewer than two groups, or the
/// first error from fitting any group or the pooled sample.
pub fn assess_pooling<G>(groups: &[G], config: &FitConfig) -> Result<PoolingAssessment>
where
    G: AsRef<[LifetimeObservation]> + Sync,
{
    if groups.len() < 2 {
        return Err(ReliabilityError::input(
            "groups",
            format!("need at least 2 groups, got {}", groups.len()),
        ));
    }

    let separate = fit_groups(groups, config)
        .into_iter()
        .collect::<Result<Vec<_>>>()?;
    let all: Vec<LifetimeObservation> = groups
        .iter()
        .flat_map(|g| g.as_ref().iter().copied())
        .collect();
    let pooled = fit(&all, config)?;

    let n = all.len();
    let k_separate = WEIBULL_PARAMETERS * separate.len();
    let separate_ll: f64 = separate.iter().map(|f| f.log_likelihood).sum();

    let assessment = PoolingAssessment {
        pooled_aic: aic(WEIBULL_PARAMETERS, pooled.log_likelihood),
        separate_aic: aic(k_separate, separate_ll),
        pooled_bic: bic(WEIBULL_PARAMETERS, n, pooled.log_likelihood),
        separate_bic: bic(k_separate, n, separate_ll),
        pooled,
        separate,
    };
    debug!(
        groups = groups.len(),
        pooled_aic = assessment.pooled_aic,
        separate_aic = assessment.separate_aic,
        "pooling assessed"
    );
    Ok(assessment)
}

/// A fitted model of any supported family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "family")]
pub enum FittedModel {
    Weibull(Weibull),
    Exponential(Exponential),
    Lognormal(Lognormal),
}

impl FittedModel {
    pub fn family(&self) -> Family {
        self.distribution().family()
    }

    pub fn distribution(&self) -> &dyn LifetimeDistribution {
        match self {
            Self::Weibull(m) => m,
            Self::Exponential(m) => m,
            Self::Lognormal(m) => m,
        }
    }
}

/// One family's fit in [`compare_families`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyFit {
    pub model: FittedModel,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    pub delta_aic: f64,
    pub akaike_weight: f64,
    pub converged: bool,
}

/// Fits Weibull, exponential and lognormal models to the same censored
/// sample and ranks them by AIC.
///
/// # Errors
/// Invalid observations or fewer than three failures.
pub fn compare_families(observations: &[LifetimeObservation], config: &FitConfig) -> Result<Vec<FamilyFit>> {
    let counts = validate_fittable(observations)?;
    let n = counts.total();

    let weibull = fit(observations, config)?;
    let exponential = Exponential::fit_censored(observations)?;
    let lognormal = Lognormal::fit_censored(observations, &config.optimizer())?;

    let candidates = [
        (
            FittedModel::Weibull(weibull.model()?),
            weibull.log_likelihood,
            weibull.converged,
        ),
        (
            FittedModel::Exponential(exponential.model),
            exponential.log_likelihood,
            exponential.converged,
        ),
        (
            FittedModel::Lognormal(lognormal.model),
            lognormal.log_likelihood,
            lognormal.converged,
        ),
    ];

    let aics: Vec<f64> = candidates
        .iter()
        .map(|(m, ll, _)| aic(m.distribution().parameter_count(), *ll))
        .collect();
    let min_aic = aics.iter().copied().fold(f64::INFINITY, f64::min);
    let deltas: Vec<f64> = aics.iter().map(|a| a - min_aic).collect();
    let weights = akaike_weights(&deltas);

    let mut ranked: Vec<FamilyFit> = candidates
        .into_iter()
        .enumerate()
        .map(|(i, (model, log_likelihood, converged))| FamilyFit {
            bic: bic(model.distribution().parameter_count(), n, log_likelihood),
            model,
            log_likelihood,
            aic: aics[i],
            delta_aic: deltas[i],
            akaike_weight: weights[i],
            converged,
        })
        .collect();
    ranked.sort_by(|a, b| a.aic.total_cmp(&b.aic));
    Ok(ranked)
}
