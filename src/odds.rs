use crate::autocorr::{thin, thinning_stride, AutocorrEstimator};
use crate::bootstrap::{resample, subsample_size};
use crate::chains::ChainAccessor;
use crate::utils::mean_and_std;
use crate::Array1;
use anyhow::{Error, Result};
use rand::Rng;

/// Name of the model index parameter in a product-space chain.
pub const MODEL_INDEX_PARAM: &str = "nmodel";

/// Half-open interval `(low, high]` of model index values belonging to one model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub low: f64,
    pub high: f64,
}

impl Domain {
    pub fn new(low: f64, high: f64) -> Self {
        Domain { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        value > self.low && value <= self.high
    }

    /// Number of samples falling in this domain.
    pub fn count(&self, samples: &[f64]) -> usize {
        samples.iter().filter(|v| self.contains(**v)).count()
    }
}

/// Settings for [`odds_ratio_bootstrap`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OddsRatioConfig {
    /// Bootstrap realizations.
    pub num_reals: usize,
    /// The odds ratio is (samples in `domains[0]`) / (samples in `domains[1]`).
    pub domains: [Domain; 2],
}

impl Default for OddsRatioConfig {
    fn default() -> Self {
        OddsRatioConfig {
            num_reals: 2000,
            domains: [Domain::new(-0.5, 0.5), Domain::new(0.5, 1.5)],
        }
    }
}

impl OddsRatioConfig {
    pub fn with_num_reals(mut self, num_reals: usize) -> Self {
        self.num_reals = num_reals;
        self
    }

    pub fn with_domains(mut self, numerator: Domain, denominator: Domain) -> Self {
        self.domains = [numerator, denominator];
        self
    }

    /// Swap numerator and denominator, giving the inverse odds ratio.
    pub fn reversed(mut self) -> Self {
        self.domains.swap(0, 1);
        self
    }
}

/// Bootstrap the product-space odds ratio between two models of a hypermodel
/// chain.
///
/// The model index chain is thinned by its integrated autocorrelation time to
/// size the subsamples (a tenth of the thinned length); each realization draws
/// that many values with replacement from the full chain and takes the ratio of
/// counts in the two domains. A realization with no samples in the second
/// domain gives an infinite (or NaN) ratio, which carries into the result.
///
/// Returns the mean and standard deviation of the ratios.
pub fn odds_ratio_bootstrap<C, E, R>(
    hypermodel: &C,
    config: &OddsRatioConfig,
    estimator: &E,
    rng: &mut R,
) -> Result<(f64, f64), Error>
where
    C: ChainAccessor + ?Sized,
    E: AutocorrEstimator + ?Sized,
    R: Rng + ?Sized,
{
    let nmodel = hypermodel.get_param(MODEL_INDEX_PARAM, 1)?;
    let stride = thinning_stride(estimator, &nmodel)?;
    let num_samples = subsample_size(thin(&nmodel, stride).len())?;
    log::debug!(
        "odds ratio: stride {}, subsample size {}, {} realizations",
        stride,
        num_samples,
        config.num_reals
    );

    let [numerator, denominator] = config.domains;
    let ratios: Array1 = resample(&nmodel, config.num_reals, num_samples, rng)?
        .iter()
        .map(|draws| numerator.count(draws) as f64 / denominator.count(draws) as f64)
        .collect();
    mean_and_std(&ratios)
}
