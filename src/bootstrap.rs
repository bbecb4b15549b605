use crate::autocorr::{thinning_stride, AutocorrEstimator};
use crate::chains::ChainAccessor;
use crate::error::EvidenceError;
use crate::utils::mean;
use crate::{Array1, Array2};
use anyhow::{anyhow, Error, Result};
use rand::Rng;

/// Fraction of the thinned chain drawn in each bootstrap realization.
pub const SUBSAMPLE_FRACTION: f64 = 0.1;

/// Bootstrap subsample size for a chain with `thinned` nearly independent samples.
pub fn subsample_size(thinned: usize) -> Result<usize, Error> {
    let size = (SUBSAMPLE_FRACTION * thinned as f64).floor() as usize;
    if size == 0 {
        return Err(EvidenceError::EmptySubsample { thinned }.into());
    }
    Ok(size)
}

/// Draw `num_reals` realizations of `num_samples` values each, uniformly and
/// with replacement from `arr`.
pub fn resample<R>(
    arr: &[f64],
    num_reals: usize,
    num_samples: usize,
    rng: &mut R,
) -> Result<Array2, Error>
where
    R: Rng + ?Sized,
{
    if arr.is_empty() {
        return Err(anyhow!("Can't resample an empty array"));
    }
    Ok((0..num_reals)
        .map(|_| {
            (0..num_samples)
                .map(|_| arr[rng.random_range(0..arr.len())])
                .collect()
        })
        .collect())
}

/// Means of `num_reals` with-replacement subsamples of size `num_samples`.
pub fn resampled_means<R>(
    arr: &[f64],
    num_reals: usize,
    num_samples: usize,
    rng: &mut R,
) -> Result<Array1, Error>
where
    R: Rng + ?Sized,
{
    if num_samples == 0 {
        return Err(anyhow!("Can't take mean of empty subsample"));
    }
    resample(arr, num_reals, num_samples, rng)?
        .iter()
        .map(|draws| mean(draws))
        .collect()
}

/// Bootstrap a single parameter.
///
/// The parameter is thinned by its own integrated autocorrelation time, and
/// `num_reals` subsamples of `num_samples` draws are taken from the nearly
/// independent remainder. Summarize the rows (e.g. mean and standard
/// deviation) for an uncertainty estimate; it is worth checking that their
/// histogram looks like a histogram before trusting `num_samples`.
pub fn bootstrap<C, E, R>(
    chains: &C,
    param: &str,
    num_reals: usize,
    num_samples: usize,
    estimator: &E,
    rng: &mut R,
) -> Result<Array2, Error>
where
    C: ChainAccessor + ?Sized,
    E: AutocorrEstimator + ?Sized,
    R: Rng + ?Sized,
{
    let stride = thinning_stride(estimator, &chains.get_param(param, 1)?)?;
    let thinned = chains.get_param(param, stride)?;
    log::debug!(
        "bootstrapping '{}' from {} samples (stride {})",
        param,
        thinned.len(),
        stride
    );
    resample(&thinned, num_reals, num_samples, rng)
}
