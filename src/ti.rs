use crate::autocorr::{thin, thinning_stride, AutocorrEstimator};
use crate::bootstrap::{resampled_means, subsample_size};
use crate::chains::{make_betalike, BetaLikelihood, ChainAccessor, MemoryChains};
use crate::error::EvidenceError;
use crate::utils::{interp_linear, linspace, mean_and_std, trapezoid};
use crate::{Array1, Array2};
use anyhow::{Error, Result};
use rand::Rng;

/// Fewest points the trapezoidal rule can integrate over.
const MIN_GRID_POINTS: usize = 2;

/// Temperatures at or above this are treated as the infinite-temperature
/// ("hot") chain that some samplers add to the ladder.
pub const HOT_CHAIN_TEMPERATURE: f64 = 1e80;

/// Settings for [`ti_log_evidence`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiConfig {
    /// Bootstrap realizations used for the error estimate.
    pub iterations: usize,
    /// Points in the log10(inverse temperature) interpolation grid.
    pub grid_points: usize,
    /// Drop chains at [`HOT_CHAIN_TEMPERATURE`] or above before integrating.
    pub remove_hot: bool,
    /// Log the result at info level.
    pub verbose: bool,
}

impl Default for TiConfig {
    fn default() -> Self {
        TiConfig {
            iterations: 2000,
            grid_points: 10_000,
            remove_hot: false,
            verbose: false,
        }
    }
}

impl TiConfig {
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_grid_points(mut self, grid_points: usize) -> Self {
        self.grid_points = grid_points;
        self
    }

    pub fn with_remove_hot(mut self, remove_hot: bool) -> Self {
        self.remove_hot = remove_hot;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Natural log of the evidence and its bootstrap standard deviation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvidenceEstimate {
    pub ln_z: f64,
    pub uncertainty: f64,
}

/// Everything computed along the way to an [`EvidenceEstimate`], for
/// diagnostics and plotting.
#[derive(Debug, Clone, PartialEq)]
pub struct TiRun {
    /// Ascending inverse temperatures.
    pub inv_temps: Array1,
    /// Bootstrap means of beta * ln(likelihood); one row per realization, one
    /// column per entry of `inv_temps`.
    pub realization_means: Array2,
    /// ln(evidence) of each realization.
    pub ln_z_samples: Array1,
    pub estimate: EvidenceEstimate,
}

/// Bootstrap the mean beta * ln(likelihood) at each temperature.
///
/// For each of the first `num_chains` columns the integrated autocorrelation
/// time sets how many nearly independent samples there are; a tenth of that
/// many draws (with replacement, from the full column) make up each of the
/// `num_reals` realizations.
///
/// The ladder is assembled in ascending temperature, so columns are returned
/// in reverse order to line up with ascending inverse temperature. Rows are
/// realizations.
pub fn ti_bootstrap<E, R>(
    betalike: &BetaLikelihood,
    num_chains: usize,
    num_reals: usize,
    estimator: &E,
    rng: &mut R,
) -> Result<Array2, Error>
where
    E: AutocorrEstimator + ?Sized,
    R: Rng + ?Sized,
{
    if num_chains > betalike.num_temps() {
        return Err(EvidenceError::TooManyChains {
            requested: num_chains,
            available: betalike.num_temps(),
        }
        .into());
    }

    let mut column_means: Array2 = Vec::with_capacity(num_chains);
    for i in 0..num_chains {
        let column = betalike.column(i);
        let stride = thinning_stride(estimator, column)?;
        let thinned = thin(column, stride);
        let num_samples = subsample_size(thinned.len())?;
        log::debug!(
            "temperature column {}: stride {}, {} thinned samples, subsample size {}",
            i,
            stride,
            thinned.len(),
            num_samples
        );
        // sized by the thinned chain but drawn from the full one
        column_means.push(resampled_means(column, num_reals, num_samples, rng)?);
    }

    Ok((0..num_reals)
        .map(|r| column_means.iter().rev().map(|means| means[r]).collect())
        .collect())
}

/// ln(evidence) of one realization of the mean beta * ln(likelihood) curve.
///
/// The curve is linearly interpolated on an even grid in log10(inverse
/// temperature), which keeps resolution where a geometric ladder is sparse,
/// then integrated over inverse temperature with the trapezoidal rule.
pub fn integrate_realization(
    inv_temps: &[f64],
    means: &[f64],
    grid_points: usize,
) -> Result<f64, Error> {
    if inv_temps.len() < 2 {
        return Err(EvidenceError::TooFewTemperatures {
            available: inv_temps.len(),
            required: 2,
        }
        .into());
    }
    if grid_points < MIN_GRID_POINTS {
        return Err(EvidenceError::TooFewGridPoints {
            available: grid_points,
            required: MIN_GRID_POINTS,
        }
        .into());
    }
    let x: Array1 = inv_temps.iter().map(|b| b.log10()).collect();
    let x_new = linspace(x[0], x[x.len() - 1], grid_points);
    let y_new = interp_linear(&x, means, &x_new)?;
    let beta: Array1 = x_new.iter().map(|v| 10f64.powf(*v)).collect();
    trapezoid(&y_new, &beta)
}

/// Estimate ln(evidence) by thermodynamic integration over the
/// parallel-tempered chains in `chains`, whose parameters are named by their
/// temperatures in ascending order.
pub fn ti_log_evidence<C, E, R>(
    chains: &C,
    config: &TiConfig,
    estimator: &E,
    rng: &mut R,
) -> Result<EvidenceEstimate, Error>
where
    C: ChainAccessor + ?Sized,
    E: AutocorrEstimator + ?Sized,
    R: Rng + ?Sized,
{
    Ok(ti_log_evidence_detailed(chains, config, estimator, rng)?.estimate)
}

/// As [`ti_log_evidence`], also returning the realizations behind the estimate.
pub fn ti_log_evidence_detailed<C, E, R>(
    chains: &C,
    config: &TiConfig,
    estimator: &E,
    rng: &mut R,
) -> Result<TiRun, Error>
where
    C: ChainAccessor + ?Sized,
    E: AutocorrEstimator + ?Sized,
    R: Rng + ?Sized,
{
    if config.grid_points < MIN_GRID_POINTS {
        return Err(EvidenceError::TooFewGridPoints {
            available: config.grid_points,
            required: MIN_GRID_POINTS,
        }
        .into());
    }
    let (temps, betalike) = make_betalike(chains)?;
    let (temps, betalike) = if config.remove_hot {
        drop_hot_chains(&temps, &betalike)?
    } else {
        (temps, betalike)
    };

    if temps.len() < 2 {
        return Err(EvidenceError::TooFewTemperatures {
            available: temps.len(),
            required: 2,
        }
        .into());
    }
    let inv_temps: Array1 = temps.iter().rev().map(|t| 1.0 / t).collect();
    if inv_temps.windows(2).any(|w| w[1] <= w[0]) {
        return Err(EvidenceError::InverseTemperatureOrder.into());
    }

    let realization_means = ti_bootstrap(
        &betalike,
        inv_temps.len(),
        config.iterations,
        estimator,
        rng,
    )?;
    let ln_z_samples = realization_means
        .iter()
        .map(|means| integrate_realization(&inv_temps, means, config.grid_points))
        .collect::<Result<Array1, Error>>()?;

    let (ln_z, uncertainty) = mean_and_std(&ln_z_samples)?;
    if config.verbose {
        log::info!("ln(evidence) = {}", ln_z);
        log::info!("error in ln(evidence) = {}", uncertainty);
    }
    Ok(TiRun {
        inv_temps,
        realization_means,
        ln_z_samples,
        estimate: EvidenceEstimate { ln_z, uncertainty },
    })
}

fn drop_hot_chains(
    temps: &[f64],
    betalike: &BetaLikelihood,
) -> Result<(Array1, BetaLikelihood), Error> {
    let kept: MemoryChains = temps
        .iter()
        .enumerate()
        .filter(|(_, t)| **t < HOT_CHAIN_TEMPERATURE)
        .map(|(i, _)| (betalike.names()[i].clone(), betalike.column(i).to_vec()))
        .collect();
    if kept.params().len() < temps.len() {
        log::debug!("removed {} hot chain(s)", temps.len() - kept.params().len());
    }
    if kept.params().is_empty() {
        return Err(EvidenceError::EmptyLadder.into());
    }
    make_betalike(&kept)
}
