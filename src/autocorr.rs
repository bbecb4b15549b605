use crate::error::EvidenceError;
use crate::utils::mean;
use crate::Array1;
use anyhow::{Error, Result};
use rustfft::{num_complex::Complex, FftPlanner};

/// Something that can estimate the integrated autocorrelation time of a chain.
pub trait AutocorrEstimator {
    /// Estimated number of raw samples per effectively independent sample.
    fn integrated_time(&self, x: &[f64]) -> Result<f64, Error>;
}

/// Integrated autocorrelation time with Sokal's automatic windowing.
///
/// The cumulative estimate at lag `m` is `tau_m = 2 * sum_{k=0}^{m} rho_k - 1`
/// where `rho_k` is the normalized autocorrelation function. The window is the
/// smallest `m` with `m >= window * tau_m` (or the last lag if there is none).
///
/// See Goodman & Weare, and Sokal, "Monte Carlo Methods in Statistical
/// Mechanics: Foundations and New Algorithms" (1997).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegratedTime {
    /// Windowing constant `c`.
    pub window: f64,
    /// The chain must be at least this many times longer than the estimate.
    pub min_chain_factor: f64,
}

impl Default for IntegratedTime {
    fn default() -> Self {
        IntegratedTime {
            window: 5.0,
            min_chain_factor: 50.0,
        }
    }
}

/// Smallest chain for which an autocorrelation function is defined.
const MIN_SAMPLES: usize = 2;

impl IntegratedTime {
    /// Scan the cumulative estimate for the automatic window.
    ///
    /// Returns the estimate at the window, or at the last lag if the window
    /// never closes.
    fn windowed(&self, rho: &[f64]) -> f64 {
        let mut cumulative = 0.0;
        let mut tau = f64::NAN;
        for (lag, r) in rho.iter().enumerate() {
            cumulative += r;
            tau = 2.0 * cumulative - 1.0;
            if lag as f64 >= self.window * tau {
                break;
            }
        }
        tau
    }
}

impl AutocorrEstimator for IntegratedTime {
    fn integrated_time(&self, x: &[f64]) -> Result<f64, Error> {
        let n = x.len();
        if n < MIN_SAMPLES {
            return Err(EvidenceError::TooFewSamples {
                available: n,
                required: MIN_SAMPLES,
            }
            .into());
        }
        let rho = autocorrelation(x)?;
        let tau = self.windowed(&rho);

        if self.min_chain_factor * tau > n as f64 {
            return Err(EvidenceError::ChainTooShort {
                tau,
                samples: n,
                factor: self.min_chain_factor,
            }
            .into());
        }
        Ok(tau)
    }
}

/// Normalized autocorrelation function of `x` at lags `0..x.len()`.
///
/// Uses the biased (divide by `n`) autocovariance, computed with a zero-padded
/// FFT. The result only depends on the shape of the chain, not its scale, so
/// chains of order 1e-80 (hot tempered chains) behave like any other.
pub fn autocorrelation(x: &[f64]) -> Result<Array1, Error> {
    if x.iter().any(|v| !v.is_finite()) {
        return Err(EvidenceError::NonFiniteSample.into());
    }
    let n = x.len();
    let first = x.first().copied().unwrap_or(f64::NAN);
    if x.iter().all(|v| *v == first) {
        return Err(EvidenceError::ConstantChain(first).into());
    }

    let xbar = mean(x)?;
    let scale = x.iter().map(|v| (v - xbar).abs()).fold(0.0, f64::max);
    let size = 2 * n.next_power_of_two();
    let mut buf: Vec<Complex<f64>> = x
        .iter()
        .map(|v| Complex::new((v - xbar) / scale, 0.0))
        .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
        .take(size)
        .collect();

    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_forward(size).process(&mut buf);
    for c in buf.iter_mut() {
        *c = Complex::new(c.norm_sqr(), 0.0);
    }
    planner.plan_fft_inverse(size).process(&mut buf);

    let lag0 = buf[0].re;
    if lag0 <= 0.0 {
        return Err(EvidenceError::ConstantChain(first).into());
    }
    Ok(buf[..n].iter().map(|c| c.re / lag0).collect())
}

/// Thinning stride for a chain: the integer part of its integrated
/// autocorrelation time, never less than one.
pub fn thinning_stride<E>(estimator: &E, x: &[f64]) -> Result<usize, Error>
where
    E: AutocorrEstimator + ?Sized,
{
    let tau = estimator.integrated_time(x)?;
    Ok((tau.floor() as usize).max(1))
}

/// Keep every `stride`-th sample, starting with the first.
pub fn thin(x: &[f64], stride: usize) -> Array1 {
    x.iter().step_by(stride.max(1)).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64;

    fn white_noise(n: usize, seed: u64) -> Array1 {
        let mut rng = Pcg64::seed_from_u64(seed);
        (0..n).map(|_| rng.random::<f64>() - 0.5).collect()
    }

    fn ar1(n: usize, phi: f64, seed: u64) -> Array1 {
        let mut rng = Pcg64::seed_from_u64(seed);
        let mut x = 0.0;
        (0..n)
            .map(|_| {
                x = phi * x + rng.random::<f64>() - 0.5;
                x
            })
            .collect()
    }

    #[test]
    fn test_independent_samples_have_unit_tau() {
        let x = white_noise(5000, 7);
        let tau = IntegratedTime::default().integrated_time(&x).unwrap();
        assert!(tau > 0.7 && tau < 1.3, "tau = {}", tau);
        assert_eq!(thinning_stride(&IntegratedTime::default(), &x).unwrap(), 1);
    }

    #[test]
    fn test_ar1_tau() {
        // tau = (1 + phi) / (1 - phi) = 19 for phi = 0.9
        let x = ar1(100_000, 0.9, 11);
        let tau = IntegratedTime::default().integrated_time(&x).unwrap();
        assert!(tau > 15.0 && tau < 23.0, "tau = {}", tau);
        let stride = thinning_stride(&IntegratedTime::default(), &x).unwrap();
        assert_eq!(stride, tau.floor() as usize);
        assert_eq!(thin(&x, stride).len(), (x.len() + stride - 1) / stride);
    }

    #[test]
    fn test_short_correlated_chain_fails() {
        let x = ar1(100, 0.9, 3);
        let err = IntegratedTime::default().integrated_time(&x).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EvidenceError>(),
            Some(EvidenceError::ChainTooShort { samples: 100, .. })
        ));

        // a lenient tolerance accepts the same chain
        let lenient = IntegratedTime {
            window: 5.0,
            min_chain_factor: 1.0,
        };
        assert!(lenient.integrated_time(&x).is_ok());
    }

    #[test]
    fn test_degenerate_chains() {
        let estimator = IntegratedTime::default();
        assert!(estimator.integrated_time(&[1.0]).is_err());
        assert!(estimator.integrated_time(&[2.0; 100]).is_err());
        let mut x = white_noise(200, 5);
        x[17] = f64::NAN;
        let err = estimator.integrated_time(&x).unwrap_err();
        assert_eq!(
            err.downcast_ref::<EvidenceError>(),
            Some(&EvidenceError::NonFiniteSample)
        );
    }

    #[test]
    fn test_autocorrelation_matches_arima_and_stan() {
        let arr = vec![
            0.747858687681513,
            0.290118161168511,
            -0.66263075102762,
            -0.00794439358648058,
            0.612494029879686,
            1.15915333101436,
            0.844402455747637,
            -0.493298834393585,
            0.140306938408938,
            -0.207331367372662,
            0.344322796977632,
            -0.216755313401662,
            -0.704730639551491,
            -0.262457923752462,
            0.338587814578015,
            0.79334841402936,
            -0.495245866959037,
            -0.736378128523917,
            -1.10220108378805,
            2.37069694852591,
        ];
        // Stan's autocovariance of the same draws
        let stan_acov = vec![
            0.6269672577,
            -0.0113804234,
            -0.1668563930,
            -0.2086591087,
            0.1016590536,
            0.1767212413,
            -0.0059714922,
            -0.1489622883,
            -0.0996503101,
            0.0996094900,
            0.0450098619,
            -0.0109203038,
            -0.2154921627,
            -0.0374684937,
            0.1274360411,
            0.1121981758,
            0.0073812983,
            -0.1254719533,
            -0.0208019612,
            0.0681360996,
        ];
        let rho = autocorrelation(&arr).unwrap();
        let arima_acov = arima::acf::acf(&arr, None, true).unwrap();
        assert_eq!(rho.len(), arr.len());
        for i in 0..arr.len() {
            assert_abs_diff_eq!(rho[i], stan_acov[i] / stan_acov[0], epsilon = 1e-8);
            assert_abs_diff_eq!(rho[i], arima_acov[i] / arima_acov[0], epsilon = 1e-10);
        }
    }

    #[test]
    fn test_tau_does_not_depend_on_scale() {
        // beta * ln(likelihood) of a T = 1e80 chain is of order 1e-78
        let x = ar1(5000, 0.5, 19);
        let tiny: Array1 = x.iter().map(|v| (v - 100.0) / 1e80).collect();
        let estimator = IntegratedTime::default();
        let tau = estimator.integrated_time(&x).unwrap();
        let tau_tiny = estimator.integrated_time(&tiny).unwrap();
        assert_relative_eq!(tau, tau_tiny, max_relative = 1e-6);
    }

    #[test]
    fn test_long_random_walk_fails_promptly() {
        let mut rng = Pcg64::seed_from_u64(23);
        let mut x = 0.0;
        let walk: Array1 = (0..200_000)
            .map(|_| {
                x += rng.random::<f64>() - 0.5;
                x
            })
            .collect();
        let start = std::time::Instant::now();
        let err = IntegratedTime::default().integrated_time(&walk).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EvidenceError>(),
            Some(EvidenceError::ChainTooShort {
                samples: 200_000,
                ..
            })
        ));
        assert!(start.elapsed().as_secs() < 30);
    }

    #[test]
    fn test_thin() {
        let x = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert_eq!(thin(&x, 3), vec![0.0, 3.0, 6.0]);
        assert_eq!(thin(&x, 1), x);
        assert_eq!(thin(&x, 0), x);
    }

    struct Fixed(f64);

    impl AutocorrEstimator for Fixed {
        fn integrated_time(&self, _x: &[f64]) -> Result<f64, Error> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_stride_is_floor_of_tau_and_at_least_one() {
        assert_eq!(thinning_stride(&Fixed(4.9), &[0.0]).unwrap(), 4);
        assert_eq!(thinning_stride(&Fixed(0.6), &[0.0]).unwrap(), 1);
    }
}
