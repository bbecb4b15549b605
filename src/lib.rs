//! A Rust library for estimating Bayesian evidence and odds ratios from the output
//! of an MCMC sampler that has already been run.
//!
//! Two estimators are provided:
//!
//! * thermodynamic integration over parallel-tempered chains, giving ln(evidence)
//!   with a bootstrap error bar ([`ti::ti_log_evidence`]);
//! * product-space (hypermodel) odds ratios from a model-index chain
//!   ([`odds::odds_ratio_bootstrap`]).
//!
//! Both thin chains by their integrated autocorrelation time before sizing the
//! bootstrap subsamples. All randomness is drawn from a caller-supplied [`rand::Rng`].
#[cfg(test)]
#[macro_use]
extern crate approx;

/// Integrated autocorrelation time and thinning
pub mod autocorr;
/// Bayes factors between two log-evidence estimates
pub mod bayes;
/// Bootstrap resampling with replacement
pub mod bootstrap;
/// Chain access and temperature ladder assembly
pub mod chains;
/// Error types
pub mod error;
/// Product-space odds ratios
pub mod odds;
/// Thermodynamic integration
pub mod ti;
/// Values with linearly propagated, correlation-aware uncertainty
pub mod uncertain;
/// Summary statistics, interpolation and quadrature helpers
pub mod utils;

pub use crate::autocorr::{AutocorrEstimator, IntegratedTime};
pub use crate::chains::{BetaLikelihood, ChainAccessor, MemoryChains};
pub use crate::error::EvidenceError;

/// One-dimensional vector of numeric values
pub type Array1 = Vec<f64>;
/// Two dimensional vector of vectors of numeric values
pub type Array2 = Vec<Array1>;
