use thiserror::Error;

/// Faults raised by the evidence estimators.
///
/// Public functions return [`anyhow::Error`]; these can be recovered with
/// `err.downcast_ref::<EvidenceError>()`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvidenceError {
    #[error("No parameter named '{0}' in chain")]
    UnknownParameter(String),
    #[error("No temperature chains to assemble")]
    EmptyLadder,
    #[error("Chain '{0}' has no samples")]
    EmptyChain(String),
    #[error("Parameter '{0}' is not a positive, finite temperature")]
    InvalidTemperature(String),
    #[error("Need at least {required} temperatures to integrate, got {available}")]
    TooFewTemperatures { available: usize, required: usize },
    #[error("Need at least {required} interpolation grid points, got {available}")]
    TooFewGridPoints { available: usize, required: usize },
    #[error("Inverse temperatures must be strictly ascending after reversing the ladder")]
    InverseTemperatureOrder,
    #[error(
        "The chain is shorter than {factor} times the integrated autocorrelation time \
         (tau={tau}, samples={samples})"
    )]
    ChainTooShort { tau: f64, samples: usize, factor: f64 },
    #[error("No autocorrelation time when elements are all constant (value={0})")]
    ConstantChain(f64),
    #[error("All values must be finite to estimate the autocorrelation time")]
    NonFiniteSample,
    #[error("Need at least {required} samples, got {available}")]
    TooFewSamples { available: usize, required: usize },
    #[error("Bootstrap subsample is empty ({thinned} thinned samples)")]
    EmptySubsample { thinned: usize },
    #[error("Requested {requested} chains but only {available} are available")]
    TooManyChains { requested: usize, available: usize },
    #[error("Unknown scale '{0}', expected one of log10, log, 1")]
    UnknownScale(String),
    #[error("Parameter '{0}' appears more than once")]
    DuplicateParameter(String),
    #[error("Could not parse '{text}' on line {line}")]
    Parse { line: usize, text: String },
    #[error("Row {line} has {found} columns, expected {expected}")]
    RaggedRow {
        line: usize,
        found: usize,
        expected: usize,
    },
}
