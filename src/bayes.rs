use crate::error::EvidenceError;
use crate::uncertain::UFloat;
use anyhow::Error;
use std::fmt;
use std::str::FromStr;

/// Scale on which a Bayes factor is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scale {
    /// log10(Bayes factor); parsed from `"log10"`.
    #[default]
    Log10,
    /// Natural log; parsed from `"log"`.
    Ln,
    /// The Bayes factor itself; parsed from `"1"`.
    Linear,
}

impl FromStr for Scale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "log10" => Ok(Scale::Log10),
            "log" => Ok(Scale::Ln),
            "1" => Ok(Scale::Linear),
            other => Err(EvidenceError::UnknownScale(other.to_string()).into()),
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scale::Log10 => "log10",
            Scale::Ln => "log",
            Scale::Linear => "1",
        };
        f.write_str(name)
    }
}

/// Bayes factor of model 2 over model 1 from their log-evidence estimates,
/// each given as `(value, standard error)`.
///
/// The difference `log_ev2 - log_ev1` is taken as the natural log of the
/// Bayes factor; the requested `scale` picks that difference, its
/// exponential, or its log10. Errors are propagated to first order.
pub fn log10_bf(log_ev1: (f64, f64), log_ev2: (f64, f64), scale: Scale) -> (f64, f64) {
    let log_evidence1 = UFloat::from(log_ev1);
    let log_evidence2 = UFloat::from(log_ev2);
    let log_bf = &log_evidence2 - &log_evidence1;
    let bf = log_bf.exp();
    let result = match scale {
        Scale::Ln => log_bf,
        Scale::Linear => bf,
        Scale::Log10 => bf.log10(),
    };
    (result.nominal(), result.std_dev())
}
