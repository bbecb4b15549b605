use crate::error::EvidenceError;
use crate::{Array1, Array2};
use anyhow::{Error, Result};
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

/// Read access to stored MCMC output.
///
/// Implementations hand out one parameter's samples at a time; nothing in this
/// crate writes through this interface.
pub trait ChainAccessor {
    /// Parameter names, in storage order.
    fn params(&self) -> &[String];

    /// Samples of `name`, keeping every `thin_by`-th draw.
    fn get_param(&self, name: &str, thin_by: usize) -> Result<Array1, Error>;
}

/// Chains held in memory, one per named parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryChains {
    params: Vec<String>,
    chains: Array2,
}

impl MemoryChains {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the chain for `name`.
    pub fn insert(&mut self, name: impl Into<String>, chain: Array1) {
        let name = name.into();
        match self.params.iter().position(|p| *p == name) {
            Some(idx) => self.chains[idx] = chain,
            None => {
                self.params.push(name);
                self.chains.push(chain);
            }
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, chain: Array1) -> Self {
        self.insert(name, chain);
        self
    }
}

impl<S: Into<String>> FromIterator<(S, Array1)> for MemoryChains {
    fn from_iter<I: IntoIterator<Item = (S, Array1)>>(iter: I) -> Self {
        let mut chains = MemoryChains::new();
        for (name, chain) in iter {
            chains.insert(name, chain);
        }
        chains
    }
}

impl ChainAccessor for MemoryChains {
    fn params(&self) -> &[String] {
        &self.params
    }

    fn get_param(&self, name: &str, thin_by: usize) -> Result<Array1, Error> {
        let idx = self
            .params
            .iter()
            .position(|p| p == name)
            .ok_or_else(|| EvidenceError::UnknownParameter(name.to_string()))?;
        Ok(self.chains[idx]
            .iter()
            .step_by(thin_by.max(1))
            .copied()
            .collect())
    }
}

/// beta * ln(likelihood) samples for each temperature of a parallel-tempered run.
///
/// Stored column-wise: `column(i)[k]` is the sample at aligned iteration `k`
/// of temperature `i`. All columns have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct BetaLikelihood {
    names: Vec<String>,
    columns: Array2,
}

impl BetaLikelihood {
    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.len())
    }

    pub fn num_temps(&self) -> usize {
        self.columns.len()
    }

    /// Parameter names the columns were read from.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, i: usize) -> &[f64] {
        &self.columns[i]
    }

    pub fn columns(&self) -> &Array2 {
        &self.columns
    }

    /// Samples of every temperature at aligned iteration `k`.
    pub fn row(&self, k: usize) -> Array1 {
        self.columns.iter().map(|c| c[k]).collect()
    }
}

/// Assemble the temperature ladder from an accessor whose parameters are
/// named by their temperature.
///
/// Chains are truncated to the length of the shortest one, keeping their most
/// recent samples. Column order follows the accessor's parameter order.
///
/// Returns the temperatures and the aligned beta * ln(likelihood) matrix.
pub fn make_betalike<C>(chains: &C) -> Result<(Array1, BetaLikelihood), Error>
where
    C: ChainAccessor + ?Sized,
{
    let names = chains.params().to_vec();
    if names.is_empty() {
        return Err(EvidenceError::EmptyLadder.into());
    }

    let mut temps: Array1 = Vec::with_capacity(names.len());
    let mut full: Array2 = Vec::with_capacity(names.len());
    for name in names.iter() {
        let temp = name
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|t| t.is_finite() && *t > 0.0)
            .ok_or_else(|| EvidenceError::InvalidTemperature(name.clone()))?;
        temps.push(temp);
        full.push(chains.get_param(name, 1)?);
    }

    let min_length = full.iter().map(|c| c.len()).min().unwrap_or(0);
    if min_length == 0 {
        let idx = full.iter().position(|c| c.is_empty()).unwrap_or(0);
        return Err(EvidenceError::EmptyChain(names[idx].clone()).into());
    }
    let columns = full
        .into_iter()
        .map(|chain| chain[chain.len() - min_length..].to_vec())
        .collect();
    log::debug!(
        "assembled {} temperatures with {} aligned samples",
        temps.len(),
        min_length
    );
    Ok((temps, BetaLikelihood { names, columns }))
}

/// Write the temperature ladder as plain text for external thermodynamic
/// integration tools: the temperature names joined by spaces on the first
/// line, then one row of the beta * ln(likelihood) matrix per line.
pub fn write_betalike<C, P>(chains: &C, path: P) -> Result<(), Error>
where
    C: ChainAccessor + ?Sized,
    P: AsRef<Path>,
{
    let (_, betalike) = make_betalike(chains)?;
    let mut f = BufWriter::new(File::create(path)?);
    writeln!(f, "{}", betalike.names().join(" "))?;
    for k in 0..betalike.num_rows() {
        let row: Vec<String> = betalike.row(k).iter().map(|v| v.to_string()).collect();
        writeln!(f, "{}", row.join(" "))?;
    }
    f.flush()?;
    Ok(())
}

/// Read a file in the format produced by [`write_betalike`] back into chains
/// named by temperature.
pub fn read_betalike<P: AsRef<Path>>(path: P) -> Result<MemoryChains, Error> {
    let f = BufReader::new(File::open(path)?);
    let mut lines = f.lines();
    let header = match lines.next() {
        Some(line) => line?,
        None => return Err(EvidenceError::EmptyLadder.into()),
    };
    let names: Vec<String> = header.split_whitespace().map(String::from).collect();
    if names.is_empty() {
        return Err(EvidenceError::EmptyLadder.into());
    }
    if let Some(dup) = names
        .iter()
        .enumerate()
        .find(|(i, name)| names[..*i].contains(*name))
        .map(|(_, name)| name)
    {
        return Err(EvidenceError::DuplicateParameter(dup.clone()).into());
    }

    let mut columns: Array2 = vec![Vec::new(); names.len()];
    for (idx, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let line_no = idx + 2;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != names.len() {
            return Err(EvidenceError::RaggedRow {
                line: line_no,
                found: fields.len(),
                expected: names.len(),
            }
            .into());
        }
        for (column, text) in columns.iter_mut().zip(fields) {
            let value = text.parse::<f64>().map_err(|_| EvidenceError::Parse {
                line: line_no,
                text: text.to_string(),
            })?;
            column.push(value);
        }
    }
    Ok(names.into_iter().zip(columns).collect())
}
