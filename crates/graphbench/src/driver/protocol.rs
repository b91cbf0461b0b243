//! Scanners that turn engine stdout into an [`ExecutionResult`].
//!
//! None of these are full parsers: each one looks for lines starting with a
//! known prefix and picks a whitespace-separated token out of them.

use super::ExecutionResult;
use crate::error::BenchError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Which token(s) of a matching line carry the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// The n-th whitespace-separated token of the line (the prefix is token 0
    /// when it contains no spaces).
    Nth(usize),
    /// Every token after the first.
    Rest,
}

/// A line prefix and where its value sits.
#[derive(Debug, Clone, Copy)]
pub struct LineRule {
    pub prefix: &'static str,
    pub token: Token,
}

impl LineRule {
    pub const fn new(prefix: &'static str, token: Token) -> Self {
        Self { prefix, token }
    }

    fn values(&self, line: &str, command: &str) -> crate::Result<Vec<f64>> {
        let cleaned = line.replace(',', "");
        let tokens: Vec<&str> = cleaned.split_whitespace().collect();
        let picked: Vec<&str> = match self.token {
            Token::Nth(n) => vec![*tokens.get(n).ok_or_else(|| decode_error(command, line, "missing token"))?],
            Token::Rest => tokens.iter().skip(1).copied().collect(),
        };
        picked
            .into_iter()
            .map(|t| t.parse::<f64>().map_err(|e| decode_error(command, line, &e.to_string())))
            .collect()
    }
}

fn decode_error(command: &str, line: &str, reason: &str) -> BenchError {
    BenchError::EngineExecution {
        command: command.to_string(),
        reason: format!("can not decode `{}`: {reason}", line.trim()),
    }
}

fn lines(output: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(output)
        .lines()
        .map(|l| l.trim_end_matches('\r').to_string())
        .collect()
}

/// Timings collected from an output before they are fitted to the
/// requested iteration count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTimings {
    pub warm_up: f64,
    pub times: Vec<f64>,
}

impl RawTimings {
    /// Fit the samples to `expected` iterations.
    ///
    /// No samples yields zero times (keeping any warm-up) with a warning.
    /// Extra samples are dropped; too few is an error.
    pub fn conform(self, expected: usize, command: &str) -> crate::Result<ExecutionResult> {
        let found = self.times.len();
        if found == 0 {
            tracing::warn!("no timings recognized in the output of `{command}`, recording zeros");
            return Ok(ExecutionResult {
                warm_up: self.warm_up,
                ..ExecutionResult::zeroed(expected)
            });
        }
        if found < expected {
            return Err(BenchError::EngineExecution {
                command: command.to_string(),
                reason: format!("expected {expected} timings, found {found}"),
            });
        }
        let mut times = self.times;
        if found > expected {
            tracing::warn!("`{command}` reported {found} timings, keeping the first {expected}");
            times.truncate(expected);
        }
        Ok(ExecutionResult {
            warm_up: self.warm_up,
            times,
        })
    }
}

/// Line-prefix token extraction.
///
/// Every line matching `times` adds its values to the timings; the first line
/// matching `warm_up` supplies the warm-up. All values are multiplied by
/// `scale`.
#[derive(Debug, Clone, Copy)]
pub struct PrefixProtocol {
    pub times: LineRule,
    pub warm_up: Option<LineRule>,
    pub scale: f64,
}

impl PrefixProtocol {
    pub const fn new(times: LineRule) -> Self {
        Self {
            times,
            warm_up: None,
            scale: 1.0,
        }
    }

    #[must_use]
    pub const fn with_warm_up(mut self, rule: LineRule) -> Self {
        self.warm_up = Some(rule);
        self
    }

    #[must_use]
    pub const fn scaled(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn scan(&self, output: &[u8], command: &str) -> crate::Result<RawTimings> {
        let mut raw = RawTimings::default();
        let mut warm_up_seen = false;
        for line in lines(output) {
            if line.starts_with(self.times.prefix) {
                raw.times
                    .extend(self.times.values(&line, command)?.into_iter().map(|v| v * self.scale));
            }
            if let Some(rule) = self.warm_up
                && !warm_up_seen
                && line.starts_with(rule.prefix)
            {
                raw.warm_up = rule.values(&line, command)?.first().copied().unwrap_or(0.0) * self.scale;
                warm_up_seen = true;
            }
        }
        Ok(raw)
    }
}

/// Repeated-run counting.
///
/// Each `Run ` line (except `Run CPU` reference runs) holds one time at
/// `column`; the first run is the warm-up.
pub fn repeated_runs(output: &[u8], column: usize, command: &str) -> crate::Result<RawTimings> {
    let rule = LineRule::new("Run ", Token::Nth(column));
    let mut runs = Vec::new();
    for line in lines(output) {
        if line.starts_with("Run ") && !line.starts_with("Run CPU") {
            runs.extend(rule.values(&line, command)?);
        }
    }
    if runs.is_empty() {
        return Ok(RawTimings::default());
    }
    let warm_up = runs.remove(0);
    Ok(RawTimings { warm_up, times: runs })
}

/// Synthetic broadcast.
///
/// The engine reports one steady-state time, which stands in for every
/// requested iteration.
pub fn broadcast(
    output: &[u8],
    warm_up: LineRule,
    steady: LineRule,
    iterations: usize,
    command: &str,
) -> crate::Result<RawTimings> {
    let mut raw = RawTimings::default();
    let mut tight = None;
    for line in lines(output) {
        if line.starts_with(warm_up.prefix) {
            raw.warm_up = warm_up.values(&line, command)?.first().copied().unwrap_or(0.0);
        }
        if line.starts_with(steady.prefix) {
            tight = steady.values(&line, command)?.first().copied();
        }
    }
    if let Some(value) = tight {
        raw.times = vec![value; iterations];
    }
    Ok(raw)
}

/// Scoped "source vertices" side input, deleted on drop.
///
/// Holds `source` once per iteration as a single-column matrix-exchange
/// array.
#[derive(Debug)]
pub struct SourcesFile {
    file: NamedTempFile,
}

impl SourcesFile {
    pub fn create(source: u64, iterations: usize) -> crate::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("sources_")
            .suffix(".mtx")
            .tempfile()?;
        file.write_all(Self::contents(source, iterations).as_bytes())?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn contents(source: u64, iterations: usize) -> String {
        let rows: Vec<String> = std::iter::repeat_n(source.to_string(), iterations).collect();
        format!(
            "\n%%MatrixMarket matrix array real general\n\
             %-------------------------------------------------------------------------------\n\
             % Temporary sources file\n\
             %-------------------------------------------------------------------------------\n\
             {iterations} 1\n{}\n",
            rows.join("\n")
        )
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
