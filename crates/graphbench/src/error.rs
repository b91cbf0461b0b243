//! Error types for the benchmark harness.

use crate::config::{Algorithm, Tool};
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T, E = BenchError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum BenchError {
    /// Dataset name has no cached path, no known URL and no local file.
    #[error("Dataset {0} is not cached, does not have a url and is not downloaded")]
    MissingSource(String),

    /// Fetching a dataset archive failed.
    #[error("Failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    /// Archive does not hold exactly one usable `.mtx` file.
    #[error("Archive {url} is unusable: {reason}")]
    ArchiveFormat { url: String, reason: String },

    /// Property cache file exists but is not valid JSON.
    #[error("Property cache {path} is corrupted: {source}")]
    CacheCorruption {
        /// Cache file that failed to parse.
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Matrix file does not follow the coordinate format.
    #[error("Malformed matrix file {path} (line {line}): {reason}")]
    MalformedMatrix {
        path: PathBuf,
        /// 1-based line number, 0 when the problem is not tied to a line.
        line: usize,
        reason: String,
    },

    /// Engine executables are still missing after a build.
    #[error("Build of {tool} did not produce all targets:{}", format_missing(.missing))]
    BuildFailure { tool: Tool, missing: Vec<PathBuf> },

    /// A driver was asked to run something it reported it can not run.
    #[error("Algorithm {algorithm} can not be run by {tool} on the dataset {dataset}")]
    UnsupportedCombination {
        tool: Tool,
        algorithm: Algorithm,
        dataset: String,
    },

    /// Engine exited non-zero or printed undecodable timings.
    #[error("Engine command `{command}` failed: {reason}")]
    EngineExecution { command: String, reason: String },

    /// Ctrl+C stopped the sweep.
    #[error("Benchmark interrupted")]
    Interrupted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl BenchError {
    pub(crate) fn malformed(path: &std::path::Path, line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedMatrix {
            path: path.to_path_buf(),
            line,
            reason: reason.into(),
        }
    }
}

fn format_missing(missing: &[PathBuf]) -> String {
    missing
        .iter()
        .map(|p| format!("\n\t{}", p.display()))
        .collect()
}
