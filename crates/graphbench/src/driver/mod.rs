//! Engine drivers.
//!
//! A [`Driver`] turns a normalized request (dataset, algorithm, iterations)
//! into one engine's command line and turns the engine's stdout back into an
//! [`ExecutionResult`].

pub mod graphblast;
pub mod gunrock;
pub mod lagraph;
pub mod protocol;
pub mod spla;

use crate::builder::Builder;
use crate::config::{Algorithm, BenchmarkConfig, Tool, ToolPaths};
use crate::dataset::Dataset;
use crate::error::BenchError;
use crate::results::stats::TimingStats;
use std::cell::Cell;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;
use std::rc::Rc;

pub use graphblast::GraphBlastDriver;
pub use gunrock::GunrockDriver;
pub use lagraph::LaGraphDriver;
pub use spla::SplaDriver;

/// Timings of one benchmark run, in milliseconds.
///
/// `times` holds exactly one sample per requested iteration; the warm-up run
/// is kept apart and never counted in the statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub warm_up: f64,
    pub times: Vec<f64>,
}

impl ExecutionResult {
    /// Result recorded when an engine printed nothing recognizable.
    pub fn zeroed(iterations: usize) -> Self {
        Self {
            warm_up: 0.0,
            times: vec![0.0; iterations],
        }
    }

    pub fn stats(&self) -> TimingStats {
        TimingStats::from_samples(&self.times)
    }

    pub fn mean(&self) -> f64 {
        self.stats().mean
    }

    pub fn median(&self) -> f64 {
        self.stats().median
    }

    pub fn stdev(&self) -> f64 {
        self.stats().std_dev
    }

    /// One-line summary used in reports and logs.
    pub fn brief(&self) -> String {
        let stats = self.stats();
        format!(
            "warm_up={:.2}ms avg={:.2}ms median={:.2}ms stdev={:.2}",
            self.warm_up, stats.mean, stats.median, stats.std_dev
        )
    }
}

impl std::fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.brief())
    }
}

/// Capability-gated adapter for one engine.
pub trait Driver {
    fn tool(&self) -> Tool;

    fn can_run_bfs(&self, dataset: &Dataset) -> crate::Result<bool>;
    fn can_run_sssp(&self, dataset: &Dataset) -> crate::Result<bool>;
    fn can_run_tc(&self, dataset: &Dataset) -> crate::Result<bool>;

    fn run_bfs(&self, dataset: &Dataset, source: u64, iterations: usize) -> crate::Result<ExecutionResult>;
    fn run_sssp(&self, dataset: &Dataset, source: u64, iterations: usize) -> crate::Result<ExecutionResult>;
    fn run_tc(&self, dataset: &Dataset, iterations: usize) -> crate::Result<ExecutionResult>;

    /// Source vertex for BFS and SSSP.
    fn default_source(&self) -> u64 {
        0
    }

    fn can_run(&self, dataset: &Dataset, algorithm: Algorithm) -> crate::Result<bool> {
        match algorithm {
            Algorithm::Bfs => self.can_run_bfs(dataset),
            Algorithm::Sssp => self.can_run_sssp(dataset),
            Algorithm::Tc => self.can_run_tc(dataset),
        }
    }

    /// Run one benchmark, sized by the dataset's category.
    ///
    /// Callers are expected to have checked [`Driver::can_run`]; an
    /// unsupported combination is an error.
    fn run(&self, dataset: &Dataset, algorithm: Algorithm) -> crate::Result<ExecutionResult> {
        if !self.can_run(dataset, algorithm)? {
            return Err(BenchError::UnsupportedCombination {
                tool: self.tool(),
                algorithm,
                dataset: dataset.name().to_string(),
            });
        }

        let iterations = dataset.category()?.iterations();
        let source = self.default_source();
        tracing::info!(
            "[{} | run]: begin {algorithm} iterations={iterations} source={source}",
            self.tool()
        );

        let result = match algorithm {
            Algorithm::Bfs => self.run_bfs(dataset, source, iterations)?,
            Algorithm::Sssp => self.run_sssp(dataset, source, iterations)?,
            Algorithm::Tc => self.run_tc(dataset, iterations)?,
        };

        tracing::info!("[{} | run]: finish {algorithm} {result}", self.tool());
        Ok(result)
    }
}

/// Executable resolution and process invocation shared by the drivers.
///
/// The first lookup asks the [`Builder`] for the engine's executables.
pub struct Engine {
    tool: Tool,
    paths: ToolPaths,
    builder: Rc<dyn Builder>,
    built: Cell<bool>,
    default_source: u64,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("tool", &self.tool)
            .field("paths", &self.paths)
            .field("built", &self.built.get())
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(tool: Tool, config: &BenchmarkConfig, builder: Rc<dyn Builder>) -> crate::Result<Self> {
        let paths = config.tool(tool).cloned().ok_or_else(|| BenchError::BuildFailure {
            tool,
            missing: Vec::new(),
        })?;
        Ok(Self {
            tool,
            paths,
            builder,
            built: Cell::new(false),
            default_source: config.default_source,
        })
    }

    pub fn default_source(&self) -> u64 {
        self.default_source
    }

    /// Path of the executable for `algorithm`, building the engine first if needed.
    pub fn executable(&self, algorithm: Algorithm) -> crate::Result<PathBuf> {
        if !self.built.get() {
            self.builder.ensure_built(self.tool)?;
            self.built.set(true);
        }
        self.paths
            .executable(algorithm)
            .ok_or_else(|| BenchError::BuildFailure {
                tool: self.tool,
                missing: vec![self.paths.build.join(algorithm.name())],
            })
    }

    /// Run the executable for `algorithm` and capture its stdout.
    ///
    /// Returns the output together with the command line, for diagnostics.
    pub fn invoke(&self, algorithm: Algorithm, args: Vec<OsString>) -> crate::Result<(Vec<u8>, String)> {
        let exe = self.executable(algorithm)?;
        invoke(&exe, &args)
    }
}

/// Run a program to completion and capture its stdout.
///
/// A spawn failure or a non-zero exit is [`BenchError::EngineExecution`].
pub fn invoke(program: &std::path::Path, args: &[OsString]) -> crate::Result<(Vec<u8>, String)> {
    let command = std::iter::once(program.display().to_string())
        .chain(args.iter().map(|a| a.to_string_lossy().into_owned()))
        .collect::<Vec<_>>()
        .join(" ");
    tracing::debug!("[subprocess | check_output]: {command}");

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| BenchError::EngineExecution {
            command: command.clone(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let tail: Vec<&str> = stderr.lines().rev().take(5).collect();
        let tail: Vec<&str> = tail.into_iter().rev().collect();
        return Err(BenchError::EngineExecution {
            command,
            reason: format!("exited with {}: {}", output.status, tail.join(" | ")),
        });
    }
    Ok((output.stdout, command))
}

/// Build the driver for `tool`.
pub fn create_driver(
    tool: Tool,
    config: &BenchmarkConfig,
    builder: Rc<dyn Builder>,
) -> crate::Result<Box<dyn Driver>> {
    let engine = Engine::new(tool, config, builder)?;
    Ok(match tool {
        Tool::Spla => Box::new(SplaDriver::new(engine)),
        Tool::LaGraph => Box::new(LaGraphDriver::new(engine)),
        Tool::Gunrock => Box::new(GunrockDriver::new(engine, config.gunrock.clone())),
        Tool::GraphBlast => Box::new(GraphBlastDriver::new(engine, config.graphblast.clone())),
    })
}

/// `--name=value` as an argument.
pub(crate) fn flag(name: &str, value: impl std::fmt::Display) -> OsString {
    OsString::from(format!("--{name}={value}"))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_result_has_requested_length() {
        let result = ExecutionResult::zeroed(5);
        assert_eq!(result.times.len(), 5);
        assert_eq!(result.warm_up, 0.0);
        assert_eq!(result.brief(), "warm_up=0.00ms avg=0.00ms median=0.00ms stdev=0.00");
    }

    #[test]
    fn test_brief_excludes_warm_up() {
        let result = ExecutionResult {
            warm_up: 100.0,
            times: vec![1.0, 2.0, 3.0],
        };
        assert_eq!(result.mean(), 2.0);
        assert_eq!(result.median(), 2.0);
        assert_eq!(result.stdev(), 1.0);
        assert!(result.brief().starts_with("warm_up=100.00ms avg=2.00ms"));
    }

    #[cfg(unix)]
    #[test]
    fn test_invoke_reports_non_zero_exit() {
        let err = invoke(std::path::Path::new("/bin/sh"), &["-c".into(), "echo boom >&2; exit 3".into()])
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("boom"), "{msg}");
    }

    #[test]
    fn test_invoke_reports_missing_program() {
        let err = invoke(std::path::Path::new("/definitely/not/here"), &[]).unwrap_err();
        assert!(matches!(err, BenchError::EngineExecution { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_rejects_unsupported_combination() {
        let dir = tempfile::tempdir().unwrap();
        let config = testing::scripted_engine(dir.path(), Tool::Spla, "");
        let driver = create_driver(Tool::Spla, &config, Rc::new(testing::NoopBuilder)).unwrap();
        // Valued edges: spla bfs needs a pattern-only graph.
        let dataset = testing::local_dataset(&config, "w", "2 2 2\n1 2 3\n");

        assert!(!driver.can_run(&dataset, Algorithm::Bfs).unwrap());
        assert!(matches!(
            driver.run(&dataset, Algorithm::Bfs),
            Err(BenchError::UnsupportedCombination { tool: Tool::Spla, .. })
        ));
    }
}
