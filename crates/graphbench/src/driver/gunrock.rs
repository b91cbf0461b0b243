//! Gunrock driver.
//!
//! Gunrock prints one `Run <i> elapsed: <ms> ...` line per run. We ask for
//! one extra run and treat the first as the warm-up.

use super::protocol::repeated_runs;
use super::{Driver, Engine, ExecutionResult, flag};
use crate::config::{Algorithm, GunrockOptions, Tool};
use crate::dataset::Dataset;
use std::ffi::OsString;

/// Token of a `Run` line holding the elapsed time.
const ELAPSED_COLUMN: usize = 3;

#[derive(Debug)]
pub struct GunrockDriver {
    engine: Engine,
    options: GunrockOptions,
}

impl GunrockDriver {
    pub fn new(engine: Engine, options: GunrockOptions) -> Self {
        Self { engine, options }
    }

    fn execute(
        &self,
        algorithm: Algorithm,
        dataset: &Dataset,
        source: u64,
        iterations: usize,
    ) -> crate::Result<ExecutionResult> {
        let mut args: Vec<OsString> = Vec::new();
        if algorithm.needs_source() {
            args.push(flag("src", source));
        }
        args.extend([
            flag("num-runs", iterations + 1),
            flag("undirected", u8::from(!dataset.directed()?)),
            flag("graph-file", dataset.path().display()),
            flag("graph-type", &self.options.graph_type),
            flag("device", self.options.device),
        ]);
        let (stdout, command) = self.engine.invoke(algorithm, args)?;
        repeated_runs(&stdout, ELAPSED_COLUMN, &command)?.conform(iterations, &command)
    }
}

impl Driver for GunrockDriver {
    fn tool(&self) -> Tool {
        Tool::Gunrock
    }

    fn default_source(&self) -> u64 {
        self.engine.default_source()
    }

    fn can_run_bfs(&self, _dataset: &Dataset) -> crate::Result<bool> {
        Ok(true)
    }

    fn can_run_sssp(&self, _dataset: &Dataset) -> crate::Result<bool> {
        Ok(true)
    }

    fn can_run_tc(&self, _dataset: &Dataset) -> crate::Result<bool> {
        Ok(true)
    }

    fn run_bfs(&self, dataset: &Dataset, source: u64, iterations: usize) -> crate::Result<ExecutionResult> {
        self.execute(Algorithm::Bfs, dataset, source, iterations)
    }

    fn run_sssp(&self, dataset: &Dataset, source: u64, iterations: usize) -> crate::Result<ExecutionResult> {
        self.execute(Algorithm::Sssp, dataset, source, iterations)
    }

    fn run_tc(&self, dataset: &Dataset, iterations: usize) -> crate::Result<ExecutionResult> {
        self.execute(Algorithm::Tc, dataset, self.default_source(), iterations)
    }
}
