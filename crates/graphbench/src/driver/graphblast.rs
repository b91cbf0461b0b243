//! GraphBLAST driver.
//!
//! GraphBLAST reports a warm-up time and a single tight-loop average, which
//! is broadcast across the requested iterations.

use super::protocol::{LineRule, Token, broadcast};
use super::{Driver, Engine, ExecutionResult, flag};
use crate::config::{Algorithm, GraphBlastOptions, Tool};
use crate::dataset::{Dataset, ValueType};
use std::ffi::OsString;

const WARM_UP: LineRule = LineRule::new("warmup", Token::Nth(1));
const TIGHT_LOOP: LineRule = LineRule::new("tight", Token::Nth(1));

/// `--directed` value: 1 forces directed, 2 forces undirected.
fn directed_flag(directed: bool) -> u8 {
    if directed { 1 } else { 2 }
}

#[derive(Debug)]
pub struct GraphBlastDriver {
    engine: Engine,
    options: GraphBlastOptions,
}

impl GraphBlastDriver {
    pub fn new(engine: Engine, options: GraphBlastOptions) -> Self {
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
            args.push(flag("source", source));
        }
        args.extend([
            flag("niter", iterations),
            flag("timing", self.options.timing),
            flag("directed", directed_flag(dataset.directed()?)),
            flag("skip_cpu_verify", u8::from(self.options.skip_cpu_verify)),
            OsString::from(dataset.path()),
        ]);
        let (stdout, command) = self.engine.invoke(algorithm, args)?;
        broadcast(&stdout, WARM_UP, TIGHT_LOOP, iterations, &command)?.conform(iterations, &command)
    }
}

impl Driver for GraphBlastDriver {
    fn tool(&self) -> Tool {
        Tool::GraphBlast
    }

    fn default_source(&self) -> u64 {
        self.engine.default_source()
    }

    fn can_run_bfs(&self, _dataset: &Dataset) -> crate::Result<bool> {
        Ok(true)
    }

    fn can_run_sssp(&self, dataset: &Dataset) -> crate::Result<bool> {
        Ok(dataset.element_type()? != ValueType::Void)
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
