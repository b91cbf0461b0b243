//! LaGraph driver.
//!
//! The demo programs take the matrix path and, for BFS and SSSP, a matrix
//! file of 1-based source vertices (one per iteration). Times are printed in
//! seconds.

use super::protocol::{LineRule, PrefixProtocol, SourcesFile, Token};
use super::{Driver, Engine, ExecutionResult};
use crate::config::{Algorithm, Tool};
use crate::dataset::{Dataset, ValueType};
use std::ffi::OsString;

const SECONDS_TO_MS: f64 = 1000.0;

const BFS_OUTPUT: PrefixProtocol = PrefixProtocol::new(LineRule::new("parent only", Token::Nth(9)))
    .with_warm_up(LineRule::new("warmup", Token::Nth(4)))
    .scaled(SECONDS_TO_MS);

const SSSP_OUTPUT: PrefixProtocol =
    PrefixProtocol::new(LineRule::new("sssp", Token::Nth(8))).scaled(SECONDS_TO_MS);

const TC_OUTPUT: PrefixProtocol = PrefixProtocol::new(LineRule::new("trial ", Token::Nth(2)))
    .with_warm_up(LineRule::new("nthreads: ", Token::Nth(3)))
    .scaled(SECONDS_TO_MS);

#[derive(Debug)]
pub struct LaGraphDriver {
    engine: Engine,
}

impl LaGraphDriver {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    fn run_from_source(
        &self,
        algorithm: Algorithm,
        protocol: PrefixProtocol,
        dataset: &Dataset,
        source: u64,
        iterations: usize,
    ) -> crate::Result<ExecutionResult> {
        // Removed when `sources` drops, whatever the outcome.
        let sources = SourcesFile::create(source + 1, iterations)?;
        let args = vec![
            OsString::from(dataset.path()),
            OsString::from(sources.path()),
        ];
        let (stdout, command) = self.engine.invoke(algorithm, args)?;
        protocol.scan(&stdout, &command)?.conform(iterations, &command)
    }
}

impl Driver for LaGraphDriver {
    fn tool(&self) -> Tool {
        Tool::LaGraph
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
        self.run_from_source(Algorithm::Bfs, BFS_OUTPUT, dataset, source, iterations)
    }

    fn run_sssp(&self, dataset: &Dataset, source: u64, iterations: usize) -> crate::Result<ExecutionResult> {
        self.run_from_source(Algorithm::Sssp, SSSP_OUTPUT, dataset, source, iterations)
    }

    fn run_tc(&self, dataset: &Dataset, iterations: usize) -> crate::Result<ExecutionResult> {
        let args = vec![OsString::from(dataset.path())];
        let (stdout, command) = self.engine.invoke(Algorithm::Tc, args)?;
        TC_OUTPUT.scan(&stdout, &command)?.conform(iterations, &command)
    }
}
