//! SPLA driver.
//!
//! Executables take `--mtxpath`, `--niters` and `--source` flags and print
//! `warm-up(ms): <t>` followed by `iters(ms): <t1> <t2> ...`.

use super::protocol::{LineRule, PrefixProtocol, Token};
use super::{Driver, Engine, ExecutionResult, flag};
use crate::config::{Algorithm, Tool};
use crate::dataset::{Dataset, ValueType};

const OUTPUT: PrefixProtocol = PrefixProtocol::new(LineRule::new("iters(ms):", Token::Rest))
    .with_warm_up(LineRule::new("warm-up(ms):", Token::Nth(1)));

#[derive(Debug)]
pub struct SplaDriver {
    engine: Engine,
}

impl SplaDriver {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    fn execute(
        &self,
        algorithm: Algorithm,
        dataset: &Dataset,
        iterations: usize,
        extra: std::ffi::OsString,
    ) -> crate::Result<ExecutionResult> {
        let args = vec![
            flag("mtxpath", dataset.path().display()),
            flag("niters", iterations),
            extra,
        ];
        let (stdout, command) = self.engine.invoke(algorithm, args)?;
        OUTPUT.scan(&stdout, &command)?.conform(iterations, &command)
    }
}

impl Driver for SplaDriver {
    fn tool(&self) -> Tool {
        Tool::Spla
    }

    fn default_source(&self) -> u64 {
        self.engine.default_source()
    }

    fn can_run_bfs(&self, dataset: &Dataset) -> crate::Result<bool> {
        Ok(dataset.element_type()? == ValueType::Void)
    }

    fn can_run_sssp(&self, dataset: &Dataset) -> crate::Result<bool> {
        Ok(dataset.element_type()? == ValueType::Float)
    }

    fn can_run_tc(&self, _dataset: &Dataset) -> crate::Result<bool> {
        Ok(true)
    }

    fn run_bfs(&self, dataset: &Dataset, source: u64, iterations: usize) -> crate::Result<ExecutionResult> {
        self.execute(Algorithm::Bfs, dataset, iterations, flag("source", source))
    }

    fn run_sssp(&self, dataset: &Dataset, source: u64, iterations: usize) -> crate::Result<ExecutionResult> {
        self.execute(Algorithm::Sssp, dataset, iterations, flag("source", source))
    }

    fn run_tc(&self, dataset: &Dataset, iterations: usize) -> crate::Result<ExecutionResult> {
        let undirected = !dataset.directed()?;
        self.execute(Algorithm::Tc, dataset, iterations, flag("undirected", undirected))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::driver::create_driver;
    use crate::driver::testing::{NoopBuilder, local_dataset, recorded_args, scripted_engine};
    use std::rc::Rc;

    const STDOUT: &str = "spla bench\nwarm-up(ms): 9.5\niters(ms): 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 17 18 19 20 21 22 23 24 25 26 27 28 29 30 31 32 33 34 35 36 37 38 39 40 41 42 43 44 45 46 47 48 49 50 \n";

    #[test]
    fn test_bfs_flags_and_parse() {
        let dir = tempfile::tempdir().unwrap();
        let config = scripted_engine(dir.path(), Tool::Spla, STDOUT);
        let driver = create_driver(Tool::Spla, &config, Rc::new(NoopBuilder)).unwrap();
        let dataset = local_dataset(&config, "p", "3 3 3\n1 2\n2 3\n");

        let result = driver.run(&dataset, Algorithm::Bfs).unwrap();
        assert_eq!(result.warm_up, 9.5);
        assert_eq!(result.times.len(), 50);
        assert_eq!(result.times[49], 50.0);

        let args = recorded_args(&config, Tool::Spla, Algorithm::Bfs);
        assert_eq!(
            args,
            format!("--mtxpath={} --niters=50 --source=0", dataset.path().display())
        );
    }

    #[test]
    fn test_tc_passes_undirected_flag() {
        let dir = tempfile::tempdir().unwrap();
        let config = scripted_engine(dir.path(), Tool::Spla, STDOUT);
        let driver = create_driver(Tool::Spla, &config, Rc::new(NoopBuilder)).unwrap();
        let dataset = local_dataset(&config, "sym", "3 3 3\n1 2\n2 1\n");

        driver.run(&dataset, Algorithm::Tc).unwrap();
        assert!(recorded_args(&config, Tool::Spla, Algorithm::Tc).ends_with("--undirected=true"));
    }

    #[test]
    fn test_sssp_needs_float_values() {
        let dir = tempfile::tempdir().unwrap();
        let config = scripted_engine(dir.path(), Tool::Spla, STDOUT);
        let driver = create_driver(Tool::Spla, &config, Rc::new(NoopBuilder)).unwrap();

        let ints = local_dataset(&config, "ints", "3 3 2\n1 2 4\n");
        let floats = local_dataset(&config, "floats", "3 3 2\n1 2 0.5\n");
        assert!(!driver.can_run(&ints, Algorithm::Sssp).unwrap());
        assert!(driver.can_run(&floats, Algorithm::Sssp).unwrap());
    }
}
