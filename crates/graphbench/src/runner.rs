//! Benchmark sweep over datasets, algorithms and drivers.

use crate::config::Algorithm;
use crate::dataset::Dataset;
use crate::driver::Driver;
use crate::error::BenchError;
use crate::results::{BenchmarkSummary, ConsoleReporter};

/// Drives every (dataset, algorithm, driver) combination in order.
///
/// A (dataset, algorithm) pair is skipped for every driver as soon as one
/// driver can not run it, so each recorded pair is comparable across all
/// tools.
pub struct BenchmarkRunner {
    drivers: Vec<Box<dyn Driver>>,
    algorithms: Vec<Algorithm>,
    keep_going: bool,
    console: Option<ConsoleReporter>,
    should_stop: Box<dyn Fn() -> bool>,
}

impl BenchmarkRunner {
    pub fn new(drivers: Vec<Box<dyn Driver>>, algorithms: Vec<Algorithm>) -> Self {
        Self {
            drivers,
            algorithms,
            keep_going: false,
            console: None,
            should_stop: Box::new(crate::signal::shutdown_requested),
        }
    }

    /// Log failed runs and continue instead of aborting the sweep.
    #[must_use]
    pub fn keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    /// Print progress to the console.
    #[must_use]
    pub fn with_console(mut self, console: ConsoleReporter) -> Self {
        self.console = Some(console);
        self
    }

    /// Replace the interrupt check (Ctrl+C by default).
    #[must_use]
    pub fn with_stop_check(mut self, check: impl Fn() -> bool + 'static) -> Self {
        self.should_stop = Box::new(check);
        self
    }

    fn check_stop(&self) -> crate::Result<()> {
        if (self.should_stop)() {
            Err(BenchError::Interrupted)
        } else {
            Ok(())
        }
    }

    /// Either propagate `err` or, under keep-going, log it and carry on.
    fn handle_failure(&self, context: &str, err: BenchError) -> crate::Result<()> {
        if !self.keep_going || matches!(err, BenchError::Interrupted) {
            return Err(err);
        }
        tracing::error!("[{context} | failed]: {err}");
        Ok(())
    }

    /// Whether every driver can run `algorithm` on `dataset`.
    pub fn all_can_run(&self, dataset: &Dataset, algorithm: Algorithm) -> crate::Result<bool> {
        for driver in &self.drivers {
            if !driver.can_run(dataset, algorithm)? {
                tracing::debug!(
                    "[algo: {algorithm}, dataset: {} | check]: {} can not run it",
                    dataset.name(),
                    driver.tool()
                );
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Run the sweep, recording into `summary`.
    ///
    /// `open` resolves a dataset name. Results gathered before an error stay
    /// in `summary`, so the caller can always write a report.
    pub fn run<F>(&self, datasets: &[String], mut open: F, summary: &mut BenchmarkSummary) -> crate::Result<()>
    where
        F: FnMut(&str) -> crate::Result<Dataset>,
    {
        for name in datasets {
            self.check_stop()?;
            let status = format!("dataset {name}");
            tracing::info!("[{status} | start preparation]");
            let dataset = match open(name) {
                Ok(dataset) => dataset,
                Err(e) => {
                    self.handle_failure(&status, e)?;
                    continue;
                }
            };
            tracing::info!("[{status} | finish preparation]");

            for &algorithm in &self.algorithms {
                self.check_stop()?;
                if let Err(e) = self.run_pair(&dataset, algorithm, summary) {
                    let status = format!("algo: {algorithm}, dataset: {name}");
                    self.handle_failure(&status, e)?;
                }
            }
        }
        Ok(())
    }

    fn run_pair(&self, dataset: &Dataset, algorithm: Algorithm, summary: &mut BenchmarkSummary) -> crate::Result<()> {
        let status = format!("algo: {algorithm}, dataset: {}", dataset.name());

        tracing::info!("[{status} | check if all tools can be used]");
        if !self.all_can_run(dataset, algorithm)? {
            tracing::warn!("[{status} | not runnable on some drivers, skipping]");
            if let Some(console) = &self.console {
                console.skipped(algorithm, dataset.name());
            }
            return Ok(());
        }

        tracing::info!("[{status} | start benchmarking]");
        for driver in &self.drivers {
            self.check_stop()?;
            let tool = driver.tool();
            match driver.run(dataset, algorithm) {
                Ok(result) => {
                    if let Some(console) = &self.console {
                        console.run_finished(algorithm, dataset.name(), tool, &result);
                    }
                    summary.add_measurement(tool, dataset.name(), algorithm, result);
                }
                Err(e) => {
                    if self.keep_going
                        && let Some(console) = &self.console
                    {
                        console.run_failed(algorithm, dataset.name(), tool, &e);
                    }
                    self.handle_failure(&format!("{status}, tool: {tool}"), e)?;
                }
            }
        }
        tracing::info!("[{status} | finish benchmarking]");
        Ok(())
    }
}
