//! Live console output while the sweep runs.

use crate::config::{Algorithm, Tool};
use crate::driver::ExecutionResult;
use owo_colors::OwoColorize;

/// Prints the banner and one block per finished run.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    color: bool,
}

impl ConsoleReporter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Banner shown before the sweep starts.
    pub fn banner(&self, tools: &[Tool], algorithms: &[Algorithm], datasets: &[String]) {
        let join = |items: Vec<String>| items.join(", ");
        let tools = join(tools.iter().map(ToString::to_string).collect());
        let algorithms = join(algorithms.iter().map(ToString::to_string).collect());

        if self.color {
            println!(
                "{} {}",
                "graphbench".bold().cyan(),
                env!("CARGO_PKG_VERSION").dimmed()
            );
            println!("  {}: {}", "Tools".bold(), tools);
            println!("  {}: {}", "Algorithms".bold(), algorithms);
            println!("  {}: {} dataset(s)", "Datasets".bold(), datasets.len());
        } else {
            println!("graphbench {}", env!("CARGO_PKG_VERSION"));
            println!("  Tools: {tools}");
            println!("  Algorithms: {algorithms}");
            println!("  Datasets: {} dataset(s)", datasets.len());
        }
        println!();
    }

    /// Result of one (algorithm, dataset, tool) run.
    ///
    /// ```text
    /// bfs / 1128_bus / spla
    ///   Time (mean ± σ):   1.52 ms ±  0.08 ms    warm-up 4.10 ms
    ///   Median:            1.50 ms               50 runs
    /// ```
    pub fn run_finished(&self, algorithm: Algorithm, dataset: &str, tool: Tool, result: &ExecutionResult) {
        let stats = result.stats();
        let mean = format!("{:.2} ms", stats.mean);
        let sigma = format!("{:.2} ms", stats.std_dev);
        let median = format!("{:.2} ms", stats.median);
        let warm_up = format!("warm-up {:.2} ms", result.warm_up);

        if self.color {
            println!("{} / {} / {}", algorithm.bold(), dataset.bold(), tool.green().bold());
            println!(
                "  {} ({} ± {}):  {} ± {}    {}",
                "Time".bold(),
                "mean".cyan(),
                "σ".cyan(),
                mean.cyan(),
                sigma.cyan().dimmed(),
                warm_up.dimmed()
            );
            println!("  {}:           {}    {} runs", "Median".bold(), median.green(), stats.count);
        } else {
            println!("{algorithm} / {dataset} / {tool}");
            println!("  Time (mean ± σ):  {mean} ± {sigma}    {warm_up}");
            println!("  Median:           {median}    {} runs", stats.count);
        }
    }

    /// A pair skipped because some engine can not run it.
    pub fn skipped(&self, algorithm: Algorithm, dataset: &str) {
        if self.color {
            println!(
                "{} / {} {}",
                algorithm.bold(),
                dataset.bold(),
                "skipped: not runnable on every tool".yellow()
            );
        } else {
            println!("{algorithm} / {dataset} skipped: not runnable on every tool");
        }
    }

    /// A run that failed under keep-going.
    pub fn run_failed(&self, algorithm: Algorithm, dataset: &str, tool: Tool, error: &crate::BenchError) {
        if self.color {
            println!("{} / {} / {} {} {error}", algorithm.bold(), dataset.bold(), tool.bold(), "failed:".red());
        } else {
            println!("{algorithm} / {dataset} / {tool} failed: {error}");
        }
    }
}
