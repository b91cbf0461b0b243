//! Command-line interface for the benchmark harness.

#![allow(clippy::struct_excessive_bools)]

use crate::config::{Algorithm, BenchmarkConfig, Tool};
use crate::dataset::{Dataset, HttpDownloader, PropertyCache};
use crate::results::{OutputFormat, ResultsPrinter};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;

/// Cross-engine benchmark harness for graph algorithms.
///
/// Runs BFS, SSSP and triangle counting with SPLA, LaGraph, Gunrock and
/// GraphBLAST over a shared set of datasets and writes comparable timing
/// reports.
#[derive(Parser, Debug)]
#[command(name = "graphbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Algorithm to benchmark. Repeatable; all algorithms if omitted.
    ///
    /// Valid values: bfs, sssp, tc
    #[arg(short = 'a', long = "algo", value_name = "ALGO")]
    pub algorithms: Vec<Algorithm>,

    /// Tool to benchmark. Repeatable; all tools if omitted.
    ///
    /// Valid values: graphblast, spla, lagraph, gunrock
    #[arg(short = 't', long = "tool", value_name = "TOOL")]
    pub tools: Vec<Tool>,

    /// Dataset name or archive URL. Repeatable; overrides the configured list.
    #[arg(short = 'd', long = "dataset", value_name = "NAME")]
    pub datasets: Vec<String>,

    /// Directory receiving the timestamped reports.
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// How each measurement is rendered in the report.
    #[arg(long, value_enum, default_value_t = ResultsPrinter::All)]
    pub printer: ResultsPrinter,

    /// JSON configuration file. Fields left out keep their defaults.
    #[arg(short = 'c', long, value_name = "PATH", env = "GRAPHBENCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root directory for datasets, engine checkouts and reports.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Source vertex for BFS and SSSP.
    #[arg(long, value_name = "VERTEX")]
    pub source: Option<u64>,

    /// Parallel jobs for native builds.
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Rebuild the selected engines even if their executables exist.
    #[arg(long)]
    pub rebuild: bool,

    /// Log failed runs and continue instead of stopping the sweep.
    #[arg(long)]
    pub keep_going: bool,

    /// Download every configured dataset and exit.
    #[arg(long)]
    pub download_datasets: bool,

    /// Show cached dataset properties and exit.
    #[arg(long)]
    pub cache_status: bool,

    /// Clear cached properties of one dataset (or all) and exit.
    #[arg(long, value_name = "NAME")]
    pub clear_cache: Option<Option<String>>,

    /// Disable colored output.
    #[arg(long, conflicts_with = "color")]
    pub no_color: bool,

    /// Force colored output (even when not a TTY).
    #[arg(long, conflicts_with = "no_color")]
    pub color: bool,

    /// Verbose output.
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    /// Build the configuration: defaults, then the config file, then flags.
    pub fn into_config(&self) -> Result<BenchmarkConfig> {
        let root = match &self.root {
            Some(root) => root.clone(),
            None => std::env::current_dir().context("Failed to determine current directory")?,
        };

        let mut config = match &self.config {
            Some(path) => BenchmarkConfig::load(path, &root)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => BenchmarkConfig::with_root(root),
        };

        if !self.datasets.is_empty() {
            config.datasets = self.datasets.clone();
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(source) = self.source {
            config.default_source = source;
        }
        if let Some(jobs) = self.jobs {
            config.build.jobs = jobs;
        }
        config.color = self.color || (!self.no_color && supports_color());

        Ok(config)
    }

    /// Selected tools, or all of them.
    pub fn selected_tools(&self) -> Vec<Tool> {
        if self.tools.is_empty() {
            Tool::all()
        } else {
            dedup(&self.tools)
        }
    }

    /// Selected algorithms, or all of them.
    pub fn selected_algorithms(&self) -> Vec<Algorithm> {
        if self.algorithms.is_empty() {
            Algorithm::all()
        } else {
            dedup(&self.algorithms)
        }
    }

    /// Whether a dataset maintenance command was requested instead of a sweep.
    pub fn is_dataset_command(&self) -> bool {
        self.download_datasets || self.cache_status || self.clear_cache.is_some()
    }

    /// Run the requested dataset maintenance command.
    pub fn execute_dataset_command(&self, config: &BenchmarkConfig) -> Result<()> {
        let cache = PropertyCache::new(&config.properties_path);

        if let Some(target) = &self.clear_cache {
            match target {
                Some(name) => {
                    if cache.remove(name)? {
                        println!("Cleared cached properties of {name}");
                    } else {
                        println!("No cached properties for {name}");
                    }
                }
                None => {
                    cache.clear()?;
                    println!("Cleared {}", cache.path().display());
                }
            }
        }

        if self.download_datasets {
            let source = HttpDownloader::new().with_progress(true);
            for name in &config.datasets {
                let dataset = Dataset::open(name, config, &source)
                    .with_context(|| format!("Failed to prepare dataset {name}"))?;
                println!("{name}: {}", dataset.path().display());
            }
        }

        if self.cache_status {
            let entries = cache.load()?;
            println!("Property cache: {}", cache.path().display());
            if entries.is_empty() {
                println!("  (empty)");
            }
            for (name, props) in &entries {
                println!("  {name}");
                for (key, value) in props {
                    println!("    {key}: {value}");
                }
            }
        }

        Ok(())
    }
}

fn dedup<T: PartialEq + Copy>(items: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(item) {
            out.push(*item);
        }
    }
    out
}

/// Check if the terminal supports colors.
fn supports_color() -> bool {
    // https://no-color.org/
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    std::io::stdout().is_terminal()
}
