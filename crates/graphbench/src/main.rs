//! graphbench - Cross-engine benchmark harness for graph algorithms.

use anyhow::{Context, Result};
use clap::Parser;
use graphbench::{
    BenchError, BenchmarkRunner, BenchmarkSummary, Builder, Cli, Dataset, NativeBuilder, create_driver,
    dataset::HttpDownloader, results::ConsoleReporter, signal,
};
use std::rc::Rc;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> Result<()> {
    // Print panics without a backtrace and abort.
    std::panic::set_hook(Box::new(|info| {
        use std::io::Write;
        let mut stderr = std::io::stderr().lock();

        let _ = writeln!(stderr, "\n=== PANIC CAPTURED ===");
        let _ = writeln!(stderr, "Location: {:?}", info.location());
        if let Some(s) = info.payload().downcast_ref::<&str>() {
            let _ = writeln!(stderr, "Message: {s}");
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            let _ = writeln!(stderr, "Message: {s}");
        } else {
            let _ = writeln!(stderr, "Message: {info:?}");
        }
        let _ = writeln!(stderr, "======================\n");
        let _ = stderr.flush();

        std::process::abort();
    }));

    if let Err(e) = signal::install_handler() {
        eprintln!("Failed to install signal handler: {e}");
    }

    let cli = Cli::parse();

    // Log lines go above progress bars. RUST_LOG wins over --verbose.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("info")
        } else {
            EnvFilter::new("warn")
        }
    });

    let indicatif_layer = IndicatifLayer::new();
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(indicatif_layer.get_stderr_writer()),
        )
        .with(indicatif_layer)
        .with(filter)
        .init();

    let config = cli.into_config().context("Failed to create benchmark config")?;

    if cli.is_dataset_command() {
        return cli.execute_dataset_command(&config);
    }

    let tools = cli.selected_tools();
    let algorithms = cli.selected_algorithms();
    let console = ConsoleReporter::new(config.color);
    console.banner(&tools, &algorithms, &config.datasets);

    let builder: Rc<dyn Builder> = Rc::new(NativeBuilder::new(config.clone()).force_rebuild(cli.rebuild));
    let drivers = tools
        .iter()
        .map(|&tool| create_driver(tool, &config, Rc::clone(&builder)))
        .collect::<graphbench::Result<Vec<_>>>()
        .context("Failed to set up drivers")?;

    let runner = BenchmarkRunner::new(drivers, algorithms)
        .keep_going(cli.keep_going)
        .with_console(console);

    let downloader = HttpDownloader::new().with_progress(true);
    let mut summary = BenchmarkSummary::new();
    let outcome = runner.run(
        &config.datasets,
        |name| Dataset::open(name, &config, &downloader),
        &mut summary,
    );

    // The report is written whatever the outcome of the sweep.
    let report = match summary.dump(cli.format, &config.output_dir, cli.printer) {
        Ok(report) => report,
        Err(e) => {
            if let Err(sweep) = &outcome {
                tracing::error!("Benchmark execution failed: {sweep}");
            }
            return Err(e).context("Failed to write the report");
        }
    };
    println!("\nReport written to: {}", report.display());

    match outcome {
        Ok(()) => Ok(()),
        Err(BenchError::Interrupted) => {
            eprintln!("\nBenchmark interrupted.");
            std::process::exit(signal::INTERRUPTED_EXIT_CODE);
        }
        Err(e) => Err(e).context("Benchmark execution failed"),
    }
}
