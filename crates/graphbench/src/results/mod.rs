//! Result aggregation and report rendering.
//!
//! - [`BenchmarkSummary`] collects one [`ExecutionResult`] per
//!   (algorithm, dataset, tool) in insertion order
//! - [`ResultsPrinter`] projects a result into a report cell
//! - [`ConsoleReporter`] prints progress while the sweep runs

pub mod console;
pub mod printer;
pub mod stats;

pub use console::ConsoleReporter;
pub use printer::ResultsPrinter;
pub use stats::TimingStats;

use crate::config::{Algorithm, Tool};
use crate::driver::ExecutionResult;
use crate::error::BenchError;
use clap::ValueEnum;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the link pointing at the latest report.
pub const RECENT_LINK: &str = "recent";

/// Report layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One `<algorithm>.csv` table per algorithm
    #[default]
    Csv,
    /// A single `raw.txt` with one line per measurement
    Raw,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Raw => "txt",
        }
    }
}

type ToolResults = Vec<(Tool, ExecutionResult)>;
type DatasetResults = Vec<(String, ToolResults)>;

/// `algorithm -> dataset -> tool -> result`, kept in insertion order.
///
/// The first measurement recorded for a key wins; later ones are ignored.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkSummary {
    measurements: Vec<(Algorithm, DatasetResults)>,
}

fn slot<'a, K: PartialEq, V: Default>(entries: &'a mut Vec<(K, V)>, key: K) -> &'a mut V {
    let idx = match entries.iter().position(|(k, _)| *k == key) {
        Some(idx) => idx,
        None => {
            entries.push((key, V::default()));
            entries.len() - 1
        }
    };
    &mut entries[idx].1
}

impl BenchmarkSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a measurement unless one already exists for the same key.
    pub fn add_measurement(&mut self, tool: Tool, dataset: &str, algorithm: Algorithm, result: ExecutionResult) {
        let datasets = slot(&mut self.measurements, algorithm);
        let tools = slot(datasets, dataset.to_string());
        if tools.iter().any(|(t, _)| *t == tool) {
            tracing::debug!("[summary | add]: keeping first result for {algorithm}/{dataset}/{tool}");
            return;
        }
        tools.push((tool, result));
    }

    pub fn algorithms(&self) -> Vec<Algorithm> {
        self.measurements.iter().map(|(a, _)| *a).collect()
    }

    pub fn get(&self, algorithm: Algorithm, dataset: &str, tool: Tool) -> Option<&ExecutionResult> {
        self.measurements
            .iter()
            .find(|(a, _)| *a == algorithm)?
            .1
            .iter()
            .find(|(d, _)| d == dataset)?
            .1
            .iter()
            .find(|(t, _)| *t == tool)
            .map(|(_, r)| r)
    }

    /// Every measurement as `(algorithm, dataset, tool, result)`, in insertion order.
    pub fn measurements(&self) -> impl Iterator<Item = (Algorithm, &str, Tool, &ExecutionResult)> {
        self.measurements.iter().flat_map(|(algorithm, datasets)| {
            datasets.iter().flat_map(move |(dataset, tools)| {
                tools
                    .iter()
                    .map(move |(tool, result)| (*algorithm, dataset.as_str(), *tool, result))
            })
        })
    }

    pub fn len(&self) -> usize {
        self.measurements().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw report: one line per measurement.
    pub fn render_raw(&self, printer: ResultsPrinter) -> String {
        self.measurements()
            .map(|(algorithm, dataset, tool, result)| {
                format!(
                    "algo: {algorithm}, dataset: {dataset}, tool: {tool}, result: {}\n",
                    printer.print(result)
                )
            })
            .collect()
    }

    /// CSV table for one algorithm, or `None` when it has no datasets.
    ///
    /// Columns come from the tools recorded for the first dataset.
    pub fn render_csv(&self, algorithm: Algorithm, printer: ResultsPrinter) -> crate::Result<Option<String>> {
        let Some((_, datasets)) = self.measurements.iter().find(|(a, _)| *a == algorithm) else {
            return Ok(None);
        };
        let Some((_, first)) = datasets.first() else {
            return Ok(None);
        };
        let columns: Vec<Tool> = first.iter().map(|(t, _)| *t).collect();

        let mut writer = csv::Writer::from_writer(Vec::new());
        let header = std::iter::once("dataset").chain(columns.iter().map(|t| t.name()));
        writer.write_record(header)?;

        for (dataset, tools) in datasets {
            for (tool, _) in tools.iter().filter(|(t, _)| !columns.contains(t)) {
                tracing::warn!("[summary | csv]: {tool} is not a column of {algorithm}.csv, leaving out its {dataset} result");
            }
            let mut row = vec![dataset.clone()];
            row.extend(columns.iter().map(|column| {
                tools
                    .iter()
                    .find(|(t, _)| t == column)
                    .map(|(_, result)| printer.print(result))
                    .unwrap_or_default()
            }));
            writer.write_record(&row)?;
        }

        let bytes = writer.into_inner().map_err(|e| BenchError::Io(e.into_error()))?;
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Write the report to a fresh timestamped directory under `output_dir`
    /// and point `output_dir/recent` at it. Returns the new directory.
    pub fn dump(&self, format: OutputFormat, output_dir: &Path, printer: ResultsPrinter) -> crate::Result<PathBuf> {
        fs::create_dir_all(output_dir)?;
        let report_dir = unique_report_dir(output_dir)?;
        relink_recent(output_dir, &report_dir)?;

        tracing::info!(
            "[summary | dump]: symlink: {}, target: {}",
            output_dir.join(RECENT_LINK).display(),
            report_dir.display()
        );

        match format {
            OutputFormat::Raw => {
                let file = report_dir.join("raw").with_extension(format.extension());
                fs::write(file, self.render_raw(printer))?;
            }
            OutputFormat::Csv => {
                for algorithm in self.algorithms() {
                    if let Some(table) = self.render_csv(algorithm, printer)? {
                        let file = report_dir.join(algorithm.name()).with_extension(format.extension());
                        fs::write(file, table)?;
                    }
                }
            }
        }
        Ok(report_dir)
    }
}

fn unique_report_dir(output_dir: &Path) -> crate::Result<PathBuf> {
    let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let mut candidate = output_dir.join(&stamp);
    let mut n = 1;
    loop {
        match fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                candidate = output_dir.join(format!("{stamp}-{n}"));
                n += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Replace the `recent` link. Not atomic: a crash in between leaves no link.
///
/// A real directory named `recent` is left alone and the link is not made.
fn relink_recent(output_dir: &Path, report_dir: &Path) -> crate::Result<()> {
    let link = output_dir.join(RECENT_LINK);
    match fs::symlink_metadata(&link) {
        Ok(meta) if meta.is_dir() => {
            tracing::warn!("[summary | dump]: {} is a directory, not updating it", link.display());
            return Ok(());
        }
        Ok(_) => fs::remove_file(&link)?,
        Err(_) => {}
    }
    let target = report_dir.strip_prefix(output_dir).unwrap_or(report_dir);

    #[cfg(unix)]
    std::os::unix::fs::symlink(target, &link)?;
    #[cfg(windows)]
    std::os::windows::fs::symlink_dir(target, &link)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(median: f64) -> ExecutionResult {
        ExecutionResult {
            warm_up: 1.0,
            times: vec![median; 3],
        }
    }

    fn sample() -> BenchmarkSummary {
        let mut summary = BenchmarkSummary::new();
        for dataset in ["B", "A"] {
            summary.add_measurement(Tool::Spla, dataset, Algorithm::Bfs, result(1.0));
            summary.add_measurement(Tool::LaGraph, dataset, Algorithm::Bfs, result(2.0));
        }
        summary
    }

    #[test]
    fn test_first_write_wins() {
        let mut summary = BenchmarkSummary::new();
        summary.add_measurement(Tool::Spla, "A", Algorithm::Tc, result(1.0));
        summary.add_measurement(Tool::Spla, "A", Algorithm::Tc, result(9.0));

        assert_eq!(summary.len(), 1);
        assert_eq!(summary.get(Algorithm::Tc, "A", Tool::Spla).unwrap().median(), 1.0);
    }

    #[test]
    fn test_csv_header_and_row_order() {
        let csv = sample().render_csv(Algorithm::Bfs, ResultsPrinter::Median).unwrap().unwrap();
        assert_eq!(csv, "dataset,spla,lagraph\nB,1.00,2.00\nA,1.00,2.00\n");
        assert!(sample().render_csv(Algorithm::Sssp, ResultsPrinter::Median).unwrap().is_none());
    }

    #[test]
    fn test_csv_quotes_dataset_names_with_commas() {
        let mut summary = BenchmarkSummary::new();
        summary.add_measurement(Tool::Spla, "road,usa", Algorithm::Tc, result(1.5));
        summary.add_measurement(Tool::Gunrock, "say \"hi\"", Algorithm::Tc, result(2.5));

        let csv = summary.render_csv(Algorithm::Tc, ResultsPrinter::Median).unwrap().unwrap();
        assert_eq!(csv, "dataset,spla\n\"road,usa\",1.50\n\"say \"\"hi\"\"\",\n");
    }

    #[test]
    fn test_raw_lines() {
        let raw = sample().render_raw(ResultsPrinter::Median);
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "algo: bfs, dataset: B, tool: spla, result: 1.00");
    }

    #[test]
    fn test_dump_writes_one_file_per_algorithm() {
        let dir = tempfile::tempdir().unwrap();
        let mut summary = sample();
        summary.add_measurement(Tool::Gunrock, "A", Algorithm::Tc, result(3.0));

        let report = summary
            .dump(OutputFormat::Csv, dir.path(), ResultsPrinter::All)
            .unwrap();
        assert!(report.join("bfs.csv").exists());
        assert!(report.join("tc.csv").exists());
        assert!(!report.join("sssp.csv").exists());

        #[cfg(unix)]
        assert_eq!(
            fs::canonicalize(dir.path().join(RECENT_LINK)).unwrap(),
            fs::canonicalize(&report).unwrap()
        );
    }

    #[test]
    fn test_dump_twice_moves_recent_link() {
        let dir = tempfile::tempdir().unwrap();
        let summary = sample();

        let first = summary.dump(OutputFormat::Raw, dir.path(), ResultsPrinter::All).unwrap();
        let second = summary.dump(OutputFormat::Raw, dir.path(), ResultsPrinter::All).unwrap();
        assert_ne!(first, second);
        assert!(second.join("raw.txt").exists());

        #[cfg(unix)]
        assert_eq!(
            fs::canonicalize(dir.path().join(RECENT_LINK)).unwrap(),
            fs::canonicalize(&second).unwrap()
        );
    }

    #[test]
    fn test_dump_survives_recent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let squatter = dir.path().join(RECENT_LINK);
        fs::create_dir(&squatter).unwrap();
        fs::write(squatter.join("keep.txt"), "mine").unwrap();

        let report = sample()
            .dump(OutputFormat::Csv, dir.path(), ResultsPrinter::All)
            .unwrap();
        assert!(report.join("bfs.csv").exists());
        assert!(squatter.join("keep.txt").exists());
    }

    #[test]
    fn test_empty_summary_still_dumps() {
        let dir = tempfile::tempdir().unwrap();
        let report = BenchmarkSummary::new()
            .dump(OutputFormat::Csv, dir.path(), ResultsPrinter::All)
            .unwrap();
        assert!(report.is_dir());
        assert_eq!(fs::read_dir(report).unwrap().count(), 0);
    }
}
