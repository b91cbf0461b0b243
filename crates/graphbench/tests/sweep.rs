use graphbench::dataset::{DatasetSource, ValueType};
use graphbench::{
    Algorithm, BenchError, BenchmarkConfig, BenchmarkRunner, BenchmarkSummary, Dataset, Driver, ExecutionResult,
    OutputFormat, ResultsPrinter, Tool,
};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

/// Source that "downloads" a fixed matrix body and records every URL.
struct CannedSource {
    body: &'static str,
    fetched: RefCell<Vec<String>>,
}

impl DatasetSource for CannedSource {
    fn materialize(&self, url: &str, dest: &Path) -> graphbench::Result<PathBuf> {
        self.fetched.borrow_mut().push(url.to_string());
        std::fs::create_dir_all(dest.parent().unwrap())?;
        std::fs::write(dest, self.body)?;
        Ok(dest.to_path_buf())
    }
}

/// Driver with lagraph-like capabilities: SSSP needs edge values.
struct WeightedOnly(Tool);

impl Driver for WeightedOnly {
    fn tool(&self) -> Tool {
        self.0
    }
    fn can_run_bfs(&self, _: &Dataset) -> graphbench::Result<bool> {
        Ok(true)
    }
    fn can_run_sssp(&self, dataset: &Dataset) -> graphbench::Result<bool> {
        Ok(dataset.element_type()? != ValueType::Void)
    }
    fn can_run_tc(&self, _: &Dataset) -> graphbench::Result<bool> {
        Ok(true)
    }
    fn run_bfs(&self, _: &Dataset, _: u64, n: usize) -> graphbench::Result<ExecutionResult> {
        Ok(ExecutionResult {
            warm_up: 0.5,
            times: vec![1.0; n],
        })
    }
    fn run_sssp(&self, _: &Dataset, _: u64, n: usize) -> graphbench::Result<ExecutionResult> {
        Ok(ExecutionResult {
            warm_up: 0.5,
            times: vec![2.0; n],
        })
    }
    fn run_tc(&self, _: &Dataset, n: usize) -> graphbench::Result<ExecutionResult> {
        Ok(ExecutionResult {
            warm_up: 0.5,
            times: vec![4.0; n],
        })
    }
}

fn config(root: &Path) -> BenchmarkConfig {
    let mut config = BenchmarkConfig::with_root(root.to_path_buf());
    config
        .dataset_urls
        .insert("square".into(), "https://example.org/MM/demo/square.tar.gz".into());
    config.datasets = vec!["square".into()];
    config
}

#[test]
fn test_downloaded_dataset_is_resolved_once() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let source = CannedSource {
        body: "4 4 5\n1 2\n2 3\n3 4\n4 1\n",
        fetched: RefCell::new(Vec::new()),
    };

    let first = Dataset::open("square", &config, &source).unwrap();
    let second = Dataset::open("square", &config, &source).unwrap();

    assert_eq!(first.path(), second.path());
    assert_eq!(source.fetched.borrow().len(), 1);
    assert!(first.directed().unwrap());
    assert_eq!(first.element_type().unwrap(), ValueType::Void);
}

#[test]
fn test_sweep_skips_sssp_on_unweighted_graph() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let source = CannedSource {
        body: "4 4 5\n1 2\n2 3\n3 4\n4 1\n",
        fetched: RefCell::new(Vec::new()),
    };

    let runner = BenchmarkRunner::new(
        vec![Box::new(WeightedOnly(Tool::LaGraph)), Box::new(WeightedOnly(Tool::Gunrock))],
        Algorithm::all(),
    )
    .with_stop_check(|| false);

    let mut summary = BenchmarkSummary::new();
    runner
        .run(&config.datasets, |name| Dataset::open(name, &config, &source), &mut summary)
        .unwrap();

    assert_eq!(summary.algorithms(), vec![Algorithm::Bfs, Algorithm::Tc]);
    assert_eq!(summary.len(), 4);
    let tc = summary.get(Algorithm::Tc, "square", Tool::Gunrock).unwrap();
    assert_eq!(tc.times.len(), 50);
    assert_eq!(tc.median(), 4.0);

    let report = summary
        .dump(OutputFormat::Csv, &config.output_dir, ResultsPrinter::Median)
        .unwrap();
    let csv = std::fs::read_to_string(report.join("tc.csv")).unwrap();
    assert_eq!(csv, "dataset,lagraph,gunrock\nsquare,4.00,4.00\n");
}

#[test]
fn test_missing_dataset_aborts_without_keep_going() {
    let dir = tempfile::tempdir().unwrap();
    let config = BenchmarkConfig::with_root(dir.path().to_path_buf());
    let source = CannedSource {
        body: "",
        fetched: RefCell::new(Vec::new()),
    };

    let runner = BenchmarkRunner::new(vec![Box::new(WeightedOnly(Tool::Spla))], vec![Algorithm::Bfs])
        .with_stop_check(|| false);
    let mut summary = BenchmarkSummary::new();
    let err = runner
        .run(&["nowhere".into()], |name| Dataset::open(name, &config, &source), &mut summary)
        .unwrap_err();

    assert!(matches!(err, BenchError::MissingSource(name) if name == "nowhere"));
    assert!(summary.is_empty());
    assert!(source.fetched.borrow().is_empty());
}
