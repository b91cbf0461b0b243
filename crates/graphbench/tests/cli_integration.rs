#![allow(deprecated)] // cargo_bin! macro doesn't exist yet in assert_cmd 2.1
#![cfg(unix)]

use assert_cmd::Command;
use graphbench::{BenchmarkConfig, Tool};
use predicates::prelude::*;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::TempDir;

const SPLA_STDOUT: &str = "warm-up(ms): 4.0\niters(ms): \
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, \
    3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3\n";

fn graphbench(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("graphbench").unwrap();
    cmd.arg("--root").arg(root).arg("--no-color");
    cmd.env_remove("GRAPHBENCH_CONFIG").env_remove("RUST_LOG");
    cmd
}

/// Workspace whose spla executables are shell scripts printing `stdout`
/// and exiting with `status`, plus a local 3-vertex path graph `path3`.
fn workspace(stdout: &str, status: i32) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = BenchmarkConfig::with_root(dir.path().to_path_buf());

    for exe in config.tool(Tool::Spla).unwrap().all_executables() {
        std::fs::create_dir_all(exe.parent().unwrap()).unwrap();
        let script = format!("#!/bin/sh\ncat <<'EOF'\n{stdout}\nEOF\nexit {status}\n");
        std::fs::write(&exe, script).unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    std::fs::create_dir_all(&config.dataset_dir).unwrap();
    std::fs::write(config.dataset_dir.join("path3.mtx"), "3 3 3\n1 2\n2 3\n").unwrap();
    dir
}

fn recent(root: &Path) -> std::path::PathBuf {
    root.join("benchmarks").join("recent")
}

#[test]
fn test_sweep_writes_csv_report() {
    let dir = workspace(SPLA_STDOUT, 0);

    graphbench(dir.path())
        .args(["--tool", "spla", "--dataset", "path3", "--printer", "median"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to"))
        .stdout(predicate::str::contains("sssp / path3 skipped"));

    let bfs = std::fs::read_to_string(recent(dir.path()).join("bfs.csv")).unwrap();
    assert_eq!(bfs, "dataset,spla\npath3,2.00\n");
    assert!(recent(dir.path()).join("tc.csv").exists());
    // Void-valued graphs can not be used for SSSP with spla.
    assert!(!recent(dir.path()).join("sssp.csv").exists());
}

#[test]
fn test_raw_report_with_full_printer() {
    let dir = workspace(SPLA_STDOUT, 0);

    graphbench(dir.path())
        .args(["--tool", "spla", "--algo", "bfs", "--dataset", "path3", "--format", "raw"])
        .assert()
        .success();

    let raw = std::fs::read_to_string(recent(dir.path()).join("raw.txt")).unwrap();
    assert_eq!(
        raw,
        "algo: bfs, dataset: path3, tool: spla, result: warm_up=4.00ms avg=2.00ms median=2.00ms stdev=1.01\n"
    );
}

#[test]
fn test_engine_failure_still_writes_report() {
    let dir = workspace(SPLA_STDOUT, 3);

    graphbench(dir.path())
        .args(["--tool", "spla", "--algo", "bfs", "--dataset", "path3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Benchmark execution failed"));

    assert!(recent(dir.path()).is_dir());
    assert!(!recent(dir.path()).join("bfs.csv").exists());
}

#[test]
fn test_unwritable_report_keeps_sweep_error() {
    let dir = workspace(SPLA_STDOUT, 3);
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();

    graphbench(dir.path())
        .args(["--tool", "spla", "--algo", "bfs", "--dataset", "path3", "--output"])
        .arg(&blocker)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to write the report"))
        .stderr(predicate::str::contains("Benchmark execution failed"))
        .stderr(predicate::str::contains("exited with"));
}

#[test]
fn test_keep_going_succeeds_past_failures() {
    let dir = workspace(SPLA_STDOUT, 3);

    graphbench(dir.path())
        .args(["--tool", "spla", "--dataset", "path3", "--dataset", "absent", "--keep-going"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bfs / path3 / spla failed"));
}

#[test]
fn test_cache_commands() {
    let dir = workspace(SPLA_STDOUT, 0);

    graphbench(dir.path())
        .args(["--tool", "spla", "--algo", "tc", "--dataset", "path3"])
        .assert()
        .success();

    graphbench(dir.path())
        .arg("--cache-status")
        .assert()
        .success()
        .stdout(predicate::str::contains("path3"))
        .stdout(predicate::str::contains("directed: true"));

    graphbench(dir.path())
        .args(["--clear-cache", "path3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared cached properties of path3"));

    graphbench(dir.path())
        .arg("--cache-status")
        .assert()
        .success()
        .stdout(predicate::str::contains("(empty)"));
}

#[test]
fn test_unknown_tool_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    graphbench(dir.path())
        .args(["--tool", "networkx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("networkx"));
}
