//! Cross-engine benchmark harness for sparse graph algorithms.
//!
//! Runs the same algorithm on the same dataset with several native engines
//! and writes comparable timing reports:
//!
//! - **spla**: OpenCL sparse linear algebra
//! - **lagraph**: LAGraph on SuiteSparse:GraphBLAS
//! - **gunrock**: CUDA graph primitives
//! - **graphblast**: CUDA GraphBLAS
//!
//! Supported algorithms are BFS, SSSP and triangle counting.
//!
//! # Usage
//!
//! ```text
//! graphbench [OPTIONS]
//!
//! Options:
//!   -a, --algo <ALGO>        Algorithm to benchmark (repeatable)
//!   -t, --tool <TOOL>        Engine to benchmark (repeatable)
//!   -d, --dataset <NAME>     Dataset name or archive URL (repeatable)
//!   -o, --output <DIR>       Report directory (default: ./benchmarks)
//!       --format <FORMAT>    csv or raw
//!       --printer <PRINTER>  all or median
//!       --keep-going         Continue past failed runs
//!   -v, --verbose            Verbose output
//! ```

pub mod builder;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod driver;
pub mod error;
pub mod results;
pub mod runner;
pub mod signal;

pub use builder::{Builder, NativeBuilder};
pub use cli::Cli;
pub use config::{Algorithm, BenchmarkConfig, SizeCategory, Tool};
pub use dataset::Dataset;
pub use driver::{Driver, ExecutionResult, create_driver};
pub use error::{BenchError, Result};
pub use results::{BenchmarkSummary, OutputFormat, ResultsPrinter};
pub use runner::BenchmarkRunner;
