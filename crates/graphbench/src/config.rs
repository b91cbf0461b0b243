//! Configuration types for the benchmark harness.

use crate::dataset::catalog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Suffix appended to engine executables on this platform.
#[cfg(windows)]
pub const EXECUTABLE_EXT: &str = "exe";
#[cfg(not(windows))]
pub const EXECUTABLE_EXT: &str = "";

/// Graph algorithm benchmarked across engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Breadth-first search from a source vertex
    Bfs,
    /// Triangle counting
    Tc,
    /// Single-source shortest paths
    Sssp,
}

impl Algorithm {
    /// Get the tag used in flags, file names and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bfs => "bfs",
            Self::Tc => "tc",
            Self::Sssp => "sssp",
        }
    }

    /// All algorithms, in report order.
    pub fn all() -> Vec<Self> {
        vec![Self::Bfs, Self::Tc, Self::Sssp]
    }

    /// Whether the algorithm starts from a source vertex.
    pub fn needs_source(self) -> bool {
        matches!(self, Self::Bfs | Self::Sssp)
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bfs" => Ok(Self::Bfs),
            "tc" | "triangles" => Ok(Self::Tc),
            "sssp" => Ok(Self::Sssp),
            _ => Err(format!("Unknown algorithm: {s}. Valid options: bfs, tc, sssp")),
        }
    }
}

/// Graph engine ("tool") whose executables are benchmarked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    GraphBlast,
    Spla,
    LaGraph,
    Gunrock,
}

impl Tool {
    /// Get the name used in flags, file names and report columns.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GraphBlast => "graphblast",
            Self::Spla => "spla",
            Self::LaGraph => "lagraph",
            Self::Gunrock => "gunrock",
        }
    }

    /// All engines, in report order.
    pub fn all() -> Vec<Self> {
        vec![Self::GraphBlast, Self::Spla, Self::LaGraph, Self::Gunrock]
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "graphblast" => Ok(Self::GraphBlast),
            "spla" => Ok(Self::Spla),
            "lagraph" => Ok(Self::LaGraph),
            "gunrock" => Ok(Self::Gunrock),
            _ => Err(format!(
                "Unknown tool: {s}. Valid options: graphblast, spla, lagraph, gunrock"
            )),
        }
    }
}

/// Dataset size tier, derived from the edge count.
///
/// Tiers are ordered by ascending upper bound; each bound is inclusive and the
/// last tier is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeCategory {
    Tiny,
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl SizeCategory {
    /// All tiers in ascending bound order.
    pub const ALL: [Self; 5] = [
        Self::Tiny,
        Self::Small,
        Self::Medium,
        Self::Large,
        Self::ExtraLarge,
    ];

    /// Inclusive upper bound on the number of edges (`None` = unbounded).
    pub fn max_edges(&self) -> Option<u64> {
        match self {
            Self::Tiny => Some(5_000),
            Self::Small => Some(80_000),
            Self::Medium => Some(500_000),
            Self::Large => Some(2_000_000),
            Self::ExtraLarge => None,
        }
    }

    /// Number of timed iterations to request for datasets of this size.
    pub fn iterations(&self) -> usize {
        match self {
            Self::Tiny => 50,
            Self::Small => 20,
            Self::Medium => 10,
            Self::Large => 5,
            Self::ExtraLarge => 2,
        }
    }

    /// Classify an edge count into the first tier whose bound admits it.
    pub fn from_edges(edges: u64) -> Self {
        Self::ALL
            .into_iter()
            .find(|tier| tier.max_edges().is_none_or(|max| max >= edges))
            .unwrap_or(Self::ExtraLarge)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Tiny => "tiny",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::ExtraLarge => "extra_large",
        }
    }
}

impl std::fmt::Display for SizeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Native build settings shared by every engine build.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Parallel jobs passed as `-j<N>`.
    pub jobs: usize,
    /// C compiler, exported as `CC`.
    pub cc: Option<String>,
    /// C++ compiler, exported as `CXX`.
    pub cxx: Option<String>,
    /// Host compiler for CUDA builds (Gunrock).
    pub cudacxx: Option<String>,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            jobs: 6,
            cc: None,
            cxx: None,
            cudacxx: Some("/usr/bin/g++-8".to_string()),
        }
    }
}

impl BuildSettings {
    /// The `-jN` flag for make-style builds.
    pub fn jobs_flag(&self) -> String {
        format!("-j{}", self.jobs.max(1))
    }

    /// Compiler overrides to add to the build environment.
    pub fn env(&self) -> Vec<(&'static str, String)> {
        [
            ("CC", &self.cc),
            ("CXX", &self.cxx),
            ("CUDAHOSTCXX", &self.cudacxx),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.clone().map(|v| (k, v)))
        .collect()
    }
}

/// Where an engine's sources, build tree and per-algorithm executables live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolPaths {
    /// Source checkout.
    pub sources: PathBuf,
    /// Build tree holding the executables.
    pub build: PathBuf,
    /// Executable path of each algorithm, relative to `build`.
    pub executables: BTreeMap<Algorithm, PathBuf>,
}

impl ToolPaths {
    fn new(sources: PathBuf, build: PathBuf, bfs: &str, sssp: &str, tc: &str) -> Self {
        let executables = [
            (Algorithm::Bfs, PathBuf::from(bfs)),
            (Algorithm::Sssp, PathBuf::from(sssp)),
            (Algorithm::Tc, PathBuf::from(tc)),
        ]
        .into_iter()
        .collect();
        Self {
            sources,
            build,
            executables,
        }
    }

    /// Absolute path of the executable for an algorithm.
    pub fn executable(&self, algorithm: Algorithm) -> Option<PathBuf> {
        self.executables
            .get(&algorithm)
            .map(|rel| self.build.join(rel).with_extension(EXECUTABLE_EXT))
    }

    /// All executables the build must produce.
    pub fn all_executables(&self) -> Vec<PathBuf> {
        self.executables
            .keys()
            .filter_map(|algo| self.executable(*algo))
            .collect()
    }
}

/// GraphBLAST command-line switches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphBlastOptions {
    /// 0: no per-iteration timing, 1: per-iteration timing.
    pub timing: u8,
    /// Skip the CPU verification run.
    pub skip_cpu_verify: bool,
}

/// Gunrock command-line and build switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GunrockOptions {
    /// Graph file type, `market` for matrix-exchange files.
    pub graph_type: String,
    /// CUDA device index.
    pub device: u32,
    /// Autodetect the target architecture instead of using `gencode`.
    pub autodetect: bool,
    /// Target SM architecture, e.g. `SM61`.
    pub gencode: String,
}

impl Default for GunrockOptions {
    fn default() -> Self {
        Self {
            graph_type: "market".to_string(),
            device: 0,
            autodetect: true,
            gencode: "SM61".to_string(),
        }
    }
}

/// SuiteSparse:GraphBLAS checkout used to build LaGraph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteSparseSource {
    /// Git repository to clone.
    pub url: String,
    /// Tag or branch checked out before building.
    pub branch: String,
    /// Checkout directory.
    pub dest: PathBuf,
}

impl SuiteSparseSource {
    pub fn include_dir(&self) -> PathBuf {
        self.dest.join("Include")
    }

    pub fn build_dir(&self) -> PathBuf {
        self.dest.join("build")
    }

    pub fn library(&self) -> PathBuf {
        #[cfg(target_os = "macos")]
        let ext = "dylib";
        #[cfg(windows)]
        let ext = "dll";
        #[cfg(not(any(target_os = "macos", windows)))]
        let ext = "so";
        self.build_dir().join("libgraphblas").with_extension(ext)
    }
}

/// Configuration for a benchmark invocation.
///
/// Every field has a default derived from `root`; a JSON file may override
/// any subset and CLI flags are applied last.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    pub root: PathBuf,
    /// Directory holding materialized `.mtx` datasets.
    pub dataset_dir: PathBuf,
    /// JSON document with memoized dataset properties.
    pub properties_path: PathBuf,
    /// Directory holding engine checkouts.
    pub deps_dir: PathBuf,
    /// Directory receiving timestamped reports.
    pub output_dir: PathBuf,
    /// Datasets to benchmark, in order.
    pub datasets: Vec<String>,
    /// Known dataset names and their archive URLs.
    pub dataset_urls: BTreeMap<String, String>,
    /// Source vertex for BFS and SSSP.
    pub default_source: u64,
    pub build: BuildSettings,
    pub tools: BTreeMap<Tool, ToolPaths>,
    pub graphblast: GraphBlastOptions,
    pub gunrock: GunrockOptions,
    pub suitesparse: SuiteSparseSource,
    /// Enable colored console output.
    pub color: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self::with_root(PathBuf::from("."))
    }
}

impl BenchmarkConfig {
    /// Create a configuration whose default paths hang off `root`.
    pub fn with_root(root: PathBuf) -> Self {
        let dataset_dir = root.join("dataset");
        let deps = root.join("deps");

        let tools = [
            (
                Tool::LaGraph,
                ToolPaths::new(
                    deps.join("lagraph"),
                    deps.join("lagraph").join("build"),
                    "sources/benchmark/bfs_demo",
                    "sources/benchmark/sssp_demo",
                    "sources/benchmark/tc_demo",
                ),
            ),
            (
                Tool::Spla,
                ToolPaths::new(
                    deps.join("spla"),
                    deps.join("spla").join("build"),
                    "spla_bfs",
                    "spla_sssp",
                    "spla_tc",
                ),
            ),
            (
                Tool::GraphBlast,
                ToolPaths::new(
                    deps.join("graphblast"),
                    deps.join("graphblast").join("bin"),
                    "gbfs",
                    "gsssp",
                    "gtc",
                ),
            ),
            (
                Tool::Gunrock,
                ToolPaths::new(
                    deps.join("gunrock"),
                    deps.join("gunrock").join("build"),
                    "bin/bfs",
                    "bin/sssp",
                    "bin/gtc",
                ),
            ),
        ]
        .into_iter()
        .collect();

        Self {
            properties_path: dataset_dir.join("properties.json"),
            dataset_dir,
            output_dir: root.join("benchmarks"),
            datasets: catalog::BENCHMARK_DATASETS
                .iter()
                .map(ToString::to_string)
                .collect(),
            dataset_urls: catalog::default_urls(),
            default_source: 0,
            build: BuildSettings::default(),
            tools,
            graphblast: GraphBlastOptions::default(),
            gunrock: GunrockOptions::default(),
            suitesparse: SuiteSparseSource {
                url: "https://github.com/DrTimothyAldenDavis/GraphBLAS".to_string(),
                branch: "v6.1.4".to_string(),
                dest: deps.join("suitesparse_graphblast"),
            },
            deps_dir: deps,
            root,
            color: true,
        }
    }

    /// Load a configuration from a JSON file.
    ///
    /// Fields missing from the file take their defaults relative to the
    /// file's `root` (or `fallback_root` when the file does not set one).
    pub fn load(path: &Path, fallback_root: &Path) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut value: serde_json::Value = serde_json::from_str(&text)?;

        let root = value
            .get("root")
            .and_then(serde_json::Value::as_str)
            .map_or_else(|| fallback_root.to_path_buf(), PathBuf::from);

        // Overlay the file onto root-derived defaults, one top-level key at a time.
        let mut base = serde_json::to_value(Self::with_root(root))?;
        if let (Some(base_map), Some(overrides)) = (base.as_object_mut(), value.as_object_mut()) {
            for (key, v) in std::mem::take(overrides) {
                base_map.insert(key, v);
            }
        }
        Ok(serde_json::from_value(base)?)
    }

    /// Paths for one engine.
    pub fn tool(&self, tool: Tool) -> Option<&ToolPaths> {
        self.tools.get(&tool)
    }

    /// Executable of `tool` for `algorithm`.
    pub fn executable(&self, tool: Tool, algorithm: Algorithm) -> Option<PathBuf> {
        self.tool(tool).and_then(|paths| paths.executable(algorithm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_category_boundaries() {
        assert_eq!(SizeCategory::from_edges(0), SizeCategory::Tiny);
        assert_eq!(SizeCategory::from_edges(5_000), SizeCategory::Tiny);
        assert_eq!(SizeCategory::from_edges(5_001), SizeCategory::Small);
        assert_eq!(SizeCategory::from_edges(80_000), SizeCategory::Small);
        assert_eq!(SizeCategory::from_edges(500_001), SizeCategory::Large);
        assert_eq!(SizeCategory::from_edges(2_000_001), SizeCategory::ExtraLarge);
        assert_eq!(SizeCategory::from_edges(u64::MAX), SizeCategory::ExtraLarge);
    }

    #[test]
    fn test_iterations_shrink_with_size() {
        let iters: Vec<_> = SizeCategory::ALL.iter().map(SizeCategory::iterations).collect();
        assert_eq!(iters, vec![50, 20, 10, 5, 2]);
    }

    #[test]
    fn test_only_traversals_take_a_source() {
        assert!(Algorithm::Bfs.needs_source());
        assert!(Algorithm::Sssp.needs_source());
        assert!(!Algorithm::Tc.needs_source());
    }

    #[test]
    fn test_parsing() {
        assert_eq!("BFS".parse::<Algorithm>().unwrap(), Algorithm::Bfs);
        assert_eq!("sssp".parse::<Algorithm>().unwrap(), Algorithm::Sssp);
        assert_eq!("lagraph".parse::<Tool>().unwrap(), Tool::LaGraph);
        assert!("pagerank".parse::<Algorithm>().is_err());
        assert!("networkx".parse::<Tool>().is_err());
    }

    #[test]
    fn test_default_executables() {
        let config = BenchmarkConfig::with_root(PathBuf::from("/bench"));
        let bfs = config.executable(Tool::Spla, Algorithm::Bfs).unwrap();
        assert!(bfs.starts_with("/bench/deps/spla/build"));
        assert_eq!(bfs.file_stem().unwrap(), "spla_bfs");

        let tc = config.executable(Tool::Gunrock, Algorithm::Tc).unwrap();
        assert!(tc.ends_with(PathBuf::from("bin").join(format!("gtc{}", dot_ext()))));
        assert_eq!(config.tool(Tool::LaGraph).unwrap().all_executables().len(), 3);
    }

    fn dot_ext() -> String {
        if EXECUTABLE_EXT.is_empty() {
            String::new()
        } else {
            format!(".{EXECUTABLE_EXT}")
        }
    }

    #[test]
    fn test_load_overrides_only_given_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.json");
        std::fs::write(
            &path,
            r#"{ "datasets": ["tiny_graph"], "default_source": 3, "build": { "jobs": 2 } }"#,
        )
        .unwrap();

        let config = BenchmarkConfig::load(&path, dir.path()).unwrap();
        assert_eq!(config.datasets, vec!["tiny_graph".to_string()]);
        assert_eq!(config.default_source, 3);
        assert_eq!(config.build.jobs_flag(), "-j2");
        assert_eq!(config.dataset_dir, dir.path().join("dataset"));
        assert_eq!(config.tools.len(), 4);
    }

    #[test]
    fn test_build_env_skips_unset_compilers() {
        let settings = BuildSettings {
            jobs: 4,
            cc: Some("clang".into()),
            cxx: None,
            cudacxx: None,
        };
        assert_eq!(settings.env(), vec![("CC", "clang".to_string())]);
    }
}
