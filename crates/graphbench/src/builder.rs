//! Native builds of the engine executables.
//!
//! Each engine is built with its own recipe (cmake/make, plus a GraphBLAS
//! checkout for LaGraph) only when one of its executables is missing.

use crate::config::{BenchmarkConfig, Tool};
use crate::error::BenchError;
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::Command;

/// Makes sure an engine's executables exist.
pub trait Builder {
    /// Build `tool` if needed. Fails with [`BenchError::BuildFailure`] when
    /// any expected executable is still missing afterwards.
    fn ensure_built(&self, tool: Tool) -> crate::Result<()>;
}

/// One command of a build recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStep {
    /// Program looked up on `PATH`.
    pub program: String,
    pub args: Vec<String>,
    /// Working directory, created before running. `None` inherits ours.
    pub cwd: Option<PathBuf>,
    /// Extra environment variables.
    pub env: Vec<(String, String)>,
}

impl BuildStep {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
            cwd: None,
            env: Vec::new(),
        }
    }

    #[must_use]
    fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    #[must_use]
    fn envs(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env.extend(vars);
        self
    }

    /// Command line for logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn run(&self) -> crate::Result<()> {
        if let Some(dir) = &self.cwd {
            std::fs::create_dir_all(dir)?;
        }
        tracing::info!("[subprocess | build]: {}", self.display());

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).envs(self.env.iter().map(|(k, v)| (k, v)));
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        let status = cmd.status()?;
        if status.success() {
            Ok(())
        } else {
            Err(BenchError::EngineExecution {
                command: self.display(),
                reason: format!("exited with {status}"),
            })
        }
    }
}

/// Builds engines from their source checkouts with the host toolchain.
#[derive(Debug)]
pub struct NativeBuilder {
    config: BenchmarkConfig,
    force: bool,
    done: RefCell<HashSet<Tool>>,
}

impl NativeBuilder {
    pub fn new(config: BenchmarkConfig) -> Self {
        Self {
            config,
            force: false,
            done: RefCell::new(HashSet::new()),
        }
    }

    /// Rebuild every engine once, even if its executables exist.
    #[must_use]
    pub fn force_rebuild(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    fn build_env(&self) -> Vec<(String, String)> {
        self.config
            .build
            .env()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    /// Commands that build `tool`.
    pub fn recipe(&self, tool: Tool) -> Vec<BuildStep> {
        let Some(paths) = self.config.tool(tool) else {
            return Vec::new();
        };
        let jobs = self.config.build.jobs_flag();
        let sources = paths.sources.display().to_string();
        let build = paths.build.display().to_string();

        match tool {
            Tool::Spla => vec![
                BuildStep::new("cmake", &[&sources, "-DCMAKE_BUILD_TYPE=Release"])
                    .cwd(&paths.build)
                    .envs(self.build_env()),
                BuildStep::new("make", &[&jobs]).cwd(&paths.build),
            ],
            Tool::GraphBlast => vec![BuildStep::new(
                "make",
                &["-B", &format!("--directory={sources}"), &jobs],
            )],
            Tool::Gunrock => {
                let gunrock = &self.config.gunrock;
                let arch = if gunrock.autodetect {
                    "-DCUDA_AUTODETECT_GENCODE=ON".to_string()
                } else {
                    format!("-DGUNROCK_GENCODE_{}=ON", gunrock.gencode)
                };
                let mut compile = BuildStep::new("cmake", &["--build", &build]);
                for exe in paths.executables.values() {
                    if let Some(name) = exe.file_name() {
                        compile = compile.arg("-t").arg(name.to_string_lossy());
                    }
                }
                vec![
                    BuildStep::new("cmake", &[&sources, "-B", &build])
                        .arg(arch)
                        .envs(self.build_env()),
                    compile.arg("-j").arg(self.config.build.jobs.to_string()),
                ]
            }
            Tool::LaGraph => {
                let mut steps = self.suitesparse_recipe();
                let sp = &self.config.suitesparse;
                let include = format!("-DGRAPHBLAS_INCLUDE_DIR={}", sp.include_dir().display());
                let library = format!("-DGRAPHBLAS_LIBRARY={}", sp.library().display());
                let env = self.build_env().into_iter().chain([
                    ("GRAPHBLAS_INCLUDE_DIR".to_string(), sp.include_dir().display().to_string()),
                    ("GRAPHBLAS_LIBRARY".to_string(), sp.library().display().to_string()),
                ]);
                steps.push(
                    BuildStep::new("cmake", &[&sources, &include, &library])
                        .cwd(&paths.build)
                        .envs(env),
                );
                steps.push(BuildStep::new("make", &[&jobs]).cwd(&paths.build));
                steps
            }
        }
    }

    /// Clone (if needed) and build SuiteSparse:GraphBLAS.
    fn suitesparse_recipe(&self) -> Vec<BuildStep> {
        let sp = &self.config.suitesparse;
        if sp.include_dir().exists() && sp.library().exists() && !self.force {
            return Vec::new();
        }
        let dest = sp.dest.display().to_string();
        let mut steps = Vec::new();
        if !sp.include_dir().exists() {
            steps.push(BuildStep::new("git", &["clone", "--recursive", &sp.url, &dest]));
        }
        steps.push(BuildStep::new("git", &["checkout", &sp.branch]).cwd(&sp.dest));
        steps.push(
            BuildStep::new("cmake", &[".."])
                .cwd(sp.build_dir())
                .envs(self.build_env()),
        );
        steps.push(BuildStep::new("make", &[&self.config.build.jobs_flag()]).cwd(sp.build_dir()));
        steps
    }

    fn missing_targets(&self, tool: Tool) -> Vec<PathBuf> {
        self.config
            .tool(tool)
            .map(|paths| paths.all_executables())
            .unwrap_or_default()
            .into_iter()
            .filter(|p| !p.exists())
            .collect()
    }
}

impl Builder for NativeBuilder {
    fn ensure_built(&self, tool: Tool) -> crate::Result<()> {
        let first_request = self.done.borrow_mut().insert(tool);
        let missing = self.missing_targets(tool);
        if missing.is_empty() && !(self.force && first_request) {
            tracing::debug!("[{tool} | build]: all targets present");
            return Ok(());
        }

        tracing::info!("[{tool} | build]: building");
        for step in self.recipe(tool) {
            if let Err(e) = step.run() {
                tracing::error!("[{tool} | build]: {e}");
                break;
            }
        }

        let missing = self.missing_targets(tool);
        if missing.is_empty() {
            tracing::info!("[{tool} | build]: done");
            Ok(())
        } else {
            Err(BenchError::BuildFailure { tool, missing })
        }
    }
}
