//! Per-run options
//!
//! [`Options`] is built once per run, before any worker starts, and then
//! shared read-only by every worker and tool thread.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

/// Progress-line verbosity. The only transition is verbose to quiet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Verbose,
    Quiet,
}

#[derive(Debug, Clone)]
pub struct Options {
    repair: bool,
    reformat: bool,
    verbosity: Verbosity,
    parallel: bool,
    partial_tools: bool,
    include_flag: Option<String>,
    base_dir: PathBuf,
}

impl Options {
    /// Build options for `files_count` work items.
    ///
    /// Fails when neither repair nor reformat is requested, or when repair is
    /// requested without an include directory.
    pub fn new(
        repair: bool,
        reformat: bool,
        files_count: usize,
        verbose: bool,
        include_dir: Option<&str>,
    ) -> Result<Self> {
        if !repair && !reformat {
            bail!("At least one of repair or reformat must be set");
        }

        let include_flag = if repair {
            let dir = include_dir
                .map(str::trim)
                .filter(|dir| !dir.is_empty())
                .context("Repair mode requires an include directory")?;
            Some(format!("-I{dir}"))
        } else {
            None
        };

        let base_dir = std::env::current_dir().context("The current directory must be set")?;

        Ok(Self {
            repair,
            reformat,
            verbosity: if verbose {
                Verbosity::Verbose
            } else {
                Verbosity::Quiet
            },
            parallel: files_count > 1,
            partial_tools: true,
            include_flag,
            base_dir,
        })
    }

    /// Like [`Options::new`], reading the include directory from `include_env`.
    pub fn from_env(
        repair: bool,
        reformat: bool,
        files_count: usize,
        verbose: bool,
        include_env: &str,
    ) -> Result<Self> {
        let include_dir = std::env::var(include_env).ok();
        if repair && include_dir.as_deref().is_none_or(|dir| dir.trim().is_empty()) {
            bail!("Please set the environment variable '{include_env}' to the include directory");
        }
        Self::new(repair, reformat, files_count, verbose, include_dir.as_deref())
    }

    /// Enable or disable the partially useful analysis tools.
    pub fn with_partial_tools(mut self, enabled: bool) -> Self {
        self.partial_tools = enabled;
        self
    }

    /// Resolve relative paths against `dir` instead of the current directory.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// The one-way verbose to quiet transition.
    pub fn quieted(mut self) -> Self {
        self.verbosity = Verbosity::Quiet;
        self
    }

    pub fn is_repair(&self) -> bool {
        self.repair
    }

    pub fn is_reformat(&self) -> bool {
        self.reformat
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    /// True when more than one file is processed in this run.
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub fn run_partial_tools(&self) -> bool {
        self.partial_tools
    }

    /// Compiler-style include flag, e.g. `-I/opt/gsl/include`; set in repair mode.
    pub fn include_flag(&self) -> Option<&str> {
        self.include_flag.as_deref()
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}
