//! The `fix`, `repair` and `format` commands
//!
//! All three resolve the work list, build the run's [`Options`] and hand the
//! files to a [`WorkDispatcher`]; they differ only in which steps run.

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cli::Output;
use crate::config::{Options, SrcfixConfig};
use crate::parallel::{WorkDispatcher, calculate_optimal_workers};
use crate::processor::FileProcessor;
use crate::utils::resolve_work_list;

#[derive(Args)]
pub struct ProcessArgs {
    /// Files or directories to process
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Maximum number of files processed at once
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Skip the partially useful tools (duplicate detectors, flaw finder)
    #[arg(long)]
    pub essential_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Fix,
    Repair,
    Format,
}

impl Mode {
    fn repair(self) -> bool {
        matches!(self, Mode::Fix | Mode::Repair)
    }

    fn reformat(self) -> bool {
        matches!(self, Mode::Fix | Mode::Format)
    }
}

/// Returns 0 when every file was processed, 1 when any file failed.
pub fn execute(
    args: ProcessArgs,
    mode: Mode,
    custom_config: Option<&Path>,
    output: &Output,
) -> Result<i32> {
    let start_time = Instant::now();
    let config = SrcfixConfig::load_with_custom_config(custom_config)?;

    let files = resolve_work_list(&args.paths, &config.files.include)?;

    let max_threads = args.threads.unwrap_or(config.parallel.max_threads);
    let dispatcher = WorkDispatcher::new(calculate_optimal_workers(
        max_threads,
        config.parallel.thread_percentage,
    ));
    let workers = dispatcher.worker_count(files.len());

    let mut options = Options::from_env(
        mode.repair(),
        mode.reformat(),
        files.len(),
        output.is_verbose(),
        &config.include_env,
    )?
    .with_partial_tools(!args.essential_only);

    if workers > 1 && config.parallel.quiet_when_parallel && options.is_verbose() {
        output.verbose(&format!("{workers} workers in use, progress lines are turned off"));
        options = options.quieted();
    }

    let processor = FileProcessor::new(&config, &options, output)?;
    output.verbose(&format!(
        "{:?}: {} files, {} workers",
        mode,
        files.len(),
        workers
    ));

    let summary = dispatcher.dispatch(&files, |_, file| processor.process(file).map(|_| ()))?;

    for failure in summary.failures() {
        output.error(&failure.to_string());
    }

    let elapsed = start_time.elapsed().as_secs_f64();
    if summary.is_success() {
        output.success(&format!(
            "Processed {} files in {:.2} seconds",
            summary.total, elapsed
        ));
        Ok(0)
    } else {
        output.warning(&format!(
            "{} of {} files failed ({:.2} seconds)",
            summary.total - summary.succeeded(),
            summary.total,
            elapsed
        ));
        Ok(1)
    }
}
