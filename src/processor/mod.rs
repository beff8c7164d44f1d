//! Per-file processing
//!
//! [`FileProcessor`] takes one work item through
//! `Pending -> Repairing -> Reformatting -> Done`, or to `Failed`.
//!
//! Repair runs every enabled analysis tool and then the refactor tool. With
//! more than one file in the run each tool gets its own named thread inside a
//! scope, and the scope joins all of them before the formatter may touch the
//! file. Every tool writes into its own [`ReportBuffer`], which is emitted to
//! the [`ReportSink`] as one block when the tool finishes.

use anyhow::{Result, anyhow, bail};
use encoding_rs::Encoding;
use std::fmt::Write;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Mutex;
use std::time::Instant;

use crate::config::{Options, SrcfixConfig, ToolConfig};
use crate::report::ReportBuffer;
use crate::tools::{Formatter, ToolRunner};
use crate::utils::relative_path;

/// Destination of finished report blocks.
///
/// `emit` is called from several threads; each call must appear as one
/// contiguous block.
pub trait ReportSink: Send + Sync {
    fn emit(&self, block: &str);
}

/// Collects blocks in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    blocks: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> Vec<String> {
        self.blocks
            .lock()
            .map(|blocks| blocks.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// All blocks joined in emission order.
    pub fn contents(&self) -> String {
        self.blocks().concat()
    }
}

impl ReportSink for MemorySink {
    fn emit(&self, block: &str) {
        let mut blocks = self
            .blocks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        blocks.push(block.to_string());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Pending,
    Repairing,
    Reformatting,
    Done,
    Failed,
}

pub struct FileProcessor<'a> {
    config: &'a SrcfixConfig,
    options: &'a Options,
    sink: &'a dyn ReportSink,
    encoding: &'static Encoding,
}

impl<'a> FileProcessor<'a> {
    pub fn new(
        config: &'a SrcfixConfig,
        options: &'a Options,
        sink: &'a dyn ReportSink,
    ) -> Result<Self> {
        Ok(Self {
            config,
            options,
            sink,
            encoding: config.encoding()?,
        })
    }

    /// Tools run in repair mode, in order, the refactor tool last.
    pub fn repair_tools(&self) -> Vec<&'a ToolConfig> {
        let config: &'a SrcfixConfig = self.config;
        config
            .repair
            .tools
            .iter()
            .filter(|tool| tool.enabled)
            .filter(|tool| self.options.run_partial_tools() || !tool.partial)
            .chain(config.repair.refactor.iter().filter(|tool| tool.enabled))
            .collect()
    }

    /// Repair and/or reformat `file`.
    ///
    /// A failing analysis tool is reported and does not stop the others nor
    /// the formatter, but the file still ends up failed.
    pub fn process(&self, file: &str) -> Result<FileState> {
        let start_time = Instant::now();
        let cur_dir = self.options.base_dir().to_string_lossy().into_owned();
        let file = relative_path(&cur_dir, file);
        let mut state = FileState::Pending;

        if self.options.is_verbose() {
            self.sink.emit(&format!("  Start '{file}' in '{cur_dir}'.\n"));
        }

        let mut failed_tools = Vec::new();
        if self.options.is_repair() {
            state = self.advance(&file, state, FileState::Repairing);
            failed_tools = self.repair(&file);
        }

        if self.options.is_reformat() {
            state = self.advance(&file, state, FileState::Reformatting);
            if let Err(error) = self.reformat(&file) {
                self.advance(&file, state, FileState::Failed);
                return Err(error);
            }
        }

        if !failed_tools.is_empty() {
            self.advance(&file, state, FileState::Failed);
            bail!("Tools failed on '{}': {}", file, failed_tools.join(", "));
        }

        if self.options.is_verbose() {
            self.sink.emit(&format!(
                " Done '{}' in {:.3} seconds.\n",
                file,
                start_time.elapsed().as_secs_f64()
            ));
        }
        Ok(self.advance(&file, state, FileState::Done))
    }

    fn advance(&self, file: &str, from: FileState, to: FileState) -> FileState {
        tracing::trace!("{}: {:?} -> {:?}", file, from, to);
        to
    }

    /// Returns the names of the tools that failed.
    fn repair(&self, file: &str) -> Vec<String> {
        let tools = self.repair_tools();

        if !self.options.is_parallel() {
            return tools
                .into_iter()
                .filter(|tool| !self.run_guarded(tool, file))
                .map(|tool| tool.name.clone())
                .collect();
        }

        let thread_count = tools.len();
        if self.options.is_verbose() {
            self.sink.emit(&format!("  Starting {thread_count} repair threads..\n"));
        }

        let joined = crossbeam::thread::scope(|s| {
            let mut handles = Vec::with_capacity(thread_count);
            for tool in &tools {
                let spawned = s
                    .builder()
                    .name(tool.name.clone())
                    .spawn(move |_| self.run_guarded(tool, file));
                match spawned {
                    Ok(handle) => handles.push(Some(handle)),
                    Err(e) => {
                        tracing::warn!("Could not start thread '{}': {}", tool.name, e);
                        handles.push(None);
                    }
                }
            }

            let mut failed = Vec::new();
            for (index, (tool, handle)) in tools.iter().zip(handles).enumerate() {
                let mut join_log = ReportBuffer::new();
                if self.options.is_verbose() {
                    let _ = writeln!(
                        join_log,
                        "   Start joining thread '{}' {} out of {}..",
                        tool.name, index, thread_count
                    );
                }

                let succeeded = match handle {
                    Some(handle) => handle.join().unwrap_or(false),
                    None => false,
                };
                if !succeeded {
                    failed.push(tool.name.clone());
                }

                if self.options.is_verbose() {
                    let _ = writeln!(
                        join_log,
                        "  Done joining thread '{}' {} out of {}.",
                        tool.name, index, thread_count
                    );
                    self.sink.emit(join_log.as_str());
                }
            }
            failed
        });

        joined.unwrap_or_else(|_| {
            tracing::error!("A repair thread panicked on '{}'", file);
            tools.iter().map(|tool| tool.name.clone()).collect()
        })
    }

    /// Run one tool with its own report buffer; the buffer is emitted even
    /// when the tool fails. Returns whether the tool succeeded.
    fn run_guarded(&self, tool: &ToolConfig, file: &str) -> bool {
        let runner = ToolRunner::new(tool, self.encoding);
        let mut report = ReportBuffer::new();

        let result = catch_unwind(AssertUnwindSafe(|| runner.run(file, self.options, &mut report)))
            .unwrap_or_else(|_| Err(anyhow!("'{}' panicked", runner.name())));

        match result {
            Ok(_) => {
                if !report.is_empty() {
                    self.sink.emit(report.as_str());
                }
                true
            }
            Err(error) => {
                report.ensure_line_end();
                let thread = std::thread::current();
                let _ = writeln!(
                    report,
                    "Error in thread '{}', file '{}'",
                    thread.name().unwrap_or(runner.name()),
                    file
                );
                let _ = writeln!(report, "{error:?}");
                self.sink.emit(report.as_str());
                tracing::error!("{} failed on {}: {:#}", runner.name(), file, error);
                false
            }
        }
    }

    fn reformat(&self, file: &str) -> Result<()> {
        let formatter = Formatter::new(&self.config.format, self.encoding);
        let mut report = ReportBuffer::new();
        let result = formatter.format_file(file, self.options, &mut report);
        if !report.is_empty() {
            self.sink.emit(report.as_str());
        }
        result
    }
}

#[cfg(test)]
mod tests;
