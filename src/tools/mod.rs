//! External tool invocation
//!
//! A [`ToolRunner`] runs one configured analysis tool against one file,
//! captures its output in the run's encoding, and turns it into report text
//! according to the tool's [`OutputKind`].

use anyhow::{Context, Result, bail};
use encoding_rs::Encoding;
use std::fmt::Write;
use std::process::{Command, Stdio};
use std::time::Instant;

use crate::config::{Options, OutputKind, ToolConfig};
use crate::report::{ReportBuffer, format_return_code};
use crate::scan::{ComplexityScanner, CrossFileScanner, skip_factor};
use crate::utils::decode;

pub mod formatter;


pub use formatter::Formatter;

const FILE_PLACEHOLDER: &str = "{file}";
const INCLUDE_PLACEHOLDER: &str = "{include}";

/// Captured result of one subprocess call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolInvocationResult {
    pub stdout: String,
    pub stderr: String,
    pub return_code: i32,
}

/// Expand an argument template for `file`.
///
/// `{file}` is replaced by the path (appended last when absent) and
/// `{include}` by the include flag.
pub fn expand_args(args: &[String], file: &str, include_flag: Option<&str>) -> Result<Vec<String>> {
    let mut expanded = Vec::with_capacity(args.len() + 1);
    let mut has_file = false;

    for arg in args {
        if arg == INCLUDE_PLACEHOLDER {
            let flag = include_flag
                .context("Tool arguments use {include} but no include directory is set")?;
            expanded.push(flag.to_string());
        } else if arg.contains(FILE_PLACEHOLDER) {
            has_file = true;
            expanded.push(arg.replace(FILE_PLACEHOLDER, file));
        } else {
            expanded.push(arg.clone());
        }
    }

    if !has_file {
        expanded.push(file.to_string());
    }
    Ok(expanded)
}

/// Run `program` to completion with stdin closed, decoding both streams.
pub fn invoke(
    program: &str,
    args: &[String],
    encoding: &'static Encoding,
) -> Result<ToolInvocationResult> {
    tracing::trace!("Running {} {:?}", program, args);

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to execute '{program}'"))?;

    Ok(ToolInvocationResult {
        stdout: decode(&output.stdout, encoding),
        stderr: decode(&output.stderr, encoding),
        // Killed by a signal: no code to report
        return_code: output.status.code().unwrap_or(-1),
    })
}

/// Append the filtered streams of `result` to `report`.
///
/// Lines containing `factor` are dropped first. A return-code line follows
/// when anything remained. Returns the tool's exit code.
pub fn append_process_result(
    report: &mut ReportBuffer,
    result: &ToolInvocationResult,
    factor: &str,
) -> i32 {
    let mut is_empty = true;

    for stream in [&result.stdout, &result.stderr] {
        let filtered = skip_factor(stream, factor);
        if !filtered.trim().is_empty() {
            is_empty = false;
            *report += &filtered;
            report.ensure_line_end();
        }
    }

    if !is_empty {
        *report += &format_return_code(result.return_code);
    }
    result.return_code
}

/// Runs one analysis tool.
pub struct ToolRunner<'a> {
    tool: &'a ToolConfig,
    encoding: &'static Encoding,
}

impl<'a> ToolRunner<'a> {
    pub fn new(tool: &'a ToolConfig, encoding: &'static Encoding) -> Self {
        Self { tool, encoding }
    }

    pub fn name(&self) -> &str {
        &self.tool.name
    }

    /// Run the tool on `file`, appending everything it reports to `report`.
    ///
    /// Non-zero exit codes are reported, not raised; only a failure to start
    /// the program is an error. Returns the effective status.
    pub fn run(&self, file: &str, options: &Options, report: &mut ReportBuffer) -> Result<i32> {
        if !self.tool.enabled {
            bail!("Tool '{}' is disabled", self.tool.name);
        }

        let start_time = Instant::now();
        if options.is_verbose() {
            let _ = writeln!(report, "  Start {} '{}'..", self.tool.name, file);
        }

        let args = expand_args(&self.tool.args, file, options.include_flag())?;
        let result = invoke(&self.tool.program, &args, self.encoding)?;

        let return_code = match self.tool.output {
            OutputKind::Plain => {
                append_process_result(report, &result, self.tool.ignore.as_deref().unwrap_or(""))
            }
            OutputKind::ComplexityDuplicates => {
                let outcome = ComplexityScanner::new(file, self.tool.label()).scan(&result);
                *report += &outcome.report;
                outcome.return_code
            }
            OutputKind::CrossFileDuplicates => {
                let outcome = CrossFileScanner::new(file, self.tool.label()).scan(&result);
                *report += &outcome.report;
                outcome.return_code
            }
        };

        tracing::debug!(
            "{} on {} finished with code {} in {:?}",
            self.tool.name,
            file,
            return_code,
            start_time.elapsed()
        );
        if options.is_verbose() {
            report.ensure_line_end();
            let _ = writeln!(
                report,
                " {} '{}' done in {:.3} seconds.",
                self.tool.name,
                file,
                start_time.elapsed().as_secs_f64()
            );
        }

        Ok(return_code)
    }
}
