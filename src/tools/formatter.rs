//! Formatter step
//!
//! Runs the formatter, which prints the formatted file on stdout, applies the
//! literal replacement rules line by line, and writes the result back in
//! place.

use anyhow::{Result, bail};
use encoding_rs::Encoding;
use std::fmt::Write;
use std::path::Path;
use std::time::Instant;

use super::{expand_args, invoke};
use crate::config::{FormatConfig, Options};
use crate::report::ReportBuffer;
use crate::utils::write_encoded;

pub struct Formatter<'a> {
    config: &'a FormatConfig,
    encoding: &'static Encoding,
}

impl<'a> Formatter<'a> {
    pub fn new(config: &'a FormatConfig, encoding: &'static Encoding) -> Self {
        Self { config, encoding }
    }

    /// Format `file` in place.
    ///
    /// Any stderr output or an empty result is an error, and the file is
    /// left untouched.
    pub fn format_file(
        &self,
        file: &str,
        options: &Options,
        report: &mut ReportBuffer,
    ) -> Result<()> {
        let start_time = Instant::now();
        if options.is_verbose() {
            let _ = writeln!(report, "  Start {} and space repair '{}'..", self.config.name, file);
        }

        let args = expand_args(&self.config.args, file, None)?;
        let result = invoke(&self.config.program, &args, self.encoding)?;

        if !result.stderr.is_empty() {
            bail!(
                "{} file '{}' errors: {}",
                self.config.name,
                file,
                result.stderr.trim_end()
            );
        }
        if result.stdout.is_empty() {
            bail!("File '{}' is empty after {}", file, self.config.name);
        }

        let contents = repair_lines(&result.stdout, &self.config.replacements);
        write_encoded(Path::new(file), &contents, self.encoding)?;

        if options.is_verbose() {
            let _ = writeln!(
                report,
                " {} and space repair '{}' in {:.3} seconds.",
                self.config.name,
                file,
                start_time.elapsed().as_secs_f64()
            );
        }
        Ok(())
    }
}

/// Apply every (from, to) replacement to each line, in rule order.
pub fn repair_lines(contents: &str, replacements: &[(String, String)]) -> String {
    contents
        .split_inclusive('\n')
        .map(|line| {
            replacements
                .iter()
                .fold(line.to_string(), |line, (from, to)| line.replace(from.as_str(), to))
        })
        .collect()
}
