//! Console output for srcfix
//!
//! Status messages are styled with `console`. Report blocks produced by the
//! workers go through [`Output::block`], which holds the stdout lock for the
//! whole block so concurrent workers never interleave lines.

use console::style;
use std::io::{self, Write};

use crate::processor::ReportSink;

/// Output handler for consistent CLI formatting
#[derive(Debug, Clone, Copy)]
pub struct Output {
    verbose: bool,
    quiet: bool,
}

impl Output {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✔").green(), message);
        }
    }

    /// Errors are shown even in quiet mode
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✖").red(), message);
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("⚠").yellow(), message);
        }
    }

    /// Only shown with --verbose
    pub fn verbose(&self, message: &str) {
        if self.verbose && !self.quiet {
            println!("{} {}", style("ℹ").dim(), style(message).dim());
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn header(&self, title: &str) {
        if !self.quiet {
            println!("\n{}", style(title).bold().underlined());
        }
    }

    pub fn table_row(&self, key: &str, value: &str) {
        println!("  {:<24} {}", style(key).dim(), value);
    }

    pub fn status_indicator(&self, status: &str, message: &str, is_success: bool) {
        let (icon, status) = if is_success {
            ("✓", style(status).green())
        } else {
            ("✗", style(status).red())
        };
        println!("{} {} {}", style(icon).bold(), status.bold(), message);
    }

    /// Write one report block to stdout in a single locked write.
    ///
    /// Reports are the product of the run, so quiet mode does not hide them.
    pub fn block(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        if let Err(e) = handle.write_all(text.as_bytes()).and_then(|_| handle.flush()) {
            tracing::warn!("Failed to write report block: {}", e);
        }
    }
}

impl ReportSink for Output {
    fn emit(&self, block: &str) {
        self.block(block);
    }
}
