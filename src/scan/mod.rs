//! Tool output scanners
//!
//! Analysis tools report findings as free-form text. The scanners here walk
//! that text line by line, pass every line through unchanged, and add one
//! normalized `file:line: severity: message #id` diagnostic per recognized
//! finding so editors can jump to it.
//!
//! - [`complexity`]: "Duplicate block:" sections with `name:start ~ end` lines.
//! - [`cross_file`]: "Found a N line (M tokens) duplication" headers followed
//!   by "Starting at line N of file" details.

pub mod complexity;
pub mod cross_file;

pub use complexity::ComplexityScanner;
pub use cross_file::CrossFileScanner;

use crate::report::ReportBuffer;
use crate::tools::ToolInvocationResult;

/// Result of scanning one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Tool output with the added diagnostics.
    pub report: String,
    /// Effective status after any remapping done by the scanner.
    pub return_code: i32,
    /// Number of recognized duplicates; negative when the count is unknown.
    pub duplicates: i64,
}

/// Read the run of ASCII digits starting at `start_pos`.
///
/// Negative or out-of-range positions give an empty string, as does a
/// position that does not start with a digit.
pub fn int_str_parse(line: &str, start_pos: isize) -> &str {
    let Ok(start) = usize::try_from(start_pos) else {
        return "";
    };
    let Some(rest) = line.get(start..) else {
        return "";
    };

    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    &rest[..end]
}

/// Drop every line containing `factor`. An empty factor keeps everything.
pub fn skip_factor(stream: &str, factor: &str) -> String {
    if factor.is_empty() {
        return stream.to_string();
    }

    stream
        .split_inclusive('\n')
        .filter(|line| !line.contains(factor))
        .collect()
}

/// Concatenate the non-blank streams of an invocation, each ending in '\n'.
pub(crate) fn merge_streams(result: &ToolInvocationResult) -> ReportBuffer {
    let mut merged = ReportBuffer::new();
    for stream in [&result.stdout, &result.stderr] {
        if !stream.trim().is_empty() {
            merged += stream;
            merged.ensure_line_end();
        }
    }
    merged
}
