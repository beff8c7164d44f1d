//! Copy-paste detector scanner
//!
//! Recognizes reports like:
//!
//! ```text
//! Found a 12 line (345 tokens) duplication in the following files:
//! Starting at line 159 of file1.h
//! Starting at line 210 of file2.h
//! ```

use std::fmt::Write;

use super::{ScanOutcome, int_str_parse, merge_streams};
use crate::report::{ReportBuffer, format_return_code};
use crate::tools::ToolInvocationResult;

pub const FOUND_PREFIX: &str = "Found a ";
pub const LINE_MID: &str = " line (";
pub const START_PREFIX: &str = "Starting at line ";

/// Status meaning "the detector ran fine and found duplicates".
pub const DUPLICATES_FOUND_CODE: i32 = 4;

/// Duplicate count reported when the tool failed without parsable findings.
pub const UNPARSED_DUPLICATES: i64 = -1;

pub struct CrossFileScanner<'a> {
    file: &'a str,
    label: &'a str,
}

impl<'a> CrossFileScanner<'a> {
    pub fn new(file: &'a str, label: &'a str) -> Self {
        Self { file, label }
    }

    pub fn scan(&self, result: &ToolInvocationResult) -> ScanOutcome {
        let merged = merge_streams(result);
        let mut report = ReportBuffer::new();
        let mut duplicates: i64 = 0;

        for line in merged.as_str().split_inclusive('\n') {
            report += line;

            if line.starts_with(FOUND_PREFIX) {
                report.ensure_line_end();
                report += &self.header(line);
            } else if line.starts_with(START_PREFIX) {
                report.ensure_line_end();
                report += &self.detail(line, &mut duplicates);
            }
        }

        if !report.is_empty() || result.return_code != 0 {
            report.ensure_line_end();
            report += &format_return_code(result.return_code);
        }

        let (return_code, duplicates) = remap_status(result.return_code, duplicates);

        if return_code == DUPLICATES_FOUND_CODE {
            let _ = writeln!(
                report,
                "warning: There are {duplicates} {} duplicates in {}.",
                self.label, self.file
            );
        } else if return_code != 0 {
            let _ = writeln!(report, "error: {duplicates} {} duplicates.", self.label);
            let _ = writeln!(report, " Unknown error code {return_code}.");
        }

        ScanOutcome {
            report: report.into_string(),
            return_code,
            duplicates,
        }
    }

    /// Summary line for a "Found a N line (M tokens)" header.
    fn header(&self, line: &str) -> String {
        let Some(mid_pos) = line.find(LINE_MID) else {
            return format!(
                "{}: warning: unrecognized {} header, has the output format changed?\n",
                self.file, self.label
            );
        };

        let lines = int_str_parse(line, FOUND_PREFIX.len() as isize);
        let tokens = int_str_parse(line, (mid_pos + LINE_MID.len()) as isize);
        if lines.is_empty() || tokens.is_empty() {
            return format!(
                "{}: warning: no {} line or token counts in header.\n",
                self.file, self.label
            );
        }

        format!(
            "{}: warning: {lines} line ({tokens} tokens) {} duplicate.\n",
            self.file, self.label
        )
    }

    /// Numbered diagnostic for a "Starting at line N of file" line.
    fn detail(&self, line: &str, duplicates: &mut i64) -> String {
        let line_number = int_str_parse(line, START_PREFIX.len() as isize);
        if line_number.is_empty() {
            return format!(
                "{}: warning: no line number in {} detail.\n",
                self.file, self.label
            );
        }

        *duplicates += 1;
        format!(
            "{}:{line_number}: error: {} duplicate #{} is found.\n",
            self.file, self.label, duplicates
        )
    }
}

/// Reconcile the detector's exit code with what was parsed.
///
/// A clean exit with findings becomes [`DUPLICATES_FOUND_CODE`]; a failing
/// exit with nothing parsed reports [`UNPARSED_DUPLICATES`] instead of zero.
pub fn remap_status(return_code: i32, duplicates: i64) -> (i32, i64) {
    if return_code == 0 && duplicates != 0 {
        (DUPLICATES_FOUND_CODE, duplicates)
    } else if return_code != 0 && duplicates == 0 {
        (return_code, UNPARSED_DUPLICATES)
    } else {
        (return_code, duplicates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(stdout: &str, return_code: i32) -> ToolInvocationResult {
        ToolInvocationResult {
            stdout: stdout.to_string(),
            stderr: String::new(),
            return_code,
        }
    }

    const TWO_HITS: &str = "Found a 12 line (345 tokens) duplication in the following files:\n\
        Starting at line 159 of file1.h\n\
        Starting at line 210 of file2.h\n";

    #[test]
    fn test_header_and_details() {
        let scanner = CrossFileScanner::new("file1.h", "Cpd");
        let outcome = scanner.scan(&invocation(TWO_HITS, 4));
        let report = &outcome.report;

        assert!(report.contains("file1.h: warning: 12 line (345 tokens) Cpd duplicate."));
        assert!(report.contains("file1.h:159: error: Cpd duplicate #1 is found."));
        assert!(report.contains("file1.h:210: error: Cpd duplicate #2 is found."));
        assert!(report.contains("   Return code is 4."));
        assert!(report.contains("warning: There are 2 Cpd duplicates in file1.h."));
        assert_eq!(outcome.duplicates, 2);
        assert_eq!(outcome.return_code, DUPLICATES_FOUND_CODE);
    }

    #[test]
    fn test_clean_exit_with_duplicates_is_remapped() {
        let scanner = CrossFileScanner::new("file1.h", "Cpd");
        let outcome = scanner.scan(&invocation(TWO_HITS, 0));
        assert_eq!(outcome.return_code, DUPLICATES_FOUND_CODE);
        assert!(outcome.report.contains("There are 2 Cpd duplicates"));
    }

    #[test]
    fn test_failure_without_duplicates() {
        let scanner = CrossFileScanner::new("a.h", "Cpd");
        let outcome = scanner.scan(&invocation("java.lang.OutOfMemoryError\n", 1));

        assert_eq!(outcome.duplicates, UNPARSED_DUPLICATES);
        assert_eq!(outcome.return_code, 1);
        assert!(outcome.report.contains("error: -1 Cpd duplicates."));
        assert!(outcome.report.contains(" Unknown error code 1."));
    }

    #[test]
    fn test_crash_without_output() {
        let scanner = CrossFileScanner::new("a.h", "Cpd");
        let outcome = scanner.scan(&invocation("", 2));
        assert!(outcome.report.starts_with("   Return code is 2.\n"));
        assert_eq!(outcome.duplicates, UNPARSED_DUPLICATES);
    }

    #[test]
    fn test_empty_input() {
        let scanner = CrossFileScanner::new("a.h", "Cpd");
        let outcome = scanner.scan(&invocation("", 0));
        assert_eq!(outcome.report, "");
        assert_eq!(outcome.duplicates, 0);
        assert_eq!(outcome.return_code, 0);
    }

    #[test]
    fn test_unrecognized_header() {
        let scanner = CrossFileScanner::new("a.h", "Cpd");
        let outcome = scanner.scan(&invocation("Found a duplication somewhere\n", 0));
        assert!(outcome.report.contains("unrecognized Cpd header"));
        assert_eq!(outcome.duplicates, 0);
    }

    #[test]
    fn test_remap_status() {
        assert_eq!(remap_status(0, 3), (DUPLICATES_FOUND_CODE, 3));
        assert_eq!(remap_status(1, 0), (1, UNPARSED_DUPLICATES));
        assert_eq!(remap_status(0, 0), (0, 0));
        assert_eq!(remap_status(4, 2), (4, 2));
    }
}
