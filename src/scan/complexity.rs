//! Complexity-analyzer duplicate scanner
//!
//! Recognizes sections like:
//!
//! ```text
//! Duplicate block:
//! --------------------------
//! fi2.h:110 ~ 120
//! fi2.h:310 ~ 320
//! ^^^^^^^^^^^^^^^^^^^^^^^^^^
//! ```

use std::fmt::Write;

use super::{ScanOutcome, int_str_parse, merge_streams};
use crate::report::{ReportBuffer, format_return_code};
use crate::tools::ToolInvocationResult;

pub const DUPLICATE_BLOCK_BEGIN: &str = "Duplicate block:";
pub const DUPLICATE_BLOCK_MID: &str = " ~ ";
pub const DUPLICATE_BLOCK_END: &str = "^^^^^^^^^^^^^^^^^^^^^^^^^^";

/// Parser state for one tool output; reset per file per tool.
#[derive(Debug, Default)]
struct BlockState {
    open: bool,
    block_duplicates: usize,
    total_duplicates: usize,
    found_any: bool,
}

pub struct ComplexityScanner<'a> {
    file: &'a str,
    label: &'a str,
}

impl<'a> ComplexityScanner<'a> {
    /// `file` is the analyzed file, `label` the tool name used in messages.
    pub fn new(file: &'a str, label: &'a str) -> Self {
        Self { file, label }
    }

    pub fn scan(&self, result: &ToolInvocationResult) -> ScanOutcome {
        let merged = merge_streams(result);
        let mut report = ReportBuffer::new();
        let mut state = BlockState::default();

        for line in merged.as_str().split_inclusive('\n') {
            report += line;

            if line.starts_with(DUPLICATE_BLOCK_BEGIN) {
                state.open = true;
                state.block_duplicates = 0;
            } else if state.open && line.contains(DUPLICATE_BLOCK_MID) {
                self.detail(line, &mut state, &mut report);
            } else if state.open && state.block_duplicates > 0 && line.contains(DUPLICATE_BLOCK_END)
            {
                self.close_block(&mut state, &mut report);
            }
        }

        if state.found_any {
            report.ensure_line_end();
            report += &format_return_code(result.return_code);
            let _ = writeln!(
                report,
                "{}: warning: {} has found {} total duplicates.",
                self.file, self.label, state.total_duplicates
            );
        } else if result.return_code != 0 {
            report.ensure_line_end();
            report += &format_return_code(result.return_code);
        }

        ScanOutcome {
            report: report.into_string(),
            return_code: result.return_code,
            duplicates: state.total_duplicates as i64,
        }
    }

    /// Handle one `name:start ~ end` line inside an open block.
    fn detail(&self, line: &str, state: &mut BlockState, report: &mut ReportBuffer) {
        let Some(mid_pos) = line.find(DUPLICATE_BLOCK_MID) else {
            return;
        };

        let Some(separ_pos) = line[..mid_pos].rfind(':') else {
            report.ensure_line_end();
            let _ = writeln!(
                report,
                "{}: warning: skipped a {} line without ':' separator.",
                self.file, self.label
            );
            return;
        };

        let from = int_str_parse(line, (separ_pos + 1) as isize);
        let to = int_str_parse(line, (mid_pos + DUPLICATE_BLOCK_MID.len()) as isize);
        if from.is_empty() || to.is_empty() {
            report.ensure_line_end();
            let _ = writeln!(
                report,
                "{}: warning: skipped a {} line without line numbers.",
                self.file, self.label
            );
            return;
        }

        state.block_duplicates += 1;

        report.ensure_line_end();
        let _ = writeln!(
            report,
            "{}:{from}: error: A {} duplicate #{} in lines {from}..{to}.",
            self.file, self.label, state.block_duplicates
        );
    }

    fn close_block(&self, state: &mut BlockState, report: &mut ReportBuffer) {
        state.total_duplicates += state.block_duplicates;

        report.ensure_line_end();
        let _ = writeln!(
            report,
            "{}: warning: {} {} duplicates.",
            self.file, state.block_duplicates, self.label
        );

        state.block_duplicates = 0;
        state.open = false;
        state.found_any = true;
    }
}
