//! Report accumulation
//!
//! Every tool step writes into its own [`ReportBuffer`] instead of printing.
//! The finished buffer is printed as one block so lines from concurrent
//! workers never interleave.

use std::fmt;
use std::ops::AddAssign;

/// Accumulating text buffer owned by a single thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportBuffer {
    text: String,
}

impl ReportBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Append a '\n' unless the buffer is empty or already ends with one.
    pub fn ensure_line_end(&mut self) {
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl From<&str> for ReportBuffer {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

impl AddAssign<&str> for ReportBuffer {
    fn add_assign(&mut self, rhs: &str) {
        self.push_str(rhs);
    }
}

impl fmt::Write for ReportBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

impl fmt::Display for ReportBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Trailing status line appended after non-empty tool output.
pub fn format_return_code(return_code: i32) -> String {
    format!("   Return code is {return_code}.\n")
}
