//! Utility functions for srcfix
//!
//! Path handling, text encoding and tool lookup shared by the other modules.

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use std::path::Path;

pub mod files;

pub use files::resolve_work_list;

/// Strip `dir` and any leading separators from `file`.
///
/// Some checkers cannot handle absolute paths, so files under the working
/// directory are passed relative to it. Anything else is returned as is.
pub fn relative_path(dir: &str, file: &str) -> String {
    if dir.is_empty() || file.is_empty() {
        return file.to_string();
    }
    let Some(rest) = file.strip_prefix(dir) else {
        return file.to_string();
    };

    let rest = rest.trim_start_matches(['\\', '/']);
    if rest.is_empty() {
        file.to_string()
    } else {
        rest.to_string()
    }
}

/// Check if a command exists in PATH
pub fn command_exists(command: &str) -> bool {
    which::which(command).is_ok()
}

/// Decode tool output or file bytes with the run's encoding.
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    text.into_owned()
}

/// Replace the contents of `path` with `text` in the run's encoding.
pub fn write_encoded(path: &Path, text: &str, encoding: &'static Encoding) -> Result<()> {
    let (bytes, _, unmappable) = encoding.encode(text);
    if unmappable {
        tracing::warn!(
            "{}: characters not representable in {} were written as numeric references",
            path.display(),
            encoding.name()
        );
    }
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}
