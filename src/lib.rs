//! # srcfix - parallel C/C++ analysis and formatting
//!
//! srcfix runs external static-analysis tools and a formatter over a list
//! of source files. Files are pulled by a fixed pool of worker threads from a
//! shared counter; each file may fan out to one thread per analysis tool.
//! Tool output is condensed into `file:line: severity: message` diagnostics
//! and printed one contiguous block per tool, so parallel workers never
//! interleave their lines.
//!
//! ## Quick Start
//!
//! ```bash
//! # Include directory for the refactor tool
//! export GSL_INCLUDE=/opt/gsl/include
//!
//! # Analyze, then reformat, every C++ file under src/
//! srcfix fix src/
//!
//! # Only reformat two files
//! srcfix format a.h b.cpp
//! ```

pub mod cli;
pub mod config;
pub mod parallel;
pub mod processor;
pub mod report;
pub mod scan;
pub mod tools;
pub mod utils;

pub use cli::{Cli, Output};
pub use config::SrcfixConfig;

/// Result type alias for srcfix operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
