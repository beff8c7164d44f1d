//! Command-line interface for srcfix
//!
//! Thin glue over the library: argument parsing with clap, logging setup,
//! and one module per subcommand.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;
mod output;

pub use output::Output;

use commands::{config, process, tools, version};

/// Run C/C++ analyzers and the formatter over source files
#[derive(Parser)]
#[command(
    name = "srcfix",
    version = env!("CARGO_PKG_VERSION"),
    about = "Run C/C++ analysis tools and the formatter over source files in parallel",
    long_about = "srcfix dispatches source files to a pool of worker threads. Each file \
                  is checked by the configured analysis tools, whose output is condensed \
                  into compiler-style diagnostics, and is then rewritten by the formatter."
)]
pub struct Cli {
    /// Use custom configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Print progress lines and debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the analysis tools, then the formatter
    Fix(process::ProcessArgs),
    /// Run the analysis tools only
    Repair(process::ProcessArgs),
    /// Run the formatter only; rewrites files in place
    Format(process::ProcessArgs),
    /// List configured tools and whether they are installed
    Tools(tools::ToolsArgs),
    /// Configuration management
    Config(config::ConfigArgs),
    /// Show version information
    Version(version::VersionArgs),
}

impl Cli {
    /// Execute the command, returning the process exit code.
    pub fn run(self) -> Result<i32> {
        setup_logging(self.verbose, self.quiet);

        let output = Output::new(self.verbose, self.quiet);
        let custom_config = self.config.as_deref();

        match self.command {
            Some(Commands::Fix(args)) => {
                process::execute(args, process::Mode::Fix, custom_config, &output)
            }
            Some(Commands::Repair(args)) => {
                process::execute(args, process::Mode::Repair, custom_config, &output)
            }
            Some(Commands::Format(args)) => {
                process::execute(args, process::Mode::Format, custom_config, &output)
            }
            Some(Commands::Tools(args)) => tools::execute(args, custom_config, &output),
            Some(Commands::Config(args)) => config::execute(args, custom_config, &output),
            Some(Commands::Version(args)) => version::execute(args),
            None => {
                Cli::command().print_help()?;
                Ok(0)
            }
        }
    }
}

fn setup_logging(verbose: bool, quiet: bool) {
    let default_level = match (verbose, quiet) {
        (true, _) => "debug,ignore=warn,globset=warn",
        (false, true) => "error",
        (false, false) => "warn",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("SRCFIX_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Reports own stdout
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
