use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::Path;

use crate::cli::Output;
use crate::config::SrcfixConfig;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Display the merged configuration as JSON
    Show,
    /// Check that the configuration loads and is valid
    Validate,
}

pub fn execute(args: ConfigArgs, custom_config: Option<&Path>, output: &Output) -> Result<i32> {
    let config = SrcfixConfig::load_with_custom_config(custom_config)?;

    match args.command {
        ConfigCommand::Show => {
            let json = serde_json::to_string_pretty(&config)
                .context("Failed to serialize configuration")?;
            println!("{json}");
        }
        ConfigCommand::Validate => {
            output.success("Configuration is valid");
            output.table_row("Encoding", &config.encoding);
            output.table_row("Include variable", &config.include_env);
            output.table_row("Analysis tools", &config.repair.tools.len().to_string());
            output.table_row(
                "Refactor tool",
                config.repair.refactor.as_ref().map_or("none", |tool| tool.name.as_str()),
            );
            output.table_row("Formatter", &config.format.name);
        }
    }
    Ok(0)
}
