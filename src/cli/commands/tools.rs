use anyhow::Result;
use clap::Args;
use std::path::Path;

use crate::cli::Output;
use crate::config::SrcfixConfig;
use crate::utils::command_exists;

#[derive(Args)]
pub struct ToolsArgs {
    /// Hide the partially useful tools
    #[arg(long)]
    pub essential_only: bool,
}

/// List every configured program and whether it is on PATH.
///
/// Returns 1 when an enabled program is missing.
pub fn execute(args: ToolsArgs, custom_config: Option<&Path>, output: &Output) -> Result<i32> {
    let config = SrcfixConfig::load_with_custom_config(custom_config)?;
    let mut missing = 0;

    output.header("Analysis tools");
    let tools = config
        .repair
        .tools
        .iter()
        .filter(|tool| !(args.essential_only && tool.partial));
    for tool in tools {
        let mut notes = Vec::new();
        if tool.partial {
            notes.push("partial");
        }
        if !tool.enabled {
            notes.push("disabled");
        }
        let found = command_exists(&tool.program);
        if tool.enabled && !found {
            missing += 1;
        }
        let label = if notes.is_empty() {
            tool.name.clone()
        } else {
            format!("{} ({})", tool.name, notes.join(", "))
        };
        report_program(output, &label, &tool.program, found);
    }

    if let Some(refactor) = &config.repair.refactor {
        output.header("Refactor tool");
        let found = command_exists(&refactor.program);
        if refactor.enabled && !found {
            missing += 1;
        }
        report_program(output, &refactor.name, &refactor.program, found);
    }

    output.header("Formatter");
    let found = command_exists(&config.format.program);
    if !found {
        missing += 1;
    }
    report_program(output, &config.format.name, &config.format.program, found);

    if missing > 0 {
        output.warning(&format!("{missing} configured programs are not installed"));
        Ok(1)
    } else {
        output.success("All configured programs are installed");
        Ok(0)
    }
}

fn report_program(output: &Output, name: &str, program: &str, found: bool) {
    if found {
        output.status_indicator("FOUND", &format!("{name}: {program}"), true);
    } else {
        output.status_indicator("MISSING", &format!("{name}: {program}"), false);
    }
}
