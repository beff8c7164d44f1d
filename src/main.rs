use clap::Parser;

use srcfix::Cli;
use srcfix::cli::Output;
use srcfix::parallel::EmptyWorkList;

/// Exit code for configuration and startup errors.
const CONFIG_ERROR_CODE: i32 = 2;

fn main() {
    let cli = Cli::parse();
    let output = Output::new(cli.verbose, cli.quiet);

    let code = match cli.run() {
        Ok(code) => code,
        Err(e) if e.downcast_ref::<EmptyWorkList>().is_some() => {
            output.error(&e.to_string());
            EmptyWorkList::EXIT_CODE
        }
        Err(e) => {
            output.error(&format!("{e:#}"));
            CONFIG_ERROR_CODE
        }
    };

    std::process::exit(code);
}
