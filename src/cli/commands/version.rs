use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct VersionArgs {
    /// Show detailed version information
    #[arg(short = 'd', long = "detailed")]
    pub detailed: bool,
}

pub fn execute(args: VersionArgs) -> Result<i32> {
    println!("{} {}", crate::PKG_NAME, crate::VERSION);
    if args.detailed {
        println!("Rust Edition: 2024");
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Description: {}", env!("CARGO_PKG_DESCRIPTION"));
        println!("Target: {}-{}", std::env::consts::ARCH, std::env::consts::OS);
    }
    Ok(0)
}
