//! assetweave CLI entry point
//!
//! Parses arguments, installs logging, runs the selected command and renders errors
//! with context and suggestions.
//!
//! - `build` - process model groups into a destination folder
//! - `aliases` - list registered strategy aliases

use anyhow::Result;
use assetweave::cli;
use assetweave::core::user_friendly_error;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.init_logging();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
