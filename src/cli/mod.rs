//! Command-line interface for assetweave.
//!
//! # Commands
//!
//! - `build` - process every group of the model for each resource type and write the
//!   outputs to a destination folder
//! - `aliases` - list the registered strategy aliases per configuration key
//!
//! # Global options
//!
//! - `--verbose` / `-v` - debug logging
//! - `--quiet` / `-q` - errors only
//! - `--config` / `-c` - configuration file (defaults to `$ASSETWEAVE_CONFIG`, then
//!   `./assetweave.toml`)
//!
//! ```bash
//! assetweave build --model wro.toml --context-folder src/main/webapp --destination dist
//! assetweave build --groups all,admin --set naming-strategy=hashEncoder --no-minimize
//! assetweave aliases
//! ```

mod aliases;
mod build;

pub use aliases::AliasesCommand;
pub use build::{BuildCommand, BuildSummary};

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Main CLI structure.
#[derive(Debug, Parser)]
#[command(
    name = "assetweave",
    about = "Locate, transform, merge and cache web resource groups",
    version,
    long_about = "assetweave resolves groups of JavaScript and CSS resources through configurable \
                  locator and processor chains, merges them, and writes named, content-addressed outputs."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Process groups and write their outputs
    Build(BuildCommand),

    /// List registered strategy aliases
    Aliases(AliasesCommand),
}

impl Cli {
    /// Log filter for the selected verbosity: `--verbose`, `--quiet`, then `RUST_LOG`,
    /// then `info`.
    #[must_use]
    pub fn log_filter(&self) -> EnvFilter {
        if self.verbose {
            EnvFilter::new("debug")
        } else if self.quiet {
            EnvFilter::new("error")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        }
    }

    /// Install the global tracing subscriber. Safe to call more than once.
    pub fn init_logging(&self) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(self.log_filter())
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Run the selected command.
    ///
    /// # Errors
    ///
    /// Configuration errors, or a failure of the command itself. `build` fails when
    /// any group failed.
    pub async fn execute(self) -> Result<()> {
        let Self {
            command, config, ..
        } = self;
        match command {
            Commands::Build(cmd) => cmd.execute(config.as_deref()).await.map(|_| ()),
            Commands::Aliases(cmd) => cmd.execute(config.as_deref()).await,
        }
    }
}
