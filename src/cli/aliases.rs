//! `assetweave aliases`

use std::path::Path;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::EngineConfig;
use crate::manager::ManagerFactory;

/// List the aliases each configuration key accepts.
#[derive(Debug, Clone, Default, Args)]
pub struct AliasesCommand {
    /// Only list aliases for this key, e.g. `locator-strategies`
    #[arg(value_name = "KEY")]
    pub key: Option<String>,
}

impl AliasesCommand {
    /// # Errors
    ///
    /// Configuration loading errors, or an unknown `key`.
    pub async fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let config = EngineConfig::load_layered(config_path, &[]).await?;
        let factory = ManagerFactory::from_config(config)?;
        let aliases = factory.aliases();

        let selected: Vec<_> = match &self.key {
            Some(key) => aliases.into_iter().filter(|(name, _)| *name == key.as_str()).collect(),
            None => aliases,
        };
        if let Some(key) = &self.key {
            if selected.is_empty() {
                anyhow::bail!("Unknown strategy key '{key}'");
            }
        }

        for (key, names) in selected {
            println!("{}", key.bold());
            for name in names {
                println!("  {name}");
            }
        }
        Ok(())
    }
}
