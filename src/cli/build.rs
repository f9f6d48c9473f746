//! `assetweave build`
//!
//! Processes every requested group once per resource type. Each group runs in its own
//! request context; a failing group is reported and the remaining groups still run.
//! Empty outputs are reported and not written.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::{debug, info};

use crate::config::{EngineConfig, parse_override};
use crate::core::{ResourceType, user_friendly_error};
use crate::manager::ManagerFactory;
use crate::model::GroupKey;

/// Process groups and write their outputs.
#[derive(Debug, Clone, Args)]
pub struct BuildCommand {
    /// Model file (overrides `context.model`)
    #[arg(long, value_name = "FILE")]
    pub model: Option<PathBuf>,

    /// Root folder for `/`-prefixed resource uris
    #[arg(long, value_name = "DIR")]
    pub context_folder: Option<PathBuf>,

    /// Folder receiving the outputs
    #[arg(short, long, value_name = "DIR", default_value = "assetweave-out")]
    pub destination: PathBuf,

    /// Groups to build, comma separated (all groups of the model when omitted)
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub groups: Vec<String>,

    /// Configuration override, repeatable
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// Skip minimizer stages
    #[arg(long)]
    pub no_minimize: bool,
}

/// Outcome of a build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Written output paths
    pub written: Vec<PathBuf>,
    /// Groups that produced no content
    pub empty: Vec<GroupKey>,
    /// Groups that failed
    pub failed: Vec<GroupKey>,
}

impl BuildCommand {
    fn overrides(&self) -> Result<Vec<(String, String)>> {
        let mut overrides = self
            .overrides
            .iter()
            .map(|pair| parse_override(pair))
            .collect::<crate::core::Result<Vec<_>>>()?;
        if let Some(model) = &self.model {
            overrides.push(("model".to_string(), model.display().to_string()));
        }
        if let Some(folder) = &self.context_folder {
            overrides.push(("context-folder".to_string(), folder.display().to_string()));
        }
        if self.no_minimize {
            overrides.push(("minimize".to_string(), "false".to_string()));
        }
        Ok(overrides)
    }

    /// `--groups` tokens, trimmed, empty ones dropped.
    fn requested_groups(&self) -> Vec<String> {
        self.groups
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Run the build.
    ///
    /// # Errors
    ///
    /// Configuration or model errors before any group runs, or a summary error when
    /// one or more groups failed.
    pub async fn execute(self, config_path: Option<&Path>) -> Result<BuildSummary> {
        let config = EngineConfig::load_layered(config_path, &self.overrides()?).await?;
        let factory = ManagerFactory::from_config(config)?;
        let model = factory.model_factory().create()?;

        let names: Vec<String> = match self.requested_groups() {
            requested if requested.is_empty() => {
                model.group_names().into_iter().map(str::to_string).collect()
            }
            requested => requested,
        };
        info!("Building {} group(s) into {}", names.len(), self.destination.display());

        let mut summary = BuildSummary::default();
        for name in &names {
            for resource_type in ResourceType::ALL {
                let key = GroupKey::new(name.as_str(), resource_type);
                match self.build_group(&factory, &key).await {
                    Ok(Some(path)) => {
                        println!("{} {} -> {}", "✓".green(), key, path.display());
                        summary.written.push(path);
                    }
                    Ok(None) => {
                        println!("{} {} (no content)", "-".dimmed(), key);
                        summary.empty.push(key);
                    }
                    Err(e) => {
                        println!("{} {}", "✗".red(), key);
                        user_friendly_error(e).display();
                        summary.failed.push(key);
                    }
                }
            }
        }

        if !summary.failed.is_empty() {
            anyhow::bail!(
                "{} of {} group output(s) failed",
                summary.failed.len(),
                names.len() * ResourceType::ALL.len()
            );
        }
        Ok(summary)
    }

    async fn build_group(&self, factory: &Arc<ManagerFactory>, key: &GroupKey) -> Result<Option<PathBuf>> {
        let request = format!("/{}", key.file_name());
        let scope = factory.establish(&request)?;
        let manager = factory.create(&scope)?;
        let content = manager.process(&request).await?;
        if content.is_empty() {
            debug!("No content found for {}", key);
            return Ok(None);
        }

        let name = scope
            .context()
            .response()
            .output_name()
            .unwrap_or_else(|| key.file_name());
        let path = self.destination.join(name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        tokio::fs::write(&path, &content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(Some(path))
    }
}
