//! Configuration management for assetweave
//!
//! The engine is configured by an [`EngineConfig`]: the five strategy keys plus a
//! `[context]` table describing where resources live and how groups are served.
//!
//! # Sources and precedence
//!
//! From lowest to highest precedence:
//!
//! 1. **Configuration file** - `--config`, else `$ASSETWEAVE_CONFIG`, else
//!    `./assetweave.toml` when it exists
//! 2. **Environment** - `ASSETWEAVE_<KEY>` with the key upper-cased and dashes replaced
//!    by underscores (`ASSETWEAVE_LOCATOR_STRATEGIES`)
//! 3. **Explicit overrides** - `--set key=value` on the command line
//!
//! # File format
//!
//! ```toml
//! locator-strategies = "servletContext, classpath"
//! pre-processor-strategies = "bomStripper, cssImport, cssUrlRewriting, semicolonAppender"
//! post-processor-strategies = "cssVariables, jsMin, cssMin"
//! naming-strategy = "hashEncoder"
//! hash-strategy = "SHA-256"
//!
//! [context]
//! context-folder = "src/main/webapp"
//! classpath = ["src/main/resources"]
//! model = "wro.toml"
//! minimize = true
//! ignore-missing-resources = false
//!
//! [context.metadata]
//! build = "1.4.2"
//! ```
//!
//! Relative paths in a file are resolved against the file's directory; `~` is expanded.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::constants::{CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE, ENV_PREFIX};
use crate::core::{AssetError, Result};
use crate::hash::HASH_STRATEGY;
use crate::locator::LOCATOR_STRATEGIES;
use crate::naming::NAMING_STRATEGY;
use crate::processor::{POST_PROCESSOR_STRATEGIES, PRE_PROCESSOR_STRATEGIES};

const CONTEXT_FOLDER: &str = "context-folder";
const CLASSPATH: &str = "classpath";
const MODEL: &str = "model";
const MINIMIZE: &str = "minimize";
const IGNORE_MISSING_RESOURCES: &str = "ignore-missing-resources";

/// Every key accepted by [`EngineConfig::set`] and the environment overlay.
pub const KEYS: [&str; 10] = [
    LOCATOR_STRATEGIES,
    PRE_PROCESSOR_STRATEGIES,
    POST_PROCESSOR_STRATEGIES,
    NAMING_STRATEGY,
    HASH_STRATEGY,
    CONTEXT_FOLDER,
    CLASSPATH,
    MODEL,
    MINIMIZE,
    IGNORE_MISSING_RESOURCES,
];

/// Effective engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct EngineConfig {
    pub locator_strategies: Option<String>,
    pub pre_processor_strategies: Option<String>,
    pub post_processor_strategies: Option<String>,
    pub naming_strategy: Option<String>,
    pub hash_strategy: Option<String>,
    #[serde(default)]
    pub context: ContextConfig,
}

/// The `[context]` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ContextConfig {
    /// Root for `servletContext` uris
    pub context_folder: PathBuf,
    /// Roots searched by the `classpath` locator, in order
    pub classpath: Vec<PathBuf>,
    /// TOML model file
    pub model: Option<PathBuf>,
    /// Whether minimizer stages run
    pub minimize: bool,
    /// Skip unreadable resources with a warning instead of failing the group
    pub ignore_missing_resources: bool,
    /// Handed to lifecycle callbacks
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            context_folder: PathBuf::from("."),
            classpath: Vec::new(),
            model: None,
            minimize: true,
            ignore_missing_resources: false,
            metadata: BTreeMap::new(),
        }
    }
}

impl ContextConfig {
    fn resolve_paths(&mut self, base: &Path) {
        self.context_folder = resolve_path(base, &self.context_folder);
        self.classpath = self.classpath.iter().map(|p| resolve_path(base, p)).collect();
        self.model = self.model.as_deref().map(|p| resolve_path(base, p));
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    let expanded = expand(&path.to_string_lossy());
    if expanded.is_relative() {
        base.join(expanded)
    } else {
        expanded
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(AssetError::configuration(format!(
            "'{key}' expects a boolean, got '{other}'"
        ))),
    }
}

/// Environment variable overriding `key`.
#[must_use]
pub fn env_name(key: &str) -> String {
    format!("{ENV_PREFIX}{}", key.to_ascii_uppercase().replace('-', "_"))
}

/// Parse a `key=value` override.
///
/// # Errors
///
/// [`AssetError::Configuration`] when there is no `=` or the key is unknown.
pub fn parse_override(pair: &str) -> Result<(String, String)> {
    let (key, value) = pair.split_once('=').ok_or_else(|| {
        AssetError::configuration(format!("Override '{pair}' must look like key=value"))
    })?;
    let key = key.trim();
    if !KEYS.contains(&key) {
        return Err(unknown_key(key));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn unknown_key(key: &str) -> AssetError {
    AssetError::configuration(format!(
        "Unknown configuration key '{key}' (known keys: {})",
        KEYS.join(", ")
    ))
}

impl EngineConfig {
    /// Parse a configuration document. Relative paths resolve against `base`.
    ///
    /// # Errors
    ///
    /// [`AssetError::Configuration`] for malformed documents or unknown keys.
    pub fn from_toml(source: &str, base: &Path) -> Result<Self> {
        let mut config: Self = toml::from_str(source)
            .map_err(|e| AssetError::configuration(format!("Invalid configuration: {e}")))?;
        config.context.resolve_paths(base);
        Ok(config)
    }

    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// [`AssetError::Io`] when the file cannot be read, [`AssetError::Configuration`]
    /// when it is malformed.
    pub async fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AssetError::io(path.display().to_string(), e))?;
        Self::from_toml(&content, path.parent().unwrap_or_else(|| Path::new(".")))
    }

    /// Load the configuration file, if any: `explicit`, else `$ASSETWEAVE_CONFIG`,
    /// else `./assetweave.toml` when present. Without a file the defaults apply.
    ///
    /// # Errors
    ///
    /// Same as [`EngineConfig::load_from`]. An explicitly named file must exist.
    pub async fn load_with_optional(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path).await;
        }
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Self::load_from(&expand(&path)).await;
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if tokio::fs::try_exists(fallback).await.unwrap_or(false) {
            Self::load_from(fallback).await
        } else {
            debug!("No configuration file found, using defaults");
            Ok(Self::default())
        }
    }

    /// File, then environment, then `overrides`.
    ///
    /// # Errors
    ///
    /// Any loading error, or an invalid environment value or override.
    pub async fn load_layered(explicit: Option<&Path>, overrides: &[(String, String)]) -> Result<Self> {
        let mut config = Self::load_with_optional(explicit).await?;
        config.apply_env()?;
        for (key, value) in overrides {
            config.set(key, value)?;
        }
        Ok(config)
    }

    /// Overlay `ASSETWEAVE_*` variables from the process environment.
    ///
    /// # Errors
    ///
    /// [`AssetError::Configuration`] for invalid values.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Overlay variables produced by `lookup` (called with each variable name).
    ///
    /// # Errors
    ///
    /// [`AssetError::Configuration`] for invalid values.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        for key in KEYS {
            if let Some(value) = lookup(&env_name(key)) {
                debug!("Configuration '{}' overridden from environment", key);
                self.set(key, &value)?;
            }
        }
        Ok(())
    }

    /// Set one key from its string form.
    ///
    /// # Errors
    ///
    /// [`AssetError::Configuration`] for unknown keys or malformed values.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let text = || Some(value.trim().to_string());
        match key {
            LOCATOR_STRATEGIES => self.locator_strategies = text(),
            PRE_PROCESSOR_STRATEGIES => self.pre_processor_strategies = text(),
            POST_PROCESSOR_STRATEGIES => self.post_processor_strategies = text(),
            NAMING_STRATEGY => self.naming_strategy = text(),
            HASH_STRATEGY => self.hash_strategy = text(),
            CONTEXT_FOLDER => self.context.context_folder = expand(value.trim()),
            CLASSPATH => {
                self.context.classpath = value
                    .split(',')
                    .map(str::trim)
                    .filter(|root| !root.is_empty())
                    .map(expand)
                    .collect();
            }
            MODEL => self.context.model = Some(expand(value.trim())),
            MINIMIZE => self.context.minimize = parse_bool(key, value)?,
            IGNORE_MISSING_RESOURCES => self.context.ignore_missing_resources = parse_bool(key, value)?,
            other => return Err(unknown_key(other)),
        }
        Ok(())
    }

    /// Raw value of a strategy key.
    #[must_use]
    pub fn strategy(&self, key: &str) -> Option<&str> {
        match key {
            LOCATOR_STRATEGIES => self.locator_strategies.as_deref(),
            PRE_PROCESSOR_STRATEGIES => self.pre_processor_strategies.as_deref(),
            POST_PROCESSOR_STRATEGIES => self.post_processor_strategies.as_deref(),
            NAMING_STRATEGY => self.naming_strategy.as_deref(),
            HASH_STRATEGY => self.hash_strategy.as_deref(),
            _ => None,
        }
    }
}
