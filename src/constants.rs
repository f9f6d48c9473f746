//! Global constants used throughout the assetweave codebase.
//!
//! Timeouts, file names and environment variable names that are shared across
//! modules live here so they are discoverable in one place.

use std::time::Duration;

/// Timeout for a single HTTP fetch performed by the `url` locator (30 seconds).
pub const HTTP_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "assetweave.toml";

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "ASSETWEAVE_CONFIG";

/// Prefix of environment variables overriding configuration keys.
///
/// `locator-strategies` is read from `ASSETWEAVE_LOCATOR_STRATEGIES`, and so on.
pub const ENV_PREFIX: &str = "ASSETWEAVE_";

/// Separator placed between merged resources of a group.
pub const MERGE_SEPARATOR: &str = "\n";

/// Maximum `@import` nesting followed by the `cssImport` processor.
pub const MAX_IMPORT_DEPTH: usize = 16;
