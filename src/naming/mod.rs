//! Output naming strategies
//!
//! A naming strategy turns a group's original output name (`all.js`) into the name
//! the output is published under. Hash-encoding strategies fingerprint the output
//! with the injected hash strategy.
//!
//! | alias | `all.js` becomes |
//! |---|---|
//! | `noOp` (default) | `all.js` |
//! | `timestamp` | `all-1718000000000.js` |
//! | `hashEncoder` | `all-<hash>.js` |
//! | `folderHashEncoder` | `<hash>/all.js` |

use std::sync::Arc;

use chrono::Utc;

use crate::core::Result;
use crate::hash::HashStrategy;
use crate::injector::{Inject, InjectionTarget, Slot};
use crate::registry::{StrategyProvider, StrategyRegistry};

/// Configuration key selecting the naming strategy.
pub const NAMING_STRATEGY: &str = "naming-strategy";

/// Renames group outputs.
pub trait NamingStrategy: InjectionTarget + Send + Sync {
    fn alias(&self) -> &str;

    /// Name for `original` given its final `content`.
    ///
    /// # Errors
    ///
    /// [`crate::core::AssetError::Precondition`] when a required collaborator was
    /// not injected.
    fn rename(&self, original: &str, content: &[u8]) -> Result<String>;
}

fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => (stem, Some(extension)),
        _ => (name, None),
    }
}

fn with_suffix(original: &str, suffix: &str) -> String {
    match split_extension(original) {
        (stem, Some(extension)) => format!("{stem}-{suffix}.{extension}"),
        (stem, None) => format!("{stem}-{suffix}"),
    }
}

/// Keeps the original name.
#[derive(Debug, Default)]
pub struct NoOpNaming;

impl NoOpNaming {
    pub const ALIAS: &'static str = "noOp";
}

impl InjectionTarget for NoOpNaming {}

impl NamingStrategy for NoOpNaming {
    fn alias(&self) -> &str {
        Self::ALIAS
    }

    fn rename(&self, original: &str, _content: &[u8]) -> Result<String> {
        Ok(original.to_string())
    }
}

/// Appends the current time in epoch milliseconds.
#[derive(Debug, Default)]
pub struct TimestampNaming;

impl TimestampNaming {
    pub const ALIAS: &'static str = "timestamp";
}

impl InjectionTarget for TimestampNaming {}

impl NamingStrategy for TimestampNaming {
    fn alias(&self) -> &str {
        Self::ALIAS
    }

    fn rename(&self, original: &str, _content: &[u8]) -> Result<String> {
        Ok(with_suffix(original, &Utc::now().timestamp_millis().to_string()))
    }
}

/// Appends the content hash: `all-<hash>.js`.
#[derive(Debug, Default)]
pub struct HashEncoderNaming {
    hash: Inject<dyn HashStrategy>,
}

impl HashEncoderNaming {
    pub const ALIAS: &'static str = "hashEncoder";
}

impl InjectionTarget for HashEncoderNaming {
    fn slots(&self) -> Vec<Slot<'_>> {
        vec![Slot::HashStrategy(&self.hash)]
    }
}

impl NamingStrategy for HashEncoderNaming {
    fn alias(&self) -> &str {
        Self::ALIAS
    }

    fn rename(&self, original: &str, content: &[u8]) -> Result<String> {
        let hash = self.hash.require("hash strategy")?.get_hash(content);
        Ok(with_suffix(original, &hash))
    }
}

/// Places the output in a folder named after the content hash: `<hash>/all.js`.
#[derive(Debug, Default)]
pub struct FolderHashEncoderNaming {
    hash: Inject<dyn HashStrategy>,
}

impl FolderHashEncoderNaming {
    pub const ALIAS: &'static str = "folderHashEncoder";
}

impl InjectionTarget for FolderHashEncoderNaming {
    fn slots(&self) -> Vec<Slot<'_>> {
        vec![Slot::HashStrategy(&self.hash)]
    }
}

impl NamingStrategy for FolderHashEncoderNaming {
    fn alias(&self) -> &str {
        Self::ALIAS
    }

    fn rename(&self, original: &str, content: &[u8]) -> Result<String> {
        let hash = self.hash.require("hash strategy")?.get_hash(content);
        Ok(format!("{hash}/{original}"))
    }
}

/// Provider registering the built-in naming strategies.
#[must_use]
pub fn builtin_provider() -> StrategyProvider<Arc<dyn NamingStrategy>> {
    StrategyProvider::new("builtin")
        .with(NoOpNaming::ALIAS, || Arc::new(NoOpNaming) as Arc<dyn NamingStrategy>)
        .with(TimestampNaming::ALIAS, || {
            Arc::new(TimestampNaming) as Arc<dyn NamingStrategy>
        })
        .with(HashEncoderNaming::ALIAS, || {
            Arc::new(HashEncoderNaming::default()) as Arc<dyn NamingStrategy>
        })
        .with(FolderHashEncoderNaming::ALIAS, || {
            Arc::new(FolderHashEncoderNaming::default()) as Arc<dyn NamingStrategy>
        })
}

/// Strategy used when `naming-strategy` is not configured.
#[must_use]
pub fn default_strategy() -> Arc<dyn NamingStrategy> {
    Arc::new(NoOpNaming)
}

/// Registry for `naming-strategy` over the built-in provider and `extra` providers.
#[must_use]
pub fn registry(
    extra: impl IntoIterator<Item = StrategyProvider<Arc<dyn NamingStrategy>>>,
) -> StrategyRegistry<Arc<dyn NamingStrategy>> {
    StrategyRegistry::from_providers(
        NAMING_STRATEGY,
        std::iter::once(builtin_provider()).chain(extra),
    )
}
