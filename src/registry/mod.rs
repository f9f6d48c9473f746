//! Alias-driven strategy resolution
//!
//! Every configurable strategy kind (locators, processors, naming and hash strategies)
//! is selected by alias. A [`StrategyProvider`] contributes `alias → constructor`
//! entries; a [`StrategyRegistry`] merges providers in registration order and turns
//! a comma-separated configuration value into an ordered list of fresh instances.
//!
//! # Resolution rules
//!
//! - The value is split on commas, tokens are trimmed and empty tokens dropped.
//! - No tokens at all yields the caller-supplied default.
//! - Aliases are case-sensitive. When two providers register the same alias the
//!   first registration wins.
//! - Order is preserved and duplicates are kept.
//! - Any unknown token fails the whole resolution with [`AssetError::UnknownAlias`],
//!   which names every offending token. Nothing partial is ever returned.
//!
//! # Examples
//!
//! ```rust
//! use assetweave::registry::{StrategyProvider, StrategyRegistry};
//!
//! let provider = StrategyProvider::new("numbers")
//!     .with("one", || 1)
//!     .with("two", || 2);
//! let registry = StrategyRegistry::from_providers("numbers", [provider]);
//!
//! let resolved = registry.resolve(Some("two, one,,two"), Vec::new).unwrap();
//! assert_eq!(resolved, vec![2, 1, 2]);
//!
//! let fallback = registry.resolve(Some("  "), || vec![0]).unwrap();
//! assert_eq!(fallback, vec![0]);
//!
//! assert!(registry.resolve(Some("three"), Vec::new).is_err());
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::core::{AssetError, Result};

/// Constructor producing a fresh strategy instance.
pub type StrategyFn<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// A named source of `alias → constructor` entries.
pub struct StrategyProvider<T> {
    name: String,
    entries: Vec<(String, StrategyFn<T>)>,
}

impl<T> StrategyProvider<T> {
    /// Create an empty provider.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Register `alias` with a constructor.
    #[must_use]
    pub fn with<F>(mut self, alias: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.entries.push((alias.into(), Arc::new(constructor)));
        self
    }

    /// Provider name, used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Aliases in registration order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(alias, _)| alias.as_str())
    }
}

impl<T> Clone for StrategyProvider<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            entries: self.entries.clone(),
        }
    }
}

impl<T> fmt::Debug for StrategyProvider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyProvider")
            .field("name", &self.name)
            .field("aliases", &self.aliases().collect::<Vec<_>>())
            .finish()
    }
}

/// A strategy resolved from an extension-aware alias such as `jsMin.js`.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    /// Registered alias the strategy was built from
    pub alias: String,
    /// Extension restriction, when the token carried one
    pub extension: Option<String>,
    /// Fresh strategy instance
    pub strategy: T,
}

/// Merged view over providers for one configuration key.
///
/// Immutable once built; every resolution call returns fresh instances.
pub struct StrategyRegistry<T> {
    key: String,
    entries: Vec<(String, StrategyFn<T>)>,
}

impl<T> StrategyRegistry<T> {
    /// Create an empty registry for configuration key `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entries: Vec::new(),
        }
    }

    /// Merge `providers` in order.
    pub fn from_providers(
        key: impl Into<String>,
        providers: impl IntoIterator<Item = StrategyProvider<T>>,
    ) -> Self {
        let mut registry = Self::new(key);
        for provider in providers {
            registry.register(provider);
        }
        registry
    }

    /// Merge one more provider. Aliases already registered keep their first constructor.
    pub fn register(&mut self, provider: StrategyProvider<T>) {
        for (alias, constructor) in provider.entries {
            if self.contains(&alias) {
                debug!(
                    "Alias '{}' from provider '{}' shadowed by an earlier registration for '{}'",
                    alias, provider.name, self.key
                );
                continue;
            }
            self.entries.push((alias, constructor));
        }
    }

    /// Configuration key this registry resolves.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether `alias` is registered.
    #[must_use]
    pub fn contains(&self, alias: &str) -> bool {
        self.entries.iter().any(|(registered, _)| registered == alias)
    }

    /// Registered aliases in registration order.
    #[must_use]
    pub fn aliases(&self) -> Vec<&str> {
        self.entries.iter().map(|(alias, _)| alias.as_str()).collect()
    }

    /// Instantiate `alias`, if registered.
    #[must_use]
    pub fn get(&self, alias: &str) -> Option<T> {
        self.entries
            .iter()
            .find(|(registered, _)| registered == alias)
            .map(|(_, constructor)| constructor())
    }

    /// Resolve a comma-separated list of aliases.
    ///
    /// # Errors
    ///
    /// [`AssetError::UnknownAlias`] when any token is not registered.
    pub fn resolve(&self, value: Option<&str>, default: impl FnOnce() -> Vec<T>) -> Result<Vec<T>> {
        let tokens = parse_aliases(value);
        if tokens.is_empty() {
            debug!("No aliases configured for '{}', using defaults", self.key);
            return Ok(default());
        }

        self.ensure_known(&tokens, |token| self.contains(token))?;
        Ok(tokens.iter().filter_map(|token| self.get(token)).collect())
    }

    /// Resolve a key that selects exactly one strategy.
    ///
    /// # Errors
    ///
    /// [`AssetError::Configuration`] when more than one alias is given,
    /// [`AssetError::UnknownAlias`] when the alias is not registered.
    pub fn resolve_single(&self, value: Option<&str>, default: impl FnOnce() -> T) -> Result<T> {
        let tokens = parse_aliases(value);
        match tokens.as_slice() {
            [] => Ok(default()),
            [alias] => {
                self.ensure_known(&tokens, |token| self.contains(token))?;
                self.get(alias).ok_or_else(|| self.unknown(vec![(*alias).to_string()]))
            }
            _ => Err(AssetError::configuration(format!(
                "'{}' selects a single strategy but {} were given: {}",
                self.key,
                tokens.len(),
                tokens.join(", ")
            ))),
        }
    }

    /// Resolve processor-style aliases, where `name.ext` restricts `name` to resources
    /// with extension `ext`.
    ///
    /// A token that is itself registered is never split, so aliases containing dots
    /// keep working. An empty value yields no strategies.
    ///
    /// # Errors
    ///
    /// [`AssetError::UnknownAlias`] when any token (after splitting) is not registered.
    pub fn resolve_extension_aware(&self, value: Option<&str>) -> Result<Vec<Resolved<T>>> {
        let tokens = parse_aliases(value);
        self.ensure_known(&tokens, |token| self.split_extension(token).is_some())?;

        Ok(tokens
            .iter()
            .filter_map(|token| {
                let (alias, extension) = self.split_extension(token)?;
                Some(Resolved {
                    alias: alias.to_string(),
                    extension: extension.map(str::to_string),
                    strategy: self.get(alias)?,
                })
            })
            .collect())
    }

    /// Check every token of `value` is registered, without instantiating anything.
    ///
    /// # Errors
    ///
    /// Same as [`StrategyRegistry::resolve`].
    pub fn validate(&self, value: Option<&str>) -> Result<()> {
        self.ensure_known(&parse_aliases(value), |token| self.contains(token))
    }

    /// Validate `value` without keeping the instances.
    ///
    /// # Errors
    ///
    /// Same as [`StrategyRegistry::resolve_extension_aware`].
    pub fn validate_extension_aware(&self, value: Option<&str>) -> Result<()> {
        let tokens = parse_aliases(value);
        self.ensure_known(&tokens, |token| self.split_extension(token).is_some())
    }

    fn split_extension<'a>(&self, token: &'a str) -> Option<(&'a str, Option<&'a str>)> {
        if self.contains(token) {
            return Some((token, None));
        }
        let (alias, extension) = token.rsplit_once('.')?;
        (!extension.is_empty() && self.contains(alias)).then_some((alias, Some(extension)))
    }

    fn ensure_known(&self, tokens: &[&str], known: impl Fn(&str) -> bool) -> Result<()> {
        let invalid: Vec<String> = tokens
            .iter()
            .copied()
            .filter(|&token| !known(token))
            .map(str::to_string)
            .collect();
        if invalid.is_empty() {
            Ok(())
        } else {
            Err(self.unknown(invalid))
        }
    }

    fn unknown(&self, invalid: Vec<String>) -> AssetError {
        AssetError::UnknownAlias {
            key: self.key.clone(),
            alias: invalid.first().cloned().unwrap_or_default(),
            invalid,
            available: self.aliases().into_iter().map(str::to_string).collect(),
        }
    }
}

impl<T> fmt::Debug for StrategyRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("key", &self.key)
            .field("aliases", &self.aliases())
            .finish()
    }
}

/// Split a configuration value into trimmed, non-empty alias tokens.
#[must_use]
pub fn parse_aliases(value: Option<&str>) -> Vec<&str> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}

/// One-shot resolution over a provider list.
///
/// Equivalent to building a [`StrategyRegistry`] from `providers` and calling
/// [`StrategyRegistry::resolve`].
///
/// # Errors
///
/// [`AssetError::UnknownAlias`] when any token is not registered.
pub fn resolve<T>(
    key: &str,
    value: Option<&str>,
    providers: &[StrategyProvider<T>],
    default: impl FnOnce() -> Vec<T>,
) -> Result<Vec<T>> {
    StrategyRegistry::from_providers(key, providers.iter().cloned()).resolve(value, default)
}
