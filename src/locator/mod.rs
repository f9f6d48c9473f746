//! Resource locators
//!
//! A [`Locator`] turns a uri it recognizes into a byte stream. A [`LocatorChain`]
//! tries its locators in configured order; the first one that accepts a uri is
//! authoritative for it:
//!
//! - nobody accepts → [`AssetError::NotFound`]
//! - the accepting locator fails to read → its [`AssetError::Io`] propagates unchanged
//!
//! # Built-in locators
//!
//! | alias | accepts | reads |
//! |---|---|---|
//! | `servletContext` | uris starting with `/` | file below the context folder |
//! | `classpath` | `classpath:` prefix | first classpath root containing the path |
//! | `url` | `file:`, `http://`, `https://` | local file or blocking HTTP GET |
//!
//! An empty `locator-strategies` value selects all three, in that order.

mod classpath;
mod servlet_context;
mod url;

pub use classpath::ClasspathLocator;
pub use servlet_context::ServletContextLocator;
pub use url::UrlLocator;

use std::io::Read;
use std::sync::Arc;

use tracing::{debug, info};

use crate::core::{AssetError, Result};
use crate::injector::InjectionTarget;
use crate::registry::{StrategyProvider, StrategyRegistry};

/// Configuration key selecting locators.
pub const LOCATOR_STRATEGIES: &str = "locator-strategies";

/// Readable stream produced by a locator.
pub type ByteStream = Box<dyn Read + Send>;

/// Resolves uris it recognizes into byte streams.
pub trait Locator: InjectionTarget + Send + Sync {
    /// Alias this locator is registered under.
    fn alias(&self) -> &str;

    /// Whether this locator is responsible for `uri`. Must not touch I/O.
    fn accepts(&self, uri: &str) -> bool;

    /// Open `uri`.
    ///
    /// # Errors
    ///
    /// [`AssetError::Io`] when the uri cannot be read.
    fn locate(&self, uri: &str) -> Result<ByteStream>;
}

/// Hands out the locator responsible for a uri.
pub trait LocatorFactory: InjectionTarget + Send + Sync {
    /// The first locator that accepts `uri`.
    ///
    /// # Errors
    ///
    /// [`AssetError::NotFound`] when no locator accepts the uri.
    fn get_instance(&self, uri: &str) -> Result<Arc<dyn Locator>>;

    /// Open `uri` with the locator responsible for it.
    ///
    /// # Errors
    ///
    /// [`AssetError::NotFound`] or the responsible locator's [`AssetError::Io`].
    fn locate(&self, uri: &str) -> Result<ByteStream> {
        self.get_instance(uri)?.locate(uri)
    }

    /// The wrapped factory, when this factory is a decorator.
    fn delegate(&self) -> Option<&Arc<dyn LocatorFactory>> {
        None
    }
}

/// Ordered locators; the first that accepts a uri wins.
pub struct LocatorChain {
    locators: Vec<Arc<dyn Locator>>,
}

impl LocatorChain {
    /// Chain over `locators`, tried in order.
    #[must_use]
    pub fn new(locators: Vec<Arc<dyn Locator>>) -> Self {
        Self { locators }
    }

    /// Build the chain configured by `value`, falling back to [`default_locators`].
    ///
    /// # Errors
    ///
    /// [`AssetError::UnknownAlias`] for unregistered aliases.
    pub fn from_config(
        registry: &StrategyRegistry<Arc<dyn Locator>>,
        value: Option<&str>,
    ) -> Result<Self> {
        let locators = registry.resolve(value, || {
            info!("No locators configured. Using default locators.");
            default_locators()
        })?;
        Ok(Self::new(locators))
    }

    /// Locators in evaluation order.
    #[must_use]
    pub fn locators(&self) -> &[Arc<dyn Locator>] {
        &self.locators
    }

    /// Aliases of the chained locators, in order.
    #[must_use]
    pub fn aliases(&self) -> Vec<&str> {
        self.locators.iter().map(|locator| locator.alias()).collect()
    }
}

impl InjectionTarget for LocatorChain {}

impl LocatorFactory for LocatorChain {
    fn get_instance(&self, uri: &str) -> Result<Arc<dyn Locator>> {
        let locator = self
            .locators
            .iter()
            .find(|locator| locator.accepts(uri))
            .ok_or_else(|| AssetError::NotFound {
                uri: uri.to_string(),
            })?;
        debug!("Locator '{}' handles '{}'", locator.alias(), uri);
        Ok(Arc::clone(locator))
    }
}

/// Provider registering the built-in locators.
#[must_use]
pub fn builtin_provider() -> StrategyProvider<Arc<dyn Locator>> {
    StrategyProvider::new("builtin")
        .with(ServletContextLocator::ALIAS, || {
            Arc::new(ServletContextLocator::default()) as Arc<dyn Locator>
        })
        .with(ClasspathLocator::ALIAS, || {
            Arc::new(ClasspathLocator::default()) as Arc<dyn Locator>
        })
        .with(UrlLocator::ALIAS, || Arc::new(UrlLocator::new()) as Arc<dyn Locator>)
}

/// Locators used when none are configured: `servletContext, classpath, url`.
#[must_use]
pub fn default_locators() -> Vec<Arc<dyn Locator>> {
    vec![
        Arc::new(ServletContextLocator::default()),
        Arc::new(ClasspathLocator::default()),
        Arc::new(UrlLocator::new()),
    ]
}

/// Registry for `locator-strategies` over the built-in provider and `extra` providers.
#[must_use]
pub fn registry(
    extra: impl IntoIterator<Item = StrategyProvider<Arc<dyn Locator>>>,
) -> StrategyRegistry<Arc<dyn Locator>> {
    StrategyRegistry::from_providers(
        LOCATOR_STRATEGIES,
        std::iter::once(builtin_provider()).chain(extra),
    )
}

/// Read a stream fully, reporting failures against `uri`.
pub(crate) fn read_all(mut stream: ByteStream, uri: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    stream
        .read_to_end(&mut bytes)
        .map_err(|e| AssetError::io(uri, e))?;
    Ok(bytes)
}
