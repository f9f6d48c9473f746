//! [`ManagerFactory`] and its builder.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use super::Manager;
use crate::cache::{CacheStorage, ContentCache, MemoryStorage};
use crate::callback::{CallbackRegistry, LifecycleCallback};
use crate::config::EngineConfig;
use crate::context::{ContextHolder, ContextScope, RequestContext};
use crate::core::Result;
use crate::hash::{self, HashStrategy};
use crate::injector::InjectorBuilder;
use crate::locator::{self, Locator, LocatorChain, LocatorFactory};
use crate::metadata::{DefaultMetaDataFactory, MetaDataFactory};
use crate::model::{
    DefaultGroupExtractor, GroupExtractor, InMemoryModelFactory, Model, ModelFactory,
    TomlModelFactory,
};
use crate::naming::{self, NamingStrategy};
use crate::processor::{self, ConfigurableProcessorsFactory, Processor, ProcessorsFactory};
use crate::registry::{StrategyFn, StrategyProvider, StrategyRegistry};

/// Creates [`Manager`]s and the per-context collaborators behind them.
///
/// Built once through [`ManagerFactory::builder`]; immutable afterwards. Strategy keys
/// are validated when the factory is built, so unknown aliases fail here rather than
/// on the first request.
pub struct ManagerFactory {
    config: Arc<EngineConfig>,
    locators: StrategyRegistry<Arc<dyn Locator>>,
    pre_processors: StrategyRegistry<Arc<dyn Processor>>,
    post_processors: StrategyRegistry<Arc<dyn Processor>>,
    naming: StrategyRegistry<Arc<dyn NamingStrategy>>,
    hash: StrategyRegistry<Arc<dyn HashStrategy>>,
    locator_factory: Option<StrategyFn<Arc<dyn LocatorFactory>>>,
    processors_factory: Option<StrategyFn<Arc<dyn ProcessorsFactory>>>,
    model_factory: Arc<dyn ModelFactory>,
    group_extractor: Arc<dyn GroupExtractor>,
    metadata: Arc<dyn MetaDataFactory>,
    callbacks: Arc<CallbackRegistry>,
    storage: Arc<dyn CacheStorage>,
    cache: OnceLock<Arc<ContentCache>>,
    holder: Arc<ContextHolder>,
}

impl ManagerFactory {
    /// Start configuring a factory over `config`.
    #[must_use]
    pub fn builder(config: EngineConfig) -> ManagerFactoryBuilder {
        ManagerFactoryBuilder::new(config)
    }

    /// A factory over `config` with built-in strategies only.
    ///
    /// # Errors
    ///
    /// [`crate::core::AssetError::UnknownAlias`] for unregistered aliases,
    /// [`crate::core::AssetError::Configuration`] for malformed values.
    pub fn from_config(config: EngineConfig) -> Result<Arc<Self>> {
        Self::builder(config).build()
    }

    #[must_use]
    pub fn config(&self) -> &Arc<EngineConfig> {
        &self.config
    }

    /// Make a context for `request_uri` the active one of the calling operation.
    ///
    /// # Errors
    ///
    /// [`crate::core::AssetError::Precondition`] while the calling operation already has an
    /// active context.
    pub fn establish(&self, request_uri: &str) -> Result<ContextScope> {
        self.establish_context(RequestContext::new(request_uri, Arc::clone(&self.config)))
    }

    /// Make `context` the active one of the calling operation.
    ///
    /// # Errors
    ///
    /// [`crate::core::AssetError::Precondition`] while the calling operation already has an
    /// active context.
    pub fn establish_context(&self, context: RequestContext) -> Result<ContextScope> {
        self.holder.establish(context)
    }

    /// A manager injected from the collaborator graph of `scope`.
    ///
    /// The graph is built on the first call for a scope and reused afterwards.
    ///
    /// # Errors
    ///
    /// Configuration errors from building the graph.
    pub fn create(self: &Arc<Self>, scope: &ContextScope) -> Result<Manager> {
        let injector = scope.injector_or_try_init(|context| {
            InjectorBuilder::create(Some(Arc::clone(self)))?.build(context)
        })?;
        let manager = Manager::default();
        injector.inject(&manager);
        Ok(manager)
    }

    /// The cache shared by every context of this factory.
    ///
    /// The first caller's strategies configure it.
    pub fn cache(
        &self,
        hash: &Arc<dyn HashStrategy>,
        naming: &Arc<dyn NamingStrategy>,
    ) -> Arc<ContentCache> {
        Arc::clone(self.cache.get_or_init(|| {
            debug!("Creating content cache with '{}' hashing", hash.alias());
            Arc::new(ContentCache::new(
                Arc::clone(&self.storage),
                Arc::clone(hash),
                Arc::clone(naming),
            ))
        }))
    }

    /// A fresh locator factory.
    ///
    /// # Errors
    ///
    /// [`crate::core::AssetError::UnknownAlias`] for unregistered locators.
    pub fn locator_factory(&self) -> Result<Arc<dyn LocatorFactory>> {
        if let Some(supplier) = &self.locator_factory {
            return Ok(supplier());
        }
        Ok(Arc::new(LocatorChain::from_config(
            &self.locators,
            self.config.locator_strategies.as_deref(),
        )?))
    }

    /// A fresh processors factory.
    ///
    /// # Errors
    ///
    /// [`crate::core::AssetError::UnknownAlias`] for unregistered stages.
    pub fn processors_factory(&self) -> Result<Arc<dyn ProcessorsFactory>> {
        if let Some(supplier) = &self.processors_factory {
            return Ok(supplier());
        }
        Ok(Arc::new(ConfigurableProcessorsFactory::from_config(
            &self.pre_processors,
            self.config.pre_processor_strategies.as_deref(),
            &self.post_processors,
            self.config.post_processor_strategies.as_deref(),
        )?))
    }

    /// A fresh naming strategy.
    ///
    /// # Errors
    ///
    /// Configuration errors for `naming-strategy`.
    pub fn naming_strategy(&self) -> Result<Arc<dyn NamingStrategy>> {
        self.naming
            .resolve_single(self.config.naming_strategy.as_deref(), naming::default_strategy)
    }

    /// A fresh hash strategy.
    ///
    /// # Errors
    ///
    /// Configuration errors for `hash-strategy`.
    pub fn hash_strategy(&self) -> Result<Arc<dyn HashStrategy>> {
        self.hash
            .resolve_single(self.config.hash_strategy.as_deref(), hash::default_strategy)
    }

    #[must_use]
    pub fn model_factory(&self) -> Arc<dyn ModelFactory> {
        Arc::clone(&self.model_factory)
    }

    #[must_use]
    pub fn group_extractor(&self) -> Arc<dyn GroupExtractor> {
        Arc::clone(&self.group_extractor)
    }

    #[must_use]
    pub fn metadata_factory(&self) -> Arc<dyn MetaDataFactory> {
        Arc::clone(&self.metadata)
    }

    #[must_use]
    pub fn callbacks(&self) -> Arc<CallbackRegistry> {
        Arc::clone(&self.callbacks)
    }

    /// Registered aliases per configuration key, in registration order.
    #[must_use]
    pub fn aliases(&self) -> Vec<(&str, Vec<&str>)> {
        vec![
            (self.locators.key(), self.locators.aliases()),
            (self.pre_processors.key(), self.pre_processors.aliases()),
            (self.post_processors.key(), self.post_processors.aliases()),
            (self.naming.key(), self.naming.aliases()),
            (self.hash.key(), self.hash.aliases()),
        ]
    }

    fn validate(&self) -> Result<()> {
        let config = &self.config;
        if self.locator_factory.is_none() {
            self.locators.validate(config.locator_strategies.as_deref())?;
        }
        if self.processors_factory.is_none() {
            self.pre_processors
                .validate_extension_aware(config.pre_processor_strategies.as_deref())?;
            self.post_processors
                .validate_extension_aware(config.post_processor_strategies.as_deref())?;
        }
        self.naming_strategy()?;
        self.hash_strategy()?;
        Ok(())
    }
}

impl fmt::Debug for ManagerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerFactory")
            .field("config", &self.config)
            .field("callbacks", &self.callbacks)
            .field("holder", &self.holder)
            .finish_non_exhaustive()
    }
}

/// Collects providers and overrides for a [`ManagerFactory`].
pub struct ManagerFactoryBuilder {
    config: EngineConfig,
    locator_providers: Vec<StrategyProvider<Arc<dyn Locator>>>,
    pre_providers: Vec<StrategyProvider<Arc<dyn Processor>>>,
    post_providers: Vec<StrategyProvider<Arc<dyn Processor>>>,
    naming_providers: Vec<StrategyProvider<Arc<dyn NamingStrategy>>>,
    hash_providers: Vec<StrategyProvider<Arc<dyn HashStrategy>>>,
    locator_factory: Option<StrategyFn<Arc<dyn LocatorFactory>>>,
    processors_factory: Option<StrategyFn<Arc<dyn ProcessorsFactory>>>,
    model_factory: Option<Arc<dyn ModelFactory>>,
    group_extractor: Option<Arc<dyn GroupExtractor>>,
    metadata: Option<Arc<dyn MetaDataFactory>>,
    callbacks: CallbackRegistry,
    storage: Option<Arc<dyn CacheStorage>>,
}

impl ManagerFactoryBuilder {
    fn new(config: EngineConfig) -> Self {
        Self {
            config,
            locator_providers: Vec::new(),
            pre_providers: Vec::new(),
            post_providers: Vec::new(),
            naming_providers: Vec::new(),
            hash_providers: Vec::new(),
            locator_factory: None,
            processors_factory: None,
            model_factory: None,
            group_extractor: None,
            metadata: None,
            callbacks: CallbackRegistry::default(),
            storage: None,
        }
    }

    /// Register more locators after the built-in ones.
    #[must_use]
    pub fn with_locator_provider(mut self, provider: StrategyProvider<Arc<dyn Locator>>) -> Self {
        self.locator_providers.push(provider);
        self
    }

    /// Register more pre-processors after the built-in ones.
    #[must_use]
    pub fn with_pre_processor_provider(
        mut self,
        provider: StrategyProvider<Arc<dyn Processor>>,
    ) -> Self {
        self.pre_providers.push(provider);
        self
    }

    /// Register more post-processors after the built-in ones.
    #[must_use]
    pub fn with_post_processor_provider(
        mut self,
        provider: StrategyProvider<Arc<dyn Processor>>,
    ) -> Self {
        self.post_providers.push(provider);
        self
    }

    #[must_use]
    pub fn with_naming_provider(
        mut self,
        provider: StrategyProvider<Arc<dyn NamingStrategy>>,
    ) -> Self {
        self.naming_providers.push(provider);
        self
    }

    #[must_use]
    pub fn with_hash_provider(mut self, provider: StrategyProvider<Arc<dyn HashStrategy>>) -> Self {
        self.hash_providers.push(provider);
        self
    }

    /// Replace the configured locator chain. `supplier` runs once per context.
    #[must_use]
    pub fn with_locator_factory<F>(mut self, supplier: F) -> Self
    where
        F: Fn() -> Arc<dyn LocatorFactory> + Send + Sync + 'static,
    {
        self.locator_factory = Some(Arc::new(supplier));
        self
    }

    /// Replace the configured processors. `supplier` runs once per context.
    #[must_use]
    pub fn with_processors_factory<F>(mut self, supplier: F) -> Self
    where
        F: Fn() -> Arc<dyn ProcessorsFactory> + Send + Sync + 'static,
    {
        self.processors_factory = Some(Arc::new(supplier));
        self
    }

    /// Serve this model factory instead of the configured model file.
    #[must_use]
    pub fn with_model_factory(mut self, factory: Arc<dyn ModelFactory>) -> Self {
        self.model_factory = Some(factory);
        self
    }

    /// Shorthand for an in-memory model.
    #[must_use]
    pub fn with_model(self, model: Model) -> Self {
        self.with_model_factory(Arc::new(InMemoryModelFactory::new(model)))
    }

    #[must_use]
    pub fn with_group_extractor(mut self, extractor: Arc<dyn GroupExtractor>) -> Self {
        self.group_extractor = Some(extractor);
        self
    }

    #[must_use]
    pub fn with_metadata_factory(mut self, factory: Arc<dyn MetaDataFactory>) -> Self {
        self.metadata = Some(factory);
        self
    }

    #[must_use]
    pub fn with_callback(mut self, callback: Arc<dyn LifecycleCallback>) -> Self {
        self.callbacks.register(callback);
        self
    }

    /// Back the cache with `storage` instead of [`MemoryStorage`].
    #[must_use]
    pub fn with_storage(mut self, storage: Arc<dyn CacheStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Validate and freeze the configuration.
    ///
    /// # Errors
    ///
    /// [`crate::core::AssetError::UnknownAlias`] for unregistered aliases,
    /// [`crate::core::AssetError::Configuration`] for malformed values.
    pub fn build(self) -> Result<Arc<ManagerFactory>> {
        let model_factory = self.model_factory.unwrap_or_else(|| {
            match &self.config.context.model {
                Some(path) => Arc::new(TomlModelFactory::new(path)) as Arc<dyn ModelFactory>,
                None => Arc::new(InMemoryModelFactory::default()),
            }
        });
        let metadata = self.metadata.unwrap_or_else(|| {
            Arc::new(DefaultMetaDataFactory::new(self.config.context.metadata.clone()))
        });

        let factory = ManagerFactory {
            locators: locator::registry(self.locator_providers),
            pre_processors: processor::pre_registry(self.pre_providers),
            post_processors: processor::post_registry(self.post_providers),
            naming: naming::registry(self.naming_providers),
            hash: hash::registry(self.hash_providers),
            locator_factory: self.locator_factory,
            processors_factory: self.processors_factory,
            model_factory,
            group_extractor: self
                .group_extractor
                .unwrap_or_else(|| Arc::new(DefaultGroupExtractor)),
            metadata,
            callbacks: Arc::new(self.callbacks),
            storage: self.storage.unwrap_or_else(|| Arc::new(MemoryStorage::new())),
            cache: OnceLock::new(),
            holder: Arc::new(ContextHolder::default()),
            config: Arc::new(self.config),
        };
        factory.validate()?;
        debug!("Manager factory ready: {:?}", factory.aliases());
        Ok(Arc::new(factory))
    }
}

impl fmt::Debug for ManagerFactoryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerFactoryBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

