//! Builds the [`Injector`] for one request context.

use std::sync::Arc;

use tracing::debug;

use super::{CollaboratorGraph, InjectingLocatorFactory, InjectingProcessorsFactory, Injector};
use crate::context::RequestContext;
use crate::core::{AssetError, Result};
use crate::manager::ManagerFactory;
use crate::processor::GroupsProcessor;

/// Assembles a [`CollaboratorGraph`] from a [`ManagerFactory`].
#[derive(Debug, Clone)]
pub struct InjectorBuilder {
    factory: Arc<ManagerFactory>,
}

impl InjectorBuilder {
    /// A builder over `factory`.
    ///
    /// # Errors
    ///
    /// [`AssetError::Precondition`] when no factory is given.
    pub fn create(factory: Option<Arc<ManagerFactory>>) -> Result<Self> {
        let factory = factory.ok_or_else(|| {
            AssetError::precondition("an injector cannot be built without a manager factory")
        })?;
        Ok(Self { factory })
    }

    /// Build the collaborator graph for `context` and return its injector.
    ///
    /// Every collaborator is created once here. Factories are wrapped in injecting
    /// decorators, and collaborators with slots of their own are injected before
    /// the injector is returned. The cache is shared across contexts; the first
    /// graph's hash and naming strategies configure it.
    ///
    /// # Errors
    ///
    /// Configuration errors from resolving strategies.
    pub fn build(&self, context: &Arc<RequestContext>) -> Result<Arc<Injector>> {
        let factory = &self.factory;
        let locator_factory = factory.locator_factory()?;
        let processors_factory = factory.processors_factory()?;
        let naming = factory.naming_strategy()?;
        let hash = factory.hash_strategy()?;
        let cache = factory.cache(&hash, &naming);
        let model_factory = factory.model_factory();
        let group_extractor = factory.group_extractor();
        let metadata = factory.metadata_factory();
        let callbacks = factory.callbacks();

        let injector = Injector::new_cyclic(|me| CollaboratorGraph {
            locator_factory: Arc::new(InjectingLocatorFactory::new(locator_factory, me.clone())),
            processors_factory: Arc::new(InjectingProcessorsFactory::new(
                processors_factory,
                me.clone(),
            )),
            naming,
            hash,
            cache,
            model_factory,
            group_extractor,
            callbacks,
            context: Arc::clone(context),
            metadata,
            groups_processor: Arc::new(GroupsProcessor::new()),
        });

        let graph = injector.graph();
        injector.inject(graph.locator_factory.as_ref());
        injector.inject(graph.processors_factory.as_ref());
        injector.inject(graph.naming.as_ref());
        injector.inject(graph.model_factory.as_ref());
        injector.inject(graph.metadata.as_ref());
        injector.inject(graph.groups_processor.as_ref());
        debug!("Built collaborator graph for request context {}", context.id());
        Ok(injector)
    }
}
