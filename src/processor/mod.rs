//! Content transformers and the pipelines built from them
//!
//! A [`Processor`] is one transform stage. Stages come in two ordered lists, each
//! resolved from its own configuration key:
//!
//! - **pre-processors** (`pre-processor-strategies`) run once per resource
//! - **post-processors** (`post-processor-strategies`) run on the merged group output
//!
//! A token such as `jsMin.js` selects stage `jsMin` restricted to resources with
//! extension `js` (see [`ExtensionFilter`]). Empty lists are valid and produce an
//! identity pipeline.
//!
//! Stage failures abort the run with [`crate::core::AssetError::Processing`]; see
//! [`pipeline::run`].

pub mod builtin;
mod decorator;
mod groups;
pub mod pipeline;

pub use decorator::ExtensionFilter;
pub use groups::{GroupsProcessor, LoadedResource, fingerprint};

use std::sync::Arc;

use crate::core::{Resource, ResourceType, Result};
use crate::injector::InjectionTarget;
use crate::registry::{Resolved, StrategyProvider, StrategyRegistry};

/// Configuration key selecting pre-processors.
pub const PRE_PROCESSOR_STRATEGIES: &str = "pre-processor-strategies";
/// Configuration key selecting post-processors.
pub const POST_PROCESSOR_STRATEGIES: &str = "post-processor-strategies";

/// One transform stage.
pub trait Processor: InjectionTarget + Send + Sync {
    /// Alias the stage is registered under; reported in processing errors.
    fn name(&self) -> &str;

    /// Transform `content` of `resource`.
    ///
    /// # Errors
    ///
    /// Any failure; the pipeline wraps it with the stage name and resource uri.
    fn process(&self, resource: &Resource, content: &str) -> anyhow::Result<String>;

    /// Resource type this stage applies to; `None` applies to every type.
    fn supported_type(&self) -> Option<ResourceType> {
        None
    }

    /// Minimizers are skipped when the context disables minimization.
    fn is_minimizer(&self) -> bool {
        false
    }

    /// The wrapped stage, when this stage is a decorator.
    fn delegate(&self) -> Option<&Arc<dyn Processor>> {
        None
    }
}

/// Supplies the ordered pre- and post-processor lists.
pub trait ProcessorsFactory: InjectionTarget + Send + Sync {
    fn pre_processors(&self) -> Vec<Arc<dyn Processor>>;

    fn post_processors(&self) -> Vec<Arc<dyn Processor>>;

    /// The wrapped factory, when this factory is a decorator.
    fn delegate(&self) -> Option<&Arc<dyn ProcessorsFactory>> {
        None
    }
}

/// Processors factory over fixed stage lists.
///
/// Stages are created once per factory, so every graph gets its own instances.
pub struct ConfigurableProcessorsFactory {
    pre: Vec<Arc<dyn Processor>>,
    post: Vec<Arc<dyn Processor>>,
}

impl ConfigurableProcessorsFactory {
    #[must_use]
    pub fn new(pre: Vec<Arc<dyn Processor>>, post: Vec<Arc<dyn Processor>>) -> Self {
        Self { pre, post }
    }

    /// Resolve both stage lists from their configuration values.
    ///
    /// # Errors
    ///
    /// [`crate::core::AssetError::UnknownAlias`] naming every unknown token of the
    /// failing key.
    pub fn from_config(
        pre_registry: &StrategyRegistry<Arc<dyn Processor>>,
        pre: Option<&str>,
        post_registry: &StrategyRegistry<Arc<dyn Processor>>,
        post: Option<&str>,
    ) -> Result<Self> {
        Ok(Self::new(
            build_stages(pre_registry.resolve_extension_aware(pre)?),
            build_stages(post_registry.resolve_extension_aware(post)?),
        ))
    }
}

impl InjectionTarget for ConfigurableProcessorsFactory {}

impl ProcessorsFactory for ConfigurableProcessorsFactory {
    fn pre_processors(&self) -> Vec<Arc<dyn Processor>> {
        self.pre.clone()
    }

    fn post_processors(&self) -> Vec<Arc<dyn Processor>> {
        self.post.clone()
    }
}

fn build_stages(resolved: Vec<Resolved<Arc<dyn Processor>>>) -> Vec<Arc<dyn Processor>> {
    resolved
        .into_iter()
        .map(|resolved| match resolved.extension {
            Some(extension) => {
                Arc::new(ExtensionFilter::new(resolved.strategy, extension)) as Arc<dyn Processor>
            }
            None => resolved.strategy,
        })
        .collect()
}

/// Registry for pre-processors over the built-in provider and `extra` providers.
#[must_use]
pub fn pre_registry(
    extra: impl IntoIterator<Item = StrategyProvider<Arc<dyn Processor>>>,
) -> StrategyRegistry<Arc<dyn Processor>> {
    StrategyRegistry::from_providers(
        PRE_PROCESSOR_STRATEGIES,
        std::iter::once(builtin::provider()).chain(extra),
    )
}

/// Registry for post-processors over the built-in provider and `extra` providers.
#[must_use]
pub fn post_registry(
    extra: impl IntoIterator<Item = StrategyProvider<Arc<dyn Processor>>>,
) -> StrategyRegistry<Arc<dyn Processor>> {
    StrategyRegistry::from_providers(
        POST_PROCESSOR_STRATEGIES,
        std::iter::once(builtin::provider()).chain(extra),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AssetError;
    use crate::injector::original;

    fn names(stages: &[Arc<dyn Processor>]) -> Vec<&str> {
        stages.iter().map(|stage| stage.name()).collect()
    }

    #[test]
    fn test_configured_order() {
        let factory = ConfigurableProcessorsFactory::from_config(
            &pre_registry([]),
            Some("jsMin,cssImport,cssVariables"),
            &post_registry([]),
            None,
        )
        .unwrap();
        assert_eq!(names(&factory.pre_processors()), vec!["jsMin", "cssImport", "cssVariables"]);
        assert!(factory.post_processors().is_empty());
    }

    #[test]
    fn test_extension_alias_is_wrapped() {
        let factory = ConfigurableProcessorsFactory::from_config(
            &pre_registry([]),
            Some("jsMin.js"),
            &post_registry([]),
            Some("cssMin"),
        )
        .unwrap();
        let pre = factory.pre_processors();
        assert_eq!(pre.len(), 1);
        assert!(pre[0].delegate().is_some());
        assert_eq!(original(&pre[0]).name(), "jsMin");
        assert!(factory.post_processors()[0].delegate().is_none());
    }

    #[test]
    fn test_unknown_processor_fails() {
        let err = ConfigurableProcessorsFactory::from_config(
            &pre_registry([]),
            None,
            &post_registry([]),
            Some("cssMin,nope"),
        )
        .err()
        .unwrap();
        assert!(matches!(
            err,
            AssetError::UnknownAlias { ref key, .. } if key == POST_PROCESSOR_STRATEGIES
        ));
    }
}
