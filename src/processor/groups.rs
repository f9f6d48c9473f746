use tracing::{debug, warn};

use crate::callback::{CallbackRegistry, LifecycleEvent};
use crate::constants::MERGE_SEPARATOR;
use crate::context::RequestContext;
use crate::core::{Resource, Result};
use crate::hash::HashStrategy;
use crate::injector::{Inject, InjectionTarget, Slot};
use crate::locator::{LocatorFactory, read_all};
use crate::model::{Group, GroupKey};

use super::{ProcessorsFactory, pipeline};

/// A resource together with the content its locator produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedResource {
    pub resource: Resource,
    pub content: String,
}

/// Hash of a group's resolved inputs: every uri with its content, in order.
#[must_use]
pub fn fingerprint(hash: &dyn HashStrategy, loaded: &[LoadedResource]) -> String {
    let mut input = Vec::new();
    for item in loaded {
        input.extend_from_slice(item.resource.uri.as_bytes());
        input.push(0);
        input.extend_from_slice(item.content.as_bytes());
        input.push(0);
    }
    hash.get_hash(&input)
}

/// Orchestrates one group run: locate, pre-process, merge, post-process.
///
/// All work is blocking; callers run it on blocking threads.
#[derive(Debug, Default)]
pub struct GroupsProcessor {
    locators: Inject<dyn LocatorFactory>,
    processors: Inject<dyn ProcessorsFactory>,
    callbacks: Inject<CallbackRegistry>,
    context: Inject<RequestContext>,
}

impl GroupsProcessor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locate and read every resource of `key.resource_type` in `group`.
    ///
    /// With `ignore-missing-resources` set, resources that cannot be found or read are
    /// skipped with a warning.
    ///
    /// # Errors
    ///
    /// The locator chain's [`crate::core::AssetError::NotFound`] or
    /// [`crate::core::AssetError::Io`], or a precondition error when not injected.
    pub fn load(&self, group: &Group, key: &GroupKey) -> Result<Vec<LoadedResource>> {
        let locators = self.locators.require("locator factory")?;
        let ignore_missing = self
            .context
            .require("read-only context")?
            .config()
            .context
            .ignore_missing_resources;

        let mut loaded = Vec::new();
        for resource in group.resources_of(key.resource_type) {
            let bytes = locators
                .locate(&resource.uri)
                .and_then(|stream| read_all(stream, &resource.uri));
            match bytes {
                Ok(bytes) => loaded.push(LoadedResource {
                    resource: resource.clone(),
                    content: String::from_utf8_lossy(&bytes).into_owned(),
                }),
                Err(e) if ignore_missing && (e.is_not_found() || e.is_io()) => {
                    warn!("Skipping resource '{}' of {}: {}", resource.uri, key, e);
                }
                Err(e) => return Err(e),
            }
        }
        debug!("Loaded {} resource(s) for {}", loaded.len(), key);
        Ok(loaded)
    }

    /// Pre-process each resource, merge, then post-process the merged output.
    ///
    /// An empty merge skips post-processing and yields an empty output.
    ///
    /// # Errors
    ///
    /// The first stage failure as [`crate::core::AssetError::Processing`].
    pub fn process(&self, key: &GroupKey, loaded: Vec<LoadedResource>) -> Result<String> {
        let context = self.context.require("read-only context")?;
        let factory = self.processors.require("processors factory")?;
        let callbacks = self.callbacks.require("lifecycle callbacks")?;
        let minimize = context.minimize();

        let pre = pipeline::select(&factory.pre_processors(), key.resource_type, minimize);
        let mut parts = Vec::with_capacity(loaded.len());
        for LoadedResource { resource, content } in loaded {
            callbacks.notify(&LifecycleEvent::BeforePreProcess(&resource));
            parts.push(pipeline::run(&pre, &resource, content)?);
            callbacks.notify(&LifecycleEvent::AfterPreProcess(&resource));
        }

        callbacks.notify(&LifecycleEvent::BeforeMerge(key));
        let merged = parts.join(MERGE_SEPARATOR);
        callbacks.notify(&LifecycleEvent::AfterMerge(key));

        if merged.is_empty() {
            debug!("No content found for {}", key);
            return Ok(merged);
        }

        let post = pipeline::select(&factory.post_processors(), key.resource_type, minimize);
        let synthetic = Resource::new(key.file_name(), key.resource_type);
        callbacks.notify(&LifecycleEvent::BeforePostProcess(key));
        let output = pipeline::run(&post, &synthetic, merged)?;
        callbacks.notify(&LifecycleEvent::AfterPostProcess(key));
        Ok(output)
    }
}

impl InjectionTarget for GroupsProcessor {
    fn slots(&self) -> Vec<Slot<'_>> {
        vec![
            Slot::LocatorFactory(&self.locators),
            Slot::ProcessorsFactory(&self.processors),
            Slot::Callbacks(&self.callbacks),
            Slot::Context(&self.context),
        ]
    }
}
