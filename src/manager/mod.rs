//! Group processing entry point
//!
//! A [`Manager`] serves one request context. [`Manager::process`] maps the request to a
//! group, reads the group's resources through the locator chain, and asks the content
//! cache for the output keyed by a fingerprint of those inputs. On a miss the
//! pre-process / merge / post-process pipeline runs on a blocking thread.
//!
//! ```rust,no_run
//! use assetweave::config::EngineConfig;
//! use assetweave::manager::ManagerFactory;
//!
//! # async fn example() -> assetweave::core::Result<()> {
//! let factory = ManagerFactory::from_config(EngineConfig::default())?;
//! let scope = factory.establish("/wro/all.js")?;
//! let manager = factory.create(&scope)?;
//! let bytes = manager.process("/wro/all.js").await?;
//! println!("{} bytes as {:?}", bytes.len(), scope.context().response().output_name());
//! # Ok(())
//! # }
//! ```

mod factory;

pub use factory::{ManagerFactory, ManagerFactoryBuilder};

use std::sync::Arc;

use tracing::info;

use crate::cache::{CacheKey, ContentCache};
use crate::callback::{CallbackRegistry, LifecycleEvent, ProcessingReport};
use crate::context::RequestContext;
use crate::core::{AssetError, Result};
use crate::hash::HashStrategy;
use crate::injector::{Inject, InjectionTarget, Slot};
use crate::metadata::MetaDataFactory;
use crate::model::{GroupExtractor, ModelFactory};
use crate::processor::{GroupsProcessor, fingerprint};

/// Serves group outputs for one request context.
#[derive(Debug, Default)]
pub struct Manager {
    groups: Inject<GroupsProcessor>,
    cache: Inject<ContentCache>,
    model: Inject<dyn ModelFactory>,
    extractor: Inject<dyn GroupExtractor>,
    callbacks: Inject<CallbackRegistry>,
    context: Inject<RequestContext>,
    hash: Inject<dyn HashStrategy>,
    metadata: Inject<dyn MetaDataFactory>,
}

impl Manager {
    /// The processed output of the group `group_id` names, e.g. `/wro/all.js`.
    ///
    /// Sets the `ETag` and `Content-Type` response headers and the published output
    /// name on the context. Never returns partial output.
    ///
    /// # Errors
    ///
    /// - [`AssetError::InvalidRequest`] when `group_id` names no group
    /// - [`AssetError::GroupNotFound`] when the model has no such group
    /// - [`AssetError::NotFound`] / [`AssetError::Io`] for unreadable resources
    /// - [`AssetError::Processing`] when a stage fails
    pub async fn process(&self, group_id: &str) -> Result<Vec<u8>> {
        let groups = Arc::clone(self.groups.require("groups processor")?);
        let cache = self.cache.require("cache strategy")?;
        let model = Arc::clone(self.model.require("model factory")?);
        let context = self.context.require("read-only context")?;
        let hash = self.hash.require("hash strategy")?;
        let callbacks = self.callbacks.require("lifecycle callbacks")?;
        let metadata = self.metadata.require("metadata factory")?;

        let key = self.extractor.require("group extractor")?.extract(group_id)?;
        info!("Processing group {}", key);

        let loaded = {
            let groups = Arc::clone(&groups);
            let key = key.clone();
            run_blocking(move || {
                let model = model.create()?;
                let group = model.require_group(&key.name)?;
                groups.load(group, &key)
            })
            .await?
        };

        let mut cache_key = CacheKey::new(key.clone(), fingerprint(hash.as_ref(), &loaded));
        if !context.minimize() {
            cache_key = cache_key.with_variant("unminimized");
        }
        let mut computed = false;
        let entry = cache
            .get_or_compute(cache_key, || {
                computed = true;
                let key = key.clone();
                async move {
                    run_blocking(move || groups.process(&key, loaded))
                        .await
                        .map(String::into_bytes)
                }
            })
            .await?;

        let response = context.response();
        response.set_header("ETag", format!("\"{}\"", entry.hash));
        response.set_header("Content-Type", key.resource_type.content_type());
        response.set_output_name(entry.name.clone());

        callbacks.notify(&LifecycleEvent::ProcessingComplete(&ProcessingReport {
            group: key,
            name: entry.name.clone(),
            hash: entry.hash.clone(),
            size: entry.content.len(),
            computed,
            metadata: metadata.create(),
        }));
        Ok(entry.content.clone())
    }
}

impl InjectionTarget for Manager {
    fn slots(&self) -> Vec<Slot<'_>> {
        vec![
            Slot::GroupsProcessor(&self.groups),
            Slot::CacheStrategy(&self.cache),
            Slot::ModelFactory(&self.model),
            Slot::GroupExtractor(&self.extractor),
            Slot::Callbacks(&self.callbacks),
            Slot::Context(&self.context),
            Slot::HashStrategy(&self.hash),
            Slot::MetaDataFactory(&self.metadata),
        ]
    }
}

async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AssetError::Processing {
            stage: "pipeline".to_string(),
            resource: "blocking task".to_string(),
            source: e.into(),
        })?
}
