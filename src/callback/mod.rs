//! Lifecycle callbacks
//!
//! Callbacks observe a group run: per-resource pre-processing, the merge, post-processing
//! and the final result. They cannot alter content. A failing callback is logged and the
//! run continues.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::core::Resource;
use crate::model::GroupKey;

/// Summary handed to callbacks once a group has been served.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingReport {
    pub group: GroupKey,
    /// Published name from the naming strategy
    pub name: String,
    /// Output hash from the hash strategy
    pub hash: String,
    pub size: usize,
    /// Whether the output was computed by this call (false on a cache hit)
    pub computed: bool,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// A point in the lifecycle of a group run.
#[derive(Debug, Clone, Copy)]
pub enum LifecycleEvent<'a> {
    BeforePreProcess(&'a Resource),
    AfterPreProcess(&'a Resource),
    BeforeMerge(&'a GroupKey),
    AfterMerge(&'a GroupKey),
    BeforePostProcess(&'a GroupKey),
    AfterPostProcess(&'a GroupKey),
    ProcessingComplete(&'a ProcessingReport),
}

impl LifecycleEvent<'_> {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BeforePreProcess(_) => "before-pre-process",
            Self::AfterPreProcess(_) => "after-pre-process",
            Self::BeforeMerge(_) => "before-merge",
            Self::AfterMerge(_) => "after-merge",
            Self::BeforePostProcess(_) => "before-post-process",
            Self::AfterPostProcess(_) => "after-post-process",
            Self::ProcessingComplete(_) => "processing-complete",
        }
    }
}

/// Observer of group runs.
pub trait LifecycleCallback: Send + Sync {
    /// # Errors
    ///
    /// Any failure; it is logged and otherwise ignored.
    fn on_event(&self, event: &LifecycleEvent<'_>) -> anyhow::Result<()>;
}

impl<F> LifecycleCallback for F
where
    F: Fn(&LifecycleEvent<'_>) -> anyhow::Result<()> + Send + Sync,
{
    fn on_event(&self, event: &LifecycleEvent<'_>) -> anyhow::Result<()> {
        self(event)
    }
}

/// Ordered set of callbacks notified together.
#[derive(Clone, Default)]
pub struct CallbackRegistry {
    callbacks: Vec<Arc<dyn LifecycleCallback>>,
}

impl CallbackRegistry {
    #[must_use]
    pub fn new(callbacks: Vec<Arc<dyn LifecycleCallback>>) -> Self {
        Self { callbacks }
    }

    pub fn register(&mut self, callback: Arc<dyn LifecycleCallback>) {
        self.callbacks.push(callback);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Notify every callback in registration order.
    pub fn notify(&self, event: &LifecycleEvent<'_>) {
        for callback in &self.callbacks {
            if let Err(e) = callback.on_event(event) {
                warn!("Lifecycle callback failed on {}: {:#}", event.name(), e);
            }
        }
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}
