//! Test doubles for locators, stages and callbacks.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::callback::{LifecycleCallback, LifecycleEvent};
use crate::core::{AssetError, Resource, ResourceType, Result};
use crate::injector::{Inject, InjectionTarget, Slot};
use crate::locator::{ByteStream, Locator};
use crate::processor::Processor;

/// Serves fixed content for the uris it was given; accepts nothing else.
#[derive(Debug, Default, Clone)]
pub struct MemoryLocator {
    files: HashMap<String, String>,
    reads: Arc<AtomicUsize>,
}

impl MemoryLocator {
    pub const ALIAS: &'static str = "memory";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, uri: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(uri.into(), content.into());
        self
    }

    /// How many times any uri was read, shared across clones.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl InjectionTarget for MemoryLocator {}

impl Locator for MemoryLocator {
    fn alias(&self) -> &str {
        Self::ALIAS
    }

    fn accepts(&self, uri: &str) -> bool {
        self.files.contains_key(uri)
    }

    fn locate(&self, uri: &str) -> Result<ByteStream> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let content = self.files.get(uri).ok_or_else(|| AssetError::NotFound {
            uri: uri.to_string(),
        })?;
        Ok(Box::new(Cursor::new(content.clone().into_bytes())))
    }
}

/// Appends `[name]` to whatever passes through and counts its calls.
///
/// Exposes a hash-strategy slot so injection into stages can be observed.
#[derive(Debug)]
pub struct RecordingProcessor {
    name: String,
    supported: Option<ResourceType>,
    minimizer: bool,
    calls: AtomicUsize,
    pub hash: Inject<dyn crate::hash::HashStrategy>,
}

impl RecordingProcessor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supported: None,
            minimizer: false,
            calls: AtomicUsize::new(0),
            hash: Inject::new(),
        }
    }

    #[must_use]
    pub fn for_type(mut self, resource_type: ResourceType) -> Self {
        self.supported = Some(resource_type);
        self
    }

    #[must_use]
    pub fn minimizer(mut self) -> Self {
        self.minimizer = true;
        self
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl InjectionTarget for RecordingProcessor {
    fn slots(&self) -> Vec<Slot<'_>> {
        vec![Slot::HashStrategy(&self.hash)]
    }
}

impl Processor for RecordingProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, _resource: &Resource, content: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{content}[{}]", self.name))
    }

    fn supported_type(&self) -> Option<ResourceType> {
        self.supported
    }

    fn is_minimizer(&self) -> bool {
        self.minimizer
    }
}

/// Fails every call.
#[derive(Debug, Clone)]
pub struct FailingProcessor {
    name: String,
}

impl FailingProcessor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl InjectionTarget for FailingProcessor {}

impl Processor for FailingProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, resource: &Resource, _content: &str) -> anyhow::Result<String> {
        anyhow::bail!("{} refused {}", self.name, resource.uri)
    }
}

/// Records lifecycle event names in order.
#[derive(Debug, Default)]
pub struct RecordingCallback {
    events: Mutex<Vec<String>>,
}

impl RecordingCallback {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl LifecycleCallback for RecordingCallback {
    fn on_event(&self, event: &LifecycleEvent<'_>) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event.name().to_string());
        Ok(())
    }
}
