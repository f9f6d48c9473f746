use std::sync::Arc;

use tracing::trace;

use crate::core::{Resource, ResourceType};
use crate::injector::{InjectionTarget, Slot};

use super::Processor;

/// Applies the wrapped stage only to resources with a given extension.
///
/// Other resources pass through untouched. Created for `name.ext` aliases.
pub struct ExtensionFilter {
    inner: Arc<dyn Processor>,
    extension: String,
}

impl ExtensionFilter {
    #[must_use]
    pub fn new(inner: Arc<dyn Processor>, extension: impl Into<String>) -> Self {
        Self {
            inner,
            extension: extension.into(),
        }
    }

    /// Extension this filter applies the stage to.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }
}

impl InjectionTarget for ExtensionFilter {
    fn slots(&self) -> Vec<Slot<'_>> {
        self.inner.slots()
    }
}

impl Processor for ExtensionFilter {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn process(&self, resource: &Resource, content: &str) -> anyhow::Result<String> {
        if resource.extension() == Some(self.extension.as_str()) {
            self.inner.process(resource, content)
        } else {
            trace!(
                "Skipping '{}' for '{}' (only applies to .{})",
                self.inner.name(),
                resource.uri,
                self.extension
            );
            Ok(content.to_string())
        }
    }

    fn supported_type(&self) -> Option<ResourceType> {
        self.inner.supported_type()
    }

    fn is_minimizer(&self) -> bool {
        self.inner.is_minimizer()
    }

    fn delegate(&self) -> Option<&Arc<dyn Processor>> {
        Some(&self.inner)
    }
}
