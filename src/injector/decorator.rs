//! Factory decorators that inject whatever their factory hands out.

use std::sync::{Arc, Weak};

use super::{InjectionTarget, Injector, Slot};
use crate::core::Result;
use crate::locator::{Locator, LocatorFactory};
use crate::processor::{Processor, ProcessorsFactory};

/// Injects every locator the wrapped factory returns.
pub struct InjectingLocatorFactory {
    inner: Arc<dyn LocatorFactory>,
    injector: Weak<Injector>,
}

impl InjectingLocatorFactory {
    #[must_use]
    pub fn new(inner: Arc<dyn LocatorFactory>, injector: Weak<Injector>) -> Self {
        Self { inner, injector }
    }
}

impl InjectionTarget for InjectingLocatorFactory {
    fn slots(&self) -> Vec<Slot<'_>> {
        self.inner.slots()
    }
}

impl LocatorFactory for InjectingLocatorFactory {
    fn get_instance(&self, uri: &str) -> Result<Arc<dyn Locator>> {
        let locator = self.inner.get_instance(uri)?;
        if let Some(injector) = self.injector.upgrade() {
            injector.inject(locator.as_ref());
        }
        Ok(locator)
    }

    fn delegate(&self) -> Option<&Arc<dyn LocatorFactory>> {
        Some(&self.inner)
    }
}

/// Injects every stage the wrapped factory returns.
pub struct InjectingProcessorsFactory {
    inner: Arc<dyn ProcessorsFactory>,
    injector: Weak<Injector>,
}

impl InjectingProcessorsFactory {
    #[must_use]
    pub fn new(inner: Arc<dyn ProcessorsFactory>, injector: Weak<Injector>) -> Self {
        Self { inner, injector }
    }

    fn injected(&self, stages: Vec<Arc<dyn Processor>>) -> Vec<Arc<dyn Processor>> {
        if let Some(injector) = self.injector.upgrade() {
            for stage in &stages {
                injector.inject(stage.as_ref());
            }
        }
        stages
    }
}

impl InjectionTarget for InjectingProcessorsFactory {
    fn slots(&self) -> Vec<Slot<'_>> {
        self.inner.slots()
    }
}

impl ProcessorsFactory for InjectingProcessorsFactory {
    fn pre_processors(&self) -> Vec<Arc<dyn Processor>> {
        self.injected(self.inner.pre_processors())
    }

    fn post_processors(&self) -> Vec<Arc<dyn Processor>> {
        self.injected(self.inner.post_processors())
    }

    fn delegate(&self) -> Option<&Arc<dyn ProcessorsFactory>> {
        Some(&self.inner)
    }
}
