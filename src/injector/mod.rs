//! Capability-slot injection
//!
//! Components declare what they need as typed [`Inject`] slots and expose them through
//! [`InjectionTarget::slots`]. An [`Injector`] owns the [`CollaboratorGraph`] built for
//! one request context and fills every empty slot of a target from it.
//!
//! The set of collaborator kinds is closed (see [`Slot`]); there is no general-purpose
//! container behind this.
//!
//! # Slot semantics
//!
//! - A slot is written at most once. Slots the target pre-populated (test doubles,
//!   partial wiring) are left untouched by [`Injector::inject`].
//! - Locator and processors factories are handed out wrapped in injecting decorators,
//!   so every locator or stage they return is injected as well.
//! - [`original`] walks decorator layers down to the innermost instance.
//!
//! # Examples
//!
//! ```rust,no_run
//! use assetweave::injector::{Inject, InjectionTarget, Slot};
//! use assetweave::hash::HashStrategy;
//!
//! #[derive(Default)]
//! struct Fingerprinter {
//!     hash: Inject<dyn HashStrategy>,
//! }
//!
//! impl InjectionTarget for Fingerprinter {
//!     fn slots(&self) -> Vec<Slot<'_>> {
//!         vec![Slot::HashStrategy(&self.hash)]
//!     }
//! }
//! ```

mod builder;
mod decorator;

pub use builder::InjectorBuilder;
pub use decorator::{InjectingLocatorFactory, InjectingProcessorsFactory};

use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use tracing::debug;

use crate::cache::ContentCache;
use crate::callback::CallbackRegistry;
use crate::context::RequestContext;
use crate::core::{AssetError, Result};
use crate::hash::HashStrategy;
use crate::locator::LocatorFactory;
use crate::metadata::MetaDataFactory;
use crate::model::{GroupExtractor, ModelFactory};
use crate::naming::NamingStrategy;
use crate::processor::{GroupsProcessor, Processor, ProcessorsFactory};

/// A write-once collaborator slot.
pub struct Inject<T: ?Sized>(OnceLock<Arc<T>>);

impl<T: ?Sized> Inject<T> {
    /// An empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// A slot pre-populated with `value`; injection will not replace it.
    #[must_use]
    pub fn with(value: Arc<T>) -> Self {
        let slot = Self::new();
        let _ = slot.0.set(value);
        slot
    }

    /// The collaborator, if injected.
    #[must_use]
    pub fn get(&self) -> Option<&Arc<T>> {
        self.0.get()
    }

    /// Store `value` if the slot is empty. Returns whether it was stored.
    pub fn set(&self, value: Arc<T>) -> bool {
        self.0.set(value).is_ok()
    }

    /// Whether the slot holds a collaborator.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.get().is_some()
    }

    /// The collaborator, or a [`AssetError::Precondition`] naming the missing slot.
    ///
    /// # Errors
    ///
    /// Returns an error when nothing was injected into this slot.
    pub fn require(&self, what: &str) -> Result<&Arc<T>> {
        self.0
            .get()
            .ok_or_else(|| AssetError::precondition(format!("'{what}' was not injected")))
    }
}

impl<T: ?Sized> Default for Inject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Inject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_set() { "Inject(set)" } else { "Inject(empty)" })
    }
}

/// One typed capability slot of an [`InjectionTarget`].
pub enum Slot<'a> {
    /// Locator factory (handed out decorated)
    LocatorFactory(&'a Inject<dyn LocatorFactory>),
    /// Processors factory (handed out decorated)
    ProcessorsFactory(&'a Inject<dyn ProcessorsFactory>),
    /// Output naming strategy
    NamingStrategy(&'a Inject<dyn NamingStrategy>),
    /// Content hash strategy
    HashStrategy(&'a Inject<dyn HashStrategy>),
    /// The content cache
    CacheStrategy(&'a Inject<ContentCache>),
    /// Group model factory
    ModelFactory(&'a Inject<dyn ModelFactory>),
    /// Request to group mapping
    GroupExtractor(&'a Inject<dyn GroupExtractor>),
    /// Lifecycle callbacks
    Callbacks(&'a Inject<CallbackRegistry>),
    /// The read-only request context
    Context(&'a Inject<RequestContext>),
    /// Metadata factory
    MetaDataFactory(&'a Inject<dyn MetaDataFactory>),
    /// The injector itself
    Injector(&'a Inject<Injector>),
    /// Pipeline orchestrator
    GroupsProcessor(&'a Inject<GroupsProcessor>),
}

impl Slot<'_> {
    /// Collaborator kind, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::LocatorFactory(_) => "locator factory",
            Self::ProcessorsFactory(_) => "processors factory",
            Self::NamingStrategy(_) => "naming strategy",
            Self::HashStrategy(_) => "hash strategy",
            Self::CacheStrategy(_) => "cache strategy",
            Self::ModelFactory(_) => "model factory",
            Self::GroupExtractor(_) => "group extractor",
            Self::Callbacks(_) => "lifecycle callbacks",
            Self::Context(_) => "read-only context",
            Self::MetaDataFactory(_) => "metadata factory",
            Self::Injector(_) => "injector",
            Self::GroupsProcessor(_) => "groups processor",
        }
    }
}

/// Anything exposing capability slots.
pub trait InjectionTarget {
    /// The target's slots. Targets without dependencies keep the empty default.
    fn slots(&self) -> Vec<Slot<'_>> {
        Vec::new()
    }
}

/// Singleton collaborators for one request context.
///
/// Built once by [`InjectorBuilder::build`] and immutable afterwards.
pub struct CollaboratorGraph {
    /// Locator factory, wrapped in [`InjectingLocatorFactory`]
    pub locator_factory: Arc<dyn LocatorFactory>,
    /// Processors factory, wrapped in [`InjectingProcessorsFactory`]
    pub processors_factory: Arc<dyn ProcessorsFactory>,
    pub naming: Arc<dyn NamingStrategy>,
    pub hash: Arc<dyn HashStrategy>,
    pub cache: Arc<ContentCache>,
    pub model_factory: Arc<dyn ModelFactory>,
    pub group_extractor: Arc<dyn GroupExtractor>,
    pub callbacks: Arc<CallbackRegistry>,
    pub context: Arc<RequestContext>,
    pub metadata: Arc<dyn MetaDataFactory>,
    pub groups_processor: Arc<GroupsProcessor>,
}

/// Fills capability slots from a [`CollaboratorGraph`].
pub struct Injector {
    graph: CollaboratorGraph,
    me: Weak<Injector>,
}

impl Injector {
    pub(crate) fn new_cyclic(build: impl FnOnce(&Weak<Injector>) -> CollaboratorGraph) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            graph: build(me),
            me: me.clone(),
        })
    }

    /// The collaborator graph this injector serves.
    #[must_use]
    pub fn graph(&self) -> &CollaboratorGraph {
        &self.graph
    }

    /// Fill every empty slot of `target`. Returns how many slots were filled.
    pub fn inject<T: InjectionTarget + ?Sized>(&self, target: &T) -> usize {
        let filled = target.slots().into_iter().filter(|slot| self.fill(slot)).count();
        if filled > 0 {
            debug!("Injected {} collaborator(s) into {}", filled, std::any::type_name::<T>());
        }
        filled
    }

    fn fill(&self, slot: &Slot<'_>) -> bool {
        let graph = &self.graph;
        match slot {
            Slot::LocatorFactory(s) => s.set(Arc::clone(&graph.locator_factory)),
            Slot::ProcessorsFactory(s) => s.set(Arc::clone(&graph.processors_factory)),
            Slot::NamingStrategy(s) => s.set(Arc::clone(&graph.naming)),
            Slot::HashStrategy(s) => s.set(Arc::clone(&graph.hash)),
            Slot::CacheStrategy(s) => s.set(Arc::clone(&graph.cache)),
            Slot::ModelFactory(s) => s.set(Arc::clone(&graph.model_factory)),
            Slot::GroupExtractor(s) => s.set(Arc::clone(&graph.group_extractor)),
            Slot::Callbacks(s) => s.set(Arc::clone(&graph.callbacks)),
            Slot::Context(s) => s.set(Arc::clone(&graph.context)),
            Slot::MetaDataFactory(s) => s.set(Arc::clone(&graph.metadata)),
            Slot::Injector(s) => self.me.upgrade().is_some_and(|me| s.set(me)),
            Slot::GroupsProcessor(s) => s.set(Arc::clone(&graph.groups_processor)),
        }
    }
}

impl InjectionTarget for Injector {}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("context", &self.graph.context.id())
            .finish_non_exhaustive()
    }
}

/// Objects that may wrap another instance of the same kind.
pub trait Decorated {
    /// The wrapped instance, if this is a decorator.
    fn decorated(&self) -> Option<&Arc<Self>>;
}

impl Decorated for dyn LocatorFactory {
    fn decorated(&self) -> Option<&Arc<Self>> {
        self.delegate()
    }
}

impl Decorated for dyn ProcessorsFactory {
    fn decorated(&self) -> Option<&Arc<Self>> {
        self.delegate()
    }
}

impl Decorated for dyn Processor {
    fn decorated(&self) -> Option<&Arc<Self>> {
        self.delegate()
    }
}

/// The innermost instance behind any number of decorator layers.
#[must_use]
pub fn original<T: Decorated + ?Sized>(object: &Arc<T>) -> Arc<T> {
    let mut current = Arc::clone(object);
    loop {
        let next = match current.decorated() {
            Some(inner) => Arc::clone(inner),
            None => return current,
        };
        current = next;
    }
}
