use std::sync::{Arc, Weak};

use assetweave::cache::ContentCache;
use assetweave::callback::CallbackRegistry;
use assetweave::config::EngineConfig;
use assetweave::context::RequestContext;
use assetweave::hash::{Blake3Hash, HashStrategy};
use assetweave::injector::{
    Inject, InjectingLocatorFactory, InjectingProcessorsFactory, InjectionTarget, Injector,
    InjectorBuilder, Slot, original,
};
use assetweave::locator::{LocatorChain, LocatorFactory};
use assetweave::manager::ManagerFactory;
use assetweave::metadata::MetaDataFactory;
use assetweave::model::{GroupExtractor, ModelFactory};
use assetweave::naming::NamingStrategy;
use assetweave::processor::{
    ConfigurableProcessorsFactory, ExtensionFilter, GroupsProcessor, Processor, ProcessorsFactory,
};
use assetweave::test_utils::RecordingProcessor;

#[derive(Default)]
struct EverySlot {
    locators: Inject<dyn LocatorFactory>,
    processors: Inject<dyn ProcessorsFactory>,
    naming: Inject<dyn NamingStrategy>,
    hash: Inject<dyn HashStrategy>,
    cache: Inject<ContentCache>,
    model: Inject<dyn ModelFactory>,
    extractor: Inject<dyn GroupExtractor>,
    callbacks: Inject<CallbackRegistry>,
    context: Inject<RequestContext>,
    metadata: Inject<dyn MetaDataFactory>,
    injector: Inject<Injector>,
    groups: Inject<GroupsProcessor>,
}

impl InjectionTarget for EverySlot {
    fn slots(&self) -> Vec<Slot<'_>> {
        vec![
            Slot::LocatorFactory(&self.locators),
            Slot::ProcessorsFactory(&self.processors),
            Slot::NamingStrategy(&self.naming),
            Slot::HashStrategy(&self.hash),
            Slot::CacheStrategy(&self.cache),
            Slot::ModelFactory(&self.model),
            Slot::GroupExtractor(&self.extractor),
            Slot::Callbacks(&self.callbacks),
            Slot::Context(&self.context),
            Slot::MetaDataFactory(&self.metadata),
            Slot::Injector(&self.injector),
            Slot::GroupsProcessor(&self.groups),
        ]
    }
}

fn factory() -> Arc<ManagerFactory> {
    ManagerFactory::from_config(EngineConfig::default()).unwrap()
}

#[test]
fn test_default_setup_fills_every_slot() {
    let factory = factory();
    let scope = factory.establish("/all.js").unwrap();
    let injector = InjectorBuilder::create(Some(Arc::clone(&factory)))
        .unwrap()
        .build(scope.context())
        .unwrap();

    let target = EverySlot::default();
    assert_eq!(injector.inject(&target), 12);
    assert!(target.slots().iter().all(|slot| match slot {
        Slot::LocatorFactory(s) => s.is_set(),
        Slot::ProcessorsFactory(s) => s.is_set(),
        Slot::NamingStrategy(s) => s.is_set(),
        Slot::HashStrategy(s) => s.is_set(),
        Slot::CacheStrategy(s) => s.is_set(),
        Slot::ModelFactory(s) => s.is_set(),
        Slot::GroupExtractor(s) => s.is_set(),
        Slot::Callbacks(s) => s.is_set(),
        Slot::Context(s) => s.is_set(),
        Slot::MetaDataFactory(s) => s.is_set(),
        Slot::Injector(s) => s.is_set(),
        Slot::GroupsProcessor(s) => s.is_set(),
    }));

    let context = target.context.get().unwrap();
    assert!(Arc::ptr_eq(context, scope.context()));
    assert!(Arc::ptr_eq(target.injector.get().unwrap(), &injector));

    // Second pass finds nothing left to fill
    assert_eq!(injector.inject(&target), 0);
}

#[test]
fn test_prepopulated_slots_are_left_alone() {
    let factory = factory();
    let scope = factory.establish("/all.js").unwrap();
    let injector = InjectorBuilder::create(Some(Arc::clone(&factory)))
        .unwrap()
        .build(scope.context())
        .unwrap();

    let target = EverySlot {
        hash: Inject::with(Arc::new(Blake3Hash) as Arc<dyn HashStrategy>),
        ..EverySlot::default()
    };
    assert_eq!(injector.inject(&target), 11);
    assert_eq!(target.hash.get().unwrap().alias(), "BLAKE3");
    assert_eq!(injector.graph().hash.alias(), "SHA-256");
}

#[test]
fn test_create_without_factory_fails() {
    let err = InjectorBuilder::create(None).unwrap_err();
    assert!(err.is_precondition());
}

#[test]
fn test_decorated_factory_injects_returned_stages() {
    let stage = Arc::new(RecordingProcessor::new("recording"));
    let handed_out = Arc::clone(&stage);
    let factory = ManagerFactory::builder(EngineConfig::default())
        .with_processors_factory(move || {
            Arc::new(ConfigurableProcessorsFactory::new(
                vec![Arc::clone(&handed_out) as Arc<dyn Processor>],
                Vec::new(),
            )) as Arc<dyn ProcessorsFactory>
        })
        .build()
        .unwrap();

    let scope = factory.establish("/all.js").unwrap();
    let injector = InjectorBuilder::create(Some(Arc::clone(&factory)))
        .unwrap()
        .build(scope.context())
        .unwrap();

    assert!(!stage.hash.is_set());
    let stages = injector.graph().processors_factory.pre_processors();
    assert_eq!(stages.len(), 1);
    assert!(stage.hash.is_set());
}

#[test]
fn test_original_walks_every_decorator_layer() {
    let inner: Arc<dyn LocatorFactory> = Arc::new(LocatorChain::new(Vec::new()));
    let once: Arc<dyn LocatorFactory> =
        Arc::new(InjectingLocatorFactory::new(Arc::clone(&inner), Weak::new()));
    let twice: Arc<dyn LocatorFactory> =
        Arc::new(InjectingLocatorFactory::new(Arc::clone(&once), Weak::new()));
    assert!(Arc::ptr_eq(&original(&twice), &inner));
    assert!(Arc::ptr_eq(&original(&inner), &inner));

    let processors: Arc<dyn ProcessorsFactory> =
        Arc::new(ConfigurableProcessorsFactory::new(Vec::new(), Vec::new()));
    let wrapped: Arc<dyn ProcessorsFactory> = Arc::new(InjectingProcessorsFactory::new(
        Arc::new(InjectingProcessorsFactory::new(Arc::clone(&processors), Weak::new())),
        Weak::new(),
    ));
    assert!(Arc::ptr_eq(&original(&wrapped), &processors));

    let stage: Arc<dyn Processor> = Arc::new(RecordingProcessor::new("inner"));
    let filtered: Arc<dyn Processor> = Arc::new(ExtensionFilter::new(
        Arc::new(ExtensionFilter::new(Arc::clone(&stage), "js")),
        "css",
    ));
    assert!(Arc::ptr_eq(&original(&filtered), &stage));
}

#[test]
fn test_graph_is_built_once_per_context() {
    let factory = factory();
    let scope = factory.establish("/all.js").unwrap();
    let first = factory.create(&scope).unwrap();
    let second = factory.create(&scope).unwrap();
    drop((first, second));

    let injector = scope
        .injector_or_try_init(|_| unreachable!("graph already built"))
        .unwrap();
    assert!(Arc::ptr_eq(&injector.graph().context, scope.context()));
}
