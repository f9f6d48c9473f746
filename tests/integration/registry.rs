use std::sync::Arc;

use assetweave::config::EngineConfig;
use assetweave::core::{AssetError, user_friendly_error};
use assetweave::locator::{self, Locator, LocatorChain};
use assetweave::manager::ManagerFactory;
use assetweave::processor::{self, Processor};
use assetweave::registry::{StrategyProvider, resolve};
use assetweave::test_utils::MemoryLocator;

#[test]
fn test_locator_chain_follows_configured_order() {
    let registry = locator::registry([]);

    let single = LocatorChain::from_config(&registry, Some("servletContext")).unwrap();
    assert_eq!(single.aliases(), vec!["servletContext"]);

    let two = LocatorChain::from_config(&registry, Some("classpath, servletContext")).unwrap();
    assert_eq!(two.aliases(), vec!["classpath", "servletContext"]);
}

#[test]
fn test_empty_locators_fall_back_to_defaults() {
    let registry = locator::registry([]);
    for value in [None, Some(""), Some(" , ,")] {
        let chain = LocatorChain::from_config(&registry, value).unwrap();
        assert_eq!(chain.aliases(), vec!["servletContext", "classpath", "url"]);
    }
}

#[test]
fn test_empty_processors_yield_empty_pipeline() {
    let registry = processor::pre_registry([]);
    assert!(registry.resolve_extension_aware(Some("")).unwrap().is_empty());
    assert!(registry.resolve_extension_aware(None).unwrap().is_empty());
}

#[test]
fn test_unknown_aliases_are_all_reported() {
    let registry = processor::pre_registry([]);
    let err = registry
        .resolve_extension_aware(Some("jsMin, INVALID1, INVALID2"))
        .err()
        .unwrap();
    assert!(err.is_configuration());
    match err {
        AssetError::UnknownAlias {
            key, alias, invalid, ..
        } => {
            assert_eq!(key, "pre-processor-strategies");
            assert_eq!(alias, "INVALID1");
            assert_eq!(invalid, vec!["INVALID1", "INVALID2"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_factory_rejects_unknown_alias_at_construction() {
    let config = EngineConfig {
        post_processor_strategies: Some("jsMinn".to_string()),
        ..EngineConfig::default()
    };
    let err = ManagerFactory::from_config(config).unwrap_err();
    assert!(err.is_configuration());

    let ctx = user_friendly_error(err.into());
    assert_eq!(ctx.suggestion.as_deref(), Some("Did you mean 'jsMin'?"));
}

#[test]
fn test_single_alias_keys_reject_lists() {
    let config = EngineConfig {
        naming_strategy: Some("noOp, timestamp".to_string()),
        ..EngineConfig::default()
    };
    let err = ManagerFactory::from_config(config).unwrap_err();
    assert!(matches!(err, AssetError::Configuration { .. }));
}

#[test]
fn test_extra_providers_extend_and_cannot_shadow() {
    let memory = StrategyProvider::new("tests")
        .with(MemoryLocator::ALIAS, || {
            Arc::new(MemoryLocator::new().with("/x.js", "x")) as Arc<dyn Locator>
        })
        .with("servletContext", || Arc::new(MemoryLocator::new()) as Arc<dyn Locator>);

    let registry = locator::registry([memory]);
    assert_eq!(registry.aliases(), vec!["servletContext", "classpath", "url", "memory"]);

    let chain = LocatorChain::from_config(&registry, Some("memory,servletContext")).unwrap();
    assert_eq!(chain.aliases(), vec!["memory", "servletContext"]);
}

#[test]
fn test_one_shot_resolve_keeps_duplicates() {
    let provider: StrategyProvider<Arc<dyn Processor>> = processor::builtin::provider();
    let stages = resolve("pre-processor-strategies", Some("cssMin,bomStripper,cssMin"), &[provider], Vec::new)
        .unwrap();
    let names: Vec<&str> = stages.iter().map(|stage| stage.name()).collect();
    assert_eq!(names, vec!["cssMin", "bomStripper", "cssMin"]);
}
