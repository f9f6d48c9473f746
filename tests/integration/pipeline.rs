use std::sync::Arc;

use assetweave::core::{AssetError, ResourceType};
use assetweave::processor::{
    ConfigurableProcessorsFactory, PRE_PROCESSOR_STRATEGIES, Processor, ProcessorsFactory, pipeline,
};
use assetweave::registry::{StrategyProvider, StrategyRegistry};
use assetweave::test_utils::{FailingProcessor, RecordingProcessor};

use crate::common::{css, js};

fn recording_registry() -> StrategyRegistry<Arc<dyn Processor>> {
    let mut provider = StrategyProvider::new("recording");
    for name in ["jsMin", "cssImport", "cssVariables"] {
        provider = provider.with(name, move || Arc::new(RecordingProcessor::new(name)) as Arc<dyn Processor>);
    }
    let provider = provider.with("broken", || Arc::new(FailingProcessor::new("broken")) as Arc<dyn Processor>);
    StrategyRegistry::from_providers(PRE_PROCESSOR_STRATEGIES, [provider])
}

fn pre_stages(value: &str) -> Vec<Arc<dyn Processor>> {
    let registry = recording_registry();
    ConfigurableProcessorsFactory::from_config(&registry, Some(value), &registry, None)
        .unwrap()
        .pre_processors()
}

#[test]
fn test_stages_apply_in_configured_order() {
    let stages = pre_stages("jsMin,cssImport,cssVariables");
    let output = pipeline::run(&stages, &js("/js/a.js"), "x".to_string()).unwrap();
    assert_eq!(output, "x[jsMin][cssImport][cssVariables]");
}

#[test]
fn test_extension_filter_skips_other_extensions() {
    let stages = pre_stages("jsMin.js, cssVariables");

    let on_css = pipeline::run(&stages, &css("/css/a.css"), "x".to_string()).unwrap();
    assert_eq!(on_css, "x[cssVariables]");

    let on_js = pipeline::run(&stages, &js("/js/a.js?v=2"), "x".to_string()).unwrap();
    assert_eq!(on_js, "x[jsMin][cssVariables]");
}

#[test]
fn test_first_failure_aborts_run() {
    let stages = pre_stages("jsMin, broken, cssImport");
    let err = pipeline::run(&stages, &js("/js/a.js"), "x".to_string()).unwrap_err();
    match err {
        AssetError::Processing { stage, resource, .. } => {
            assert_eq!(stage, "broken");
            assert_eq!(resource, "/js/a.js");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_select_honours_type_and_minimize() {
    let stages: Vec<Arc<dyn Processor>> = vec![
        Arc::new(RecordingProcessor::new("any")),
        Arc::new(RecordingProcessor::new("jsOnly").for_type(ResourceType::Js)),
        Arc::new(RecordingProcessor::new("min").minimizer()),
    ];

    let names = |selected: Vec<Arc<dyn Processor>>| -> Vec<String> {
        selected.iter().map(|stage| stage.name().to_string()).collect()
    };
    assert_eq!(names(pipeline::select(&stages, ResourceType::Js, true)), vec!["any", "jsOnly", "min"]);
    assert_eq!(names(pipeline::select(&stages, ResourceType::Css, true)), vec!["any", "min"]);
    assert_eq!(names(pipeline::select(&stages, ResourceType::Js, false)), vec!["any", "jsOnly"]);
}

#[test]
fn test_builtin_css_stages_compose() {
    let registry = assetweave::processor::pre_registry([]);
    let factory = ConfigurableProcessorsFactory::from_config(
        &registry,
        Some("cssVariables, cssUrlRewriting, cssMin"),
        &registry,
        None,
    )
    .unwrap();
    let source = "@variables { main: red; }\n.a { color: var(main); background: url(../img/x.png); }";
    let output = pipeline::run(&factory.pre_processors(), &css("/css/theme/a.css"), source.to_string()).unwrap();
    assert_eq!(output, ".a{color:red;background:url(/css/img/x.png)}");
}
