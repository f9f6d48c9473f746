use std::path::PathBuf;

use assetweave::config::{EngineConfig, env_name, parse_override};
use assetweave::manager::ManagerFactory;
use serial_test::serial;

use crate::common::basic_webapp;

#[tokio::test]
async fn test_file_paths_resolve_against_file_directory() {
    let webapp = basic_webapp().unwrap();
    let config = EngineConfig::load_from(webapp.config_path()).await.unwrap();

    assert_eq!(config.context.context_folder, webapp.context_folder());
    assert_eq!(config.context.classpath, vec![webapp.root().join("classes")]);
    assert_eq!(config.context.model.as_deref(), Some(webapp.model_path()));
    assert_eq!(config.pre_processor_strategies.as_deref(), Some("semicolonAppender"));
}

#[tokio::test]
#[serial]
async fn test_overrides_win_over_file() {
    let webapp = basic_webapp().unwrap();
    let overrides = vec![
        parse_override("post-processor-strategies=cssMin").unwrap(),
        parse_override("minimize = false").unwrap(),
    ];
    let config = EngineConfig::load_layered(Some(webapp.config_path()), &overrides)
        .await
        .unwrap();

    assert_eq!(config.post_processor_strategies.as_deref(), Some("cssMin"));
    assert!(!config.context.minimize);
    assert_eq!(config.pre_processor_strategies.as_deref(), Some("semicolonAppender"));
}

#[tokio::test]
#[serial]
async fn test_environment_sits_between_file_and_overrides() {
    let webapp = basic_webapp().unwrap();
    let naming = env_name("naming-strategy");
    let hash = env_name("hash-strategy");
    assert_eq!(naming, "ASSETWEAVE_NAMING_STRATEGY");

    unsafe {
        std::env::set_var(&naming, "timestamp");
        std::env::set_var(&hash, "BLAKE3");
    }
    let overrides = vec![("hash-strategy".to_string(), "SHA-512".to_string())];
    let loaded = EngineConfig::load_layered(Some(webapp.config_path()), &overrides).await;
    unsafe {
        std::env::remove_var(&naming);
        std::env::remove_var(&hash);
    }

    let config = loaded.unwrap();
    assert_eq!(config.naming_strategy.as_deref(), Some("timestamp"));
    assert_eq!(config.hash_strategy.as_deref(), Some("SHA-512"));
    assert!(ManagerFactory::from_config(config).is_ok());
}

#[tokio::test]
#[serial]
async fn test_invalid_environment_value_is_rejected() {
    let webapp = basic_webapp().unwrap();
    let name = env_name("minimize");
    unsafe {
        std::env::set_var(&name, "sometimes");
    }
    let loaded = EngineConfig::load_layered(Some(webapp.config_path()), &[]).await;
    unsafe {
        std::env::remove_var(&name);
    }

    assert!(loaded.unwrap_err().is_configuration());
}

#[tokio::test]
async fn test_explicit_missing_file_is_an_error() {
    let missing = PathBuf::from("/definitely/not/here/assetweave.toml");
    let err = EngineConfig::load_with_optional(Some(&missing)).await.unwrap_err();
    assert!(err.is_io());
}

#[test]
fn test_malformed_overrides_are_rejected() {
    assert!(parse_override("minimize").unwrap_err().is_configuration());
    assert!(parse_override("colour=blue").unwrap_err().is_configuration());
}

#[test]
fn test_unknown_file_keys_are_rejected() {
    let err = EngineConfig::from_toml("locators = \"servletContext\"", &PathBuf::from(".")).unwrap_err();
    assert!(err.is_configuration());
}
