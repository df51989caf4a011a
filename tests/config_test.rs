//! Config file loading and storing

use sky_toc::{
    config::{ConfigProvider, OutlineConfig, TomlConfigProvider},
    TocError,
};
use std::fs;
use tempfile::tempdir;
use test_log::test;

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().unwrap();
    let provider = TomlConfigProvider::new(dir.path().join("sky-toc.toml"));
    assert_eq!(provider.load().unwrap(), OutlineConfig::default());
}

#[test]
fn stored_config_loads_back() {
    let dir = tempdir().unwrap();
    let provider = TomlConfigProvider::new(dir.path().join("sky-toc.toml"));
    let mut config = OutlineConfig {
        header_offset: 72.0,
        resize_debounce_ms: 100.0,
        ..Default::default()
    };
    config.selectors.content = ".article-body".to_string();

    provider.store(&config).unwrap();
    let loaded = provider.load().unwrap();

    assert_eq!(loaded, config);
    assert_eq!(loaded.selectors.content_class(), Some("article-body"));
}

#[test]
fn invalid_config_is_not_stored() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sky-toc.toml");
    let provider = TomlConfigProvider::new(&path);
    let config = OutlineConfig {
        progress_end_ratio: 1.5,
        ..Default::default()
    };

    assert!(matches!(provider.store(&config), Err(TocError::Config(_))));
    assert!(!path.exists());
}

#[test]
fn malformed_file_is_a_config_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sky-toc.toml");
    fs::write(&path, "header_offset = \"tall\"").unwrap();

    let err = TomlConfigProvider::new(&path).load().unwrap_err();
    assert!(matches!(err, TocError::Config(_)));
}
