//! Tests for config

use super::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_config_default_values() {
    let config = SearchConfig::default();
    assert_eq!(config.min_query_length, 3);
    assert_eq!(config.debounce_rate, 0);
    assert!(!config.idle_enabled);
    assert_eq!(config.idle_time, 300);
    assert_eq!(config.endpoint, None);
    assert_eq!(config.result_key, None);
}

#[test]
fn test_with_endpoint_keeps_defaults() {
    let config = SearchConfig::with_endpoint("/api/v1/users");
    assert_eq!(config.endpoint.as_deref(), Some("/api/v1/users"));
    assert_eq!(config.min_query_length, 3);
}

#[test]
fn test_parse_full_config() {
    let toml = r#"
min_query_length = 2
debounce_rate = 250
idle_enabled = true
idle_time = 100
endpoint = "https://example.com/search"
result_key = "name"
"#;
    let config: SearchConfig = toml::from_str(toml).unwrap();
    assert_eq!(config.min_query_length, 2);
    assert_eq!(config.debounce_rate, 250);
    assert!(config.idle_enabled);
    assert_eq!(config.idle_time, 100);
    assert_eq!(config.endpoint.as_deref(), Some("https://example.com/search"));
    assert_eq!(config.result_key.as_deref(), Some("name"));
}

#[test]
fn test_empty_config_uses_defaults() {
    let config: SearchConfig = toml::from_str("").unwrap();
    assert_eq!(config, SearchConfig::default());
}

#[test]
fn test_negative_length_fails_parse() {
    let result: Result<SearchConfig, _> = toml::from_str("min_query_length = -1");
    assert!(result.is_err());
}

#[test]
fn test_missing_file_returns_defaults_without_warning() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_config_from(&dir.path().join("config.toml"));
    assert_eq!(result.config, SearchConfig::default());
    assert!(result.warning.is_none());
}

#[test]
fn test_load_valid_file() {
    let file = write_config("endpoint = \"/search\"\ndebounce_rate = 5\n");
    let result = load_config_from(file.path());
    assert!(result.warning.is_none());
    assert_eq!(result.config.endpoint.as_deref(), Some("/search"));
    assert_eq!(result.config.debounce_rate, 5);
}

#[test]
fn test_load_malformed_file_warns_and_defaults() {
    let file = write_config("endpoint = \"/search");
    let result = load_config_from(file.path());
    assert_eq!(result.config, SearchConfig::default());
    let warning = result.warning.unwrap();
    assert!(warning.starts_with("Invalid config"), "got: {}", warning);
}

#[test]
fn test_config_path_ends_with_app_dir() {
    let path = get_config_path();
    assert!(path.ends_with(".config/hyper-search/config.toml"));
}
