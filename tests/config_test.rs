//! Unit tests for config.rs module

use notice_drafter::classifier::KNOWN_DISTRICTS;
use notice_drafter::config::{AppConfig, LoggingConfig};

#[test]
fn test_default_config_values() {
    let config = AppConfig::default();

    assert_eq!(config.database.path, "data/messages.db");
    assert_eq!(config.autosave.interval_secs, 10);
    assert_eq!(config.templates.default_name, "Default Pattern");
    assert_eq!(config.classifier.districts, KNOWN_DISTRICTS.to_vec());
}

#[test]
fn test_default_logging_config() {
    let config = AppConfig::default();

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.file_path, None);
    assert_eq!(config.logging.format, "text");
}

#[test]
fn test_config_validation_success() {
    let config = AppConfig::default();
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_empty_database_path() {
    let mut config = AppConfig::default();
    config.database.path = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_invalid_log_level() {
    let mut config = AppConfig::default();
    config.logging.level = "invalid".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_valid_log_levels() {
    let valid_levels = vec!["trace", "debug", "info", "warn", "error"];
    for level in valid_levels {
        let mut config = AppConfig::default();
        config.logging.level = level.to_string();
        assert!(config.validate().is_ok(), "Failed for level: {}", level);
    }
}

#[test]
fn test_config_validation_invalid_log_format() {
    let mut config = AppConfig::default();
    config.logging.format = "xml".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_zero_autosave_interval() {
    let mut config = AppConfig::default();
    config.autosave.interval_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_empty_gazetteer() {
    let mut config = AppConfig::default();
    config.classifier.districts = vec![String::new()];
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_blank_district_among_valid_ones() {
    let mut config = AppConfig::default();
    config.classifier.districts = vec![String::new(), "Karachi".to_string()];
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_no_districts() {
    let mut config = AppConfig::default();
    config.classifier.districts = Vec::new();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_empty_default_template() {
    let mut config = AppConfig::default();
    config.templates.default_name = String::new();
    assert!(config.validate().is_err());
}

#[test]
fn test_get_database_path_default() {
    std::env::remove_var("NOTICE_DRAFTER_DB");
    let config = AppConfig::default();
    assert_eq!(config.get_database_path(), "data/messages.db");
}

#[test]
fn test_logging_config_with_file_path() {
    let config = LoggingConfig {
        level: "debug".to_string(),
        file_path: Some("/var/log/notice-drafter.log".to_string()),
        format: "json".to_string(),
    };
    assert!(config.file_path.is_some());
}

#[test]
fn test_config_flattens_every_section() {
    let keys: Vec<String> = AppConfig::default().into_iter().map(|(key, _)| key).collect();
    for key in [
        "database.path",
        "logging.level",
        "logging.format",
        "autosave.interval_secs",
        "classifier.districts",
        "templates.default_name",
    ] {
        assert!(keys.iter().any(|k| k == key), "missing {key}");
    }
}

#[test]
fn test_config_clone() {
    let config = AppConfig::default();
    let cloned = config.clone();
    assert_eq!(config.database.path, cloned.database.path);
    assert_eq!(config.logging.level, cloned.logging.level);
}
