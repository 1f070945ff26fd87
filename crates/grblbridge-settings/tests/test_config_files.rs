use grblbridge_core::Language;
use grblbridge_settings::{Config, SettingsError};
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_toml_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("bridge.toml");

    let mut config = Config::new();
    config.server.port = 2323;
    config.capture.program_file = PathBuf::from("/tmp/job.ngc");
    config.ui.language = Language::De;

    config.save_to_file(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("[server]"));
    assert!(text.contains("language = \"de\""));

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_json_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bridge.json");

    let mut config = Config::new();
    config.server.host = "127.0.0.1".to_string();
    config.server.poll_interval_ms = 200;

    config.save_to_file(&path).unwrap();
    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded.server.bind_addr(), "127.0.0.1:23");
    assert_eq!(loaded.server.poll_interval_ms, 200);
}

#[test]
fn test_partial_file_uses_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bridge.toml");
    std::fs::write(&path, "[server]\nport = 2525\n").unwrap();

    let config = Config::load_from_file(&path).unwrap();
    assert_eq!(config.server.port, 2525);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.capture.log_file, PathBuf::from("lightburn_log.txt"));
    assert_eq!(config.ui.language, Language::En);
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bridge.toml");
    std::fs::write(&path, "[server]\npoll_interval_ms = 0\n").unwrap();

    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::InvalidSetting { .. })
    ));

    std::fs::write(&path, "[server\nport = ").unwrap();
    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::TomlError(_))
    ));
}

#[test]
fn test_load_or_default() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    let config = Config::load_or_default(&missing).unwrap();
    assert_eq!(config, Config::default());
    assert!(!missing.exists());
}

#[test]
fn test_missing_file_reports_load_error() {
    let dir = tempdir().unwrap();
    let err = Config::load_from_file(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, SettingsError::LoadError(_)));
}
