//! Tests for configuration validation

use std::collections::HashMap;

use prometheus_safe_io::config::{FileConfig, FilesConfig};
use prometheus_safe_io::{Mode, TextEncoding};

#[test]
fn test_file_config_validation() {
    let valid = FileConfig {
        path: "data.txt".into(),
        encoding: "utf-8".to_string(),
        blocking: true,
    };
    assert!(valid.validate().is_ok());
}

#[test]
fn test_file_config_empty_path() {
    let invalid = FileConfig::new("");
    assert!(invalid.validate().is_err());
}

#[test]
fn test_file_config_bad_encoding() {
    let invalid = FileConfig {
        path: "data.txt".into(),
        encoding: "utf-99".to_string(),
        blocking: true,
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_file_config_from_json() {
    let json = r#"{
        "path": "journal.txt",
        "encoding": "ISO-8859-1",
        "blocking": false
    }"#;

    let config = FileConfig::from_json_str(json).unwrap();
    assert_eq!(config.text_encoding().unwrap(), TextEncoding::Latin1);
    assert_eq!(config.default_mode(), Mode::NonBlocking);
}

#[test]
fn test_files_config_validation() {
    let mut files = HashMap::new();
    files.insert("journal".to_string(), FileConfig::new("journal.txt"));
    files.insert("audit".to_string(), FileConfig::new("audit.txt"));

    let config = FilesConfig { files };
    assert!(config.validate().is_ok());
}

#[test]
fn test_files_config_empty() {
    let config = FilesConfig {
        files: HashMap::new(),
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_files_config_rejects_shared_path() {
    let mut files = HashMap::new();
    files.insert("a".to_string(), FileConfig::new("same.txt"));
    files.insert("b".to_string(), FileConfig::new("same.txt"));

    let err = FilesConfig { files }.validate().unwrap_err();
    assert!(err.contains("configured more than once"));
}

#[test]
fn test_files_config_from_json() {
    let json = r#"{
        "files": {
            "journal": { "path": "journal.txt" },
            "audit": { "path": "audit.txt", "encoding": "ascii" }
        }
    }"#;

    let config = FilesConfig::from_json_str(json).unwrap();
    assert_eq!(config.files.len(), 2);
    assert!(config.files["journal"].blocking);
}

#[test]
fn test_file_config_from_env() {
    use prometheus_safe_io::config::file::{ENV_BLOCKING, ENV_ENCODING, ENV_PATH};
    use std::env;

    // One test owns the SAFE_IO_* variables so the cases cannot race.
    let clear = || {
        for var in [ENV_PATH, ENV_ENCODING, ENV_BLOCKING] {
            env::remove_var(var);
        }
    };
    clear();

    let err = FileConfig::from_env().unwrap_err();
    assert!(err.contains(ENV_PATH));

    env::set_var(ENV_PATH, "from_env.txt");
    let config = FileConfig::from_env().unwrap();
    assert_eq!(config, FileConfig::new("from_env.txt"));

    env::set_var(ENV_ENCODING, "latin1");
    env::set_var(ENV_BLOCKING, "no");
    let config = FileConfig::from_env().unwrap();
    assert_eq!(config.text_encoding().unwrap(), TextEncoding::Latin1);
    assert_eq!(config.default_mode(), Mode::NonBlocking);

    env::set_var(ENV_BLOCKING, "sometimes");
    let err = FileConfig::from_env().unwrap_err();
    assert!(err.contains("must be a boolean"));

    env::set_var(ENV_BLOCKING, "true");
    env::set_var(ENV_ENCODING, "utf-99");
    let err = FileConfig::from_env().unwrap_err();
    assert!(err.contains("unsupported encoding"));

    env::set_var(ENV_ENCODING, "utf-8");
    env::set_var(ENV_PATH, "");
    let err = FileConfig::from_env().unwrap_err();
    assert!(err.contains("path must not be empty"));

    clear();
}
