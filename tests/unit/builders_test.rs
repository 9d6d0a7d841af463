//! Tests for builder modules

use std::collections::HashMap;

use prometheus_safe_io::builders::{build_files, TextFileBuilder};
use prometheus_safe_io::config::{FileConfig, FilesConfig};
use prometheus_safe_io::infra::MemoryStorage;
use prometheus_safe_io::{Call, FileError, Mode, TextEncoding};

#[test]
fn test_builder_defaults() {
    let file = TextFileBuilder::new("notes.txt").build().unwrap();
    assert_eq!(file.path().to_str(), Some("notes.txt"));
    assert_eq!(file.encoding(), TextEncoding::Utf8);
    assert_eq!(file.default_mode(), Mode::Blocking);
}

#[test]
fn test_builder_from_config() {
    let config = FileConfig {
        path: "notes.txt".into(),
        encoding: "ascii".to_string(),
        blocking: false,
    };
    let builder = TextFileBuilder::from_config(&config);
    assert_eq!(builder.default_mode(), Mode::NonBlocking);

    let file = builder.build().unwrap();
    assert_eq!(file.encoding(), TextEncoding::Ascii);
}

#[test]
fn test_builder_rejects_bad_encoding() {
    let err = TextFileBuilder::new("notes.txt").encoding("rot13").build().unwrap_err();
    assert!(matches!(err, FileError::Encoding { .. }));
}

#[test]
fn test_builder_rejects_empty_path() {
    let err = TextFileBuilder::new("").build().unwrap_err();
    assert!(matches!(err, FileError::InvalidConfig(_)));
}

#[test]
fn test_builder_custom_storage() {
    let file = TextFileBuilder::new("mem.txt")
        .storage(MemoryStorage::new())
        .blocking(true)
        .build()
        .unwrap();
    file.write("in memory", 0, Call::new()).unwrap();
    assert_eq!(file.storage().contents("mem.txt").unwrap(), b"in memory");
}

#[test]
fn test_build_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut files = HashMap::new();
    files.insert("journal".to_string(), FileConfig::new(dir.path().join("journal.txt")));
    files.insert("audit".to_string(), FileConfig::new(dir.path().join("audit.txt")));

    let handles = build_files(&FilesConfig { files }).unwrap();
    assert_eq!(handles.len(), 2);

    handles["journal"].append("entry\n", Call::new()).unwrap();
    let text = handles["journal"].read(0, Call::new()).unwrap().completed();
    assert_eq!(text.as_deref(), Some("entry\n"));
}

#[test]
fn test_build_files_invalid_config() {
    let err = build_files(&FilesConfig {
        files: HashMap::new(),
    })
    .unwrap_err();
    assert!(matches!(err, FileError::InvalidConfig(_)));
}
