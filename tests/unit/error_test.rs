//! Tests for error types

use std::io;
use std::path::PathBuf;

use prometheus_safe_io::{FileError, OpenMode};

#[test]
fn test_resource_not_found_error() {
    let err = FileError::ResourceNotFound {
        path: PathBuf::from("data/missing.txt"),
    };
    assert_eq!(format!("{}", err), "resource not found: data/missing.txt");
}

#[test]
fn test_access_denied_error() {
    let err = FileError::ResourceAccessDenied {
        path: PathBuf::from("locked.txt"),
        mode: OpenMode::Append,
    };
    assert_eq!(format!("{}", err), "access denied: cannot open locked.txt in mode `a`");
}

#[test]
fn test_encoding_error() {
    let err = FileError::Encoding {
        encoding: "ascii".to_string(),
        reason: "cannot encode 'é' at byte 3".to_string(),
    };
    assert_eq!(format!("{}", err), "encoding error (ascii): cannot encode 'é' at byte 3");
}

#[test]
fn test_invalid_position_error() {
    let err = FileError::InvalidPosition {
        position: 42,
        reason: "out of range".to_string(),
    };
    assert_eq!(format!("{}", err), "invalid position 42: out of range");
}

#[test]
fn test_dispatch_error_keeps_source() {
    let err = FileError::Dispatch(io::Error::other("thread limit reached"));
    assert_eq!(format!("{}", err), "dispatch failed: thread limit reached");
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_reentrant_error() {
    let err = FileError::Reentrant {
        op: prometheus_safe_io::core::Operation::ReadLines,
    };
    assert_eq!(
        format!("{}", err),
        "re-entrant `readlines` call on a handle this thread is already operating on"
    );
}
