//! Error types for file operations.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::call::Operation;
use crate::infra::storage::OpenMode;

/// Errors produced by file handle operations.
#[derive(Debug, Error)]
pub enum FileError {
    /// The path does not resolve to an existing resource.
    #[error("resource not found: {}", path.display())]
    ResourceNotFound {
        /// Path that was opened.
        path: PathBuf,
    },
    /// Insufficient permission to open the resource in the requested mode.
    #[error("access denied: cannot open {} in mode `{mode}`", path.display())]
    ResourceAccessDenied {
        /// Path that was opened.
        path: PathBuf,
        /// Mode the open was attempted with.
        mode: OpenMode,
    },
    /// Payload cannot be encoded or decoded under the configured scheme.
    #[error("encoding error ({encoding}): {reason}")]
    Encoding {
        /// Name of the encoding in use.
        encoding: String,
        /// What went wrong.
        reason: String,
    },
    /// Offset is out of range for the backend.
    #[error("invalid position {position}: {reason}")]
    InvalidPosition {
        /// Requested offset.
        position: u64,
        /// What went wrong.
        reason: String,
    },
    /// Open-mode token could not be parsed.
    #[error("invalid open mode: {0}")]
    InvalidMode(String),
    /// Handle configuration is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Call made on a thread that is already running an operation of the same
    /// handle, such as from inside a non-blocking callback.
    #[error("re-entrant `{op}` call on a handle this thread is already operating on")]
    Reentrant {
        /// Operation that was refused.
        op: Operation,
    },
    /// A non-blocking execution unit could not be spawned.
    #[error("dispatch failed: {0}")]
    Dispatch(#[source] io::Error),
    /// Backend failure that fits none of the classified kinds.
    #[error("backend error on {}: {source}", path.display())]
    Backend {
        /// Path the failing operation targeted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl FileError {
    /// Classify a backend I/O error raised while opening or using `path`.
    pub fn from_io(err: io::Error, path: &Path, mode: OpenMode) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::ResourceNotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => Self::ResourceAccessDenied {
                path: path.to_path_buf(),
                mode,
            },
            io::ErrorKind::InvalidData => Self::Encoding {
                encoding: "backend".into(),
                reason: err.to_string(),
            },
            _ => Self::Backend {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// Returns true for errors raised because the resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound { .. })
    }
}

/// Result alias for file handle operations.
pub type FileResult<T> = Result<T, FileError>;

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_not_found() {
        let err = io::Error::from(io::ErrorKind::NotFound);
        let classified = FileError::from_io(err, Path::new("/tmp/missing"), OpenMode::Read);
        assert!(classified.is_not_found());
    }

    #[test]
    fn test_classify_permission_denied() {
        let err = io::Error::from(io::ErrorKind::PermissionDenied);
        let classified = FileError::from_io(err, Path::new("/etc/shadow"), OpenMode::Write);
        assert!(matches!(
            classified,
            FileError::ResourceAccessDenied { mode: OpenMode::Write, .. }
        ));
    }

    #[test]
    fn test_classify_other_is_backend() {
        let err = io::Error::other("disk on fire");
        let classified = FileError::from_io(err, Path::new("data.txt"), OpenMode::Append);
        assert_eq!(
            classified.to_string(),
            "backend error on data.txt: disk on fire"
        );
    }
}
