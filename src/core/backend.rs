//! Operation bodies. Each one performs a single open/use/close cycle
//! against the storage and is only ever run while the gate is held.

use std::io;
use std::path::Path;
use std::sync::Arc;

use crate::infra::storage::{OpenMode, Storage};
use crate::util::TextEncoding;

use super::error::{FileError, FileResult};
use super::lines::{split_lines, LineInput};

/// Highest offset any backend can seek to.
const MAX_POSITION: u64 = i64::MAX.unsigned_abs();

/// Everything an operation body needs, cheap to clone onto another thread.
pub(crate) struct Backend<S: Storage> {
    storage: Arc<S>,
    path: Arc<Path>,
    encoding: TextEncoding,
}

impl<S: Storage> Clone for Backend<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            path: Arc::clone(&self.path),
            encoding: self.encoding,
        }
    }
}

impl<S: Storage> Backend<S> {
    pub(crate) fn new(storage: Arc<S>, path: Arc<Path>, encoding: TextEncoding) -> Self {
        Self {
            storage,
            path,
            encoding,
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) const fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub(crate) fn storage(&self) -> &S {
        &self.storage
    }

    pub(crate) fn name(&self) -> FileResult<String> {
        let handle = self.open(OpenMode::Read)?;
        let identifier = self.storage.identifier(&self.path, &handle);
        self.close(handle, OpenMode::Read)?;
        Ok(identifier)
    }

    pub(crate) fn read(&self, position: u64) -> FileResult<String> {
        check_position(position)?;
        let mut handle = self.open(OpenMode::Read)?;
        self.seek(&mut handle, position)?;
        let bytes = self
            .storage
            .read_to_end(&mut handle)
            .map_err(|e| self.classify(e, OpenMode::Read))?;
        self.close(handle, OpenMode::Read)?;
        self.encoding.decode(bytes)
    }

    pub(crate) fn write(&self, data: &str, position: u64) -> FileResult<usize> {
        check_position(position)?;
        let bytes = self.encoding.encode(data)?;
        let mut handle = self.open(OpenMode::Write)?;
        self.seek(&mut handle, position)?;
        self.put(&mut handle, &bytes, OpenMode::Write)?;
        self.close(handle, OpenMode::Write)?;
        Ok(self.encoding.units(data))
    }

    pub(crate) fn append(&self, data: &str) -> FileResult<usize> {
        let bytes = self.encoding.encode(data)?;
        let mut handle = self.open(OpenMode::Append)?;
        self.put(&mut handle, &bytes, OpenMode::Append)?;
        self.close(handle, OpenMode::Append)?;
        Ok(self.encoding.units(data))
    }

    pub(crate) fn readline(&self, position: u64) -> FileResult<String> {
        check_position(position)?;
        let mut handle = self.open(OpenMode::Read)?;
        self.seek(&mut handle, position)?;
        let bytes = self
            .storage
            .read_line(&mut handle)
            .map_err(|e| self.classify(e, OpenMode::Read))?;
        self.close(handle, OpenMode::Read)?;
        self.encoding.decode(bytes)
    }

    pub(crate) fn readlines(&self, position: u64) -> FileResult<Vec<String>> {
        self.read(position).map(|text| split_lines(&text))
    }

    pub(crate) fn writelines(&self, lines: LineInput, position: u64) -> FileResult<()> {
        self.write(&lines.render(), position).map(drop)
    }

    pub(crate) fn appendlines(&self, lines: LineInput) -> FileResult<()> {
        self.append(&lines.render()).map(drop)
    }

    pub(crate) fn descriptor(&self) -> FileResult<i64> {
        let handle = self.open(OpenMode::Read)?;
        let descriptor = self
            .storage
            .descriptor(&handle)
            .map_err(|e| self.classify(e, OpenMode::Read))?;
        self.close(handle, OpenMode::Read)?;
        Ok(descriptor)
    }

    /// Open without closing. The caller owns the returned handle.
    pub(crate) fn detach(&self, mode: OpenMode) -> FileResult<S::Handle> {
        self.open(mode)
    }

    fn open(&self, mode: OpenMode) -> FileResult<S::Handle> {
        self.storage
            .open(&self.path, mode)
            .map_err(|e| self.classify(e, mode))
    }

    fn seek(&self, handle: &mut S::Handle, position: u64) -> FileResult<()> {
        self.storage.seek(handle, position).map_err(|e| {
            if e.kind() == io::ErrorKind::InvalidInput {
                FileError::InvalidPosition {
                    position,
                    reason: e.to_string(),
                }
            } else {
                FileError::Backend {
                    path: self.path.to_path_buf(),
                    source: e,
                }
            }
        })
    }

    fn put(&self, handle: &mut S::Handle, bytes: &[u8], mode: OpenMode) -> FileResult<()> {
        self.storage
            .write(handle, bytes)
            .map_err(|e| self.classify(e, mode))
    }

    fn close(&self, handle: S::Handle, mode: OpenMode) -> FileResult<()> {
        self.storage
            .close(handle)
            .map_err(|e| self.classify(e, mode))
    }

    fn classify(&self, err: io::Error, mode: OpenMode) -> FileError {
        match FileError::from_io(err, &self.path, mode) {
            FileError::Encoding { reason, .. } => FileError::Encoding {
                encoding: self.encoding.name().into(),
                reason,
            },
            other => other,
        }
    }
}

fn check_position(position: u64) -> FileResult<()> {
    if position > MAX_POSITION {
        return Err(FileError::InvalidPosition {
            position,
            reason: format!("offsets above {MAX_POSITION} are not addressable"),
        });
    }
    Ok(())
}
