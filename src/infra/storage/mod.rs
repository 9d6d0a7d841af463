//! Storage backends.
//!
//! A [`Storage`] opens resources and hands back handles implementing the std
//! I/O traits. Everything above the backend (encoding, line handling,
//! ordering) lives in [`crate::core`]; backends only move bytes.

pub mod local;
pub mod memory;

use std::fmt;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::str::FromStr;

use crate::core::FileError;

pub use local::LocalStorage;
pub use memory::{MemoryHandle, MemoryStorage};

/// Mode a resource is opened in, using fopen-style tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenMode {
    /// `r`: read only; the resource must exist.
    Read,
    /// `w`: write only; created if missing, truncated if present.
    Write,
    /// `a`: write only at the end; created if missing.
    Append,
    /// `r+`: read and write; the resource must exist and is not truncated.
    ReadWrite,
    /// `w+`: read and write; created if missing, truncated if present.
    ReadWriteTruncate,
    /// `a+`: read anywhere, write at the end; created if missing.
    ReadAppend,
    /// `x`: write only; fails if the resource already exists.
    CreateNew,
}

impl OpenMode {
    /// fopen-style token for this mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "r",
            Self::Write => "w",
            Self::Append => "a",
            Self::ReadWrite => "r+",
            Self::ReadWriteTruncate => "w+",
            Self::ReadAppend => "a+",
            Self::CreateNew => "x",
        }
    }

    /// Whether handles opened in this mode can be read from.
    #[must_use]
    pub const fn readable(self) -> bool {
        matches!(
            self,
            Self::Read | Self::ReadWrite | Self::ReadWriteTruncate | Self::ReadAppend
        )
    }

    /// Whether handles opened in this mode can be written to.
    #[must_use]
    pub const fn writable(self) -> bool {
        !matches!(self, Self::Read)
    }

    /// Whether every write lands at the end of the resource.
    #[must_use]
    pub const fn appends(self) -> bool {
        matches!(self, Self::Append | Self::ReadAppend)
    }

    /// Whether opening truncates existing content.
    #[must_use]
    pub const fn truncates(self) -> bool {
        matches!(self, Self::Write | Self::ReadWriteTruncate)
    }

    /// Whether opening creates a missing resource.
    #[must_use]
    pub const fn creates(self) -> bool {
        !matches!(self, Self::Read | Self::ReadWrite)
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpenMode {
    type Err = FileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // A `t` marks text mode; every mode here is text mode.
        let token: String = s.chars().filter(|c| *c != 't').collect();
        match token.as_str() {
            "r" => Ok(Self::Read),
            "w" => Ok(Self::Write),
            "a" => Ok(Self::Append),
            "r+" => Ok(Self::ReadWrite),
            "w+" => Ok(Self::ReadWriteTruncate),
            "a+" => Ok(Self::ReadAppend),
            "x" => Ok(Self::CreateNew),
            _ => Err(FileError::InvalidMode(s.to_owned())),
        }
    }
}

/// Abstraction for storage backends.
///
/// Only `open`, `identifier` and `descriptor` are backend specific; the byte
/// level primitives default to the std I/O traits of the handle.
pub trait Storage: Send + Sync + 'static {
    /// Open resource handle. Dropping it closes the resource.
    type Handle: Read + Write + Seek + Send + 'static;

    /// Open `path` in `mode`.
    fn open(&self, path: &Path, mode: OpenMode) -> io::Result<Self::Handle>;

    /// Identifier of the opened resource.
    fn identifier(&self, path: &Path, handle: &Self::Handle) -> String;

    /// Low-level descriptor number of the opened resource.
    fn descriptor(&self, handle: &Self::Handle) -> io::Result<i64>;

    /// Move the cursor to `offset` bytes from the start.
    fn seek(&self, handle: &mut Self::Handle, offset: u64) -> io::Result<()> {
        handle.seek(SeekFrom::Start(offset)).map(drop)
    }

    /// Read from the cursor to the end.
    fn read_to_end(&self, handle: &mut Self::Handle) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        handle.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Read from the cursor through the next `\n` (inclusive) or the end.
    ///
    /// The cursor is left just past the returned bytes.
    fn read_line(&self, handle: &mut Self::Handle) -> io::Result<Vec<u8>> {
        let start = handle.stream_position()?;
        let mut buf = Vec::new();
        BufReader::new(&mut *handle).read_until(b'\n', &mut buf)?;
        handle.seek(SeekFrom::Start(start + buf.len() as u64))?;
        Ok(buf)
    }

    /// Write all of `bytes` at the cursor.
    fn write(&self, handle: &mut Self::Handle, bytes: &[u8]) -> io::Result<()> {
        handle.write_all(bytes)?;
        handle.flush()
    }

    /// Close the handle.
    fn close(&self, handle: Self::Handle) -> io::Result<()> {
        drop(handle);
        Ok(())
    }
}
