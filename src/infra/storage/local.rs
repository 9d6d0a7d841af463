//! Local filesystem backend.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use super::{OpenMode, Storage};

/// Storage backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    /// Create the backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn options(mode: OpenMode) -> OpenOptions {
        let mut options = OpenOptions::new();
        match mode {
            OpenMode::Read => options.read(true),
            OpenMode::Write => options.write(true).create(true).truncate(true),
            OpenMode::Append => options.append(true).create(true),
            OpenMode::ReadWrite => options.read(true).write(true),
            OpenMode::ReadWriteTruncate => {
                options.read(true).write(true).create(true).truncate(true)
            }
            OpenMode::ReadAppend => options.read(true).append(true).create(true),
            OpenMode::CreateNew => options.write(true).create_new(true),
        };
        options
    }
}

impl Storage for LocalStorage {
    type Handle = File;

    fn open(&self, path: &Path, mode: OpenMode) -> io::Result<File> {
        Self::options(mode).open(path)
    }

    fn identifier(&self, path: &Path, _handle: &File) -> String {
        path.display().to_string()
    }

    #[cfg(unix)]
    fn descriptor(&self, handle: &File) -> io::Result<i64> {
        use std::os::unix::io::AsRawFd;
        Ok(i64::from(handle.as_raw_fd()))
    }

    #[cfg(windows)]
    fn descriptor(&self, handle: &File) -> io::Result<i64> {
        use std::os::windows::io::AsRawHandle;
        Ok(handle.as_raw_handle() as isize as i64)
    }

    #[cfg(not(any(unix, windows)))]
    fn descriptor(&self, _handle: &File) -> io::Result<i64> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "descriptors are not available on this platform",
        ))
    }
}
