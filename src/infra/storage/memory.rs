//! In-memory storage backend for development and testing.
//!
//! Besides holding file contents, the backend counts open handles and
//! remembers the highest number ever open at once, and can slow every open
//! down. Together these make overlapping access observable in tests.

use std::collections::HashMap;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use super::{OpenMode, Storage};

type Contents = Arc<Mutex<Vec<u8>>>;

#[derive(Debug)]
struct Entry {
    data: Contents,
    read_only: bool,
}

#[derive(Debug, Default)]
struct HandleCounters {
    open: AtomicUsize,
    peak: AtomicUsize,
    opened_total: AtomicUsize,
}

/// Simple in-memory storage keyed by path.
#[derive(Debug)]
pub struct MemoryStorage {
    files: Mutex<HashMap<PathBuf, Entry>>,
    counters: Arc<HandleCounters>,
    next_descriptor: AtomicI64,
    latency: Option<Duration>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// Create an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            counters: Arc::new(HandleCounters::default()),
            next_descriptor: AtomicI64::new(3),
            latency: None,
        }
    }

    /// Sleep for `latency` inside every open.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Create or replace the resource at `path`.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files.lock().insert(
            path.into(),
            Entry {
                data: Arc::new(Mutex::new(contents.into())),
                read_only: false,
            },
        );
    }

    /// Current contents of the resource at `path`.
    #[must_use]
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files
            .lock()
            .get(path.as_ref())
            .map(|entry| entry.data.lock().clone())
    }

    /// Mark an existing resource read-only. Returns false if it does not exist.
    pub fn set_read_only(&self, path: impl AsRef<Path>, read_only: bool) -> bool {
        self.files
            .lock()
            .get_mut(path.as_ref())
            .map(|entry| entry.read_only = read_only)
            .is_some()
    }

    /// Handles currently open.
    #[must_use]
    pub fn open_handles(&self) -> usize {
        self.counters.open.load(Ordering::SeqCst)
    }

    /// Highest number of handles that were ever open at the same time.
    #[must_use]
    pub fn peak_open_handles(&self) -> usize {
        self.counters.peak.load(Ordering::SeqCst)
    }

    /// Total successful opens.
    #[must_use]
    pub fn opened_total(&self) -> usize {
        self.counters.opened_total.load(Ordering::SeqCst)
    }

    fn resolve(&self, path: &Path, mode: OpenMode) -> io::Result<Contents> {
        let mut files = self.files.lock();
        if let Some(entry) = files.get(path) {
            if mode == OpenMode::CreateNew {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} already exists", path.display()),
                ));
            }
            if entry.read_only && mode.writable() {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    format!("{} is read-only", path.display()),
                ));
            }
            if mode.truncates() {
                entry.data.lock().clear();
            }
            return Ok(Arc::clone(&entry.data));
        }

        if !mode.creates() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            ));
        }
        let data = Contents::default();
        files.insert(
            path.to_path_buf(),
            Entry {
                data: Arc::clone(&data),
                read_only: false,
            },
        );
        Ok(data)
    }
}

impl Storage for MemoryStorage {
    type Handle = MemoryHandle;

    fn open(&self, path: &Path, mode: OpenMode) -> io::Result<MemoryHandle> {
        if let Some(latency) = self.latency {
            thread::sleep(latency);
        }
        let data = self.resolve(path, mode)?;

        let now_open = self.counters.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.peak.fetch_max(now_open, Ordering::SeqCst);
        self.counters.opened_total.fetch_add(1, Ordering::SeqCst);

        Ok(MemoryHandle {
            descriptor: self.next_descriptor.fetch_add(1, Ordering::Relaxed),
            data,
            cursor: 0,
            mode,
            counters: Arc::clone(&self.counters),
        })
    }

    fn identifier(&self, path: &Path, _handle: &MemoryHandle) -> String {
        path.display().to_string()
    }

    fn descriptor(&self, handle: &MemoryHandle) -> io::Result<i64> {
        Ok(handle.descriptor)
    }
}

/// Open handle on a [`MemoryStorage`] resource. Dropping it closes it.
#[derive(Debug)]
pub struct MemoryHandle {
    descriptor: i64,
    data: Contents,
    cursor: u64,
    mode: OpenMode,
    counters: Arc<HandleCounters>,
}

impl MemoryHandle {
    /// Mode the handle was opened in.
    #[must_use]
    pub const fn mode(&self) -> OpenMode {
        self.mode
    }

    fn cursor_index(&self) -> io::Result<usize> {
        usize::try_from(self.cursor)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "cursor out of range"))
    }
}

impl Read for MemoryHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.mode.readable() {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "handle not opened for reading",
            ));
        }
        let data = self.data.lock();
        let start = self.cursor_index()?.min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        self.cursor += n as u64;
        Ok(n)
    }
}

impl Write for MemoryHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.mode.writable() {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "handle not opened for writing",
            ));
        }
        let mut data = self.data.lock();
        if self.mode.appends() {
            self.cursor = data.len() as u64;
        }
        let start = self.cursor_index()?;
        let end = start
            .checked_add(buf.len())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "write past addressable end"))?;
        let len = data.len();
        if len < end {
            data.try_reserve(end - len)
                .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e.to_string()))?;
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(buf);
        self.cursor = end as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemoryHandle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let len = self.data.lock().len() as u64;
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => len.checked_add_signed(delta),
            SeekFrom::Current(delta) => self.cursor.checked_add_signed(delta),
        };
        let target = target
            .filter(|offset| i64::try_from(*offset).is_ok())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid seek target"))?;
        self.cursor = target;
        Ok(target)
    }
}

impl Drop for MemoryHandle {
    fn drop(&mut self) {
        self.counters.open.fetch_sub(1, Ordering::SeqCst);
    }
}
