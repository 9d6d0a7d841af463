//! The resource handle: one text file, one gate.
//!
//! Every operation goes through the same path: admit (take the gate and a
//! ticket on the caller's thread), run the body against storage, release.
//! In blocking mode the body runs right there and the value is returned. In
//! non-blocking mode the admission is moved into a job handed to the
//! dispatcher; the call returns [`Outcome::Dispatched`] immediately and the
//! job reports through the callback before giving the gate up.
//!
//! Since admission always happens synchronously, two calls are ordered by
//! when they were admitted regardless of their modes.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::infra::storage::{LocalStorage, OpenMode, Storage};
use crate::util::TextEncoding;

use super::backend::Backend;
use super::call::{Call, Callback, Mode, Operation, Outcome};
use super::dispatch::{Dispatch, ThreadSpawner};
use super::error::{FileError, FileResult};
use super::lines::LineInput;
use super::scheduler::{AccessScheduler, SchedulerStats};

/// Shared handle to one text file, serializing every operation against it.
///
/// Share one `TextFile` (for example behind an `Arc`) between every caller
/// that touches the same file; separate handles on the same path do not
/// coordinate with each other.
///
/// # Examples
///
/// ```no_run
/// use prometheus_safe_io::{Call, TextFile};
///
/// let file = TextFile::new("notes.txt");
/// file.write("hello\n", 0, Call::new())?;
/// file.append("world\n", Call::new())?;
/// let text = file.read(0, Call::new())?.completed();
/// assert_eq!(text.as_deref(), Some("hello\nworld\n"));
///
/// // Fire-and-forget: the result goes to the callback on another thread.
/// file.append(
///     "later\n",
///     Call::non_blocking().with_callback(|written| println!("{written:?}")),
/// )?;
/// # Ok::<(), prometheus_safe_io::FileError>(())
/// ```
pub struct TextFile<S: Storage = LocalStorage, D: Dispatch = ThreadSpawner> {
    id: Uuid,
    backend: Backend<S>,
    default_mode: Mode,
    scheduler: AccessScheduler,
    dispatcher: D,
}

impl TextFile {
    /// Handle on a local file, utf-8, blocking by default.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_options(path, TextEncoding::default(), Mode::Blocking)
    }

    /// Handle on a local file with an explicit encoding and default mode.
    pub fn with_options(path: impl Into<PathBuf>, encoding: TextEncoding, default_mode: Mode) -> Self {
        Self::from_parts(path, encoding, default_mode, LocalStorage, ThreadSpawner::new())
    }
}

impl<S: Storage, D: Dispatch> TextFile<S, D> {
    /// Assemble a handle from its parts.
    pub fn from_parts(
        path: impl Into<PathBuf>,
        encoding: TextEncoding,
        default_mode: Mode,
        storage: S,
        dispatcher: D,
    ) -> Self {
        let path: PathBuf = path.into();
        Self {
            id: Uuid::new_v4(),
            backend: Backend::new(Arc::new(storage), Arc::from(path.as_path()), encoding),
            default_mode,
            scheduler: AccessScheduler::new(),
            dispatcher,
        }
    }

    /// Unique id of this handle, used as the `file` field in logs.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Path of the target resource.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.backend.path()
    }

    /// Encoding applied to payloads.
    #[must_use]
    pub const fn encoding(&self) -> TextEncoding {
        self.backend.encoding()
    }

    /// Mode used when a call does not override it.
    #[must_use]
    pub const fn default_mode(&self) -> Mode {
        self.default_mode
    }

    /// Storage backend.
    #[must_use]
    pub fn storage(&self) -> &S {
        self.backend.storage()
    }

    /// Snapshot of ticket counters and gate state.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        self.scheduler.stats()
    }

    /// Identifier of the resource.
    ///
    /// # Errors
    ///
    /// Blocking calls return the classified error (e.g. `ResourceNotFound`).
    /// Non-blocking calls deliver it to the callback instead and only fail
    /// directly with `FileError::Dispatch`. Calls made from inside a callback
    /// of this handle fail with `FileError::Reentrant`.
    pub fn name(&self, call: impl Into<Call<String>>) -> FileResult<Outcome<String>> {
        self.run(Operation::Name, call.into(), |backend| backend.name())
    }

    /// Read from byte offset `position` to the end.
    ///
    /// # Errors
    ///
    /// See [`name`](Self::name).
    pub fn read(&self, position: u64, call: impl Into<Call<String>>) -> FileResult<Outcome<String>> {
        self.run(Operation::Read, call.into(), move |backend| backend.read(position))
    }

    /// Truncate the file, then write `data` at byte offset `position`.
    ///
    /// Completes with the number of characters written.
    ///
    /// # Errors
    ///
    /// See [`name`](Self::name).
    pub fn write(
        &self,
        data: impl Into<String>,
        position: u64,
        call: impl Into<Call<usize>>,
    ) -> FileResult<Outcome<usize>> {
        let data = data.into();
        self.run(Operation::Write, call.into(), move |backend| backend.write(&data, position))
    }

    /// Write `data` at the end of the file, creating it if missing.
    ///
    /// Completes with the number of characters written.
    ///
    /// # Errors
    ///
    /// See [`name`](Self::name).
    pub fn append(&self, data: impl Into<String>, call: impl Into<Call<usize>>) -> FileResult<Outcome<usize>> {
        let data = data.into();
        self.run(Operation::Append, call.into(), move |backend| backend.append(&data))
    }

    /// Read one line starting at byte offset `position`, terminator included.
    ///
    /// Completes with an empty string at the end of the file.
    ///
    /// # Errors
    ///
    /// See [`name`](Self::name).
    pub fn readline(&self, position: u64, call: impl Into<Call<String>>) -> FileResult<Outcome<String>> {
        self.run(Operation::ReadLine, call.into(), move |backend| backend.readline(position))
    }

    /// Read every line from byte offset `position`, terminators included.
    ///
    /// # Errors
    ///
    /// See [`name`](Self::name).
    pub fn readlines(
        &self,
        position: u64,
        call: impl Into<Call<Vec<String>>>,
    ) -> FileResult<Outcome<Vec<String>>> {
        self.run(Operation::ReadLines, call.into(), move |backend| backend.readlines(position))
    }

    /// Truncate the file, then write `lines` at byte offset `position`, each
    /// terminated by `\n`.
    ///
    /// # Errors
    ///
    /// See [`name`](Self::name).
    pub fn writelines(
        &self,
        lines: impl Into<LineInput>,
        position: u64,
        call: impl Into<Call<()>>,
    ) -> FileResult<Outcome<()>> {
        let lines = lines.into();
        self.run(Operation::WriteLines, call.into(), move |backend| {
            backend.writelines(lines, position)
        })
    }

    /// Write `lines` at the end of the file, each terminated by `\n`.
    ///
    /// # Errors
    ///
    /// See [`name`](Self::name).
    pub fn appendlines(&self, lines: impl Into<LineInput>, call: impl Into<Call<()>>) -> FileResult<Outcome<()>> {
        let lines = lines.into();
        self.run(Operation::AppendLines, call.into(), move |backend| backend.appendlines(lines))
    }

    /// Low-level descriptor number of the file.
    ///
    /// The file is opened and closed within the call, so the number is only
    /// informational by the time it is returned.
    ///
    /// # Errors
    ///
    /// See [`name`](Self::name).
    pub fn fileno(&self, call: impl Into<Call<i64>>) -> FileResult<Outcome<i64>> {
        self.run(Operation::Descriptor, call.into(), |backend| backend.descriptor())
    }

    /// Open the file in `mode` and hand the open handle to the caller.
    ///
    /// The open itself is serialized like every other operation, but the
    /// returned handle is not: once it leaves this call the gate no longer
    /// covers it, and the caller is responsible for closing it (dropping it).
    /// Access through a detached handle can interleave with operations on
    /// this `TextFile`.
    ///
    /// # Errors
    ///
    /// See [`name`](Self::name).
    pub fn detach(&self, mode: OpenMode, call: impl Into<Call<S::Handle>>) -> FileResult<Outcome<S::Handle>> {
        self.run(Operation::Detach, call.into(), move |backend| backend.detach(mode))
    }

    /// Admit a call and run `body` exclusively, in the call's mode.
    ///
    /// Blocking: `body` runs on this thread, the gate is released, then the
    /// value or classified error is returned.
    ///
    /// Non-blocking: once admitted, `body` is handed to the dispatcher and
    /// `Outcome::Dispatched` is returned without waiting. The result, success
    /// or error, reaches the callback only; with no callback it is dropped.
    /// The only error returned directly is `FileError::Dispatch`, when no
    /// unit of execution could be spawned; the admission is released and the
    /// callback is dropped without being called in that case.
    ///
    /// In either mode a call from a thread already running an operation of
    /// this handle (a callback) fails with `FileError::Reentrant` before
    /// admission.
    fn run<T, F>(&self, op: Operation, call: Call<T>, body: F) -> FileResult<Outcome<T>>
    where
        T: Send + 'static,
        F: FnOnce(&Backend<S>) -> FileResult<T> + Send + 'static,
    {
        let (mode, callback) = call.into_parts();
        let mode = mode.unwrap_or(self.default_mode);

        if self.scheduler.held_on_current_thread() {
            warn!(file = %self.id, op = %op, "re-entrant call refused");
            return Err(FileError::Reentrant { op });
        }

        let admission = self.scheduler.admit();
        let ticket = admission.ticket();
        debug!(file = %self.id, ticket = ticket.value(), op = %op, mode = %mode, "operation admitted");

        match mode {
            Mode::Blocking => {
                let here = admission.hold_here();
                let result = body(&self.backend);
                drop(here);
                drop(admission);
                match &result {
                    Ok(_) => debug!(file = %self.id, ticket = ticket.value(), op = %op, "operation completed"),
                    Err(e) => warn!(file = %self.id, ticket = ticket.value(), op = %op, error = %e, "operation failed"),
                }
                result.map(Outcome::Completed)
            }
            Mode::NonBlocking => {
                let backend = self.backend.clone();
                let file = self.id;
                self.dispatcher
                    .dispatch(Box::new(move || {
                        let here = admission.hold_here();
                        let result = body(&backend);
                        deliver(file, ticket.value(), op, result, callback);
                        drop(here);
                        drop(admission);
                    }))
                    .map_err(|e| {
                        error!(file = %self.id, ticket = ticket.value(), op = %op, error = %e, "failed to dispatch operation");
                        FileError::Dispatch(e)
                    })?;
                Ok(Outcome::Dispatched(ticket))
            }
        }
    }
}

fn deliver<T>(file: Uuid, ticket: u64, op: Operation, result: FileResult<T>, callback: Option<Callback<T>>) {
    match callback {
        Some(callback) => {
            debug!(file = %file, ticket, op = %op, ok = result.is_ok(), "operation completed");
            callback(result);
        }
        None => match &result {
            Ok(_) => debug!(file = %file, ticket, op = %op, "operation completed; no callback, result discarded"),
            Err(e) => warn!(file = %file, ticket, op = %op, error = %e, "operation failed; no callback, error discarded"),
        },
    }
}

impl<S: Storage, D: Dispatch> fmt::Display for TextFile<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().display())
    }
}

impl<S: Storage, D: Dispatch> fmt::Debug for TextFile<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextFile")
            .field("id", &self.id)
            .field("path", &self.path())
            .field("encoding", &self.encoding())
            .field("default_mode", &self.default_mode)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
