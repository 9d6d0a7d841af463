//! Per-call execution options and outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::FileResult;
use super::scheduler::Ticket;

/// How an operation body is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// The body runs on the caller's thread; the result is returned.
    #[default]
    Blocking,
    /// The body runs on a separate unit of execution; the result goes to the
    /// callback, if any.
    NonBlocking,
}

impl Mode {
    /// `Blocking` when `blocking` is true, `NonBlocking` otherwise.
    #[must_use]
    pub const fn from_blocking(blocking: bool) -> Self {
        if blocking {
            Self::Blocking
        } else {
            Self::NonBlocking
        }
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blocking => "blocking",
            Self::NonBlocking => "non_blocking",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of operation requested against a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Query the resource identifier.
    Name,
    /// Read from a position to the end.
    Read,
    /// Truncate and write at a position.
    Write,
    /// Write at the end.
    Append,
    /// Read one line from a position.
    ReadLine,
    /// Read every line from a position.
    ReadLines,
    /// Truncate and write lines at a position.
    WriteLines,
    /// Write lines at the end.
    AppendLines,
    /// Query the low-level descriptor.
    Descriptor,
    /// Open and hand the raw handle to the caller.
    Detach,
}

impl Operation {
    /// Short name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Read => "read",
            Self::Write => "write",
            Self::Append => "append",
            Self::ReadLine => "readline",
            Self::ReadLines => "readlines",
            Self::WriteLines => "writelines",
            Self::AppendLines => "appendlines",
            Self::Descriptor => "fileno",
            Self::Detach => "detach",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completion callback for non-blocking calls.
pub type Callback<T> = Box<dyn FnOnce(FileResult<T>) + Send + 'static>;

/// Per-call options: an optional mode override and an optional callback.
///
/// The callback only fires in non-blocking mode. A non-blocking call without
/// a callback is fire-and-forget: its result, including any error, is
/// discarded.
pub struct Call<T> {
    mode: Option<Mode>,
    callback: Option<Callback<T>>,
}

impl<T> Call<T> {
    /// Use the handle's default mode, no callback.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode: None,
            callback: None,
        }
    }

    /// Force blocking mode.
    #[must_use]
    pub const fn blocking() -> Self {
        Self {
            mode: Some(Mode::Blocking),
            callback: None,
        }
    }

    /// Force non-blocking mode.
    #[must_use]
    pub const fn non_blocking() -> Self {
        Self {
            mode: Some(Mode::NonBlocking),
            callback: None,
        }
    }

    /// Override the mode.
    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Deliver the non-blocking result to `callback`.
    ///
    /// The callback runs on the unit of execution that ran the operation,
    /// while the handle's gate is still held, so callbacks fire in admission
    /// order. Calls it makes on the same handle fail with
    /// `FileError::Reentrant`; hand follow-up work to another thread instead.
    #[must_use]
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(FileResult<T>) + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Mode override, if any.
    #[must_use]
    pub const fn mode_override(&self) -> Option<Mode> {
        self.mode
    }

    /// Whether a callback is attached.
    #[must_use]
    pub const fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    pub(crate) fn into_parts(self) -> (Option<Mode>, Option<Callback<T>>) {
        (self.mode, self.callback)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + 'static> Call<T> {
    /// A non-blocking call whose result is sent to the returned receiver.
    #[must_use]
    pub fn channel() -> (Self, crossbeam_channel::Receiver<FileResult<T>>) {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let call = Self::non_blocking().with_callback(move |result| {
            // The receiver may have been dropped; the result is then discarded.
            let _ = tx.send(result);
        });
        (call, rx)
    }
}

impl<T> Default for Call<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Mode> for Call<T> {
    fn from(mode: Mode) -> Self {
        Self::new().mode(mode)
    }
}

impl<T> fmt::Debug for Call<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("mode", &self.mode)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// What an operation call returned.
#[derive(Debug)]
pub enum Outcome<T> {
    /// Blocking call finished with this value.
    Completed(T),
    /// Non-blocking call was admitted with this ticket and handed off.
    Dispatched(Ticket),
}

impl<T> Outcome<T> {
    /// Value of a blocking call; `None` for a dispatched call.
    #[must_use]
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Dispatched(_) => None,
        }
    }

    /// Ticket of a dispatched call; `None` for a blocking call.
    #[must_use]
    pub const fn ticket(&self) -> Option<Ticket> {
        match self {
            Self::Completed(_) => None,
            Self::Dispatched(ticket) => Some(*ticket),
        }
    }

    /// Whether the call was handed off.
    #[must_use]
    pub const fn is_dispatched(&self) -> bool {
        matches!(self, Self::Dispatched(_))
    }
}
