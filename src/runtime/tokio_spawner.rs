//! Tokio runtime dispatcher implementation.

use std::io;
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::core::{Call, Dispatch, FileResult, Job};

/// Dispatcher that runs non-blocking operation bodies on a tokio runtime's
/// blocking thread pool.
#[derive(Clone, Debug)]
pub struct TokioSpawner {
    handle: Arc<tokio::runtime::Handle>,
}

impl TokioSpawner {
    /// Create a `TokioSpawner` from a tokio runtime handle.
    #[must_use]
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self {
            handle: Arc::new(handle),
        }
    }

    /// Create a `TokioSpawner` for the runtime the caller is running on.
    ///
    /// # Errors
    ///
    /// Fails when called outside a tokio runtime.
    pub fn try_current() -> io::Result<Self> {
        tokio::runtime::Handle::try_current()
            .map(Self::new)
            .map_err(|e| io::Error::other(e.to_string()))
    }
}

impl Dispatch for TokioSpawner {
    fn dispatch(&self, job: Job) -> io::Result<()> {
        // Bodies do blocking file I/O, so they stay off the async workers.
        drop(self.handle.spawn_blocking(job));
        Ok(())
    }
}

/// A non-blocking call whose result can be awaited.
///
/// ```rust,ignore
/// let (call, done) = oneshot_call();
/// file.append("line\n", call)?;
/// let written = done.await.expect("callback dropped")?;
/// ```
#[must_use]
pub fn oneshot_call<T: Send + 'static>() -> (Call<T>, oneshot::Receiver<FileResult<T>>) {
    let (tx, rx) = oneshot::channel();
    let call = Call::non_blocking().with_callback(move |result| {
        // The receiver may have been dropped; the result is then discarded.
        let _ = tx.send(result);
    });
    (call, rx)
}
