//! Execution units for non-blocking operation bodies.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

/// A unit of work owning an admission and, with it, the gate release.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Abstraction for running a non-blocking operation body off the caller's thread.
///
/// Implementations must run every job on an independently scheduled unit of
/// execution and must never run it inline on the calling thread. Jobs are
/// fire-and-forget: the dispatcher does not join or track them.
pub trait Dispatch: Send + Sync + 'static {
    /// Hand `job` to a new unit of execution.
    ///
    /// # Errors
    ///
    /// Returns the spawn error if no unit of execution could be created. The
    /// job is dropped in that case, which releases the admission it owns.
    fn dispatch(&self, job: Job) -> io::Result<()>;
}

/// Dispatcher that spawns one named OS thread per job.
#[derive(Debug, Clone, Default)]
pub struct ThreadSpawner {
    stack_size: Option<usize>,
    spawned: Arc<AtomicU64>,
}

impl ThreadSpawner {
    /// Create a spawner using the platform default stack size.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `stack_size` bytes for every spawned thread.
    #[must_use]
    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = Some(stack_size);
        self
    }

    /// Number of threads spawned so far.
    #[must_use]
    pub fn spawned(&self) -> u64 {
        self.spawned.load(Ordering::Relaxed)
    }
}

impl Dispatch for ThreadSpawner {
    fn dispatch(&self, job: Job) -> io::Result<()> {
        let seq = self.spawned.fetch_add(1, Ordering::Relaxed);
        let mut builder = thread::Builder::new().name(format!("safe-io-op-{seq}"));
        if let Some(stack_size) = self.stack_size {
            builder = builder.stack_size(stack_size);
        }
        builder.spawn(job).map(drop)
    }
}
