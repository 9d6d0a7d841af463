//! # Prometheus Safe IO
//!
//! Ordered, mutually exclusive access to a text file shared by many threads.
//!
//! A [`TextFile`] identifies one file (path, encoding, default execution
//! mode) and owns an admission gate. Every operation on it passes through
//! that gate, so at most one operation body touches the file at a time and
//! callers are served in the order they were admitted.
//!
//! ## Execution modes
//!
//! - **Blocking**: the body runs on the caller's thread and the value (or a
//!   classified [`FileError`]) is returned.
//! - **Non-blocking**: the caller is admitted synchronously, then the body
//!   runs on a separate unit of execution and the result goes to the
//!   callback. Without a callback the result is discarded (fire-and-forget).
//!
//! Ordering holds across modes: if one call's admission finishes before
//! another's begins, the first body, callback included, finishes before the
//! second body starts.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::thread;
//!
//! use prometheus_safe_io::{Call, TextFile};
//!
//! let log = Arc::new(TextFile::new("events.log"));
//! let workers: Vec<_> = (0..4)
//!     .map(|id| {
//!         let log = Arc::clone(&log);
//!         thread::spawn(move || log.append(format!("worker {id}\n"), Call::new()))
//!     })
//!     .collect();
//! for worker in workers {
//!     worker.join().unwrap()?;
//! }
//!
//! let (call, done) = Call::channel();
//! log.readlines(0, call)?;
//! assert_eq!(done.recv().unwrap()?.len(), 4);
//! # Ok::<(), prometheus_safe_io::FileError>(())
//! ```
//!
//! ## Limitations
//!
//! - Only callers in this process that share one handle are ordered.
//! - There is no cancellation or timeout: once admitted, an operation runs
//!   to completion, and a body that never returns holds the gate forever.
//! - No atomicity spans more than one operation; durability is whatever the
//!   storage backend provides.
//! - [`TextFile::detach`] hands an open handle to the caller, outside the
//!   gate's protection.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Access scheduling, operation dispatch and the resource handle.
pub mod core;
/// Configuration models for file handles.
pub mod config;
/// Builders to construct file handles from configuration.
pub mod builders;
/// Infrastructure adapters for storage backends.
pub mod infra;
/// Runtime adapters for non-blocking execution.
#[cfg(feature = "tokio-runtime")]
pub mod runtime;
/// Shared utilities.
pub mod util;

pub use crate::core::{
    AccessScheduler, Call, FileError, FileResult, LineInput, Mode, Outcome, TextFile, Ticket,
};
pub use crate::infra::storage::OpenMode;
pub use crate::util::TextEncoding;
