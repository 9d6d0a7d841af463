//! Access scheduling, operation dispatch and the resource handle.

mod backend;
pub mod call;
pub mod dispatch;
pub mod error;
pub mod lines;
pub mod scheduler;
pub mod text_file;

pub use call::{Call, Callback, Mode, Operation, Outcome};
pub use dispatch::{Dispatch, Job, ThreadSpawner};
pub use error::{AppResult, FileError, FileResult};
pub use lines::{split_lines, LineInput};
pub use scheduler::{AccessScheduler, Admission, SchedulerStats, Ticket};
pub use text_file::TextFile;
