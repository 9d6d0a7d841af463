//! Infrastructure adapters for storage backends.

pub mod storage;
pub use storage::{LocalStorage, MemoryStorage, OpenMode, Storage};
