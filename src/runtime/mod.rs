//! Runtime adapters for non-blocking execution.

pub mod tokio_spawner;

pub use tokio_spawner::{oneshot_call, TokioSpawner};
