//! Configuration models for file handles.

pub mod file;

pub use file::{FileConfig, FilesConfig};
