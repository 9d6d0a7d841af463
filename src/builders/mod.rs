//! Builders to construct file handles from configuration.

pub mod file_builder;

pub use file_builder::{build_files, TextFileBuilder};
