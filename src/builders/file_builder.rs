//! Builders to construct file handles from configuration.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::config::{FileConfig, FilesConfig};
use crate::core::{Dispatch, FileError, FileResult, Mode, TextFile, ThreadSpawner};
use crate::infra::storage::{LocalStorage, Storage};
use crate::util::TextEncoding;

/// Step-by-step construction of a [`TextFile`].
#[derive(Debug)]
pub struct TextFileBuilder<S = LocalStorage, D = ThreadSpawner> {
    path: PathBuf,
    encoding: String,
    mode: Mode,
    storage: S,
    dispatcher: D,
}

impl TextFileBuilder {
    /// Start from a local, utf-8, blocking handle on `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            encoding: TextEncoding::default().name().to_owned(),
            mode: Mode::Blocking,
            storage: LocalStorage,
            dispatcher: ThreadSpawner::new(),
        }
    }

    /// Start from a configuration entry.
    #[must_use]
    pub fn from_config(cfg: &FileConfig) -> Self {
        Self::new(cfg.path.clone())
            .encoding(cfg.encoding.clone())
            .mode(cfg.default_mode())
    }
}

impl<S, D> TextFileBuilder<S, D> {
    /// Encoding name; checked in [`build`](Self::build).
    #[must_use]
    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Blocking-by-default flag.
    #[must_use]
    pub fn blocking(self, blocking: bool) -> Self {
        self.mode(Mode::from_blocking(blocking))
    }

    /// Default mode.
    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Replace the storage backend.
    pub fn storage<S2>(self, storage: S2) -> TextFileBuilder<S2, D> {
        TextFileBuilder {
            path: self.path,
            encoding: self.encoding,
            mode: self.mode,
            storage,
            dispatcher: self.dispatcher,
        }
    }

    /// Replace the dispatcher used for non-blocking calls.
    pub fn dispatcher<D2>(self, dispatcher: D2) -> TextFileBuilder<S, D2> {
        TextFileBuilder {
            path: self.path,
            encoding: self.encoding,
            mode: self.mode,
            storage: self.storage,
            dispatcher,
        }
    }

    /// Path the handle will target.
    pub const fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Default mode the handle will use.
    pub const fn default_mode(&self) -> Mode {
        self.mode
    }
}

impl<S: Storage, D: Dispatch> TextFileBuilder<S, D> {
    /// Build the handle.
    ///
    /// # Errors
    ///
    /// Returns `FileError::InvalidConfig` for an empty path and
    /// `FileError::Encoding` for an unsupported encoding name.
    pub fn build(self) -> FileResult<TextFile<S, D>> {
        if self.path.as_os_str().is_empty() {
            return Err(FileError::InvalidConfig("path must not be empty".into()));
        }
        let encoding: TextEncoding = self.encoding.parse()?;
        Ok(TextFile::from_parts(
            self.path,
            encoding,
            self.mode,
            self.storage,
            self.dispatcher,
        ))
    }
}

/// Build one shared local handle per configured file.
///
/// # Errors
///
/// Returns `FileError::InvalidConfig` if the configuration does not validate.
pub fn build_files(cfg: &FilesConfig) -> FileResult<HashMap<String, Arc<TextFile>>> {
    cfg.validate()
        .map_err(|e| FileError::InvalidConfig(format!("config invalid: {e}")))?;

    let mut files = HashMap::new();
    for (name, file_cfg) in &cfg.files {
        let file = TextFileBuilder::from_config(file_cfg).build()?;
        info!(
            name = %name,
            file = %file.id(),
            path = %file.path().display(),
            encoding = %file.encoding(),
            mode = %file.default_mode(),
            "file handle built"
        );
        files.insert(name.clone(), Arc::new(file));
    }

    Ok(files)
}
