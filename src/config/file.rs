//! File handle configuration structures.

use std::collections::{HashMap, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::{AppResult, Mode};
use crate::util::TextEncoding;

/// Environment variable holding the file path.
pub const ENV_PATH: &str = "SAFE_IO_PATH";
/// Environment variable holding the encoding name.
pub const ENV_ENCODING: &str = "SAFE_IO_ENCODING";
/// Environment variable holding the blocking-by-default flag.
pub const ENV_BLOCKING: &str = "SAFE_IO_BLOCKING";

fn default_encoding() -> String {
    TextEncoding::default().name().to_owned()
}

const fn default_blocking() -> bool {
    true
}

/// Configuration of one file handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    /// Target resource.
    pub path: PathBuf,
    /// Encoding name, e.g. `utf-8`, `ascii`, `latin-1`.
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// Whether calls block unless they override the mode.
    #[serde(default = "default_blocking")]
    pub blocking: bool,
}

impl FileConfig {
    /// utf-8, blocking configuration for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            encoding: default_encoding(),
            blocking: default_blocking(),
        }
    }

    /// Parsed encoding.
    ///
    /// # Errors
    ///
    /// Returns a message if the encoding name is not supported.
    pub fn text_encoding(&self) -> Result<TextEncoding, String> {
        self.encoding.parse().map_err(|e| format!("{e}"))
    }

    /// Default mode derived from `blocking`.
    #[must_use]
    pub const fn default_mode(&self) -> Mode {
        Mode::from_blocking(self.blocking)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a message for an empty path or an unsupported encoding.
    pub fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("path must not be empty".into());
        }
        self.text_encoding()?;
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a message if the JSON is malformed or the values are invalid.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from `SAFE_IO_*` environment variables, loading a
    /// `.env` file first if one exists.
    ///
    /// # Errors
    ///
    /// Returns a message if `SAFE_IO_PATH` is unset, `SAFE_IO_BLOCKING` is not
    /// a boolean, or the values are invalid.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();

        let path = env::var(ENV_PATH).map_err(|_| format!("{ENV_PATH} is not set"))?;
        let mut cfg = Self::new(path);
        if let Ok(encoding) = env::var(ENV_ENCODING) {
            cfg.encoding = encoding;
        }
        if let Ok(blocking) = env::var(ENV_BLOCKING) {
            cfg.blocking = parse_bool(&blocking)
                .ok_or_else(|| format!("{ENV_BLOCKING} must be a boolean, got `{blocking}`"))?;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load and validate configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or its content is invalid.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let input = fs::read_to_string(path)
            .with_context(|| format!("reading file config {}", path.display()))?;
        Self::from_json_str(&input)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("loading file config {}", path.display()))
    }
}

/// Named set of file handles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    /// Map of handle name to configuration.
    pub files: HashMap<String, FileConfig>,
}

impl FilesConfig {
    /// Validate every entry, require at least one, and reject a path
    /// configured under more than one name.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first offending entry.
    pub fn validate(&self) -> Result<(), String> {
        if self.files.is_empty() {
            return Err("at least one file must be defined".into());
        }
        let mut seen = HashSet::new();
        let mut names: Vec<&String> = self.files.keys().collect();
        names.sort();
        for name in names {
            let file = &self.files[name];
            file.validate()
                .map_err(|e| format!("file `{name}` invalid: {e}"))?;
            if !seen.insert(&file.path) {
                return Err(format!(
                    "file `{name}`: path {} is configured more than once",
                    file.path.display()
                ));
            }
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a message if the JSON is malformed or the values are invalid.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let cfg = FileConfig::from_json_str(r#"{ "path": "data.txt" }"#).unwrap();
        assert_eq!(cfg, FileConfig::new("data.txt"));
        assert_eq!(cfg.default_mode(), Mode::Blocking);
    }

    #[test]
    fn test_unsupported_encoding_rejected() {
        let err = FileConfig::from_json_str(r#"{ "path": "a", "encoding": "klingon" }"#).unwrap_err();
        assert!(err.contains("unsupported encoding"));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool(" TRUE "), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(format!("{err:#}").contains("reading file config"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg_path = dir.path().join("file.json");
        fs::write(&cfg_path, r#"{ "path": "log.txt", "encoding": "latin-1", "blocking": false }"#).unwrap();
        let cfg = FileConfig::load(&cfg_path).unwrap();
        assert_eq!(cfg.text_encoding().unwrap(), TextEncoding::Latin1);
        assert_eq!(cfg.default_mode(), Mode::NonBlocking);
    }
}
