//! Text encodings applied to payloads on their way to and from storage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{FileError, FileResult};

/// Supported text encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    /// UTF-8, the platform default.
    #[default]
    Utf8,
    /// 7-bit US-ASCII.
    Ascii,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
}

impl TextEncoding {
    /// Canonical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Ascii => "ascii",
            Self::Latin1 => "latin-1",
        }
    }

    /// Encode `text` into bytes.
    ///
    /// # Errors
    ///
    /// Returns `FileError::Encoding` naming the first character the encoding
    /// cannot represent.
    pub fn encode(self, text: &str) -> FileResult<Vec<u8>> {
        match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Ascii => text
                .char_indices()
                .map(|(idx, ch)| {
                    if ch.is_ascii() {
                        Ok(ch as u8)
                    } else {
                        Err(self.unencodable(ch, idx))
                    }
                })
                .collect(),
            Self::Latin1 => text
                .char_indices()
                .map(|(idx, ch)| u8::try_from(u32::from(ch)).map_err(|_| self.unencodable(ch, idx)))
                .collect(),
        }
    }

    /// Decode `bytes` into text.
    ///
    /// # Errors
    ///
    /// Returns `FileError::Encoding` if `bytes` is not valid in this encoding.
    pub fn decode(self, bytes: Vec<u8>) -> FileResult<String> {
        match self {
            Self::Utf8 => String::from_utf8(bytes).map_err(|err| FileError::Encoding {
                encoding: self.name().into(),
                reason: format!(
                    "invalid byte sequence at offset {}",
                    err.utf8_error().valid_up_to()
                ),
            }),
            Self::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(offset) => Err(FileError::Encoding {
                    encoding: self.name().into(),
                    reason: format!("byte 0x{:02x} at offset {offset} is not ascii", bytes[offset]),
                }),
                None => Ok(bytes.into_iter().map(char::from).collect()),
            },
            Self::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
        }
    }

    /// Number of characters `text` counts as when written.
    #[must_use]
    pub fn units(self, text: &str) -> usize {
        text.chars().count()
    }

    fn unencodable(self, ch: char, idx: usize) -> FileError {
        FileError::Encoding {
            encoding: self.name().into(),
            reason: format!("cannot encode {ch:?} at byte {idx}"),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TextEncoding {
    type Err = FileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "utf8" => Ok(Self::Utf8),
            "ascii" | "usascii" => Ok(Self::Ascii),
            "latin1" | "iso88591" | "l1" => Ok(Self::Latin1),
            _ => Err(FileError::Encoding {
                encoding: s.to_owned(),
                reason: "unsupported encoding".into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("UTF-8".parse::<TextEncoding>().unwrap(), TextEncoding::Utf8);
        assert_eq!("utf8".parse::<TextEncoding>().unwrap(), TextEncoding::Utf8);
        assert_eq!("US-ASCII".parse::<TextEncoding>().unwrap(), TextEncoding::Ascii);
        assert_eq!("ISO-8859-1".parse::<TextEncoding>().unwrap(), TextEncoding::Latin1);
        assert!("ebcdic".parse::<TextEncoding>().is_err());
    }

    #[test]
    fn test_utf8_round_trip() {
        let text = "héllo ✓";
        let bytes = TextEncoding::Utf8.encode(text).unwrap();
        assert_eq!(TextEncoding::Utf8.decode(bytes).unwrap(), text);
        assert_eq!(TextEncoding::Utf8.units(text), 7);
    }

    #[test]
    fn test_utf8_rejects_split_sequence() {
        let err = TextEncoding::Utf8.decode(vec![b'a', 0xc3]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "encoding error (utf-8): invalid byte sequence at offset 1"
        );
    }

    #[test]
    fn test_ascii_rejects_non_ascii() {
        assert!(TextEncoding::Ascii.encode("café").is_err());
        assert!(TextEncoding::Ascii.decode(vec![0xe9]).is_err());
        assert_eq!(TextEncoding::Ascii.encode("cafe").unwrap(), b"cafe");
    }

    #[test]
    fn test_latin1_maps_bytes_to_code_points() {
        assert_eq!(TextEncoding::Latin1.encode("café").unwrap(), vec![b'c', b'a', b'f', 0xe9]);
        assert_eq!(TextEncoding::Latin1.decode(vec![0xe9]).unwrap(), "é");
        assert!(TextEncoding::Latin1.encode("✓").is_err());
    }
}
