//! Index records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::digest::Digest;
use crate::error::TypeError;

/// Separator between fields in index and manifest lines.
pub const FIELD_SEPARATOR: char = '|';

/// A tracked asset: its normalized key and the digest of its content.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Normalized, lower-cased, forward-slash key relative to the data root.
    pub path: String,
    /// Content digest at the time the record was taken.
    pub digest: Digest,
}

impl AssetRecord {
    /// Create a record. The path must be non-empty and must not contain the
    /// field separator, or the written line could not be read back.
    pub fn new(path: impl Into<String>, digest: Digest) -> Result<Self, TypeError> {
        let path = path.into();
        if path.is_empty() {
            return Err(TypeError::InvalidRecord("empty path".into()));
        }
        if path.contains(FIELD_SEPARATOR) {
            return Err(TypeError::InvalidRecord(format!(
                "path contains '{FIELD_SEPARATOR}': {path}"
            )));
        }
        Ok(Self { path, digest })
    }

    /// Parse a `path|digest` line. The line is split on the first separator.
    pub fn parse_line(line: &str) -> Result<Self, TypeError> {
        let (path, digest) = line
            .split_once(FIELD_SEPARATOR)
            .ok_or_else(|| TypeError::InvalidRecord(format!("missing '{FIELD_SEPARATOR}'")))?;
        let digest = Digest::parse(digest)?;
        Self::new(path, digest)
    }

    /// Render as an index line (without trailing newline).
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AssetRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{FIELD_SEPARATOR}{}", self.path, self.digest)
    }
}
