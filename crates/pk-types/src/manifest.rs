//! Published patch manifest entries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::record::FIELD_SEPARATOR;

/// Where a patch archive is published and how many bytes of assets it holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchManifestEntry {
    pub url: String,
    /// Sum of the source file sizes packed into the archive.
    pub size_bytes: u64,
}

impl PatchManifestEntry {
    pub fn new(url: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            url: url.into(),
            size_bytes,
        }
    }

    /// Parse a `url|size` line. The size is taken after the last separator.
    pub fn parse_line(line: &str) -> Result<Self, TypeError> {
        let (url, size) = line.rsplit_once(FIELD_SEPARATOR).ok_or_else(|| {
            TypeError::InvalidManifestEntry(format!("missing '{FIELD_SEPARATOR}'"))
        })?;
        if url.is_empty() {
            return Err(TypeError::InvalidManifestEntry("empty url".into()));
        }
        let size_bytes = size
            .parse::<u64>()
            .map_err(|e| TypeError::InvalidManifestEntry(format!("size {size:?}: {e}")))?;
        Ok(Self::new(url, size_bytes))
    }

    /// Render as a manifest line (without trailing newline).
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PatchManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{FIELD_SEPARATOR}{}", self.url, self.size_bytes)
    }
}
