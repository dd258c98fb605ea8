use std::fs;
use std::path::Path;

use pk_types::VersionTuple;

use crate::error::{SdkError, SdkResult};

/// Read the `main.primary.patch` version from the first non-empty line of
/// `path`. A missing or malformed file is [`SdkError::MissingVersionInfo`].
pub fn load_version(path: &Path) -> SdkResult<VersionTuple> {
    let missing = |reason: String| SdkError::MissingVersionInfo {
        path: path.to_path_buf(),
        reason,
    };
    let text = fs::read_to_string(path).map_err(|e| missing(e.to_string()))?;
    let line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| missing("file is empty".into()))?;
    line.parse().map_err(|e: pk_types::TypeError| missing(e.to_string()))
}
