//! Append-only per-version patch manifest.
//!
//! Each successful build appends one `url|size` line; nothing is ever
//! rewritten, so the file doubles as the build history for a version line.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use pk_types::PatchManifestEntry;

use crate::error::{PackError, PackResult};

/// The `patchs_{main}_{primary}.txt` file of one version line.
#[derive(Clone, Debug)]
pub struct PatchManifest {
    path: PathBuf,
}

impl PatchManifest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry, creating the file if needed.
    pub fn append(&self, entry: &PatchManifestEntry) -> PackResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(PackError::io(parent))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(PackError::io(&self.path))?;
        file.write_all(format!("{entry}\n").as_bytes())
            .map_err(PackError::io(&self.path))
    }

    /// Read every entry in publication order. A missing file has none.
    pub fn load(&self) -> PackResult<Vec<PatchManifestEntry>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PackError::io(&self.path)(e)),
        };
        text.lines()
            .enumerate()
            .map(|(i, line)| (i, line.strip_suffix('\r').unwrap_or(line)))
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                PatchManifestEntry::parse_line(line).map_err(|e| PackError::CorruptManifest {
                    path: self.path.clone(),
                    line: i + 1,
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}
