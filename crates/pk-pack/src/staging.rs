//! Scratch directory for assembling a patch.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{PackError, PackResult};

/// A staging directory owned by one build.
///
/// The directory is removed when the area is dropped, whether or not the
/// build succeeded. Call [`close`](Self::close) to remove it and observe
/// errors; otherwise removal failures are only logged.
#[derive(Debug)]
pub struct StagingArea {
    root: PathBuf,
    files: usize,
    total_bytes: u64,
    removed: bool,
}

impl StagingArea {
    /// Create an empty staging directory at `root`. Leftovers from an
    /// interrupted build are removed first so they cannot leak into the
    /// archive.
    pub fn create(root: impl Into<PathBuf>) -> PackResult<Self> {
        let root = root.into();
        remove_tree(&root)?;
        fs::create_dir_all(&root).map_err(PackError::io(&root))?;
        Ok(Self {
            root,
            files: 0,
            total_bytes: 0,
            removed: false,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of files staged so far.
    pub fn file_count(&self) -> usize {
        self.files
    }

    /// Total size in bytes of the staged source files.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Copy `source` to `dest` (a path inside the staging root), replacing
    /// any stale file there. Returns the number of bytes copied.
    pub fn stage(&mut self, source: &Path, dest: &Path) -> PackResult<u64> {
        debug_assert!(dest.starts_with(&self.root));
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(PackError::io(parent))?;
        }
        match fs::remove_file(dest) {
            Ok(()) => debug!(path = %dest.display(), "removed stale staged file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(PackError::io(dest)(e)),
        }
        let bytes = fs::copy(source, dest).map_err(PackError::io(source))?;
        self.files += 1;
        self.total_bytes += bytes;
        Ok(bytes)
    }

    /// Remove the staging directory.
    pub fn close(mut self) -> PackResult<()> {
        self.removed = true;
        remove_tree(&self.root)
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = remove_tree(&self.root) {
            warn!(error = %e, "failed to remove staging directory");
        }
    }
}

fn remove_tree(path: &Path) -> PackResult<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PackError::io(path)(e)),
    }
}
