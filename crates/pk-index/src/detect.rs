//! Change detection against the last index.

use std::path::PathBuf;

use pk_types::Digest;
use tracing::{debug, info};

use crate::error::IndexResult;
use crate::index::Index;
use crate::scan::AssetScanner;
use crate::status::FileStatus;

/// A new or modified file to be packaged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangedFile {
    /// Absolute path on disk, needed for copying.
    pub source: PathBuf,
    /// Index key.
    pub key: String,
    /// Case-preserving path inside the patch archive.
    pub relative: String,
    pub digest: Digest,
    pub status: FileStatus,
}

/// Files that are new or modified since the last index, in scan order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    entries: Vec<ChangedFile>,
}

impl ChangeSet {
    pub fn new(entries: Vec<ChangedFile>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChangedFile> {
        self.entries.iter()
    }

    pub fn get(&self, key: &str) -> Option<&ChangedFile> {
        self.entries.iter().find(|c| c.key == key)
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a ChangedFile;
    type IntoIter = std::slice::Iter<'a, ChangedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Result of one detection run.
#[derive(Clone, Debug, Default)]
pub struct Detection {
    pub changes: ChangeSet,
    /// Every file found on disk, changed or not.
    pub snapshot: Index,
}

/// Compares the current asset tree against a previously loaded index.
///
/// The previous index is only read. A missing index means a first run, which
/// callers handle with a full rebuild instead of a detection.
pub struct ChangeDetector<'a> {
    scanner: &'a AssetScanner,
}

impl<'a> ChangeDetector<'a> {
    pub fn new(scanner: &'a AssetScanner) -> Self {
        Self { scanner }
    }

    /// Scan every asset root and classify each file against `previous`.
    ///
    /// Keys present in `previous` but gone from disk are not reported.
    pub fn detect(&self, previous: &Index) -> IndexResult<Detection> {
        let mut changes = Vec::new();
        let mut snapshot = Index::new();

        self.scanner.for_each(|asset| {
            let status = match previous.digest_of(&asset.key) {
                Some(old) if *old == asset.digest => None,
                Some(_) => Some(FileStatus::Modified),
                None => Some(FileStatus::New),
            };
            snapshot.insert(asset.to_record()?)?;
            if let Some(status) = status {
                debug!(key = %asset.key, ?status, "change detected");
                changes.push(ChangedFile {
                    source: asset.source,
                    key: asset.key,
                    relative: asset.relative,
                    digest: asset.digest,
                    status,
                });
            }
            Ok(())
        })?;

        info!(
            scanned = snapshot.len(),
            changed = changes.len(),
            "change detection finished"
        );
        Ok(Detection {
            changes: ChangeSet::new(changes),
            snapshot,
        })
    }
}
