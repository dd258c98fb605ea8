use std::fs;
use std::path::PathBuf;

use pk_index::{ChangeSet, PathNormalizer};
use pk_types::{PatchManifestEntry, VersionTuple};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::archive::ArchiveWriter;
use crate::error::{PackError, PackResult};
use crate::layout::{archive_name, publish_url, PatchLayout};
use crate::manifest::PatchManifest;
use crate::staging::StagingArea;

/// Result of a successful build.
#[derive(Clone, Debug, Serialize)]
pub struct PatchReport {
    pub archive_path: PathBuf,
    pub archive_name: String,
    pub manifest_path: PathBuf,
    pub file_count: usize,
    /// Sum of the source file sizes.
    pub total_size: u64,
    /// Line appended to the manifest.
    pub entry: PatchManifestEntry,
}

/// Packages a change set into a versioned archive and publishes it in the
/// version's manifest.
///
/// Staged paths come from the same [`PathNormalizer`] that produced the index
/// keys, so archive entries sit at the files' logical asset paths.
pub struct PatchBuilder<'a> {
    layout: PatchLayout,
    normalizer: &'a PathNormalizer,
    base_url: String,
}

impl<'a> PatchBuilder<'a> {
    pub fn new(layout: PatchLayout, normalizer: &'a PathNormalizer, base_url: impl Into<String>) -> Self {
        Self {
            layout,
            normalizer,
            base_url: base_url.into(),
        }
    }

    pub fn layout(&self) -> &PatchLayout {
        &self.layout
    }

    /// Stage, archive, clean up, and append the manifest line.
    ///
    /// The staging directory is removed whether or not archiving succeeds.
    /// The manifest is only touched after the archive is complete.
    pub fn build(&self, changes: &ChangeSet, version: &VersionTuple) -> PackResult<PatchReport> {
        if changes.is_empty() {
            return Err(PackError::EmptyChangeSet);
        }

        let version_dir = self.layout.version_dir(version);
        fs::create_dir_all(&version_dir).map_err(PackError::io(&version_dir))?;
        let mut staging = StagingArea::create(self.layout.staging_root())?;

        for change in changes {
            let dest = self.normalizer.staged_path(staging.root(), &change.source)?;
            let bytes = staging.stage(&change.source, &dest)?;
            debug!(key = %change.key, bytes, status = ?change.status, "staged");
        }

        let file_count = changes.len();
        let total_size = staging.total_bytes();
        let name = archive_name(version, file_count);
        let archive_path = self.layout.archive_path(version, file_count);
        if archive_path.exists() {
            warn!(path = %archive_path.display(), "overwriting existing archive");
        }

        let archive = ArchiveWriter::new(&archive_path).write_dir(staging.root())?;
        staging.close()?;

        let entry = PatchManifestEntry::new(publish_url(&self.base_url, version, &name), total_size);
        let manifest = PatchManifest::new(self.layout.manifest_path(version));
        manifest.append(&entry)?;

        info!(
            archive = %archive.path.display(),
            files = file_count,
            total_size,
            archive_size = archive.archive_size,
            "patch built"
        );
        Ok(PatchReport {
            archive_path,
            archive_name: name,
            manifest_path: manifest.path().to_path_buf(),
            file_count,
            total_size,
            entry,
        })
    }
}
