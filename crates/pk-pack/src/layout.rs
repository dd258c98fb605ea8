//! Where patch outputs live under the patch root.
//!
//! ```text
//! {patch_root}/PatchIndex.txt
//! {patch_root}/patchs_{main}_{primary}.txt
//! {patch_root}/temps/...                        (staging, removed after each build)
//! {patch_root}/files/{main}_{primary}/patch_{patch}_{count}.zip
//! ```

use std::path::{Path, PathBuf};

use pk_types::VersionTuple;

const STAGING_DIR: &str = "temps";
const ARCHIVE_DIR: &str = "files";

/// Path scheme for one patch root.
#[derive(Clone, Debug)]
pub struct PatchLayout {
    root: PathBuf,
}

impl PatchLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn staging_root(&self) -> PathBuf {
        self.root.join(STAGING_DIR)
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.root.join(ARCHIVE_DIR)
    }

    pub fn version_dir(&self, version: &VersionTuple) -> PathBuf {
        self.archive_dir().join(version.version_dir())
    }

    pub fn archive_path(&self, version: &VersionTuple, file_count: usize) -> PathBuf {
        self.version_dir(version)
            .join(archive_name(version, file_count))
    }

    pub fn manifest_path(&self, version: &VersionTuple) -> PathBuf {
        self.root
            .join(format!("patchs_{}.txt", version.version_dir()))
    }
}

/// `patch_{patch}_{file_count}.zip`. The file count keeps builds of the same
/// patch version with different change sets from overwriting each other.
pub fn archive_name(version: &VersionTuple, file_count: usize) -> String {
    format!("patch_{}_{}.zip", version.patch, file_count)
}

/// Public URL of an archive: `{base_url}/{main}_{primary}/{archive_name}`.
pub fn publish_url(base_url: &str, version: &VersionTuple, archive_name: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.is_empty() {
        format!("{}/{}", version.version_dir(), archive_name)
    } else {
        format!("{}/{}/{}", base, version.version_dir(), archive_name)
    }
}
