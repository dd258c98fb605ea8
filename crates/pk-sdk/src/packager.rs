use std::fs;
use std::path::{Path, PathBuf};

use pk_index::{AssetScanner, ChangeDetector, Index, IndexStore, PathNormalizer, WorkdirStatus};
use pk_pack::{PatchBuilder, PatchLayout, PatchManifest, PatchReport};
use pk_types::{PatchManifestEntry, VersionTuple};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::PatchConfig;
use crate::error::{SdkError, SdkResult};
use crate::version::load_version;

/// What a call to [`Packager::build_patch`] did.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BuildOutcome {
    /// No index existed; one was built from a full scan and nothing was
    /// packaged.
    IndexCreated { records: usize },
    /// Every tracked file matches the index.
    NoChanges { scanned: usize },
    /// A patch archive was built and published.
    Built(PatchReport),
}

/// The patch pipeline for one project.
///
/// # Example
///
/// ```no_run
/// use pk_sdk::{BuildOutcome, PatchConfig, Packager};
///
/// let packager = Packager::new(PatchConfig::rooted_at("."))?;
/// if let BuildOutcome::Built(report) = packager.build_patch()? {
///     println!("{}", report.entry);
/// }
/// # Ok::<(), pk_sdk::SdkError>(())
/// ```
pub struct Packager {
    config: PatchConfig,
    version_path: PathBuf,
    normalizer: PathNormalizer,
    scanner: AssetScanner,
    store: IndexStore,
    layout: PatchLayout,
}

impl Packager {
    pub fn new(config: PatchConfig) -> SdkResult<Self> {
        let data_root = absolute(&config.data_root())?;
        let normalizer = PathNormalizer::new(&data_root, config.streaming_dir.clone())?;
        // Scanner paths are built from the normalized root, so the excluded
        // directory must be too.
        let patch_root = PathBuf::from(normalizer.root()).join(&config.patch_dir);
        let scanner = AssetScanner::new(normalizer.clone(), config.asset_paths.as_slice())
            .with_sidecar_suffix(config.sidecar_suffix.clone())
            .with_excluded_dir(patch_root.clone());
        debug!(
            data_root = %data_root.display(),
            patch_root = %patch_root.display(),
            roots = config.asset_paths.len(),
            "packager configured"
        );
        Ok(Self {
            version_path: data_root.join(&config.version_file),
            store: IndexStore::in_dir(&patch_root),
            layout: PatchLayout::new(patch_root),
            config,
            normalizer,
            scanner,
        })
    }

    pub fn config(&self) -> &PatchConfig {
        &self.config
    }

    pub fn layout(&self) -> &PatchLayout {
        &self.layout
    }

    pub fn index_path(&self) -> &Path {
        self.store.path()
    }

    pub fn version(&self) -> SdkResult<VersionTuple> {
        load_version(&self.version_path)
    }

    /// Run one packaging pass.
    ///
    /// Without an index, the index is built and nothing is packaged. With
    /// one, files that are new or changed since the index are packaged into
    /// `files/{main}_{primary}/patch_{patch}_{count}.zip` and announced in the
    /// version's manifest.
    pub fn build_patch(&self) -> SdkResult<BuildOutcome> {
        let version = self.version()?;
        let root = self.layout.root();
        fs::create_dir_all(root).map_err(|source| SdkError::Io {
            path: root.to_path_buf(),
            source,
        })?;

        let Some(previous) = self.store.load()? else {
            let records = self.store.rebuild(&self.scanner)?;
            info!(records, "no index found, created one; nothing packaged");
            return Ok(BuildOutcome::IndexCreated { records });
        };

        let detection = ChangeDetector::new(&self.scanner).detect(&previous)?;
        if detection.changes.is_empty() {
            info!(scanned = detection.snapshot.len(), "no files need updating");
            return Ok(BuildOutcome::NoChanges {
                scanned: detection.snapshot.len(),
            });
        }

        let builder = PatchBuilder::new(
            self.layout.clone(),
            &self.normalizer,
            self.config.patch_url.clone(),
        );
        let report = builder.build(&detection.changes, &version)?;

        if self.config.refresh_index_after_build {
            let mut next = previous;
            next.merge(detection.snapshot);
            self.store.write(&next)?;
        }
        Ok(BuildOutcome::Built(report))
    }

    /// Discard the index and rebuild it from the current tree.
    pub fn reindex(&self) -> SdkResult<usize> {
        Ok(self.store.rebuild(&self.scanner)?)
    }

    /// Compare the tree with the index without writing anything. Returns
    /// `None` when no index exists yet.
    pub fn status(&self) -> SdkResult<Option<WorkdirStatus>> {
        let Some(previous) = self.store.load()? else {
            return Ok(None);
        };
        let detection = ChangeDetector::new(&self.scanner).detect(&previous)?;
        Ok(Some(WorkdirStatus::from_detection(&detection, &previous)))
    }

    /// Current index, if any.
    pub fn index(&self) -> SdkResult<Option<Index>> {
        Ok(self.store.load()?)
    }

    /// Manifest entries published for `version`'s line, oldest first.
    pub fn history(&self, version: &VersionTuple) -> SdkResult<Vec<PatchManifestEntry>> {
        let manifest = PatchManifest::new(self.layout.manifest_path(version));
        Ok(manifest.load()?)
    }
}

fn absolute(path: &Path) -> SdkResult<PathBuf> {
    std::path::absolute(path).map_err(|source| SdkError::Io {
        path: path.to_path_buf(),
        source,
    })
}
