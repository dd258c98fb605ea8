//! Asset tree scanning.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use pk_crypto::ContentHasher;
use pk_types::{AssetRecord, Digest};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{IndexError, IndexResult};
use crate::normalize::PathNormalizer;

/// Suffix of editor-generated sidecar files that are never tracked.
pub const DEFAULT_SIDECAR_SUFFIX: &str = ".meta";

/// A file found under an asset root, hashed and normalized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannedAsset {
    /// Absolute path on disk, as walked.
    pub source: PathBuf,
    /// Case-preserving path relative to the data root.
    pub relative: String,
    /// Index key (lower-cased `relative`).
    pub key: String,
    pub digest: Digest,
}

impl ScannedAsset {
    pub fn to_record(&self) -> IndexResult<AssetRecord> {
        Ok(AssetRecord::new(self.key.clone(), self.digest.clone())?)
    }
}

/// Walks the configured asset roots in a stable order.
///
/// Directories are visited sorted by file name so that two scans of the same
/// tree yield files in the same order.
#[derive(Clone, Debug)]
pub struct AssetScanner {
    normalizer: PathNormalizer,
    roots: Vec<PathBuf>,
    sidecar_suffix: String,
    excluded: Vec<PathBuf>,
}

impl AssetScanner {
    /// Create a scanner over `asset_paths`, each relative to the normalizer's
    /// data root. Leading separators on asset paths are ignored.
    pub fn new<S: AsRef<str>>(normalizer: PathNormalizer, asset_paths: &[S]) -> Self {
        let data_root = PathBuf::from(normalizer.root());
        let roots = asset_paths
            .iter()
            .map(|p| {
                let p = p.as_ref().trim_start_matches(|c| c == '/' || c == '\\');
                if p.is_empty() {
                    data_root.clone()
                } else {
                    data_root.join(p)
                }
            })
            .collect();
        Self {
            normalizer,
            roots,
            sidecar_suffix: DEFAULT_SIDECAR_SUFFIX.to_string(),
            excluded: Vec::new(),
        }
    }

    /// Replace the sidecar suffix. An empty suffix tracks every file.
    pub fn with_sidecar_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.sidecar_suffix = suffix.into();
        self
    }

    /// Never descend into `dir` (used for the patch output directory).
    pub fn with_excluded_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.excluded.push(dir.into());
        self
    }

    pub fn normalizer(&self) -> &PathNormalizer {
        &self.normalizer
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn is_sidecar(&self, path: &Path) -> bool {
        !self.sidecar_suffix.is_empty()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(self.sidecar_suffix.as_str()))
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.excluded.iter().any(|dir| path.starts_with(dir))
    }

    /// Visit every tracked file, hashing it before calling `visit`.
    ///
    /// Roots are walked in configuration order, each depth-first with the
    /// entries of every directory sorted byte-wise by file name. The order is
    /// stable across runs but is not key order (`Res/` sorts before `a.txt`);
    /// [`IndexStore`](crate::IndexStore) sorts by key before writing.
    ///
    /// Stops at the first error, including one returned by `visit`. A file
    /// reached twice through overlapping roots is visited once; two different
    /// files with the same key fail with [`IndexError::KeyCollision`].
    pub fn for_each<F>(&self, mut visit: F) -> IndexResult<usize>
    where
        F: FnMut(ScannedAsset) -> IndexResult<()>,
    {
        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        for root in &self.roots {
            if !root.is_dir() {
                return Err(IndexError::AssetRootMissing(root.clone()));
            }
            let walker = WalkDir::new(root)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| !self.is_excluded(e.path()));
            for entry in walker {
                let entry = entry?;
                if !entry.file_type().is_file() || self.is_sidecar(entry.path()) {
                    continue;
                }
                let source = entry.into_path();
                let key = self.normalizer.key(&source)?;
                if let Some(first) = seen.get(&key) {
                    if *first == source {
                        debug!(path = %source.display(), "already scanned via another root");
                        continue;
                    }
                    return Err(IndexError::KeyCollision {
                        key,
                        first: first.clone(),
                        second: source,
                    });
                }
                let relative = self.normalizer.relative(&source)?;
                let digest = ContentHasher::ASSET.hash_file(&source)?;
                seen.insert(key.clone(), source.clone());
                visit(ScannedAsset {
                    source,
                    relative,
                    key,
                    digest,
                })?;
            }
        }
        Ok(seen.len())
    }

    /// Scan everything into memory.
    pub fn scan(&self) -> IndexResult<Vec<ScannedAsset>> {
        let mut assets = Vec::new();
        self.for_each(|asset| {
            assets.push(asset);
            Ok(())
        })?;
        Ok(assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::DEFAULT_STREAMING_DIR;
    use std::fs;

    fn write(root: &Path, rel: &str, data: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }

    fn scanner(root: &Path, paths: &[&str]) -> AssetScanner {
        let n = PathNormalizer::new(root, DEFAULT_STREAMING_DIR).unwrap();
        AssetScanner::new(n, paths)
    }

    #[test]
    fn scan_walks_in_file_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "StreamingAssets/b.txt", b"b");
        write(dir.path(), "StreamingAssets/a.txt", b"a");
        write(dir.path(), "StreamingAssets/Res/C.txt", b"c");

        let assets = scanner(dir.path(), &["StreamingAssets"]).scan().unwrap();
        let keys: Vec<&str> = assets.iter().map(|a| a.key.as_str()).collect();
        // Byte-wise names: uppercase `Res` sorts before `a.txt`.
        assert_eq!(keys, vec!["res/c.txt", "a.txt", "b.txt"]);
        assert_eq!(assets[0].relative, "Res/C.txt");
        assert_eq!(assets[1].digest, ContentHasher::ASSET.hash(b"a"));
    }

    #[test]
    fn sidecar_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "StreamingAssets/a.txt", b"a");
        write(dir.path(), "StreamingAssets/a.txt.meta", b"guid");
        write(dir.path(), "StreamingAssets/Res.meta", b"guid");

        let assets = scanner(dir.path(), &["StreamingAssets"]).scan().unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].key, "a.txt");
    }

    #[test]
    fn empty_sidecar_suffix_tracks_everything() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "StreamingAssets/a.txt.meta", b"guid");

        let assets = scanner(dir.path(), &["StreamingAssets"])
            .with_sidecar_suffix("")
            .scan()
            .unwrap();
        assert_eq!(assets.len(), 1);
    }

    #[test]
    fn leading_separator_on_asset_path_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "StreamingAssets/a.txt", b"a");
        let s = scanner(dir.path(), &["/StreamingAssets"]);
        assert_eq!(s.roots()[0], dir.path().join("StreamingAssets"));
        assert_eq!(s.scan().unwrap().len(), 1);
    }

    #[test]
    fn overlapping_roots_scan_each_file_once() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "StreamingAssets/Lua/a.lua", b"a");

        let assets = scanner(dir.path(), &["StreamingAssets", "StreamingAssets/Lua"])
            .scan()
            .unwrap();
        assert_eq!(assets.len(), 1);
    }

    #[test]
    fn colliding_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "StreamingAssets/res/a.txt", b"one");
        write(dir.path(), "res/a.txt", b"two");

        let err = scanner(dir.path(), &["StreamingAssets", "res"])
            .scan()
            .unwrap_err();
        assert!(matches!(err, IndexError::KeyCollision { ref key, .. } if key == "res/a.txt"));
    }

    #[test]
    fn excluded_dir_is_not_walked() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.txt", b"a");
        write(dir.path(), "Patchs/PatchIndex.txt", b"x|00");

        let assets = scanner(dir.path(), &[""])
            .with_excluded_dir(dir.path().join("Patchs"))
            .scan()
            .unwrap();
        let keys: Vec<&str> = assets.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, vec!["a.txt"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = scanner(dir.path(), &["Nope"]).scan().unwrap_err();
        assert!(matches!(err, IndexError::AssetRootMissing(_)));
    }

    #[test]
    fn visitor_error_stops_the_scan() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "StreamingAssets/a.txt", b"a");
        write(dir.path(), "StreamingAssets/b.txt", b"b");

        let mut visited = 0;
        let err = scanner(dir.path(), &["StreamingAssets"])
            .for_each(|_| {
                visited += 1;
                Err(IndexError::InvalidPath("stop".into()))
            })
            .unwrap_err();
        assert_eq!(visited, 1);
        assert!(matches!(err, IndexError::InvalidPath(_)));
    }
}
