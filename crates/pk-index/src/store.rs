//! Persistence of the patch index.
//!
//! On-disk format, UTF-8, one record per line, no header:
//! ```text
//! res/ui/main.ab|9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08
//! lua/init.lua|60303ae22b998861bce3b28f33eec1be758a213c86c93c076dbe9f558c11c752
//! ```
//! Records are written in key order, one unbuffered `write` per line, into
//! `PatchIndex.txt.partial`. The live index is deleted before a rewrite starts
//! and the partial file is renamed over it only once every record is on disk.
//! An interrupted rewrite therefore leaves no index at all, and the next run
//! starts over with a full rebuild.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use pk_types::AssetRecord;
use tracing::{debug, info};

use crate::error::{IndexError, IndexResult};
use crate::index::Index;
use crate::scan::AssetScanner;

/// File name of the index inside the patch root.
pub const INDEX_FILE_NAME: &str = "PatchIndex.txt";

const PARTIAL_SUFFIX: &str = ".partial";

/// Reads and rewrites the index file.
#[derive(Clone, Debug)]
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    /// Store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store backed by [`INDEX_FILE_NAME`] inside `patch_root`.
    pub fn in_dir(patch_root: &Path) -> Self {
        Self::new(patch_root.join(INDEX_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the index. Returns `None` if no index file exists yet.
    ///
    /// Blank lines are skipped. Any other line that is not a valid
    /// `path|digest` record, or repeats an earlier path, fails the load.
    pub fn load(&self) -> IndexResult<Option<Index>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(IndexError::io(&self.path)(e)),
        };

        let mut index = Index::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.trim().is_empty() {
                continue;
            }
            let corrupt = |reason: String| IndexError::CorruptIndex {
                path: self.path.clone(),
                line: i + 1,
                reason,
            };
            let record = AssetRecord::parse_line(line).map_err(|e| corrupt(e.to_string()))?;
            if index.contains(&record.path) {
                return Err(corrupt(format!("duplicate path {}", record.path)));
            }
            index.upsert(record);
        }

        debug!(path = %self.path.display(), entries = index.len(), "index loaded");
        Ok(Some(index))
    }

    /// Delete the index file if present.
    pub fn remove(&self) -> IndexResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(IndexError::io(&self.path)(e)),
        }
    }

    /// Where a rewrite accumulates records before it is committed.
    pub fn partial_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(PARTIAL_SUFFIX);
        PathBuf::from(name)
    }

    /// Delete the live index and open an empty partial file for appending.
    fn begin(&self) -> IndexResult<File> {
        self.remove()?;
        let partial = self.partial_path();
        if let Some(parent) = partial.parent() {
            fs::create_dir_all(parent).map_err(IndexError::io(parent))?;
        }
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&partial)
            .map_err(IndexError::io(&partial))
    }

    fn append(&self, file: &mut File, record: &AssetRecord) -> IndexResult<()> {
        let line = format!("{record}\n");
        file.write_all(line.as_bytes())
            .map_err(IndexError::io(&self.partial_path()))
    }

    fn commit(&self, file: File) -> IndexResult<()> {
        let partial = self.partial_path();
        file.sync_all().map_err(IndexError::io(&partial))?;
        drop(file);
        fs::rename(&partial, &self.path).map_err(IndexError::io(&self.path))
    }

    /// Delete the index and rebuild it from a full scan. Returns the number
    /// of records written.
    ///
    /// Every file is hashed before anything is written. If the scan fails
    /// the index stays absent.
    pub fn rebuild(&self, scanner: &AssetScanner) -> IndexResult<usize> {
        self.remove()?;
        let mut index = Index::new();
        scanner.for_each(|asset| index.insert(asset.to_record()?))?;
        let count = self.write(&index)?;
        info!(path = %self.path.display(), records = count, "index rebuilt");
        Ok(count)
    }

    /// Delete the index and write `index` in key order.
    pub fn write(&self, index: &Index) -> IndexResult<usize> {
        let mut file = self.begin()?;
        for record in index.records() {
            self.append(&mut file, record)?;
        }
        self.commit(file)?;
        debug!(path = %self.path.display(), records = index.len(), "index written");
        Ok(index.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{PathNormalizer, DEFAULT_STREAMING_DIR};
    use pk_crypto::ContentHasher;
    use pk_types::Digest;

    fn rec(path: &str, digest: &str) -> AssetRecord {
        AssetRecord::new(path, Digest::parse(digest).unwrap()).unwrap()
    }

    fn write_asset(root: &Path, rel: &str, data: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }

    #[test]
    fn load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::in_dir(dir.path());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn write_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::in_dir(&dir.path().join("Patchs"));
        let index: Index = [rec("res/b.ab", "0b"), rec("a.txt", "0a"), rec("lua/c.lua", "0c")]
            .into_iter()
            .collect();

        assert_eq!(store.write(&index).unwrap(), 3);
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, index);

        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "a.txt|0a\nlua/c.lua|0c\nres/b.ab|0b\n");
    }

    #[test]
    fn write_replaces_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::in_dir(dir.path());
        store.write(&[rec("old.txt", "01")].into_iter().collect()).unwrap();
        store.write(&[rec("new.txt", "02")].into_iter().collect()).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains("new.txt"));
    }

    #[test]
    fn load_skips_blank_lines_and_crlf() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::in_dir(dir.path());
        fs::write(store.path(), "a.txt|111\r\n\r\n   \nb.txt|222\n\n").unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.digest_of("a.txt").unwrap().as_str(), "111");
        assert_eq!(loaded.digest_of("b.txt").unwrap().as_str(), "222");
    }

    #[test]
    fn load_rejects_malformed_line() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::in_dir(dir.path());
        fs::write(store.path(), "a.txt|111\nbroken line\n").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, IndexError::CorruptIndex { line: 2, .. }));
    }

    #[test]
    fn load_rejects_non_hex_digest() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::in_dir(dir.path());
        fs::write(store.path(), "a.txt|not-a-digest\n").unwrap();

        assert!(matches!(
            store.load().unwrap_err(),
            IndexError::CorruptIndex { line: 1, .. }
        ));
    }

    #[test]
    fn load_rejects_duplicate_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::in_dir(dir.path());
        fs::write(store.path(), "a.txt|111\nb.txt|222\na.txt|333\n").unwrap();

        assert!(matches!(
            store.load().unwrap_err(),
            IndexError::CorruptIndex { line: 3, .. }
        ));
    }

    #[test]
    fn rebuild_scans_and_excludes_sidecars() {
        let dir = tempfile::tempdir().unwrap();
        let assets = dir.path().join("Assets");
        write_asset(&assets, "StreamingAssets/Res/A.txt", b"alpha");
        write_asset(&assets, "StreamingAssets/Res/A.txt.meta", b"guid");
        write_asset(&assets, "StreamingAssets/b.txt", b"beta");

        let normalizer = PathNormalizer::new(&assets, DEFAULT_STREAMING_DIR).unwrap();
        let scanner = AssetScanner::new(normalizer, &["StreamingAssets"]);
        let store = IndexStore::in_dir(&assets.join("Patchs"));
        fs::create_dir_all(assets.join("Patchs")).unwrap();
        fs::write(store.path(), "stale.txt|00\n").unwrap();

        assert_eq!(store.rebuild(&scanner).unwrap(), 2);
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(!loaded.contains("stale.txt"));
        assert_eq!(
            loaded.digest_of("res/a.txt"),
            Some(&ContentHasher::ASSET.hash(b"alpha"))
        );
        assert_eq!(
            loaded.digest_of("b.txt"),
            Some(&ContentHasher::ASSET.hash(b"beta"))
        );
    }

    #[test]
    fn rebuild_and_write_produce_identical_files() {
        let dir = tempfile::tempdir().unwrap();
        let assets = dir.path().join("Assets");
        write_asset(&assets, "StreamingAssets/b.txt", b"b");
        write_asset(&assets, "StreamingAssets/a.txt", b"a");
        write_asset(&assets, "StreamingAssets/Res/C.txt", b"c");

        let normalizer = PathNormalizer::new(&assets, DEFAULT_STREAMING_DIR).unwrap();
        let scanner = AssetScanner::new(normalizer, &["StreamingAssets"]);
        let store = IndexStore::in_dir(&assets.join("Patchs"));

        store.rebuild(&scanner).unwrap();
        let rebuilt = fs::read_to_string(store.path()).unwrap();
        let keys: Vec<&str> = rebuilt.lines().map(|l| l.split('|').next().unwrap()).collect();
        assert_eq!(keys, vec!["a.txt", "b.txt", "res/c.txt"]);

        store.write(&store.load().unwrap().unwrap()).unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), rebuilt);
        assert!(!store.partial_path().exists());
    }

    #[test]
    fn failed_rebuild_leaves_no_index() {
        let dir = tempfile::tempdir().unwrap();
        let assets = dir.path().join("Assets");
        write_asset(&assets, "StreamingAssets/a.txt", b"a");
        write_asset(&assets, "StreamingAssets/b.txt", b"b");

        let normalizer = PathNormalizer::new(&assets, DEFAULT_STREAMING_DIR).unwrap();
        // The second root is missing, so the scan fails after the first.
        let scanner = AssetScanner::new(normalizer, &["StreamingAssets", "Missing"]);
        let store = IndexStore::in_dir(&assets.join("Patchs"));
        store.write(&[rec("old.txt", "01")].into_iter().collect()).unwrap();

        assert!(matches!(
            store.rebuild(&scanner).unwrap_err(),
            IndexError::AssetRootMissing(_)
        ));
        assert!(store.load().unwrap().is_none());

        fs::create_dir_all(assets.join("Missing")).unwrap();
        assert_eq!(store.rebuild(&scanner).unwrap(), 2);
        assert_eq!(store.load().unwrap().unwrap().len(), 2);
    }

    #[test]
    fn uncommitted_partial_file_is_not_an_index() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::in_dir(dir.path());
        fs::write(store.partial_path(), "a.txt|0a\n").unwrap();
        assert!(store.load().unwrap().is_none());

        store.write(&[rec("b.txt", "0b")].into_iter().collect()).unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "b.txt|0b\n");
        assert!(!store.partial_path().exists());
    }
}
