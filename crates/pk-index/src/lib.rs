//! Patch index for patchkit.
//!
//! Scans the configured asset roots, normalizes every file path into a stable
//! key, hashes content, and compares the result with the last persisted
//! index to find new and modified files.
//!
//! # Key Types
//!
//! - [`PathNormalizer`] -- Maps absolute paths to index keys and archive paths
//! - [`AssetScanner`] -- Walks the asset roots, skipping sidecar files
//! - [`Index`] -- In-memory `key -> AssetRecord` map (BTreeMap-backed)
//! - [`IndexStore`] -- Reads and rewrites the `PatchIndex.txt` file
//! - [`ChangeDetector`] -- Diffs the current tree against an [`Index`]
//! - [`ChangeSet`] -- New and modified files found by a detection run
//! - [`WorkdirStatus`] -- Summary of a detection run for reporting

pub mod detect;
pub mod error;
pub mod index;
pub mod normalize;
pub mod scan;
pub mod status;
pub mod store;

pub use detect::{ChangeDetector, ChangeSet, ChangedFile, Detection};
pub use error::{IndexError, IndexResult};
pub use index::Index;
pub use normalize::{normalize_key, relative_path, PathNormalizer, DEFAULT_STREAMING_DIR};
pub use scan::{AssetScanner, ScannedAsset, DEFAULT_SIDECAR_SUFFIX};
pub use status::{FileStatus, WorkdirStatus};
pub use store::{IndexStore, INDEX_FILE_NAME};
