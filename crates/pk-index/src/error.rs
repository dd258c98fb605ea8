//! Error types for the index crate.

use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur while scanning, loading, or writing the index.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// A filesystem operation failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file could not be hashed.
    #[error(transparent)]
    Hash(#[from] pk_crypto::HasherError),

    /// Directory traversal failed.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// The persisted index contains a line that cannot be trusted.
    #[error("corrupt index {} at line {line}: {reason}", path.display())]
    CorruptIndex {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// A configured asset root does not exist.
    #[error("asset root not found: {}", .0.display())]
    AssetRootMissing(PathBuf),

    /// Two different files normalize to the same key.
    #[error("files {} and {} both map to key {key}", first.display(), second.display())]
    KeyCollision {
        key: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// A key was inserted twice into one index.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// A path cannot be turned into an index key.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A record failed validation.
    #[error("invalid record: {0}")]
    Record(#[from] pk_types::TypeError),
}

impl IndexError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
