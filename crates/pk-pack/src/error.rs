use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("archive creation failed: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("index error: {0}")]
    Index(#[from] pk_index::IndexError),

    #[error("nothing to package: change set is empty")]
    EmptyChangeSet,

    #[error("corrupt manifest {} at line {line}: {reason}", path.display())]
    CorruptManifest {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

impl PackError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type PackResult<T> = Result<T, PackError>;
