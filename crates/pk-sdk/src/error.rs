use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("version info missing or unreadable at {}: {reason}", path.display())]
    MissingVersionInfo { path: PathBuf, reason: String },

    #[error("invalid configuration {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("index error: {0}")]
    Index(#[from] pk_index::IndexError),

    #[error("pack error: {0}")]
    Pack(#[from] pk_pack::PackError),
}

pub type SdkResult<T> = Result<T, SdkError>;
