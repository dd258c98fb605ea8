use thiserror::Error;

/// Errors produced by type parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("invalid version: {0}")]
    InvalidVersion(String),

    #[error("invalid manifest entry: {0}")]
    InvalidManifestEntry(String),
}
