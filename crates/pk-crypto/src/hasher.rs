use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use pk_types::Digest;

/// Domain-separated BLAKE3 content hasher.
///
/// The domain tag is prepended to every hash computation, so digests from
/// different record kinds never collide even for identical bytes. Changing
/// the tag invalidates every index written with the old one.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for tracked asset files.
    pub const ASSET: Self = Self {
        domain: "pk-asset-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    fn start(&self) -> blake3::Hasher {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> Digest {
        let mut hasher = self.start();
        hasher.update(data);
        Digest::from_hash(hasher.finalize().as_bytes())
    }

    /// Hash a file's content, streaming it from disk.
    pub fn hash_file(&self, path: &Path) -> Result<Digest, HasherError> {
        let io_err = |source| HasherError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(io_err)?;
        let mut hasher = self.start();
        io::copy(&mut BufReader::new(file), &mut hasher).map_err(io_err)?;
        Ok(Digest::from_hash(hasher.finalize().as_bytes()))
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error)]
pub enum HasherError {
    #[error("failed to hash {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
