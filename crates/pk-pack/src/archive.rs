use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{PackError, PackResult};

/// Result of writing an archive.
#[derive(Clone, Debug)]
pub struct ArchiveFile {
    pub path: PathBuf,
    /// Number of file entries (directories are not stored).
    pub entry_count: usize,
    /// Size of the archive on disk.
    pub archive_size: u64,
}

/// Builds a zip archive from a directory tree.
///
/// Entries are named by their forward-slash path relative to the source
/// directory and added in sorted order, so the same tree always produces the
/// same entry list.
pub struct ArchiveWriter {
    path: PathBuf,
    method: CompressionMethod,
}

impl ArchiveWriter {
    /// Create a writer targeting `path`, deflate-compressed.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            method: CompressionMethod::Deflated,
        }
    }

    /// Store entries uncompressed (useful for already-compressed bundles).
    pub fn stored(mut self) -> Self {
        self.method = CompressionMethod::Stored;
        self
    }

    /// Archive every file under `source_dir`. A partially written archive is
    /// removed on failure.
    pub fn write_dir(self, source_dir: &Path) -> PackResult<ArchiveFile> {
        match self.write_dir_inner(source_dir) {
            Ok(entry_count) => {
                let archive_size = fs::metadata(&self.path)
                    .map_err(PackError::io(&self.path))?
                    .len();
                debug!(path = %self.path.display(), entry_count, archive_size, "archive written");
                Ok(ArchiveFile {
                    path: self.path,
                    entry_count,
                    archive_size,
                })
            }
            Err(e) => {
                if let Err(rm) = fs::remove_file(&self.path) {
                    if rm.kind() != io::ErrorKind::NotFound {
                        warn!(path = %self.path.display(), error = %rm, "failed to remove partial archive");
                    }
                }
                Err(e)
            }
        }
    }

    fn write_dir_inner(&self, source_dir: &Path) -> PackResult<usize> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(PackError::io(parent))?;
        }
        let file = File::create(&self.path).map_err(PackError::io(&self.path))?;
        let mut zip = ZipWriter::new(BufWriter::new(file));
        let mut count = 0;

        for entry in WalkDir::new(source_dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry_name(source_dir, entry.path())?;
            let len = entry.metadata()?.len();
            let options = SimpleFileOptions::default()
                .compression_method(self.method)
                .large_file(len >= u64::from(u32::MAX));

            zip.start_file(name, options)?;
            let mut src = File::open(entry.path()).map_err(PackError::io(entry.path()))?;
            io::copy(&mut src, &mut zip).map_err(PackError::io(entry.path()))?;
            count += 1;
        }

        let mut out = zip.finish()?;
        out.flush().map_err(PackError::io(&self.path))?;
        Ok(count)
    }
}

/// Forward-slash name of `path` relative to `root`.
fn entry_name(root: &Path, path: &Path) -> PackResult<String> {
    let rel = path.strip_prefix(root).map_err(|_| {
        PackError::io(path)(io::Error::new(
            io::ErrorKind::InvalidInput,
            "path escapes archive root",
        ))
    })?;
    let parts = rel
        .components()
        .map(|c| {
            c.as_os_str().to_str().map(str::to_owned).ok_or_else(|| {
                PackError::io(path)(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "entry name is not UTF-8",
                ))
            })
        })
        .collect::<PackResult<Vec<_>>>()?;
    Ok(parts.join("/"))
}
