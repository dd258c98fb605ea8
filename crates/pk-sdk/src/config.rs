use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "patchkit.toml";

/// Configuration for the patch pipeline.
///
/// Every path is relative to `data_root` except `data_root` itself, which is
/// relative to the directory holding the configuration file. Defaults match
/// the usual project layout:
///
/// ```toml
/// data_root = "Assets"
/// asset_paths = ["StreamingAssets"]
/// patch_dir = "Patchs"
/// streaming_dir = "StreamingAssets"
/// sidecar_suffix = ".meta"
/// version_file = "version.txt"
/// patch_url = "http://cdn.example.com/patch/files"
/// refresh_index_after_build = true
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatchConfig {
    /// Directory that index keys are relative to.
    pub data_root: PathBuf,
    /// Tracked asset roots.
    pub asset_paths: Vec<String>,
    /// Patch root: index, manifests, and archives.
    pub patch_dir: PathBuf,
    /// Subdirectory whose contents are logically rooted at `data_root`.
    pub streaming_dir: String,
    /// Files ending with this suffix are never tracked.
    pub sidecar_suffix: String,
    /// `main.primary.patch` version file.
    pub version_file: PathBuf,
    /// Base URL prefixed to archive paths in manifest lines.
    pub patch_url: String,
    /// Record the packaged state in the index after each build, so the next
    /// patch only carries later changes. When `false`, every patch is
    /// cumulative against the first index.
    pub refresh_index_after_build: bool,
    /// Directory the configuration was loaded from.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("Assets"),
            asset_paths: vec![pk_index::DEFAULT_STREAMING_DIR.to_string()],
            patch_dir: PathBuf::from("Patchs"),
            streaming_dir: pk_index::DEFAULT_STREAMING_DIR.to_string(),
            sidecar_suffix: pk_index::DEFAULT_SIDECAR_SUFFIX.to_string(),
            version_file: PathBuf::from("version.txt"),
            patch_url: String::new(),
            refresh_index_after_build: true,
            base_dir: PathBuf::new(),
        }
    }
}

impl PatchConfig {
    /// Parse a TOML configuration file.
    pub fn load(path: &Path) -> SdkResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| SdkError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&text).map_err(|reason| SdkError::Config {
            path: path.to_path_buf(),
            reason,
        })?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    /// Load `path` if it exists, otherwise use defaults rooted at `base_dir`.
    pub fn load_or_default(path: &Path, base_dir: &Path) -> SdkResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::rooted_at(base_dir))
        }
    }

    /// Defaults with relative paths resolved against `base_dir`.
    pub fn rooted_at(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    pub fn from_toml(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    pub fn data_root(&self) -> PathBuf {
        self.base_dir.join(&self.data_root)
    }

    pub fn patch_root(&self) -> PathBuf {
        self.data_root().join(&self.patch_dir)
    }

    pub fn version_path(&self) -> PathBuf {
        self.data_root().join(&self.version_file)
    }
}
