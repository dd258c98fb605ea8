//! Path normalization.
//!
//! Every place that turns a filesystem path into an index key or an archive
//! path goes through [`relative_path`]. Index building, change detection and
//! patch staging must agree on it exactly, otherwise unchanged files show up
//! as new ones.

use std::path::{Path, PathBuf};

use crate::error::{IndexError, IndexResult};

/// Directory whose contents are treated as living at the data root.
pub const DEFAULT_STREAMING_DIR: &str = "StreamingAssets";

/// Turns absolute asset paths into data-root-relative paths and keys.
#[derive(Clone, Debug)]
pub struct PathNormalizer {
    root: String,
    streaming_dir: String,
}

impl PathNormalizer {
    /// Create a normalizer for files under `root`.
    ///
    /// `streaming_dir` may be empty to disable streaming-prefix stripping.
    pub fn new(root: &Path, streaming_dir: impl Into<String>) -> IndexResult<Self> {
        let root = path_str(root)?;
        if root.is_empty() {
            return Err(IndexError::InvalidPath("empty data root".into()));
        }
        Ok(Self {
            root: to_forward_slashes(root),
            streaming_dir: streaming_dir.into(),
        })
    }

    /// The data root, with forward slashes.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Case-preserving path relative to the data root, streaming prefix
    /// removed. This is where the file lands inside a patch archive.
    pub fn relative(&self, path: &Path) -> IndexResult<String> {
        Ok(relative_path(path_str(path)?, &self.root, &self.streaming_dir))
    }

    /// The index key: [`relative`](Self::relative) folded to lowercase.
    pub fn key(&self, path: &Path) -> IndexResult<String> {
        Ok(normalize_key(path_str(path)?, &self.root, &self.streaming_dir))
    }

    /// Location of `path` inside a staging directory.
    pub fn staged_path(&self, staging_root: &Path, path: &Path) -> IndexResult<PathBuf> {
        let raw = path_str(path)?;
        let relative = relative_path(raw, &self.root, &self.streaming_dir);
        let under_root =
            strip_dir_prefix(&to_forward_slashes(raw), self.root.trim_end_matches('/')).is_some();
        if !under_root || relative.is_empty() {
            return Err(IndexError::InvalidPath(format!(
                "{} is not under {}",
                path.display(),
                self.root
            )));
        }
        Ok(relative
            .split('/')
            .fold(staging_root.to_path_buf(), |acc, part| acc.join(part)))
    }
}

fn path_str(path: &Path) -> IndexResult<&str> {
    path.to_str()
        .ok_or_else(|| IndexError::InvalidPath(format!("not UTF-8: {}", path.display())))
}

fn to_forward_slashes(s: &str) -> String {
    s.replace('\\', "/")
}

/// Strip `prefix` (ASCII case-insensitive) when it is followed by `/` or
/// ends the string.
fn strip_dir_prefix<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    let rest = &s[prefix.len()..];
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

/// Forward-slash path relative to `root`, with a leading `streaming_dir`
/// component removed. Letter case is preserved.
///
/// Paths outside `root` are only separator-normalized; the streaming prefix
/// is never stripped from them, which keeps normalization idempotent on keys.
pub fn relative_path(path: &str, root: &str, streaming_dir: &str) -> String {
    let path = to_forward_slashes(path);
    let root = to_forward_slashes(root);
    let root = root.trim_end_matches('/');
    if root.is_empty() {
        return path;
    }

    let Some(rest) = strip_dir_prefix(&path, root) else {
        return path;
    };
    let rest = rest.trim_start_matches('/');

    let streaming_dir = streaming_dir.trim_matches(|c| c == '/' || c == '\\');
    if !streaming_dir.is_empty() {
        if let Some(inner) = strip_dir_prefix(rest, streaming_dir) {
            return inner.trim_start_matches('/').to_string();
        }
    }
    rest.to_string()
}

/// The index key for `path`: [`relative_path`] folded to lowercase.
pub fn normalize_key(path: &str, root: &str, streaming_dir: &str) -> String {
    relative_path(path, root, streaming_dir).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SA: &str = DEFAULT_STREAMING_DIR;

    #[test]
    fn posix_path_under_streaming_dir() {
        let key = normalize_key("/proj/Assets/StreamingAssets/Res/UI/Main.ab", "/proj/Assets", SA);
        assert_eq!(key, "res/ui/main.ab");
    }

    #[test]
    fn windows_path_under_streaming_dir() {
        let key = normalize_key(
            r"C:\Proj\Assets\StreamingAssets\Res\UI\Main.ab",
            r"C:\Proj\Assets",
            SA,
        );
        assert_eq!(key, "res/ui/main.ab");
    }

    #[test]
    fn separator_style_and_case_do_not_matter() {
        let a = normalize_key(r"C:\proj\assets\Lua\Init.lua", "C:/Proj/Assets", SA);
        let b = normalize_key("C:/Proj/Assets/lua/init.lua", r"C:\Proj\Assets\", SA);
        assert_eq!(a, "lua/init.lua");
        assert_eq!(a, b);
    }

    #[test]
    fn relative_preserves_case() {
        let rel = relative_path("/p/Assets/StreamingAssets/Res/A.txt", "/p/Assets", SA);
        assert_eq!(rel, "Res/A.txt");
    }

    #[test]
    fn files_outside_streaming_dir_keep_their_prefix() {
        let rel = relative_path("/p/Assets/Scripts/A.cs", "/p/Assets", SA);
        assert_eq!(rel, "Scripts/A.cs");
    }

    #[test]
    fn streaming_dir_only_stripped_as_whole_component() {
        let rel = relative_path("/p/Assets/StreamingAssetsOld/a.txt", "/p/Assets", SA);
        assert_eq!(rel, "StreamingAssetsOld/a.txt");
        let rel = relative_path("/p/Assets/res/StreamingAssets/a.txt", "/p/Assets", SA);
        assert_eq!(rel, "res/StreamingAssets/a.txt");
    }

    #[test]
    fn root_only_stripped_as_whole_component() {
        let rel = relative_path("/p/AssetsBackup/a.txt", "/p/Assets", SA);
        assert_eq!(rel, "/p/AssetsBackup/a.txt");
    }

    #[test]
    fn empty_streaming_dir_disables_stripping() {
        let rel = relative_path("/p/Assets/StreamingAssets/a.txt", "/p/Assets", "");
        assert_eq!(rel, "StreamingAssets/a.txt");
    }

    #[test]
    fn already_normalized_key_is_unchanged() {
        let key = normalize_key("/p/Assets/StreamingAssets/Res/A.txt", "/p/Assets", SA);
        assert_eq!(normalize_key(&key, "/p/Assets", SA), key);
    }

    #[test]
    fn normalizer_staged_path_mirrors_relative_layout() {
        let n = PathNormalizer::new(Path::new("/p/Assets"), SA).unwrap();
        let staged = n
            .staged_path(
                Path::new("/tmp/temps"),
                Path::new("/p/Assets/StreamingAssets/Res/A.txt"),
            )
            .unwrap();
        assert_eq!(staged, Path::new("/tmp/temps/Res/A.txt"));
    }

    #[test]
    fn normalizer_rejects_staging_paths_outside_root() {
        let n = PathNormalizer::new(Path::new("/p/Assets"), SA).unwrap();
        let err = n
            .staged_path(Path::new("/tmp/temps"), Path::new("/elsewhere/a.txt"))
            .unwrap_err();
        assert!(matches!(err, IndexError::InvalidPath(_)));
    }

    fn segment() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_. -]{1,12}".prop_filter("not a dot segment", |s| s != "." && s != "..")
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(
            segments in prop::collection::vec(segment(), 1..6),
            streaming in any::<bool>(),
            windows in any::<bool>(),
        ) {
            let (root, sep) = if windows { (r"D:\Game\Assets", "\\") } else { ("/game/Assets", "/") };
            let mut path = root.to_string();
            if streaming {
                path.push_str(sep);
                path.push_str(SA);
            }
            for s in &segments {
                path.push_str(sep);
                path.push_str(s);
            }
            let key = normalize_key(&path, root, SA);
            prop_assert_eq!(normalize_key(&key, root, SA), key.clone());
            prop_assert!(!key.contains('\\'));
            prop_assert_eq!(key.clone(), key.to_lowercase());
        }

        #[test]
        fn windows_and_posix_spellings_agree(segments in prop::collection::vec(segment(), 1..6)) {
            let posix = format!("/game/Assets/{}/{}", SA, segments.join("/"));
            let windows = format!(r"\game\Assets\{}\{}", SA, segments.join("\\"));
            prop_assert_eq!(
                normalize_key(&posix, "/game/Assets", SA),
                normalize_key(&windows, "/game/Assets", SA)
            );
        }
    }
}
