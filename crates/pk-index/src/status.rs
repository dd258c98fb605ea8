//! Change status types.
//!
//! These types summarize a detection run for reporting. They carry keys only;
//! the files to package live in [`ChangeSet`](crate::ChangeSet).

use serde::{Deserialize, Serialize};

use crate::detect::Detection;
use crate::index::Index;

/// Why a file was picked up by change detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// The key was not in the previous index.
    New,
    /// The key was indexed with a different digest.
    Modified,
}

/// Summary of the asset tree relative to the last index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkdirStatus {
    /// Keys of files not present in the previous index.
    pub new: Vec<String>,
    /// Keys of files whose content changed.
    pub modified: Vec<String>,
    /// Number of files whose digest matched.
    pub unchanged: usize,
    /// Indexed keys no longer found on disk. Informational only: deletions
    /// are never packaged.
    pub missing: Vec<String>,
}

impl WorkdirStatus {
    /// Summarize `detection` against the index it was computed from.
    pub fn from_detection(detection: &Detection, previous: &Index) -> Self {
        let mut status = Self::default();
        for change in detection.changes.iter() {
            match change.status {
                FileStatus::New => status.new.push(change.key.clone()),
                FileStatus::Modified => status.modified.push(change.key.clone()),
            }
        }
        status.unchanged = detection.snapshot.len() - detection.changes.len();
        status.missing = previous
            .keys()
            .filter(|k| !detection.snapshot.contains(k))
            .map(str::to_string)
            .collect();
        status
    }

    /// Returns `true` if nothing would be packaged.
    pub fn is_clean(&self) -> bool {
        self.new.is_empty() && self.modified.is_empty()
    }

    /// Number of files that would be packaged.
    pub fn change_count(&self) -> usize {
        self.new.len() + self.modified.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_status_is_clean() {
        let status = WorkdirStatus::default();
        assert!(status.is_clean());
        assert_eq!(status.change_count(), 0);
    }

    #[test]
    fn missing_files_do_not_make_status_dirty() {
        let status = WorkdirStatus {
            missing: vec!["gone.txt".into()],
            ..Default::default()
        };
        assert!(status.is_clean());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&FileStatus::Modified).unwrap(), "\"modified\"");
    }
}
