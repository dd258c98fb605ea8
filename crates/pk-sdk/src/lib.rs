//! High-level SDK for patchkit.
//!
//! [`Packager`] is the single entry point: it loads the version, decides
//! between a first-run index build and an incremental patch, and runs the
//! index and pack crates in order.

pub mod config;
pub mod error;
pub mod packager;
pub mod version;

pub use config::{PatchConfig, CONFIG_FILE_NAME};
pub use error::{SdkError, SdkResult};
pub use packager::{BuildOutcome, Packager};
pub use version::load_version;

// Re-export key types
pub use pk_index::{FileStatus, WorkdirStatus};
pub use pk_pack::PatchReport;
pub use pk_types::{PatchManifestEntry, VersionTuple};
