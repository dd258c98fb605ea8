//! Patch packaging for patchkit.
//!
//! Turns a [`ChangeSet`](pk_index::ChangeSet) into a published patch: the
//! changed files are copied into a staging directory at their logical asset
//! paths, zipped into a versioned archive, and announced in an append-only
//! manifest.
//!
//! # Architecture
//!
//! - **PatchLayout**: where archives, manifests, and staging live under the patch root
//! - **StagingArea**: scratch copy of the change set, removed after every build
//! - **ArchiveWriter**: zips a directory tree with sorted, forward-slash entry names
//! - **PatchManifest**: `patchs_{main}_{primary}.txt`, one `url|size` line per build
//! - **PatchBuilder**: runs the whole sequence for one change set

pub mod archive;
pub mod builder;
pub mod error;
pub mod layout;
pub mod manifest;
pub mod staging;

pub use archive::{ArchiveFile, ArchiveWriter};
pub use builder::{PatchBuilder, PatchReport};
pub use error::{PackError, PackResult};
pub use layout::{archive_name, publish_url, PatchLayout};
pub use manifest::PatchManifest;
pub use staging::StagingArea;
