//! Foundation types for patchkit.
//!
//! Every other patchkit crate depends on `pk-types`. The types here are plain
//! values: they know how to parse and print their on-disk line formats but
//! perform no I/O themselves.
//!
//! # Key Types
//!
//! - [`Digest`]: Hex-encoded content fingerprint of a tracked file
//! - [`AssetRecord`]: One `path|digest` line of the patch index
//! - [`VersionTuple`]: `main.primary.patch` version used to name outputs
//! - [`PatchManifestEntry`]: One `url|size` line of a patch manifest

pub mod digest;
pub mod error;
pub mod manifest;
pub mod record;
pub mod version;

pub use digest::Digest;
pub use error::TypeError;
pub use manifest::PatchManifestEntry;
pub use record::AssetRecord;
pub use version::VersionTuple;
