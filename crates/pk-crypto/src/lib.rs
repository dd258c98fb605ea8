//! Content hashing for patchkit.
//!
//! Provides domain-separated BLAKE3 digests of asset files. A digest only
//! needs to change when file content changes; timestamps and permissions are
//! never hashed.

pub mod hasher;

pub use hasher::{ContentHasher, HasherError};
