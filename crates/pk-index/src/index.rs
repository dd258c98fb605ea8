//! The in-memory index of tracked assets.
//!
//! An [`Index`] is a `BTreeMap<String, AssetRecord>` keyed by normalized
//! path. Iteration order is key order, which is also the order the index is
//! written in.

use std::collections::BTreeMap;

use pk_types::{AssetRecord, Digest};

use crate::error::{IndexError, IndexResult};

/// Last known state of every tracked asset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Index {
    entries: BTreeMap<String, AssetRecord>,
}

impl Index {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the index has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get a record by key.
    pub fn get(&self, key: &str) -> Option<&AssetRecord> {
        self.entries.get(key)
    }

    /// Digest recorded for `key`, if tracked.
    pub fn digest_of(&self, key: &str) -> Option<&Digest> {
        self.entries.get(key).map(|r| &r.digest)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Add a record. Keys are unique within an index.
    pub fn insert(&mut self, record: AssetRecord) -> IndexResult<()> {
        if self.entries.contains_key(&record.path) {
            return Err(IndexError::DuplicateKey(record.path));
        }
        self.entries.insert(record.path.clone(), record);
        Ok(())
    }

    /// Add or replace a record, returning the previous one.
    pub fn upsert(&mut self, record: AssetRecord) -> Option<AssetRecord> {
        self.entries.insert(record.path.clone(), record)
    }

    /// Overlay `other` on top of this index: records in `other` replace
    /// records with the same key, records only in `self` are kept.
    pub fn merge(&mut self, other: Index) {
        self.entries.extend(other.entries);
    }

    /// Records in key order.
    pub fn records(&self) -> impl Iterator<Item = &AssetRecord> {
        self.entries.values()
    }

    /// Keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl FromIterator<AssetRecord> for Index {
    /// Later records win on duplicate keys.
    fn from_iter<I: IntoIterator<Item = AssetRecord>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|r| (r.path.clone(), r)).collect(),
        }
    }
}
