//! Environment variable catalog.
//!
//! A catalog is a flat collection of [`CatalogEntry`] records, one per
//! distinct (name, default) pair. It is produced by the scanner, reconciled
//! against the persisted copy by [`Catalog::merge`], and consumed by
//! verification.
//!
//! Entries are never removed by any operation here; stale entries are
//! cleaned up by editing the catalog file by hand.

mod entry;
mod merge;
mod store;
mod tags;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

pub use entry::{entry_key, CatalogEntry, DefaultValue, Location, NON_CONSTANT};
pub use merge::MergeStats;
pub use store::{CatalogError, KeyOrder};
pub use tags::ALL_TAG;

/// Ordered collection of catalog entries. Order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogEntry> {
        self.entries.iter()
    }

    pub fn push(&mut self, entry: CatalogEntry) {
        self.entries.push(entry);
    }

    /// Find the entry with the given key.
    pub fn get(&self, key: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.key() == key)
    }

    /// All keys present in the catalog.
    pub fn keys(&self) -> HashSet<String> {
        self.entries.iter().map(CatalogEntry::key).collect()
    }

    /// Entries of `other` whose key does not exist in this catalog, in `other`'s order.
    pub fn undocumented<'a>(&self, other: &'a Catalog) -> Vec<&'a CatalogEntry> {
        let known = self.keys();
        other
            .iter()
            .filter(|entry| !known.contains(&entry.key()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogEntry;
    type IntoIter = std::slice::Iter<'a, CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
