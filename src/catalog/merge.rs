//! Reconciling a fresh scan with a persisted catalog.

use std::collections::{HashMap, HashSet};

use super::{Catalog, CatalogEntry, Location};

/// Counters reported after a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Entries whose key was new to the catalog.
    pub added: usize,
    /// (file, line) pairs appended to entries that already existed.
    pub updated: usize,
}

impl Catalog {
    /// Merge a freshly scanned catalog into this one.
    ///
    /// Existing entries gain any new locations, packages and tags; unknown
    /// keys are appended. Nothing is ever removed, so entries that vanished
    /// from the code stay in the catalog.
    pub fn merge(&mut self, fresh: Catalog) -> MergeStats {
        let mut stats = MergeStats::default();
        let mut index: HashMap<String, usize> = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (entry.key(), idx))
            .collect();

        for mut incoming in fresh.entries {
            let key = incoming.key();
            match index.get(&key) {
                Some(&idx) => {
                    stats.updated += merge_into(&mut self.entries[idx], incoming);
                }
                None => {
                    dedup_locations(&mut incoming.locations);
                    index.insert(key, self.entries.len());
                    self.entries.push(incoming);
                    stats.added += 1;
                }
            }
        }

        stats
    }
}

/// Union `incoming` into `existing`, returning how many locations were new.
fn merge_into(existing: &mut CatalogEntry, incoming: CatalogEntry) -> usize {
    let mut seen: HashSet<Location> = existing.locations.iter().cloned().collect();
    let mut added = 0;

    for location in incoming.locations {
        if seen.insert(location.clone()) {
            existing.locations.push(location);
            added += 1;
        }
    }

    existing.packages.extend(incoming.packages);
    existing.tags.extend(incoming.tags);

    added
}

fn dedup_locations(locations: &mut Vec<Location>) {
    let mut seen = HashSet::new();
    locations.retain(|location| seen.insert(location.clone()));
}
