//! Tag filtering and presence tagging.

use crate::env::ExistenceCheck;

use super::Catalog;

/// Reserved tag marking an entry as relevant to every deployable unit.
pub const ALL_TAG: &str = "__all__";

impl Catalog {
    /// Entries tagged with any of `tags`, or with [`ALL_TAG`].
    ///
    /// An empty tag list selects the whole catalog. Catalog order is kept.
    pub fn filter_by_tag<S: AsRef<str>>(&self, tags: &[S]) -> Catalog {
        if tags.is_empty() {
            return self.clone();
        }

        let entries = self
            .entries
            .iter()
            .filter(|entry| {
                entry.tags.contains(ALL_TAG) || tags.iter().any(|t| entry.tags.contains(t.as_ref()))
            })
            .cloned()
            .collect();
        Catalog::from_entries(entries)
    }

    /// Add `tags` to every entry whose variable passes `exists`.
    ///
    /// Tags already present are skipped, so applying the same tags twice
    /// changes nothing. Returns the number of tags inserted.
    pub fn tag_present<S, E>(&mut self, tags: &[S], exists: &E) -> usize
    where
        S: AsRef<str>,
        E: ExistenceCheck + ?Sized,
    {
        if tags.is_empty() {
            return 0;
        }

        let mut inserted = 0;
        for entry in &mut self.entries {
            if !exists.exists(&entry.name) {
                continue;
            }
            for tag in tags {
                if entry.tags.insert(tag.as_ref().to_string()) {
                    inserted += 1;
                }
            }
        }
        inserted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;

    fn tagged(name: &str, tags: &[&str]) -> CatalogEntry {
        let mut entry = CatalogEntry::new(name, false, None);
        entry.tags.extend(tags.iter().map(|t| t.to_string()));
        entry
    }

    fn names(catalog: &Catalog) -> Vec<&str> {
        catalog.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_filter_without_tags_returns_everything() {
        let catalog = Catalog::from_entries(vec![tagged("A", &["api"]), tagged("B", &[])]);
        let no_tags: [&str; 0] = [];
        assert_eq!(catalog.filter_by_tag(&no_tags), catalog);
    }

    #[test]
    fn test_filter_keeps_wildcard_and_order() {
        let catalog = Catalog::from_entries(vec![
            tagged("A", &["worker"]),
            tagged("B", &[ALL_TAG]),
            tagged("C", &["api", "worker"]),
            tagged("D", &["api"]),
        ]);

        assert_eq!(names(&catalog.filter_by_tag(&["api"])), vec!["B", "C", "D"]);
        assert_eq!(names(&catalog.filter_by_tag(&["nothing"])), vec!["B"]);
    }

    #[test]
    fn test_tag_present_is_idempotent() {
        let mut catalog = Catalog::from_entries(vec![tagged("SET", &["api"]), tagged("UNSET", &[])]);
        let exists = |name: &str| name == "SET";

        assert_eq!(catalog.tag_present(&["prod", "api"], &exists), 1);
        assert_eq!(catalog.tag_present(&["prod"], &exists), 0);

        let set = &catalog.entries()[0];
        assert_eq!(set.tags.iter().collect::<Vec<_>>(), vec!["api", "prod"]);
        assert!(catalog.entries()[1].tags.is_empty());
    }
}
