//! Duplicate-free item collection.

use std::collections::HashSet;

use super::{Category, DigestItem, Fingerprint};

/// Mutable accumulator owned by the aggregator.
#[derive(Debug, Default)]
pub struct ItemSetBuilder {
    seen: HashSet<Fingerprint>,
    items: Vec<DigestItem>,
}

impl ItemSetBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item unless any of its fingerprints was already seen.
    ///
    /// Returns `false` when the item was dropped as a duplicate. A kept item
    /// records all of its keys.
    pub fn insert(&mut self, item: DigestItem) -> bool {
        if item.fingerprints().any(|key| self.seen.contains(key)) {
            return false;
        }
        self.seen.extend(item.fingerprints().cloned());
        self.items.push(item);
        true
    }

    /// Number of unique items so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Freeze into a read-only [`ItemSet`].
    #[must_use]
    pub fn seal(self) -> ItemSet {
        ItemSet { items: self.items }
    }
}

/// Sealed, read-only set of unique items in first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemSet {
    items: Vec<DigestItem>,
}

impl ItemSet {
    /// An empty set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a set from items, dropping later duplicates.
    pub fn from_items(items: impl IntoIterator<Item = DigestItem>) -> Self {
        let mut builder = ItemSetBuilder::new();
        for item in items {
            builder.insert(item);
        }
        builder.seal()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &DigestItem> {
        self.items.iter()
    }

    /// Items of one category, in insertion order.
    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &DigestItem> {
        self.items.iter().filter(move |item| item.category() == category)
    }

    /// Number of items in one category.
    #[must_use]
    pub fn count(&self, category: Category) -> usize {
        self.by_category(category).count()
    }
}

impl<'a> IntoIterator for &'a ItemSet {
    type Item = &'a DigestItem;
    type IntoIter = std::slice::Iter<'a, DigestItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str, stars: u64) -> DigestItem {
        DigestItem::new(Category::Repository, name, format!("https://github.com/{name}"))
            .unwrap()
            .with_identity(name)
            .with_metric(Some(stars))
    }

    fn paper(title: &str, url: &str) -> DigestItem {
        DigestItem::new(Category::Paper, title, url).unwrap()
    }

    #[test]
    fn test_first_occurrence_wins() {
        let set = ItemSet::from_items([repo("a/one", 1), repo("b/two", 2), repo("A/One", 99)]);

        assert_eq!(set.len(), 2);
        let names: Vec<_> = set.iter().map(DigestItem::title).collect();
        assert_eq!(names, vec!["a/one", "b/two"]);
        assert_eq!(set.iter().next().unwrap().metric(), Some(1));
    }

    #[test]
    fn test_insert_reports_duplicates() {
        let mut builder = ItemSetBuilder::new();
        assert!(builder.insert(paper("Title", "https://x/1")));
        assert!(!builder.insert(paper("Title", "https://x/1")));
        assert!(builder.insert(paper("Title", "https://x/2")));
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_identity_and_content_keys_both_dedup() {
        let keyed = DigestItem::new(Category::Repository, "Foo/bar", "https://x/Foo/bar")
            .unwrap()
            .with_identity("Foo/bar")
            .with_metric(Some(42));
        let plain = DigestItem::new(Category::Repository, "Foo/bar", "https://x/Foo/bar").unwrap();

        // Either order: the shared content key merges them.
        let set = ItemSet::from_items([keyed.clone(), plain.clone()]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next().unwrap().metric(), Some(42));

        let set = ItemSet::from_items([plain, keyed]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next().unwrap().metric(), None);
    }

    #[test]
    fn test_by_category_preserves_order() {
        let set = ItemSet::from_items([
            paper("P1", "https://x/1"),
            repo("r/1", 5),
            paper("P2", "https://x/2"),
            repo("r/2", 6),
        ]);

        let papers: Vec<_> = set.by_category(Category::Paper).map(DigestItem::title).collect();
        assert_eq!(papers, vec!["P1", "P2"]);
        assert_eq!(set.count(Category::Repository), 2);
    }

    #[test]
    fn test_empty_set() {
        let set = ItemSet::empty();
        assert!(set.is_empty());
        for category in Category::all() {
            assert_eq!(set.count(*category), 0);
        }
    }
}
