use std::hash::Hash;

use indexmap::IndexSet;

/// A set that remembers first-insertion order.
///
/// Re-adding an item keeps its original position; deleting an item closes the
/// gap without reordering the rest.
#[derive(Debug, Clone)]
pub struct OrderedSet<T: Hash + Eq> {
    items: IndexSet<T>,
}

impl<T: Hash + Eq> Default for OrderedSet<T> {
    fn default() -> Self {
        Self {
            items: IndexSet::new(),
        }
    }
}

impl<T: Hash + Eq> OrderedSet<T> {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item; returns whether it was new.
    pub fn add(&mut self, item: T) -> bool {
        self.items.insert(item)
    }

    /// Remove an item; returns whether it was present.
    pub fn delete<Q>(&mut self, item: &Q) -> bool
    where
        T: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.items.shift_remove(item)
    }

    /// Whether the set holds `item`.
    pub fn contains<Q>(&self, item: &Q) -> bool
    where
        T: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.items.contains(item)
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in first-insertion order.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Take the items in first-insertion order.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items.into_iter().collect()
    }
}
