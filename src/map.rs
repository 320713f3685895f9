//! An ordered map implemented on top of an AVL search tree.

use std::cmp::Ordering;
use std::fmt;
use std::iter::FromIterator;

use crate::error::Error;
use crate::tree::{Comparator, InOrder, NaturalOrder, SearchTree};

/// A key-value pair stored in an [`AvlTreeMap`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry<K, V> {
    key: K,
    value: V,
}

impl<K, V> Entry<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}

/// Orders entries by their keys only. Values never take part in comparisons,
/// so inserting an entry with a present key replaces that key's value.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyOrder<C>(C);

impl<K, V, C> Comparator<Entry<K, V>> for KeyOrder<C>
where
    C: Comparator<K>,
{
    fn compare(&self, lhs: &Entry<K, V>, rhs: &Entry<K, V>) -> Ordering {
        self.0.compare(&lhs.key, &rhs.key)
    }
}

/// An ordered map from keys to values, backed by an AVL search tree over its
/// entries. Keys are sorted according to the comparator given at
/// construction, or their natural order if none is provided.
///
/// ```
/// use avl_search::AvlTreeMap;
/// let mut map = AvlTreeMap::new();
/// map.insert(0, "zero");
/// map.insert(1, "one");
/// map.insert(2, "two");
/// assert_eq!(map.get(&1), Some(&"one"));
/// map.remove(&1);
/// assert!(map.get(&1).is_none());
/// ```
#[derive(Clone)]
pub struct AvlTreeMap<K, V, C = NaturalOrder> {
    comparator: C,
    tree: SearchTree<Entry<K, V>, KeyOrder<C>>,
}

impl<K: Ord, V> AvlTreeMap<K, V> {
    /// Creates an empty map ordered by the keys' natural order.
    /// No memory is allocated until the first entry is inserted.
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<K: Ord, V> Default for AvlTreeMap<K, V> {
    /// Creates an empty map ordered by the keys' natural order.
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C: Comparator<K>> AvlTreeMap<K, V, C> {
    /// Creates an empty map with the given key order.
    pub fn with_comparator(comparator: C) -> Self
    where
        C: Clone,
    {
        Self {
            tree: SearchTree::with_comparator(KeyOrder(comparator.clone())),
            comparator,
        }
    }

    /// Returns the key ordering in force for this map.
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Returns true if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Clears the map, releasing all entries.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns a reference to the value associated with the key.
    pub fn get(&self, key: &K) -> Option<&V> {
        let comparator = &self.comparator;
        self.tree
            .search_by(|entry| comparator.compare(key, &entry.key))
            .map(Entry::value)
    }

    /// Returns references to the stored key and the value associated with it.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let comparator = &self.comparator;
        self.tree
            .search_by(|entry| comparator.compare(key, &entry.key))
            .map(|entry| (&entry.key, &entry.value))
    }

    /// Returns true if the map has a value associated with the key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Inserts a key-value pair into the map.
    /// Returns the previous value at the key if one was present.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.tree
            .insert(Entry::new(key, value))
            .map(|entry| entry.value)
    }

    /// Removes a key from the map.
    /// Returns the value at the key if the key was previously in the map.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the map, returning the stored key and value if the
    /// key was previously in the map.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let comparator = &self.comparator;
        self.tree
            .delete_by(|entry| comparator.compare(key, &entry.key))
            .map(Entry::into_pair)
    }

    /// Returns the entry with the smallest key.
    pub fn minimum(&self) -> Result<(&K, &V), Error> {
        self.tree.minimum().map(|entry| (&entry.key, &entry.value))
    }

    /// Returns the entry with the greatest key.
    pub fn maximum(&self) -> Result<(&K, &V), Error> {
        self.tree.maximum().map(|entry| (&entry.key, &entry.value))
    }

    /// Gets an iterator over the entries of the map in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            entries: self.tree.in_order(),
        }
    }

    /// Gets an iterator over the keys of the map in ascending order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys {
            entries: self.tree.in_order(),
        }
    }

    /// Gets an iterator over the values of the map in ascending key order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values {
            entries: self.tree.in_order(),
        }
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        self.tree.check_consistency()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTreeMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<K, V, C: Comparator<K>> Extend<(K, V)> for AvlTreeMap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C: Comparator<K>> fmt::Debug for AvlTreeMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq, C: Comparator<K>> PartialEq for AvlTreeMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C: Comparator<K>> Eq for AvlTreeMap<K, V, C> {}

impl<'a, K, V, C: Comparator<K>> IntoIterator for &'a AvlTreeMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the entries of a map in ascending key order.
pub struct Iter<'a, K, V> {
    entries: InOrder<'a, Entry<K, V>>,
}

// Auto derived clone would have invalid type bounds of K: Clone, V: Clone
impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(|entry| (&entry.key, &entry.value))
    }
}

/// An iterator over the keys of a map in ascending order.
pub struct Keys<'a, K, V> {
    entries: InOrder<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(Entry::key)
    }
}

/// An iterator over the values of a map in ascending key order.
pub struct Values<'a, K, V> {
    entries: InOrder<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(Entry::value)
    }
}
