//! Insertion-ordered map.
//!
//! [`OrderedMap`] stores entries densely in insertion order and keeps a hash
//! index from key to position, so lookups are `O(1)` while iteration, moves
//! and positional inserts follow the visible order. Positional operations
//! shift the dense storage and re-index the affected tail.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// A map that remembers the order its keys were inserted in.
#[derive(Clone)]
pub struct OrderedMap<K, V> {
    /// Dense entries in visible order.
    entries: Vec<(K, V)>,
    /// Key to position in `entries`.
    index: HashMap<K, usize>,
}

impl<K: Hash + Eq + Clone, V> OrderedMap<K, V> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Creates an empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let i = *self.index.get(key)?;
        Some(&mut self.entries[i].1)
    }

    /// Position of `key` in iteration order.
    pub fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).copied()
    }

    /// Entry at `position` in iteration order.
    pub fn get_index(&self, position: usize) -> Option<(&K, &V)> {
        self.entries.get(position).map(|(k, v)| (k, v))
    }

    /// Inserts or replaces a value.
    ///
    /// A new key is appended at the end; an existing key keeps its position
    /// and the previous value is returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&i) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[i].1, value));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    /// Inserts a new key at `position`, shifting later entries back.
    ///
    /// Returns the pair unchanged if the key already exists or the position
    /// is past the end.
    pub fn insert_at(&mut self, position: usize, key: K, value: V) -> Result<(), (K, V)> {
        if self.index.contains_key(&key) || position > self.entries.len() {
            return Err((key, value));
        }
        self.entries.insert(position, (key, value));
        self.reindex_from(position);
        Ok(())
    }

    /// Removes `key`, returning its former position and value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<(usize, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let position = self.index.remove(key)?;
        let (_, value) = self.entries.remove(position);
        self.reindex_from(position);
        Some((position, value))
    }

    /// Renames `old` to `new` in place. Fails if `old` is absent or `new`
    /// is already taken.
    pub fn rename(&mut self, old: &K, new: K) -> bool {
        if self.index.contains_key(&new) {
            return false;
        }
        let Some(position) = self.index.remove(old) else {
            return false;
        };
        self.index.insert(new.clone(), position);
        self.entries[position].0 = new;
        true
    }

    /// Moves `key` so that it ends up at `position`.
    ///
    /// Returns the key's former position, or `None` if the key is absent or
    /// the position is out of range.
    pub fn move_to<Q>(&mut self, key: &Q, position: usize) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let from = *self.index.get(key)?;
        if position >= self.entries.len() {
            return None;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(position, entry);
        self.reindex_from(from.min(position));
        Some(from)
    }

    /// Stable sort by a comparator over `(key, value)` entries.
    ///
    /// Returns the applied permutation: `permutation[new] = old`.
    pub fn sort_by<F>(&mut self, mut compare: F) -> Vec<usize>
    where
        F: FnMut(&(K, V), &(K, V)) -> Ordering,
    {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|&a, &b| compare(&self.entries[a], &self.entries[b]));
        self.permute(&order);
        order
    }

    /// Reorders entries so that entry `permutation[i]` ends up at `i`.
    ///
    /// The permutation must have exactly [`len`](Self::len) distinct indices.
    pub fn permute(&mut self, permutation: &[usize]) {
        debug_assert_eq!(permutation.len(), self.entries.len());
        let mut slots: Vec<Option<(K, V)>> = self.entries.drain(..).map(Some).collect();
        for &old in permutation {
            if let Some(entry) = slots[old].take() {
                self.entries.push(entry);
            }
        }
        self.reindex_from(0);
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
        self.entries.iter_mut().map(|(k, v)| (&*k, v))
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    fn reindex_from(&mut self, start: usize) {
        for (i, (k, _)) in self.entries.iter().enumerate().skip(start) {
            if let Some(slot) = self.index.get_mut(k) {
                *slot = i;
            } else {
                self.index.insert(k.clone(), i);
            }
        }
    }
}

impl<K: Hash + Eq + Clone, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for OrderedMap<K, V> {
    /// Maps are equal when they hold equal entries in the same order.
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Eq, V: Eq> Eq for OrderedMap<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

impl<K: Hash + Eq + Clone, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<K: Hash + Eq + Clone, V> IntoIterator for OrderedMap<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Hash + Eq + Clone, V, const N: usize> From<[(K, V); N]> for OrderedMap<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}
