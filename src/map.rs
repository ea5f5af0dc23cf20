//! Hash map data structure.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::slice;

/// A hash map that remembers insertion order.
///
/// To simplify the implementation, the key type `K` is required to be `Copy`.
/// This makes it easier to store in both the vector and the map without
/// worrying about references or cloning.
pub struct OrderMap<K, V> {
    /// Entries in insertion order.
    entries: Vec<(K, V)>,
    /// Position of each key in `entries`.
    index: HashMap<K, usize>,
}

/// Iterator over the entries of an `OrderMap`, in insertion order.
pub struct Iter<'a, K: 'a, V: 'a>(slice::Iter<'a, (K, V)>);

impl<K, V> PartialEq for OrderMap<K, V>
where
    K: Eq + Hash,
    V: PartialEq,
{
    fn eq(&self, other: &OrderMap<K, V>) -> bool {
        self.entries == other.entries
    }
}

impl<K, V> Eq for OrderMap<K, V>
where
    K: Eq + Hash,
    V: Eq,
{
}

impl<K, V> fmt::Debug for OrderMap<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

impl<K, V> Default for OrderMap<K, V>
where
    K: Eq + Hash + Copy,
{
    fn default() -> OrderMap<K, V> {
        OrderMap::new()
    }
}

impl<K, V> OrderMap<K, V>
where
    K: Eq + Hash + Copy,
{
    /// Creates a new `OrderMap`.
    pub fn new() -> OrderMap<K, V> {
        OrderMap {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Checks if the map contains a key.
    pub fn contains(&self, k: K) -> bool {
        self.index.contains_key(&k)
    }

    /// Gets a value from the map by key.
    pub fn get(&self, k: K) -> Option<&V> {
        self.index.get(&k).map(|&i| &self.entries[i].1)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns an iterator over the entries, in insertion order.
    pub fn iter(&self) -> Iter<K, V> {
        Iter(self.entries.iter())
    }

    /// Inserts an entry into the map.
    ///
    /// Replacing the value of an existing key keeps its original position.
    pub fn insert<T>(&mut self, k: K, v: T)
    where
        T: Into<V>,
    {
        let value = v.into();
        match self.index.get(&k) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(k, self.entries.len());
                self.entries.push((k, value));
            }
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V>
where
    K: Copy,
{
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<(K, &'a V)> {
        self.0.next().map(|(k, v)| (*k, v))
    }
}
