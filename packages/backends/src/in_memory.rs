//! In-memory store backed by an ordered map.

use std::collections::BTreeMap;
use std::fmt;

use keyshape_core_store::{Error, KeyCollection, Keys, ObjReader, ObjWriter};

/// A store that keeps everything in a `BTreeMap`.
///
/// Keys iterate in sorted order. Count and membership are answered by the map
/// instead of by a traversal.
///
/// # Example
///
/// ```rust
/// use keyshape_backends::InMemoryStore;
/// use keyshape_core_store::{KeyCollection, ObjReader, ObjWriter};
///
/// let mut store = InMemoryStore::new();
/// store.write("name".to_string(), "Alice".to_string()).unwrap();
///
/// assert_eq!(store.read(&"name".to_string()).unwrap(), "Alice");
/// assert_eq!(store.count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryStore<K, V> {
    data: BTreeMap<K, V>,
}

impl<K: Ord, V> InMemoryStore<K, V> {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
        }
    }

    /// Create a store with initial data.
    pub fn with_data(data: BTreeMap<K, V>) -> Self {
        Self { data }
    }

    pub fn as_map(&self) -> &BTreeMap<K, V> {
        &self.data
    }

    pub fn into_map(self) -> BTreeMap<K, V> {
        self.data
    }
}

impl<K: Ord, V> Default for InMemoryStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for InMemoryStore<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

impl<K: Ord + Clone, V> KeyCollection for InMemoryStore<K, V> {
    type Key = K;

    fn iter_keys(&self) -> Keys<'_, K> {
        Box::new(self.data.keys().cloned())
    }

    fn count(&self) -> usize {
        self.data.len()
    }

    fn contains_key(&self, key: &K) -> bool {
        self.data.contains_key(key)
    }
}

impl<K: Ord + fmt::Debug, V: Clone> ObjReader for InMemoryStore<K, V> {
    type Key = K;
    type Value = V;

    fn read(&self, key: &K) -> Result<V, Error> {
        self.data.get(key).cloned().ok_or_else(|| Error::not_found(key))
    }
}

impl<K: Ord + fmt::Debug, V> ObjWriter for InMemoryStore<K, V> {
    type Key = K;
    type Value = V;

    fn write(&mut self, key: K, value: V) -> Result<(), Error> {
        self.data.insert(key, value);
        Ok(())
    }

    fn delete(&mut self, key: &K) -> Result<(), Error> {
        match self.data.remove(key) {
            Some(_) => Ok(()),
            None => Err(Error::not_found(key)),
        }
    }
}
