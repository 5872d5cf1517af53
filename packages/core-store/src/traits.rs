//! Capability traits: KeyCollection, ObjReader, ObjWriter, and the composed
//! ObjSource and ObjStore contracts.
//!
//! A backend implements the primitives (`iter_keys`, `read`, `write`,
//! `delete`). Everything else is derived here from those primitives. The
//! derived operations are correct but not fast; a backend with a native way
//! to count or test membership overrides them.

use std::collections::BTreeMap;

use crate::Error;

/// A fresh traversal of a key collection.
pub type Keys<'a, K> = Box<dyn Iterator<Item = K> + 'a>;

/// The key type of a collection.
pub type KeyOf<S> = <S as KeyCollection>::Key;

/// The value type of a reader.
pub type ValueOf<S> = <S as ObjReader>::Value;

/// An iterable set of keys.
///
/// Only `iter_keys` is required. `count` and `contains_key` are derived from
/// it and always agree with what iteration currently yields.
///
/// # Example
///
/// ```rust
/// use keyshape_core_store::{KeyCollection, Keys};
///
/// struct Evens(u32);
///
/// impl KeyCollection for Evens {
///     type Key = u32;
///
///     fn iter_keys(&self) -> Keys<'_, u32> {
///         Box::new((0..self.0).filter(|n| n % 2 == 0))
///     }
/// }
///
/// let evens = Evens(10);
/// assert_eq!(evens.count(), 5);
/// assert!(evens.contains_key(&4));
/// assert!(!evens.contains_key(&5));
/// ```
pub trait KeyCollection {
    type Key: PartialEq;

    /// Start a new traversal of the keys.
    ///
    /// Every call starts from the beginning. Whether the traversal is eager
    /// or lazy is up to the implementation.
    fn iter_keys(&self) -> Keys<'_, Self::Key>;

    /// Number of keys in the collection.
    ///
    /// Drains a full traversal, so this is O(n). Override it when the backend
    /// knows its size.
    fn count(&self) -> usize {
        let mut count = 0;
        for _ in self.iter_keys() {
            count += 1;
        }
        count
    }

    /// Whether `key` is in the collection.
    ///
    /// Scans a traversal until a match is found, so this is O(n) in the worst
    /// case. Override it when the backend can look a key up directly.
    fn contains_key(&self, key: &Self::Key) -> bool {
        self.iter_keys().any(|k| k == *key)
    }
}

/// Retrieves the object stored under a key.
pub trait ObjReader {
    type Key;
    type Value;

    /// Read the value for `key`.
    ///
    /// # Returns
    ///
    /// * `Ok(value)` - The value stored under `key`.
    /// * `Err(Error::NotFound)` - `key` is absent.
    /// * `Err(_)` - Any other backend failure.
    fn read(&self, key: &Self::Key) -> Result<Self::Value, Error>;

    /// Whether `key` can be read.
    ///
    /// Fetches the whole value and discards it, so it may be expensive.
    /// `NotFound` becomes `false`; other errors propagate.
    fn exists(&self, key: &Self::Key) -> Result<bool, Error> {
        match self.read(key) {
            Ok(_) => Ok(true),
            Err(Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Stores and removes objects under keys.
pub trait ObjWriter {
    type Key;
    type Value;

    /// Associate `value` with `key`, replacing any previous value.
    fn write(&mut self, key: Self::Key, value: Self::Value) -> Result<(), Error>;

    /// Remove the value for `key`.
    ///
    /// Fails with `Error::NotFound` if `key` is absent.
    fn delete(&mut self, key: &Self::Key) -> Result<(), Error>;
}

/// A read-only mapping: a key collection whose keys can be read.
///
/// Automatically implemented for any type that implements both
/// [`KeyCollection`] and [`ObjReader`] over the same key type. Every derived
/// operation walks `iter_keys` in its current order, so items, values and
/// keys come out in the same order.
pub trait ObjSource: KeyCollection + ObjReader<Key = <Self as KeyCollection>::Key> {
    /// Lazily pair each key with its value.
    fn items(&self) -> Box<dyn Iterator<Item = Result<(KeyOf<Self>, ValueOf<Self>), Error>> + '_> {
        Box::new(self.iter_keys().map(move |key| {
            let value = self.read(&key)?;
            Ok((key, value))
        }))
    }

    /// Lazily read each value.
    fn values(&self) -> Box<dyn Iterator<Item = Result<ValueOf<Self>, Error>> + '_> {
        Box::new(self.iter_keys().map(move |key| self.read(&key)))
    }

    /// Read `key`, falling back to `default` if it is absent.
    fn get_or(&self, key: &KeyOf<Self>, default: ValueOf<Self>) -> Result<ValueOf<Self>, Error> {
        match self.read(key) {
            Ok(value) => Ok(value),
            Err(Error::NotFound { .. }) => Ok(default),
            Err(e) => Err(e),
        }
    }

    /// Structural equality: the same key set, and equal values for every key.
    ///
    /// Values need a total equality relation.
    fn source_eq<O>(&self, other: &O) -> Result<bool, Error>
    where
        O: ObjSource
            + KeyCollection<Key = KeyOf<Self>>
            + ObjReader<Key = KeyOf<Self>, Value = ValueOf<Self>>
            + ?Sized,
        ValueOf<Self>: Eq,
    {
        if self.count() != other.count() {
            return Ok(false);
        }

        for item in self.items() {
            let (key, value) = item?;
            match other.read(&key) {
                Ok(theirs) if theirs == value => {}
                Ok(_) | Err(Error::NotFound { .. }) => return Ok(false),
                Err(e) => return Err(e),
            }
        }

        Ok(true)
    }

    /// Read everything into an ordered snapshot.
    fn to_map(&self) -> Result<BTreeMap<KeyOf<Self>, ValueOf<Self>>, Error>
    where
        KeyOf<Self>: Ord,
    {
        self.items().collect()
    }
}

impl<T> ObjSource for T where T: KeyCollection + ObjReader<Key = <T as KeyCollection>::Key> + ?Sized {}

/// A mutable mapping: a source that can also be written to.
///
/// Automatically implemented for any [`ObjSource`] that is also an
/// [`ObjWriter`] over the same key and value types.
///
/// There is deliberately no way to empty a store in one call. Clearing is
/// written out at the call site:
///
/// ```rust
/// use keyshape_core_store::{Error, KeyCollection, ObjStore, ObjWriter};
///
/// fn delete_everything<S: ObjStore>(store: &mut S) -> Result<(), Error> {
///     let keys: Vec<_> = store.iter_keys().collect();
///     for key in keys {
///         store.delete(&key)?;
///     }
///     Ok(())
/// }
/// ```
///
/// ```compile_fail
/// use keyshape_core_store::ObjStore;
///
/// fn wipe<S: ObjStore>(store: &mut S) {
///     store.clear();
/// }
/// ```
pub trait ObjStore:
    ObjSource
    + ObjWriter<Key = <Self as KeyCollection>::Key, Value = <Self as ObjReader>::Value>
{
}

impl<T> ObjStore for T where
    T: ObjSource
        + ObjWriter<Key = <T as KeyCollection>::Key, Value = <T as ObjReader>::Value>
        + ?Sized
{
}

// Blanket implementations for references and boxes

impl<T: KeyCollection + ?Sized> KeyCollection for &T {
    type Key = T::Key;

    fn iter_keys(&self) -> Keys<'_, Self::Key> {
        (**self).iter_keys()
    }

    fn count(&self) -> usize {
        (**self).count()
    }

    fn contains_key(&self, key: &Self::Key) -> bool {
        (**self).contains_key(key)
    }
}

impl<T: KeyCollection + ?Sized> KeyCollection for &mut T {
    type Key = T::Key;

    fn iter_keys(&self) -> Keys<'_, Self::Key> {
        (**self).iter_keys()
    }

    fn count(&self) -> usize {
        (**self).count()
    }

    fn contains_key(&self, key: &Self::Key) -> bool {
        (**self).contains_key(key)
    }
}

impl<T: KeyCollection + ?Sized> KeyCollection for Box<T> {
    type Key = T::Key;

    fn iter_keys(&self) -> Keys<'_, Self::Key> {
        self.as_ref().iter_keys()
    }

    fn count(&self) -> usize {
        self.as_ref().count()
    }

    fn contains_key(&self, key: &Self::Key) -> bool {
        self.as_ref().contains_key(key)
    }
}

impl<T: ObjReader + ?Sized> ObjReader for &T {
    type Key = T::Key;
    type Value = T::Value;

    fn read(&self, key: &Self::Key) -> Result<Self::Value, Error> {
        (**self).read(key)
    }
}

impl<T: ObjReader + ?Sized> ObjReader for &mut T {
    type Key = T::Key;
    type Value = T::Value;

    fn read(&self, key: &Self::Key) -> Result<Self::Value, Error> {
        (**self).read(key)
    }
}

impl<T: ObjReader + ?Sized> ObjReader for Box<T> {
    type Key = T::Key;
    type Value = T::Value;

    fn read(&self, key: &Self::Key) -> Result<Self::Value, Error> {
        self.as_ref().read(key)
    }
}

impl<T: ObjWriter + ?Sized> ObjWriter for &mut T {
    type Key = T::Key;
    type Value = T::Value;

    fn write(&mut self, key: Self::Key, value: Self::Value) -> Result<(), Error> {
        (**self).write(key, value)
    }

    fn delete(&mut self, key: &Self::Key) -> Result<(), Error> {
        (**self).delete(key)
    }
}

impl<T: ObjWriter + ?Sized> ObjWriter for Box<T> {
    type Key = T::Key;
    type Value = T::Value;

    fn write(&mut self, key: Self::Key, value: Self::Value) -> Result<(), Error> {
        self.as_mut().write(key, value)
    }

    fn delete(&mut self, key: &Self::Key) -> Result<(), Error> {
        self.as_mut().delete(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::{BTreeSet, HashMap};

    /// Exposes only iteration, and counts how many traversals were started.
    struct IterOnly {
        keys: Vec<String>,
        traversals: Cell<usize>,
    }

    impl IterOnly {
        fn new(keys: &[&str]) -> Self {
            Self {
                keys: keys.iter().map(|k| k.to_string()).collect(),
                traversals: Cell::new(0),
            }
        }
    }

    impl KeyCollection for IterOnly {
        type Key = String;

        fn iter_keys(&self) -> Keys<'_, String> {
            self.traversals.set(self.traversals.get() + 1);
            Box::new(self.keys.iter().cloned())
        }
    }

    /// Simple in-memory store for testing.
    #[derive(Default)]
    struct TestStore {
        order: Vec<String>,
        data: HashMap<String, i64>,
    }

    impl TestStore {
        fn with(pairs: &[(&str, i64)]) -> Self {
            let mut store = Self::default();
            for (k, v) in pairs {
                store.write(k.to_string(), *v).unwrap();
            }
            store
        }
    }

    impl KeyCollection for TestStore {
        type Key = String;

        fn iter_keys(&self) -> Keys<'_, String> {
            Box::new(self.order.iter().cloned())
        }
    }

    impl ObjReader for TestStore {
        type Key = String;
        type Value = i64;

        fn read(&self, key: &String) -> Result<i64, Error> {
            self.data.get(key).copied().ok_or_else(|| Error::not_found(key))
        }
    }

    impl ObjWriter for TestStore {
        type Key = String;
        type Value = i64;

        fn write(&mut self, key: String, value: i64) -> Result<(), Error> {
            if self.data.insert(key.clone(), value).is_none() {
                self.order.push(key);
            }
            Ok(())
        }

        fn delete(&mut self, key: &String) -> Result<(), Error> {
            self.data.remove(key).ok_or_else(|| Error::not_found(key))?;
            self.order.retain(|k| k != key);
            Ok(())
        }
    }

    #[test]
    fn derived_count_and_membership_agree_with_iteration() {
        let keys = IterOnly::new(&["a", "b", "c", "a2"]);
        let reference: BTreeSet<String> = keys.iter_keys().collect();

        assert_eq!(keys.count(), reference.len());
        for k in ["a", "b", "c", "a2", "zz", ""] {
            assert_eq!(keys.contains_key(&k.to_string()), reference.contains(k), "key {}", k);
        }
    }

    #[test]
    fn every_derived_call_starts_a_fresh_traversal() {
        let keys = IterOnly::new(&["a", "b"]);
        keys.count();
        keys.contains_key(&"b".to_string());
        keys.count();
        assert_eq!(keys.traversals.get(), 3);
    }

    #[test]
    fn derivations_follow_live_iteration() {
        let mut store = TestStore::with(&[("a", 1)]);
        assert_eq!(store.count(), 1);
        store.write("b".to_string(), 2).unwrap();
        assert_eq!(store.count(), 2);
        assert!(store.contains_key(&"b".to_string()));
        store.delete(&"a".to_string()).unwrap();
        assert!(!store.contains_key(&"a".to_string()));
    }

    #[test]
    fn empty_collection() {
        let keys = IterOnly::new(&[]);
        assert_eq!(keys.count(), 0);
        assert!(!keys.contains_key(&"a".to_string()));
    }

    #[test]
    fn read_missing_is_not_found() {
        let store = TestStore::with(&[("a", 1)]);
        assert!(store.read(&"nope".to_string()).unwrap_err().is_not_found());
        assert!(store.exists(&"a".to_string()).unwrap());
        assert!(!store.exists(&"nope".to_string()).unwrap());
    }

    #[test]
    fn write_overwrites_and_delete_missing_fails() {
        let mut store = TestStore::with(&[("a", 1)]);
        store.write("a".to_string(), 5).unwrap();
        assert_eq!(store.read(&"a".to_string()).unwrap(), 5);
        assert_eq!(store.count(), 1);

        store.delete(&"a".to_string()).unwrap();
        assert!(store.delete(&"a".to_string()).unwrap_err().is_not_found());
    }

    #[test]
    fn items_and_values_follow_key_order() {
        let store = TestStore::with(&[("z", 26), ("a", 1), ("m", 13)]);
        let keys: Vec<String> = store.iter_keys().collect();
        let items: Vec<(String, i64)> = store.items().collect::<Result<_, _>>().unwrap();
        let values: Vec<i64> = store.values().collect::<Result<_, _>>().unwrap();

        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(
            items,
            vec![("z".to_string(), 26), ("a".to_string(), 1), ("m".to_string(), 13)]
        );
        assert_eq!(values, vec![26, 1, 13]);
    }

    #[test]
    fn get_or_falls_back_only_on_missing() {
        let store = TestStore::with(&[("a", 1)]);
        assert_eq!(store.get_or(&"a".to_string(), 0).unwrap(), 1);
        assert_eq!(store.get_or(&"b".to_string(), 0).unwrap(), 0);
    }

    #[test]
    fn structural_equality() {
        let a = TestStore::with(&[("x", 1), ("y", 2)]);
        let same_different_order = TestStore::with(&[("y", 2), ("x", 1)]);
        let other_value = TestStore::with(&[("x", 1), ("y", 3)]);
        let other_key = TestStore::with(&[("x", 1), ("z", 2)]);
        let extra_key = TestStore::with(&[("x", 1), ("y", 2), ("z", 3)]);

        assert!(a.source_eq(&same_different_order).unwrap());
        assert!(same_different_order.source_eq(&a).unwrap());
        assert!(!a.source_eq(&other_value).unwrap());
        assert!(!a.source_eq(&other_key).unwrap());
        assert!(!a.source_eq(&extra_key).unwrap());
        assert!(!extra_key.source_eq(&a).unwrap());
        assert!(TestStore::default().source_eq(&TestStore::default()).unwrap());
    }

    #[test]
    fn to_map_snapshot() {
        let store = TestStore::with(&[("b", 2), ("a", 1)]);
        let map = store.to_map().unwrap();
        assert_eq!(map.into_iter().collect::<Vec<_>>(), vec![("a".to_string(), 1), ("b".to_string(), 2)]);
    }

    #[test]
    fn clearing_is_explicit_per_key() {
        let mut store = TestStore::with(&[("a", 1), ("b", 2), ("c", 3)]);
        let keys: Vec<String> = store.iter_keys().collect();
        for key in keys {
            store.delete(&key).unwrap();
        }
        assert_eq!(store.count(), 0);
    }

    fn generic_count<S: ObjStore>(store: &S) -> usize {
        store.count()
    }

    #[test]
    fn references_and_boxes_are_stores() {
        let mut store = TestStore::with(&[("a", 1)]);
        {
            let by_ref = &mut store;
            by_ref.write("b".to_string(), 2).unwrap();
            assert_eq!(generic_count(&by_ref), 2);
        }

        let boxed: Box<TestStore> = Box::new(store);
        assert_eq!(generic_count(&boxed), 2);
        assert_eq!(boxed.read(&"b".to_string()).unwrap(), 2);
    }
}
