//! A read-side view that hides part of a source's key set.

use std::fmt;

use crate::traits::{KeyCollection, KeyOf, Keys, ObjReader, ObjSource, ValueOf};
use crate::Error;

/// Restricts a source to the keys accepted by a predicate.
///
/// Iteration, count and membership only see accepted keys. Reading a hidden
/// key fails with `NotFound` even if the inner source holds it.
///
/// ```rust
/// use keyshape_core_store::{ExplicitKeys, FilteredKeys, KeyCollection};
///
/// let keys = ExplicitKeys::new(vec!["a.json", "b.csv", "c.json"]);
/// let json = FilteredKeys::new(keys, |k: &&str| k.ends_with(".json"));
/// assert_eq!(json.iter_keys().collect::<Vec<_>>(), vec!["a.json", "c.json"]);
/// assert!(!json.contains_key(&"b.csv"));
/// ```
pub struct FilteredKeys<S, F> {
    inner: S,
    filt: F,
}

impl<S, F> FilteredKeys<S, F> {
    pub fn new(inner: S, filt: F) -> Self {
        Self { inner, filt }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: fmt::Debug, F> fmt::Debug for FilteredKeys<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteredKeys")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<S, F> KeyCollection for FilteredKeys<S, F>
where
    S: KeyCollection,
    F: Fn(&S::Key) -> bool,
{
    type Key = S::Key;

    fn iter_keys(&self) -> Keys<'_, S::Key> {
        Box::new(self.inner.iter_keys().filter(move |k| (self.filt)(k)))
    }

    fn contains_key(&self, key: &S::Key) -> bool {
        (self.filt)(key) && self.inner.contains_key(key)
    }
}

impl<S, F> ObjReader for FilteredKeys<S, F>
where
    S: ObjSource,
    F: Fn(&KeyOf<S>) -> bool,
    KeyOf<S>: fmt::Debug,
{
    type Key = KeyOf<S>;
    type Value = ValueOf<S>;

    fn read(&self, key: &KeyOf<S>) -> Result<ValueOf<S>, Error> {
        if !(self.filt)(key) {
            return Err(Error::not_found(key));
        }
        self.inner.read(key)
    }
}
