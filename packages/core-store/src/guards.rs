//! Write guards: wrappers that refuse some writes.

use std::fmt;

use crate::error::Operation;
use crate::traits::{KeyCollection, KeyOf, Keys, ObjReader, ObjStore, ObjWriter, ValueOf};
use crate::Error;

/// Wraps a reader to reject all writes and deletes.
///
/// The refusal does not depend on the key or on the store's contents.
#[derive(Debug, Clone)]
pub struct ReadOnly<S> {
    inner: S,
}

impl<S> ReadOnly<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: KeyCollection> KeyCollection for ReadOnly<S> {
    type Key = S::Key;

    fn iter_keys(&self) -> Keys<'_, S::Key> {
        self.inner.iter_keys()
    }

    fn count(&self) -> usize {
        self.inner.count()
    }

    fn contains_key(&self, key: &S::Key) -> bool {
        self.inner.contains_key(key)
    }
}

impl<S: ObjReader> ObjReader for ReadOnly<S> {
    type Key = S::Key;
    type Value = S::Value;

    fn read(&self, key: &S::Key) -> Result<S::Value, Error> {
        self.inner.read(key)
    }
}

impl<S: ObjReader> ObjWriter for ReadOnly<S> {
    type Key = S::Key;
    type Value = S::Value;

    fn write(&mut self, _key: S::Key, _value: S::Value) -> Result<(), Error> {
        Err(Error::unsupported(Operation::Write))
    }

    fn delete(&mut self, _key: &S::Key) -> Result<(), Error> {
        Err(Error::unsupported(Operation::Delete))
    }
}

/// Wraps a store so existing keys can't be written again.
///
/// Writing a key the store already holds fails with `OverwriteNotAllowed`.
/// Deleting first and then writing is allowed.
#[derive(Debug, Clone)]
pub struct NoOverwrites<S> {
    inner: S,
}

impl<S> NoOverwrites<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: KeyCollection> KeyCollection for NoOverwrites<S> {
    type Key = S::Key;

    fn iter_keys(&self) -> Keys<'_, S::Key> {
        self.inner.iter_keys()
    }

    fn count(&self) -> usize {
        self.inner.count()
    }

    fn contains_key(&self, key: &S::Key) -> bool {
        self.inner.contains_key(key)
    }
}

impl<S: ObjReader> ObjReader for NoOverwrites<S> {
    type Key = S::Key;
    type Value = S::Value;

    fn read(&self, key: &S::Key) -> Result<S::Value, Error> {
        self.inner.read(key)
    }
}

impl<S> ObjWriter for NoOverwrites<S>
where
    S: ObjStore,
    KeyOf<S>: fmt::Debug,
{
    type Key = KeyOf<S>;
    type Value = ValueOf<S>;

    fn write(&mut self, key: KeyOf<S>, value: ValueOf<S>) -> Result<(), Error> {
        if self.inner.contains_key(&key) {
            return Err(Error::OverwriteNotAllowed {
                key: format!("{:?}", key),
            });
        }
        self.inner.write(key, value)
    }

    fn delete(&mut self, key: &KeyOf<S>) -> Result<(), Error> {
        self.inner.delete(key)
    }
}
