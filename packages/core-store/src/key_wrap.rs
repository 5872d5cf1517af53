//! KeyWrap: present a store under a different key shape.

use keyshape_key_codec::KeyCodec;

use crate::traits::{KeyCollection, Keys, ObjReader, ObjWriter};
use crate::Error;

/// Wraps a store and translates its keys with a [`KeyCodec`].
///
/// Keys passed in are encoded into the inner store's representation. Keys
/// coming out of the inner store are decoded; inner keys the codec cannot
/// decode are not part of the outer key set and are skipped.
///
/// ```rust
/// use std::collections::BTreeMap;
/// use keyshape_core_store::{KeyCollection, KeyWrap, ObjReader, ObjWriter};
/// # use keyshape_core_store::{Error, Keys};
/// use keyshape_key_codec::TupleTemplateCodec;
/// # #[derive(Default)]
/// # struct Strings(BTreeMap<String, u32>);
/// # impl KeyCollection for Strings {
/// #     type Key = String;
/// #     fn iter_keys(&self) -> Keys<'_, String> { Box::new(self.0.keys().cloned()) }
/// # }
/// # impl ObjReader for Strings {
/// #     type Key = String;
/// #     type Value = u32;
/// #     fn read(&self, key: &String) -> Result<u32, Error> {
/// #         self.0.get(key).copied().ok_or_else(|| Error::not_found(key))
/// #     }
/// # }
/// # impl ObjWriter for Strings {
/// #     type Key = String;
/// #     type Value = u32;
/// #     fn write(&mut self, key: String, value: u32) -> Result<(), Error> {
/// #         self.0.insert(key, value);
/// #         Ok(())
/// #     }
/// #     fn delete(&mut self, key: &String) -> Result<(), Error> {
/// #         self.0.remove(key).map(|_| ()).ok_or_else(|| Error::not_found(key))
/// #     }
/// # }
///
/// let codec = TupleTemplateCodec::new("{}/{}.json").unwrap();
/// let mut store = KeyWrap::new(Strings::default(), codec);
///
/// store.write(vec!["alice".into(), "2019".into()], 7).unwrap();
/// assert_eq!(store.inner().0.keys().next().unwrap(), "alice/2019.json");
/// assert_eq!(store.read(&vec!["alice".into(), "2019".into()]).unwrap(), 7);
/// ```
#[derive(Debug, Clone)]
pub struct KeyWrap<S, C> {
    inner: S,
    codec: C,
}

impl<S, C> KeyWrap<S, C> {
    pub fn new(inner: S, codec: C) -> Self {
        Self { inner, codec }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, C> KeyCollection for KeyWrap<S, C>
where
    S: KeyCollection,
    C: KeyCodec<Inner = S::Key>,
    C::Outer: PartialEq,
{
    type Key = C::Outer;

    fn iter_keys(&self) -> Keys<'_, C::Outer> {
        Box::new(
            self.inner
                .iter_keys()
                .filter_map(move |key| match self.codec.decode(&key) {
                    Ok(outer) => Some(outer),
                    Err(e) => {
                        log::warn!("skipping key that does not fit the key shape: {}", e);
                        None
                    }
                }),
        )
    }

    fn contains_key(&self, key: &C::Outer) -> bool {
        match self.codec.encode(key) {
            Ok(inner) => self.inner.contains_key(&inner),
            Err(_) => false,
        }
    }
}

impl<S, C> ObjReader for KeyWrap<S, C>
where
    S: ObjReader,
    C: KeyCodec<Inner = <S as ObjReader>::Key>,
{
    type Key = C::Outer;
    type Value = S::Value;

    fn read(&self, key: &C::Outer) -> Result<S::Value, Error> {
        let inner = self.codec.encode(key)?;
        self.inner.read(&inner)
    }
}

impl<S, C> ObjWriter for KeyWrap<S, C>
where
    S: ObjWriter,
    C: KeyCodec<Inner = <S as ObjWriter>::Key>,
{
    type Key = C::Outer;
    type Value = S::Value;

    fn write(&mut self, key: C::Outer, value: S::Value) -> Result<(), Error> {
        let inner = self.codec.encode(&key)?;
        self.inner.write(inner, value)
    }

    fn delete(&mut self, key: &C::Outer) -> Result<(), Error> {
        let inner = self.codec.encode(key)?;
        self.inner.delete(&inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{ObjSource, ObjStore};
    use collection_literals::btree;
    use keyshape_key_codec::{DictTemplateCodec, DsvCodec, KeyValidationError};
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct TestStore {
        data: BTreeMap<String, String>,
    }

    impl KeyCollection for TestStore {
        type Key = String;

        fn iter_keys(&self) -> Keys<'_, String> {
            Box::new(self.data.keys().cloned())
        }
    }

    impl ObjReader for TestStore {
        type Key = String;
        type Value = String;

        fn read(&self, key: &String) -> Result<String, Error> {
            self.data.get(key).cloned().ok_or_else(|| Error::not_found(key))
        }
    }

    impl ObjWriter for TestStore {
        type Key = String;
        type Value = String;

        fn write(&mut self, key: String, value: String) -> Result<(), Error> {
            self.data.insert(key, value);
            Ok(())
        }

        fn delete(&mut self, key: &String) -> Result<(), Error> {
            self.data
                .remove(key)
                .map(|_| ())
                .ok_or_else(|| Error::not_found(key))
        }
    }

    fn assert_store<S: ObjStore>(_: &S) {}

    fn dict_store() -> KeyWrap<TestStore, DictTemplateCodec> {
        KeyWrap::new(
            TestStore::default(),
            DictTemplateCodec::new("{user}/{year}.json").unwrap(),
        )
    }

    #[test]
    fn writes_encoded_keys_to_inner_store() {
        let mut store = dict_store();
        assert_store(&store);

        let key = btree! { "user".to_string() => "alice".to_string(), "year".to_string() => "2019".to_string() };
        store.write(key.clone(), "data".to_string()).unwrap();

        assert!(store.inner().data.contains_key("alice/2019.json"));
        assert_eq!(store.read(&key).unwrap(), "data");
        assert_eq!(store.iter_keys().collect::<Vec<_>>(), vec![key.clone()]);
        assert!(store.contains_key(&key));

        store.delete(&key).unwrap();
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn undecodable_inner_keys_are_skipped() {
        let mut inner = TestStore::default();
        inner.write("alice/2019.json".to_string(), "a".to_string()).unwrap();
        inner.write("README".to_string(), "b".to_string()).unwrap();
        let store = KeyWrap::new(inner, DictTemplateCodec::new("{user}/{year}.json").unwrap());

        assert_eq!(store.count(), 1);
        let items: Vec<_> = store.items().collect::<Result<_, _>>().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].1, "a");
    }

    #[test]
    fn bad_outer_key_is_a_key_validation_error() {
        let mut store = dict_store();
        let partial = btree! { "user".to_string() => "alice".to_string() };

        let err = store.write(partial.clone(), "x".to_string()).unwrap_err();
        assert!(matches!(
            err,
            Error::KeyValidation(KeyValidationError::Format { .. })
        ));
        assert!(matches!(store.read(&partial), Err(Error::KeyValidation(_))));
        assert!(!store.contains_key(&partial));
    }

    #[test]
    fn missing_key_passes_through_not_found() {
        let store = KeyWrap::new(TestStore::default(), DsvCodec::new("/"));
        let err = store.read(&vec!["a".to_string(), "b".to_string()]).unwrap_err();
        assert!(err.is_not_found());
    }
}
