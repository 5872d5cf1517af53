//! Value codecs and the store adapter that applies them.

use std::fmt;
use std::marker::PhantomData;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::traits::{KeyCollection, Keys, ObjReader, ObjWriter};
use crate::Error;

/// Converts between the objects a caller works with and the data a backend
/// stores.
pub trait ValueCodec {
    /// What callers read and write.
    type Obj;
    /// What the backend holds.
    type Data;

    fn data_of_obj(&self, obj: Self::Obj) -> Result<Self::Data, Error>;

    fn obj_of_data(&self, data: Self::Data) -> Result<Self::Obj, Error>;
}

impl<C: ValueCodec + ?Sized> ValueCodec for &C {
    type Obj = C::Obj;
    type Data = C::Data;

    fn data_of_obj(&self, obj: Self::Obj) -> Result<Self::Data, Error> {
        (**self).data_of_obj(obj)
    }

    fn obj_of_data(&self, data: Self::Data) -> Result<Self::Obj, Error> {
        (**self).obj_of_data(data)
    }
}

/// Stores any serde type as JSON bytes.
///
/// ```rust
/// use keyshape_core_store::{JsonValues, ValueCodec};
///
/// let codec = JsonValues::<Vec<u32>>::new();
/// let data = codec.data_of_obj(vec![1, 2, 3]).unwrap();
/// assert_eq!(&data[..], b"[1,2,3]");
/// assert_eq!(codec.obj_of_data(data).unwrap(), vec![1, 2, 3]);
/// ```
pub struct JsonValues<T>(PhantomData<fn(T) -> T>);

impl<T> JsonValues<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for JsonValues<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonValues<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonValues<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonValues")
    }
}

impl<T: Serialize + DeserializeOwned> ValueCodec for JsonValues<T> {
    type Obj = T;
    type Data = Bytes;

    fn data_of_obj(&self, obj: T) -> Result<Bytes, Error> {
        serde_json::to_vec(&obj)
            .map(Bytes::from)
            .map_err(Error::serialization)
    }

    fn obj_of_data(&self, data: Bytes) -> Result<T, Error> {
        serde_json::from_slice(&data).map_err(Error::serialization)
    }
}

/// Wraps a store and translates its values with a [`ValueCodec`].
///
/// Keys pass through untouched.
#[derive(Debug, Clone)]
pub struct ValueWrap<S, C> {
    inner: S,
    codec: C,
}

impl<S, C> ValueWrap<S, C> {
    pub fn new(inner: S, codec: C) -> Self {
        Self { inner, codec }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: KeyCollection, C> KeyCollection for ValueWrap<S, C> {
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

impl<S, C> ObjReader for ValueWrap<S, C>
where
    S: ObjReader,
    C: ValueCodec<Data = <S as ObjReader>::Value>,
{
    type Key = <S as ObjReader>::Key;
    type Value = C::Obj;

    fn read(&self, key: &Self::Key) -> Result<C::Obj, Error> {
        let data = self.inner.read(key)?;
        self.codec.obj_of_data(data)
    }
}

impl<S, C> ObjWriter for ValueWrap<S, C>
where
    S: ObjWriter,
    C: ValueCodec<Data = <S as ObjWriter>::Value>,
{
    type Key = <S as ObjWriter>::Key;
    type Value = C::Obj;

    fn write(&mut self, key: Self::Key, value: C::Obj) -> Result<(), Error> {
        let data = self.codec.data_of_obj(value)?;
        self.inner.write(key, data)
    }

    fn delete(&mut self, key: &Self::Key) -> Result<(), Error> {
        self.inner.delete(key)
    }
}
