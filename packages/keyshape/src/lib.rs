//! keyshape: one mapping interface over any storage, with keys in the shape
//! the caller wants.
//!
//! A backend only has to list, read, write and delete keys. The capability
//! traits in [`keyshape_core_store`] derive the rest, and the codecs in
//! [`keyshape_key_codec`] turn flat backend keys such as
//! `"alice/2019.json"` into tuples or named fields and back.
//!
//! # Example
//!
//! ```rust
//! use keyshape::backends::InMemoryStore;
//! use keyshape::codecs::TupleTemplateCodec;
//! use keyshape::{KeyCollection, KeyWrap, ObjReader, ObjWriter};
//!
//! let codec = TupleTemplateCodec::new("{}-{}").unwrap();
//! let mut store = KeyWrap::new(InMemoryStore::<String, u32>::new(), codec);
//!
//! store.write(vec!["a".into(), "1".into()], 10).unwrap();
//! assert_eq!(store.inner().as_map().keys().next().unwrap(), "a-1");
//! assert_eq!(store.read(&vec!["a".into(), "1".into()]).unwrap(), 10);
//! assert_eq!(store.count(), 1);
//! ```

pub use keyshape_backends as backends;
pub use keyshape_key_codec as codecs;

pub use keyshape_core_store::{
    Bytes, Error, ExplicitKeys, FilteredKeys, JsonValues, KeyCodec, KeyCollection, KeyOf,
    KeyValidationError, KeyWrap, Keys, NoOverwrites, ObjReader, ObjSource, ObjStore, ObjWriter,
    Operation, ReadOnly, ValueCodec, ValueOf, ValueWrap,
};
