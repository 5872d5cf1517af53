//! Keyshape core store layer.
//!
//! A store is described by what it can do rather than what it is:
//! - [`KeyCollection`]: iterate keys; count and membership come for free
//! - [`ObjReader`]: read a value by key
//! - [`ObjWriter`]: write or delete a value by key
//! - [`ObjSource`]: collection + reader, with items, values and equality
//! - [`ObjStore`]: source + writer
//!
//! `ObjSource` and `ObjStore` are implemented automatically for anything that
//! has the underlying capabilities. Adapters reshape a store without touching
//! its backend: [`KeyWrap`] changes the key shape, [`ValueWrap`] the value
//! representation, [`FilteredKeys`] narrows what is visible, and
//! [`ReadOnly`] / [`NoOverwrites`] guard writes.
//!
//! # Example
//!
//! ```rust
//! use keyshape_core_store::{Error, KeyOf, ObjSource, ObjWriter, ValueOf};
//!
//! fn copy_all<A, B>(from: &A, to: &mut B) -> Result<usize, Error>
//! where
//!     A: ObjSource,
//!     B: ObjWriter<Key = KeyOf<A>, Value = ValueOf<A>>,
//! {
//!     let mut n = 0;
//!     for item in from.items() {
//!         let (key, value) = item?;
//!         to.write(key, value)?;
//!         n += 1;
//!     }
//!     Ok(n)
//! }
//! ```

pub use bytes::Bytes;

mod error;
mod explicit_keys;
mod filtered;
mod guards;
mod key_wrap;
mod traits;
mod value_wrap;

pub use error::{Error, Operation};
pub use explicit_keys::ExplicitKeys;
pub use filtered::FilteredKeys;
pub use guards::{NoOverwrites, ReadOnly};
pub use key_wrap::KeyWrap;
pub use traits::{
    KeyCollection, KeyOf, Keys, ObjReader, ObjSource, ObjStore, ObjWriter, ValueOf,
};
pub use value_wrap::{JsonValues, ValueCodec, ValueWrap};

// Re-export the key codecs so a store and its key shapes come from one place
pub use keyshape_key_codec as key_codec;
pub use keyshape_key_codec::{KeyCodec, KeyValidationError};
