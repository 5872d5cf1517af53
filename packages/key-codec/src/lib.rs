//! Key shape codecs.
//!
//! Stores are keyed by whatever their backend understands: file paths, object
//! names, row ids. This crate converts between that representation and the
//! structured keys callers would rather use:
//!
//! - `tuple_of_dict` / `dict_of_tuple`: named mapping ↔ ordered tuple
//! - `str_of_tuple` / `tuple_of_str`: tuple ↔ formatted string
//! - `str_of_dict` / `dict_of_str`: mapping ↔ formatted string
//! - `dsv_of_list` / `list_of_dsv`: sequence ↔ delimiter-separated string
//!
//! Every failure is a [`KeyValidationError`].
//!
//! [`KeyCodec`] binds a schema to a conversion pair so it can be placed in
//! front of a store.
//!
//! # Example
//!
//! ```rust
//! use keyshape_key_codec::{dict_of_tuple, str_of_tuple, tuple_of_dict};
//!
//! let key = dict_of_tuple(&["alice", "2019"], &["user", "year"]).unwrap();
//! let tuple = tuple_of_dict(&key, &["user", "year"]).unwrap();
//! assert_eq!(str_of_tuple(&tuple, "{}/{}.json").unwrap(), "alice/2019.json");
//! ```

pub use regex::Regex;

mod codecs;
mod error;
mod key_codec;
mod prefix;
mod template;

pub use codecs::{
    dict_of_str, dict_of_tuple, dsv_of_list, list_of_dsv, str_of_dict, str_of_tuple,
    tuple_of_dict, tuple_of_str,
};
pub use error::{CodecResult, KeyValidationError};
pub use key_codec::{
    Chain, DictTemplateCodec, DsvCodec, FieldsCodec, IdentityCodec, KeyCodec, TupleTemplateCodec,
};
pub use prefix::{max_common_prefix, PrefixCodec};
pub use template::{FieldNumbering, FieldRef, FormatTemplate};
