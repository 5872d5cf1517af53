//! Conversions between key shapes.
//!
//! Keys come in four shapes:
//! - tuples: ordered parts (`&[V]` / `Vec<V>`)
//! - mappings: named parts (`BTreeMap<String, V>`)
//! - formatted strings: a template populated with the parts, parsed back with
//!   a regex
//! - dsv strings: parts joined by a delimiter
//!
//! Each `x_of_y` function has an inverse `y_of_x`. The schema (field list,
//! template or pattern) is passed with every call and never retained.

use std::collections::BTreeMap;
use std::fmt::Display;

use regex::{Captures, Regex};

use crate::error::{CodecResult, KeyValidationError};
use crate::template::FormatTemplate;

fn field_names<S: AsRef<str>>(fields: &[S]) -> Vec<String> {
    fields.iter().map(|f| f.as_ref().to_string()).collect()
}

/// Turn a mapping into a tuple, ordering its values by `fields`.
///
/// Every key of `d` must appear in `fields` and vice versa.
///
/// ```rust
/// use std::collections::BTreeMap;
/// use keyshape_key_codec::tuple_of_dict;
///
/// let d: BTreeMap<String, i32> = [("a", 1), ("b", 2), ("c", 3)]
///     .into_iter()
///     .map(|(k, v)| (k.to_string(), v))
///     .collect();
///
/// assert_eq!(tuple_of_dict(&d, &["a", "b", "c"]).unwrap(), vec![1, 2, 3]);
/// assert_eq!(tuple_of_dict(&d, &["c", "b", "a"]).unwrap(), vec![3, 2, 1]);
/// assert!(tuple_of_dict(&d, &["a", "b"]).is_err());
/// ```
pub fn tuple_of_dict<V: Clone, S: AsRef<str>>(
    d: &BTreeMap<String, V>,
    fields: &[S],
) -> CodecResult<Vec<V>> {
    if fields.len() != d.len() {
        return Err(KeyValidationError::ArityMismatch {
            shape: "mapping",
            expected: fields.len(),
            actual: d.len(),
            fields: field_names(fields),
        });
    }

    fields
        .iter()
        .map(|f| {
            d.get(f.as_ref())
                .cloned()
                .ok_or_else(|| KeyValidationError::MissingField {
                    field: f.as_ref().to_string(),
                    present: d.keys().cloned().collect(),
                })
        })
        .collect()
}

/// Turn a tuple into a mapping, naming its parts with `fields`.
///
/// ```rust
/// use keyshape_key_codec::dict_of_tuple;
///
/// let d = dict_of_tuple(&[1, 2, 3], &["c", "b", "a"]).unwrap();
/// assert_eq!(d["c"], 1);
/// assert_eq!(d["a"], 3);
/// assert!(dict_of_tuple(&[1, 2, 3], &["c", "b"]).is_err());
/// ```
pub fn dict_of_tuple<V: Clone, S: AsRef<str>>(
    t: &[V],
    fields: &[S],
) -> CodecResult<BTreeMap<String, V>> {
    if fields.len() != t.len() {
        return Err(KeyValidationError::ArityMismatch {
            shape: "tuple",
            expected: fields.len(),
            actual: t.len(),
            fields: field_names(fields),
        });
    }

    Ok(fields
        .iter()
        .map(|f| f.as_ref().to_string())
        .zip(t.iter().cloned())
        .collect())
}

/// Populate a template positionally with the parts of a tuple.
///
/// ```rust
/// use keyshape_key_codec::str_of_tuple;
///
/// assert_eq!(str_of_tuple(&[1, 2, 3], "{}{}{}").unwrap(), "123");
/// assert_eq!(str_of_tuple(&[1, 2, 3], "{}{}").unwrap(), "12");
/// assert!(str_of_tuple(&[1, 2, 3], "{}{}{}{}").is_err());
/// ```
pub fn str_of_tuple<V: Display>(t: &[V], template: &str) -> CodecResult<String> {
    FormatTemplate::parse(template)?.render_positional(t)
}

/// Parse a string into the tuple of a pattern's capture groups.
///
/// The pattern must match at the start of `s`. Groups that did not
/// participate in the match come back as empty strings.
///
/// ```rust
/// use regex::Regex;
/// use keyshape_key_codec::tuple_of_str;
///
/// let pattern = Regex::new(r"(\d{3})\w").unwrap();
/// assert_eq!(tuple_of_str("123ABC", &pattern).unwrap(), vec!["123".to_string()]);
///
/// let pattern = Regex::new(r"(\d{4})").unwrap();
/// assert!(tuple_of_str("123ABC", &pattern).is_err());
/// ```
pub fn tuple_of_str(s: &str, pattern: &Regex) -> CodecResult<Vec<String>> {
    let caps = match_at_start(s, pattern)?;
    Ok(caps
        .iter()
        .skip(1)
        .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
        .collect())
}

/// Populate a template's named placeholders from a mapping.
///
/// Fails if a placeholder has no entry or an entry has no placeholder.
///
/// ```rust
/// use std::collections::BTreeMap;
/// use keyshape_key_codec::str_of_dict;
///
/// let mut d = BTreeMap::new();
/// d.insert("A".to_string(), "a");
/// d.insert("B".to_string(), "b");
/// assert_eq!(str_of_dict(&d, "{A}{B}").unwrap(), "ab");
/// ```
pub fn str_of_dict<V: Display>(d: &BTreeMap<String, V>, template: &str) -> CodecResult<String> {
    FormatTemplate::parse(template)?.render_named(d)
}

/// Parse a string into a mapping from a pattern's named groups to what they
/// captured.
///
/// The pattern must match at the start of `s`. Named groups that did not
/// participate in the match are left out.
///
/// ```rust
/// use regex::Regex;
/// use keyshape_key_codec::dict_of_str;
///
/// let pattern = Regex::new(r"(?P<Domain>[a-zA-Z0-9]+)\.com").unwrap();
/// let d = dict_of_str("gmail.com", &pattern).unwrap();
/// assert_eq!(d["Domain"], "gmail");
/// ```
pub fn dict_of_str(s: &str, pattern: &Regex) -> CodecResult<BTreeMap<String, String>> {
    let caps = match_at_start(s, pattern)?;
    Ok(pattern
        .capture_names()
        .flatten()
        .filter_map(|name| {
            caps.name(name)
                .map(|m| (name.to_string(), m.as_str().to_string()))
        })
        .collect())
}

/// Join parts into a delimiter-separated string.
///
/// There is no arity check here; impose one externally if needed.
///
/// ```rust
/// use keyshape_key_codec::dsv_of_list;
///
/// assert_eq!(dsv_of_list(&["a", "brown", "fox"], " "), "a brown fox");
/// assert_eq!(dsv_of_list(&["First", "Last"], ":::"), "First:::Last");
/// assert_eq!(dsv_of_list::<&str>(&[], "@"), "");
/// ```
pub fn dsv_of_list<S: AsRef<str>>(parts: &[S], sep: &str) -> String {
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        out.push_str(part.as_ref());
    }
    out
}

/// Split a delimiter-separated string into its parts.
///
/// The empty string yields no parts at all (not a single empty part).
///
/// ```rust
/// use keyshape_key_codec::list_of_dsv;
///
/// assert_eq!(list_of_dsv("jumps/over", "/"), vec!["jumps", "over"]);
/// assert_eq!(list_of_dsv("singleton", "@"), vec!["singleton"]);
/// assert!(list_of_dsv("", "@").is_empty());
/// ```
pub fn list_of_dsv(s: &str, sep: &str) -> Vec<String> {
    if s.is_empty() {
        return Vec::new();
    }
    s.split(sep).map(|part| part.to_string()).collect()
}

fn match_at_start<'s>(s: &'s str, pattern: &Regex) -> CodecResult<Captures<'s>> {
    pattern
        .captures(s)
        .filter(|caps| caps.get(0).is_some_and(|m| m.start() == 0))
        .ok_or_else(|| KeyValidationError::PatternMismatch {
            input: s.to_string(),
            pattern: pattern.as_str().to_string(),
        })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn distinct_fields(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{}", i)).collect()
    }

    proptest! {
        /// dict_of_tuple inverts tuple_of_dict for any ordering of the keys.
        #[test]
        fn prop_dict_tuple_roundtrip(values in proptest::collection::vec(any::<i64>(), 0..8), seed in any::<u64>()) {
            let mut fields = distinct_fields(values.len());
            let d: BTreeMap<String, i64> = fields.iter().cloned().zip(values.iter().copied()).collect();

            // Deterministic shuffle so every permutation of the schema is exercised.
            let mut state = seed;
            for i in (1..fields.len()).rev() {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let j = (state >> 33) as usize % (i + 1);
                fields.swap(i, j);
            }

            let t = tuple_of_dict(&d, &fields).unwrap();
            prop_assert_eq!(dict_of_tuple(&t, &fields).unwrap(), d);
        }

        /// tuple_of_dict inverts dict_of_tuple for equal-length schemas.
        #[test]
        fn prop_tuple_dict_roundtrip(t in proptest::collection::vec(".*", 0..8)) {
            let fields = distinct_fields(t.len());
            let d = dict_of_tuple(&t, &fields).unwrap();
            prop_assert_eq!(tuple_of_dict(&d, &fields).unwrap(), t);
        }

        /// list_of_dsv inverts dsv_of_list when no part contains the separator.
        #[test]
        fn prop_dsv_roundtrip(
            parts in proptest::collection::vec("[a-z0-9]{1,7}", 0..10),
            sep in r"[^a-z0-9]{1,3}",
        ) {
            let line = dsv_of_list(&parts, &sep);
            prop_assert_eq!(list_of_dsv(&line, &sep), parts);
        }
    }
}
