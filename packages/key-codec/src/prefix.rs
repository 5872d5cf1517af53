//! Relative keys in front of a backend keyed by absolute ones.
//!
//! Instead of addressing `/a/very/long/root/folder/the/file/we.want`, callers
//! address `the/file/we.want` and the codec adds or strips the prefix.

use crate::error::{CodecResult, KeyValidationError};
use crate::key_codec::KeyCodec;

/// Adds a fixed prefix on the way in and strips it on the way out.
///
/// ```rust
/// use keyshape_key_codec::{KeyCodec, PrefixCodec};
///
/// let codec = PrefixCodec::new("/root/of/");
/// assert_eq!(codec.encode(&"foo".to_string()).unwrap(), "/root/of/foo");
/// assert_eq!(codec.decode(&"/root/of/foo".to_string()).unwrap(), "foo");
/// assert!(codec.decode(&"/elsewhere/foo".to_string()).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrefixCodec {
    prefix: String,
}

impl PrefixCodec {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Use the longest prefix shared by all `keys`.
    pub fn common_to<S: AsRef<str>>(keys: &[S]) -> Self {
        Self::new(max_common_prefix(keys))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl KeyCodec for PrefixCodec {
    type Outer = String;
    type Inner = String;

    fn encode(&self, key: &String) -> CodecResult<String> {
        let mut absolute = String::with_capacity(self.prefix.len() + key.len());
        absolute.push_str(&self.prefix);
        absolute.push_str(key);
        Ok(absolute)
    }

    fn decode(&self, key: &String) -> CodecResult<String> {
        key.strip_prefix(self.prefix.as_str())
            .map(str::to_string)
            .ok_or_else(|| KeyValidationError::PrefixMismatch {
                key: key.clone(),
                prefix: self.prefix.clone(),
            })
    }
}

/// The longest string every element of `keys` starts with.
///
/// The result always ends on a character boundary. No keys gives `""`.
pub fn max_common_prefix<S: AsRef<str>>(keys: &[S]) -> String {
    let mut iter = keys.iter().map(AsRef::as_ref);
    let first = match iter.next() {
        Some(first) => first,
        None => return String::new(),
    };

    let mut end = first.len();
    for key in iter {
        end = first[..end]
            .char_indices()
            .zip(key.chars())
            .find(|((_, a), b)| a != b)
            .map(|((i, _), _)| i)
            .unwrap_or_else(|| end.min(key.len()));
        if end == 0 {
            break;
        }
    }
    first[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_prefix_of_paths() {
        let keys = ["/root/of/foo", "/root/of/bar", "/root/for/alice"];
        assert_eq!(max_common_prefix(&keys), "/root/");
    }

    #[test]
    fn common_prefix_edge_cases() {
        assert_eq!(max_common_prefix::<&str>(&[]), "");
        assert_eq!(max_common_prefix(&["only"]), "only");
        assert_eq!(max_common_prefix(&["abc", "ab"]), "ab");
        assert_eq!(max_common_prefix(&["ab", "abc"]), "ab");
        assert_eq!(max_common_prefix(&["x", "y"]), "");
        assert_eq!(max_common_prefix(&["naïve", "naïf"]), "naï");
    }

    #[test]
    fn relativizes_explicit_keys() {
        let keys = ["/root/of/foo", "/root/of/bar", "/root/for/alice"];
        let codec = PrefixCodec::common_to(&keys);
        let relative: Vec<String> = keys
            .iter()
            .map(|k| codec.decode(&k.to_string()).unwrap())
            .collect();
        assert_eq!(relative, vec!["of/foo", "of/bar", "for/alice"]);
        assert_eq!(codec.encode(&"of/foo".to_string()).unwrap(), "/root/of/foo");
    }

    #[test]
    fn foreign_key_is_rejected() {
        let codec = PrefixCodec::new("/data/");
        assert_eq!(
            codec.decode(&"/tmp/x".to_string()).unwrap_err(),
            KeyValidationError::PrefixMismatch {
                key: "/tmp/x".to_string(),
                prefix: "/data/".to_string(),
            }
        );
    }
}
