//! Key codecs that carry their schema.
//!
//! The free conversion functions take the schema on every call.
//! A [`KeyCodec`] binds a schema once so the conversion can sit at the
//! boundary of a store: `encode` maps the caller's key shape to the one the
//! backend uses, `decode` maps it back.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use regex::Regex;

use crate::codecs::{dict_of_str, dict_of_tuple, dsv_of_list, list_of_dsv, tuple_of_dict, tuple_of_str};
use crate::error::CodecResult;
use crate::template::FormatTemplate;

/// An invertible key transform.
///
/// `decode(encode(k)) == k` is expected for every well-formed `k`, but not
/// enforced. Implementations that are not inverses make stores behave
/// strangely: keys written through the codec would not come back out of
/// iteration.
pub trait KeyCodec {
    /// The key shape callers use.
    type Outer;
    /// The key shape the wrapped backend uses.
    type Inner;

    /// Map a caller key to a backend key.
    fn encode(&self, key: &Self::Outer) -> CodecResult<Self::Inner>;

    /// Map a backend key to a caller key.
    fn decode(&self, key: &Self::Inner) -> CodecResult<Self::Outer>;

    /// Follow this codec with another one.
    fn then<C>(self, next: C) -> Chain<Self, C>
    where
        Self: Sized,
        C: KeyCodec<Outer = Self::Inner>,
    {
        Chain {
            first: self,
            second: next,
        }
    }
}

impl<C: KeyCodec + ?Sized> KeyCodec for &C {
    type Outer = C::Outer;
    type Inner = C::Inner;

    fn encode(&self, key: &Self::Outer) -> CodecResult<Self::Inner> {
        (**self).encode(key)
    }

    fn decode(&self, key: &Self::Inner) -> CodecResult<Self::Outer> {
        (**self).decode(key)
    }
}

impl<C: KeyCodec + ?Sized> KeyCodec for Box<C> {
    type Outer = C::Outer;
    type Inner = C::Inner;

    fn encode(&self, key: &Self::Outer) -> CodecResult<Self::Inner> {
        self.as_ref().encode(key)
    }

    fn decode(&self, key: &Self::Inner) -> CodecResult<Self::Outer> {
        self.as_ref().decode(key)
    }
}

/// Passes keys through unchanged.
pub struct IdentityCodec<T>(PhantomData<fn(T) -> T>);

impl<T> IdentityCodec<T> {
    pub fn new() -> Self {
        IdentityCodec(PhantomData)
    }
}

impl<T> Default for IdentityCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for IdentityCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for IdentityCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdentityCodec")
    }
}

impl<T: Clone> KeyCodec for IdentityCodec<T> {
    type Outer = T;
    type Inner = T;

    fn encode(&self, key: &T) -> CodecResult<T> {
        Ok(key.clone())
    }

    fn decode(&self, key: &T) -> CodecResult<T> {
        Ok(key.clone())
    }
}

/// Mapping keys in front of a tuple-keyed backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldsCodec {
    fields: Vec<String>,
}

impl FieldsCodec {
    pub fn new<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl KeyCodec for FieldsCodec {
    type Outer = BTreeMap<String, String>;
    type Inner = Vec<String>;

    fn encode(&self, key: &Self::Outer) -> CodecResult<Self::Inner> {
        tuple_of_dict(key, &self.fields)
    }

    fn decode(&self, key: &Self::Inner) -> CodecResult<Self::Outer> {
        dict_of_tuple(key, &self.fields)
    }
}

fn pattern_for(template: &FormatTemplate, pattern: Option<Regex>) -> CodecResult<Regex> {
    match pattern {
        Some(pattern) => Ok(pattern),
        None => template.to_regex(),
    }
}

/// Tuple keys in front of a string-keyed backend.
///
/// ```rust
/// use keyshape_key_codec::{KeyCodec, TupleTemplateCodec};
///
/// let codec = TupleTemplateCodec::new("{}/{}.wav").unwrap();
/// let key = vec!["speaker1".to_string(), "take3".to_string()];
///
/// let path = codec.encode(&key).unwrap();
/// assert_eq!(path, "speaker1/take3.wav");
/// assert_eq!(codec.decode(&path).unwrap(), key);
/// ```
#[derive(Debug, Clone)]
pub struct TupleTemplateCodec {
    template: FormatTemplate,
    pattern: Regex,
}

impl TupleTemplateCodec {
    /// Build from a template alone; the parsing pattern is derived from it.
    pub fn new(template: &str) -> CodecResult<Self> {
        Self::with_pattern(template, None)
    }

    /// Build from a template and an explicit parsing pattern.
    pub fn with_pattern(template: &str, pattern: Option<Regex>) -> CodecResult<Self> {
        let template = FormatTemplate::parse(template)?;
        let pattern = pattern_for(&template, pattern)?;
        Ok(Self { template, pattern })
    }

    pub fn template(&self) -> &FormatTemplate {
        &self.template
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

impl KeyCodec for TupleTemplateCodec {
    type Outer = Vec<String>;
    type Inner = String;

    fn encode(&self, key: &Self::Outer) -> CodecResult<Self::Inner> {
        self.template.render_positional(key)
    }

    fn decode(&self, key: &Self::Inner) -> CodecResult<Self::Outer> {
        tuple_of_str(key, &self.pattern)
    }
}

/// Mapping keys in front of a string-keyed backend.
#[derive(Debug, Clone)]
pub struct DictTemplateCodec {
    template: FormatTemplate,
    pattern: Regex,
}

impl DictTemplateCodec {
    /// Build from a template alone; the parsing pattern is derived from it.
    pub fn new(template: &str) -> CodecResult<Self> {
        Self::with_pattern(template, None)
    }

    /// Build from a template and an explicit parsing pattern.
    pub fn with_pattern(template: &str, pattern: Option<Regex>) -> CodecResult<Self> {
        let template = FormatTemplate::parse(template)?;
        let pattern = pattern_for(&template, pattern)?;
        Ok(Self { template, pattern })
    }

    pub fn template(&self) -> &FormatTemplate {
        &self.template
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

impl KeyCodec for DictTemplateCodec {
    type Outer = BTreeMap<String, String>;
    type Inner = String;

    fn encode(&self, key: &Self::Outer) -> CodecResult<Self::Inner> {
        self.template.render_named(key)
    }

    fn decode(&self, key: &Self::Inner) -> CodecResult<Self::Outer> {
        dict_of_str(key, &self.pattern)
    }
}

/// Sequence keys in front of a delimited-string-keyed backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DsvCodec {
    sep: String,
}

impl DsvCodec {
    pub fn new(sep: impl Into<String>) -> Self {
        Self { sep: sep.into() }
    }

    pub fn sep(&self) -> &str {
        &self.sep
    }
}

impl KeyCodec for DsvCodec {
    type Outer = Vec<String>;
    type Inner = String;

    fn encode(&self, key: &Self::Outer) -> CodecResult<Self::Inner> {
        Ok(dsv_of_list(key, &self.sep))
    }

    fn decode(&self, key: &Self::Inner) -> CodecResult<Self::Outer> {
        Ok(list_of_dsv(key, &self.sep))
    }
}

/// Two codecs applied in sequence: `first` faces the caller, `second` faces
/// the backend.
#[derive(Debug, Clone)]
pub struct Chain<A, B> {
    first: A,
    second: B,
}

impl<A, B> KeyCodec for Chain<A, B>
where
    A: KeyCodec,
    B: KeyCodec<Outer = A::Inner>,
{
    type Outer = A::Outer;
    type Inner = B::Inner;

    fn encode(&self, key: &Self::Outer) -> CodecResult<Self::Inner> {
        self.second.encode(&self.first.encode(key)?)
    }

    fn decode(&self, key: &Self::Inner) -> CodecResult<Self::Outer> {
        self.first.decode(&self.second.decode(key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyValidationError;
    use collection_literals::btree;

    fn strings(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn identity_passes_through() {
        let codec = IdentityCodec::<u32>::new();
        assert_eq!(codec.encode(&7).unwrap(), 7);
        assert_eq!(codec.decode(&7).unwrap(), 7);
    }

    #[test]
    fn fields_codec_roundtrip() {
        let codec = FieldsCodec::new(["user", "year"]);
        let key = btree! { "user".to_string() => "alice".to_string(), "year".to_string() => "2019".to_string() };
        let tuple = codec.encode(&key).unwrap();
        assert_eq!(tuple, strings(&["alice", "2019"]));
        assert_eq!(codec.decode(&tuple).unwrap(), key);
    }

    #[test]
    fn fields_codec_rejects_wrong_arity() {
        let codec = FieldsCodec::new(["user", "year"]);
        assert!(codec.decode(&strings(&["alice"])).is_err());
    }

    #[test]
    fn padded_template_keys_decode_to_what_was_encoded() {
        let codec = TupleTemplateCodec::new("{:>3}.txt").unwrap();
        let key = strings(&["7"]);
        let encoded = codec.encode(&key).unwrap();
        assert_eq!(encoded, "  7.txt");
        assert_eq!(codec.decode(&encoded).unwrap(), key);

        let codec = DictTemplateCodec::new("take_{take:03}/{name:_<5}.wav").unwrap();
        let key = btree! { "take".to_string() => "10".to_string(), "name".to_string() => "kick".to_string() };
        let encoded = codec.encode(&key).unwrap();
        assert_eq!(encoded, "take_010/kick_.wav");
        assert_eq!(codec.decode(&encoded).unwrap(), key);
    }

    #[test]
    fn lossy_template_needs_an_explicit_pattern() {
        assert!(matches!(
            TupleTemplateCodec::new("{:.3}"),
            Err(KeyValidationError::InvalidTemplate { .. })
        ));
    }

    #[test]
    fn tuple_template_codec_with_explicit_pattern() {
        let codec =
            TupleTemplateCodec::with_pattern("{}{}", Some(Regex::new(r"(\d{3})(\w+)").unwrap()))
                .unwrap();
        assert_eq!(codec.encode(&strings(&["123", "ABC"])).unwrap(), "123ABC");
        assert_eq!(codec.decode(&"123ABC".to_string()).unwrap(), strings(&["123", "ABC"]));
    }

    #[test]
    fn tuple_template_codec_rejects_unparseable() {
        let codec = TupleTemplateCodec::new("{}/{}.wav").unwrap();
        let err = codec.decode(&"speaker1.wav".to_string()).unwrap_err();
        assert!(matches!(err, KeyValidationError::PatternMismatch { .. }));
    }

    #[test]
    fn dict_template_codec_roundtrip() {
        let codec = DictTemplateCodec::new("{user}/{year}.json").unwrap();
        let key = btree! { "user".to_string() => "bob".to_string(), "year".to_string() => "2020".to_string() };
        let s = codec.encode(&key).unwrap();
        assert_eq!(s, "bob/2020.json");
        assert_eq!(codec.decode(&s).unwrap(), key);
    }

    #[test]
    fn dsv_codec_roundtrip() {
        let codec = DsvCodec::new("/");
        let key = strings(&["jumps", "over"]);
        assert_eq!(codec.encode(&key).unwrap(), "jumps/over");
        assert_eq!(codec.decode(&"jumps/over".to_string()).unwrap(), key);
        assert!(codec.decode(&String::new()).unwrap().is_empty());
    }

    #[test]
    fn chained_codecs() {
        // mapping -> tuple -> dsv string
        let codec = FieldsCodec::new(["bucket", "name"]).then(DsvCodec::new("/"));
        let key = btree! { "bucket".to_string() => "raw".to_string(), "name".to_string() => "a.txt".to_string() };
        let s = codec.encode(&key).unwrap();
        assert_eq!(s, "raw/a.txt");
        assert_eq!(codec.decode(&s).unwrap(), key);
    }

    #[test]
    fn chain_propagates_inner_failure() {
        let codec = FieldsCodec::new(["bucket", "name"]).then(DsvCodec::new("/"));
        let err = codec.decode(&"only-one-part".to_string()).unwrap_err();
        assert!(matches!(err, KeyValidationError::ArityMismatch { .. }));
    }

    #[test]
    fn boxed_codec_dispatches() {
        let codec: Box<dyn KeyCodec<Outer = Vec<String>, Inner = String>> =
            Box::new(DsvCodec::new(","));
        assert_eq!(codec.encode(&strings(&["a", "b"])).unwrap(), "a,b");
    }
}
