//! Error types for key shape conversion.
//!
//! Every codec reports failures through the one [`KeyValidationError`] type,
//! so callers can catch key-shape problems uniformly regardless of which
//! transform produced them.

/// A key did not fit the shape a codec expected.
///
/// Each variant carries the offending value and the schema or pattern it was
/// checked against.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyValidationError {
    /// The number of fields in the schema differs from the number of parts
    /// in the key.
    #[error("{shape} has {actual} parts but the schema has {expected} fields {fields:?}")]
    ArityMismatch {
        shape: &'static str,
        expected: usize,
        actual: usize,
        fields: Vec<String>,
    },

    /// A mapping key lacks one of the schema's fields.
    #[error("field {field:?} is missing from mapping with keys {present:?}")]
    MissingField { field: String, present: Vec<String> },

    /// The string did not match the parsing pattern.
    #[error("the string {input:?} didn't match the pattern {pattern:?}")]
    PatternMismatch { input: String, pattern: String },

    /// Populating a format template failed.
    #[error("could not format {value} with template {template:?}: {message}")]
    Format {
        template: String,
        value: String,
        message: String,
    },

    /// The format template itself is malformed.
    #[error("invalid format template {template:?} at offset {offset}: {message}")]
    InvalidTemplate {
        template: String,
        offset: usize,
        message: String,
    },

    /// The template mixes automatic (`{}`) and manual (`{0}`, `{name}`)
    /// field specification.
    #[error("cannot switch between automatic and manual field numbering in {template:?}")]
    MixedFieldNumbering { template: String },

    /// The key does not start with the prefix a prefix codec strips.
    #[error("key {key:?} does not start with prefix {prefix:?}")]
    PrefixMismatch { key: String, prefix: String },
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, KeyValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_display_mentions_counts() {
        let e = KeyValidationError::ArityMismatch {
            shape: "mapping",
            expected: 1,
            actual: 2,
            fields: vec!["a".to_string()],
        };
        let display = e.to_string();
        assert!(display.contains("2 parts"));
        assert!(display.contains("1 fields"));
        assert!(display.contains("\"a\""));
    }

    #[test]
    fn pattern_mismatch_display() {
        let e = KeyValidationError::PatternMismatch {
            input: "123ABC".to_string(),
            pattern: r"(\d{4})".to_string(),
        };
        let display = e.to_string();
        assert!(display.contains("123ABC"));
        assert!(display.contains("didn't match"));
    }

    #[test]
    fn mixed_numbering_display() {
        let e = KeyValidationError::MixedFieldNumbering {
            template: "{}{0}".to_string(),
        };
        assert!(e.to_string().contains("{}{0}"));
    }
}
