//! Error types for the store layer.

use std::fmt;

use keyshape_key_codec::KeyValidationError;

/// A store operation that a store can refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    Write,
    Delete,
    Iterate,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::Delete => "delete",
            Operation::Iterate => "iterate",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by capability implementations and store adapters.
///
/// None of these are caught or retried inside the store layer; they reach the
/// immediate caller as-is.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The key is not in the store's key set.
    #[error("key not found: {key}")]
    NotFound { key: String },

    /// The store does not allow this operation at all.
    #[error("{operation} is not supported by this store")]
    Unsupported { operation: Operation },

    /// The key already holds a value and the store refuses to replace it.
    #[error("key {key} already exists and cannot be overwritten; delete it before writing")]
    OverwriteNotAllowed { key: String },

    /// A key codec rejected the key.
    #[error("invalid key: {0}")]
    KeyValidation(#[from] KeyValidationError),

    /// A value codec could not convert the value.
    #[error("serialization error: {source}")]
    Serialization {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Transport or I/O failure inside a backend.
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// A `NotFound` error naming `key`.
    pub fn not_found<K: fmt::Debug + ?Sized>(key: &K) -> Self {
        Error::NotFound {
            key: format!("{:?}", key),
        }
    }

    pub fn unsupported(operation: Operation) -> Self {
        Error::Unsupported { operation }
    }

    /// Wrap an arbitrary backend error.
    pub fn backend<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Backend(error.into())
    }

    /// Wrap a value codec failure.
    pub fn serialization<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Serialization {
            source: error.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Backend(Box::new(e))
    }
}
