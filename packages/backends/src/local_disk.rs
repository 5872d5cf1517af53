//! A store of files under a root directory.
//!
//! Keys are `/`-separated paths relative to the root and values are the raw
//! file contents. Only regular files are keys; directories exist to hold them.
//! Symlinks are never followed: a link, or anything reached through one, is
//! not a key and can't be written.

use std::path::{Component, Path, PathBuf};
use std::{fs, io};

use bytes::Bytes;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use keyshape_core_store::{Error, KeyCollection, Keys, ObjReader, ObjWriter};
use keyshape_key_codec::KeyValidationError;

lazy_static! {
    /// One or more non-empty components, none of them `.` or `..`.
    static ref VALID_KEY: Regex = {
        let component = r"(?:[^/.][^/]*|\.[^/.][^/]*|\.\.[^/]+)";
        Regex::new(&format!(r"^{component}(?:/{component})*$")).unwrap()
    };
}

/// How to open a [`LocalDiskStore`].
///
/// Every field has a default, so a config can be loaded from a partial JSON
/// object.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalDiskConfig {
    /// Directory holding the store's files.
    pub root: PathBuf,
    /// Create `root` (and its parents) if it does not exist yet.
    pub create_root: bool,
    /// Only relative paths this regex matches from their start are keys.
    pub key_pattern: Option<String>,
}

impl LocalDiskConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LocalDiskError {
    #[error("an error occurred trying to use the root path {}: {error}", .path.display())]
    RootPathInvalid { path: PathBuf, error: io::Error },

    #[error("invalid key pattern: {0}")]
    KeyPattern(#[from] regex::Error),

    #[error("refusing to write through symlink {}", .path.display())]
    Symlink { path: PathBuf },

    #[error("file {} could not be accessed: {error}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        error: io::Error,
    },
}

impl From<LocalDiskError> for Error {
    fn from(error: LocalDiskError) -> Self {
        Error::backend(error)
    }
}

pub struct LocalDiskStore {
    root: PathBuf,
    key_pattern: Option<Regex>,
}

impl LocalDiskStore {
    /// Open a store rooted at an existing, writable directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, LocalDiskError> {
        Self::open(LocalDiskConfig::new(root))
    }

    pub fn open(config: LocalDiskConfig) -> Result<Self, LocalDiskError> {
        let LocalDiskConfig {
            root,
            create_root,
            key_pattern,
        } = config;

        if create_root && !root.exists() {
            log::debug!("Creating store root {}...", root.display());
            fs::create_dir_all(&root).map_err(|error| LocalDiskError::RootPathInvalid {
                path: root.clone(),
                error,
            })?;
        }

        let attr = fs::metadata(&root).map_err(|error| LocalDiskError::RootPathInvalid {
            path: root.clone(),
            error,
        })?;

        if !attr.is_dir() {
            return Err(LocalDiskError::RootPathInvalid {
                path: root,
                error: io::Error::other("Root path must be a directory."),
            });
        }

        if attr.permissions().readonly() {
            return Err(LocalDiskError::RootPathInvalid {
                path: root,
                error: io::Error::other("Root directory must be writable"),
            });
        }

        let key_pattern = key_pattern.as_deref().map(Regex::new).transpose()?;

        let root = root
            .canonicalize()
            .map_err(|error| LocalDiskError::RootPathInvalid { path: root, error })?;

        Ok(LocalDiskStore { root, key_pattern })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn accepts(&self, key: &str) -> bool {
        match &self.key_pattern {
            Some(pattern) => pattern.find(key).is_some_and(|m| m.start() == 0),
            None => true,
        }
    }

    /// Map a key to its file path, rejecting keys that would leave the root.
    fn file_path(&self, key: &str) -> Result<PathBuf, KeyValidationError> {
        if !VALID_KEY.is_match(key) {
            return Err(KeyValidationError::PatternMismatch {
                input: key.to_string(),
                pattern: VALID_KEY.as_str().to_string(),
            });
        }
        Ok(self.root.join(key))
    }

    /// Inverse of `file_path`. Paths that aren't valid UTF-8 have no key.
    fn key_of_path(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts = relative
            .components()
            .map(|c| match c {
                Component::Normal(s) => s.to_str(),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?;
        Some(parts.join("/"))
    }

    /// The first existing path on the way from the root to `key` that is a
    /// symlink.
    fn symlink_on_path(&self, key: &str) -> Option<PathBuf> {
        let mut path = self.root.clone();
        for part in key.split('/') {
            path.push(part);
            match fs::symlink_metadata(&path) {
                Ok(meta) if meta.file_type().is_symlink() => return Some(path),
                Ok(_) => {}
                Err(_) => return None,
            }
        }
        None
    }

    /// Path of a key that is currently readable, or `NotFound`.
    ///
    /// Agrees with `iter_keys`: the file must be regular and reached without
    /// following links.
    fn existing_file(&self, key: &str) -> Result<PathBuf, Error> {
        let file_path = self.file_path(key)?;
        if !self.accepts(key) || self.symlink_on_path(key).is_some() {
            return Err(Error::not_found(key));
        }
        match fs::symlink_metadata(&file_path) {
            Ok(meta) if meta.file_type().is_file() => Ok(file_path),
            _ => Err(Error::not_found(key)),
        }
    }
}

impl KeyCollection for LocalDiskStore {
    type Key = String;

    fn iter_keys(&self) -> Keys<'_, String> {
        Box::new(
            walkdir::WalkDir::new(&self.root)
                .min_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        log::debug!("Skipping unreadable entry: {}", e);
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file())
                .filter_map(move |entry| self.key_of_path(entry.path()))
                .filter(move |key| self.accepts(key)),
        )
    }

    fn contains_key(&self, key: &String) -> bool {
        self.existing_file(key).is_ok()
    }
}

impl ObjReader for LocalDiskStore {
    type Key = String;
    type Value = Bytes;

    fn read(&self, key: &String) -> Result<Bytes, Error> {
        let file_path = self.existing_file(key)?;
        log::debug!("Reading {}...", file_path.display());

        match fs::read(&file_path) {
            Ok(data) => Ok(Bytes::from(data)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Err(Error::not_found(key)),
            Err(error) => Err(LocalDiskError::Io {
                path: file_path,
                error,
            }
            .into()),
        }
    }
}

impl ObjWriter for LocalDiskStore {
    type Key = String;
    type Value = Bytes;

    fn write(&mut self, key: String, value: Bytes) -> Result<(), Error> {
        let file_path = self.file_path(&key)?;
        if let Some(pattern) = &self.key_pattern {
            if !self.accepts(&key) {
                return Err(KeyValidationError::PatternMismatch {
                    input: key,
                    pattern: pattern.as_str().to_string(),
                }
                .into());
            }
        }

        if let Some(path) = self.symlink_on_path(&key) {
            return Err(LocalDiskError::Symlink { path }.into());
        }

        log::debug!("Writing {}...", file_path.display());

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).map_err(|error| LocalDiskError::Io {
                path: parent.to_path_buf(),
                error,
            })?;
        }

        fs::write(&file_path, &value).map_err(|error| LocalDiskError::Io {
            path: file_path,
            error,
        })?;

        Ok(())
    }

    fn delete(&mut self, key: &String) -> Result<(), Error> {
        let file_path = self.existing_file(key)?;
        log::debug!("Deleting {}...", file_path.display());

        fs::remove_file(&file_path).map_err(|error| match error.kind() {
            io::ErrorKind::NotFound => Error::not_found(key),
            _ => LocalDiskError::Io {
                path: file_path,
                error,
            }
            .into(),
        })
    }
}
