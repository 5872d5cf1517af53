//! Reference stores for keyshape.
//!
//! - [`InMemoryStore`]: any ordered key type, any cloneable value
//! - [`LocalDiskStore`]: relative path keys, file contents as values

mod in_memory;
mod local_disk;

pub use in_memory::InMemoryStore;
pub use local_disk::{LocalDiskConfig, LocalDiskError, LocalDiskStore};
