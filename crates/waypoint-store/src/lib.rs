//! # Waypoint Store
//!
//! Storage backends for navigator trees.
//!
//! - [`ByteStore`]: synchronous key/value byte storage
//! - [`MemoryByteStore`]: in-memory backend for tests
//! - [`FileByteStore`]: one file per key under a directory
//! - [`RecordStore`]: [`waypoint_core::NavigationStore`] encoding trees as JSON

#![forbid(unsafe_code)]

mod error;
mod filesystem;
mod memory;
mod record;

pub use error::ByteStoreError;
pub use filesystem::FileByteStore;
pub use memory::MemoryByteStore;
pub use record::RecordStore;

/// Synchronous key/value byte storage.
pub trait ByteStore {
    /// Store `value` under `key`, replacing any previous value
    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), ByteStoreError>;

    /// Value stored under `key`
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ByteStoreError>;

    /// Remove `key`. Returns whether it existed.
    fn remove(&self, key: &str) -> Result<bool, ByteStoreError>;
}

impl<B: ByteStore + ?Sized> ByteStore for std::rc::Rc<B> {
    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), ByteStoreError> {
        (**self).put(key, value)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ByteStoreError> {
        (**self).get(key)
    }

    fn remove(&self, key: &str) -> Result<bool, ByteStoreError> {
        (**self).remove(key)
    }
}
