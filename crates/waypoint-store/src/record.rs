//! JSON record store
//!
//! Persists a navigator tree's [`NodeRecord`] as JSON under a single key of a
//! [`ByteStore`].

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use waypoint_core::{NavigationStore, NavigatorConfig, NodeRecord, Routes, StoreError};

use crate::ByteStore;

/// [`NavigationStore`] backed by a byte store.
pub struct RecordStore<R, B> {
    backend: B,
    key: String,
    _routes: PhantomData<fn() -> R>,
}

impl<R: Routes, B: ByteStore> RecordStore<R, B> {
    /// Store records under `key`
    pub fn new(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            _routes: PhantomData,
        }
    }

    /// Store records under the configured storage key
    pub fn from_config(backend: B, config: &NavigatorConfig) -> Self {
        Self::new(backend, config.storage_key.clone())
    }

    /// Key the record is stored under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying byte store
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Remove the stored record. Returns whether one existed.
    pub fn clear(&self) -> Result<bool, StoreError> {
        Ok(self.backend.remove(&self.key)?)
    }
}

impl<R, B> NavigationStore<R> for RecordStore<R, B>
where
    R: Routes,
    R::Destination: Serialize + DeserializeOwned,
    R::TabTag: Serialize + DeserializeOwned,
    R::SheetTag: Serialize + DeserializeOwned,
    B: ByteStore,
{
    fn store(&self, tree: &NodeRecord<R>) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(tree)?;
        debug!(key = %self.key, bytes = bytes.len(), "Storing navigation tree");
        self.backend.put(&self.key, bytes)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<NodeRecord<R>>, StoreError> {
        let Some(bytes) = self.backend.get(&self.key)? else {
            return Ok(None);
        };
        match NodeRecord::<R>::from_json_bytes(&bytes) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                warn!(key = %self.key, error = %err, "Stored navigation tree is malformed");
                Err(StoreError::Serialization(err.to_string()))
            }
        }
    }
}

impl<R, B: std::fmt::Debug> std::fmt::Debug for RecordStore<R, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("backend", &self.backend)
            .field("key", &self.key)
            .finish()
    }
}
