//! Filesystem byte store
//!
//! One file per key under a base directory. Writes go to a temporary file
//! that is synced and renamed over the target, so a crash never leaves a
//! half-written tree behind.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ByteStoreError;
use crate::ByteStore;

const MAX_KEY_LEN: usize = 255;

/// Byte store persisting each key as a file.
#[derive(Debug, Clone)]
pub struct FileByteStore {
    base_path: PathBuf,
}

impl FileByteStore {
    /// Open a store rooted at `base_path`, creating the directory if needed
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, ByteStoreError> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).map_err(|e| {
            ByteStoreError::WriteFailed(format!(
                "Failed to create storage directory {}: {e}",
                base_path.display()
            ))
        })?;
        debug!(path = %base_path.display(), "Opened file byte store");
        Ok(Self { base_path })
    }

    /// Directory holding the stored files
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn validate_key(key: &str) -> Result<(), ByteStoreError> {
        if key.is_empty() {
            return Err(ByteStoreError::invalid_key("Key cannot be empty"));
        }
        if key.len() > MAX_KEY_LEN {
            return Err(ByteStoreError::invalid_key(format!(
                "Key too long (max {MAX_KEY_LEN} characters)"
            )));
        }
        // Path traversal and separators
        if key.contains("..") || key.contains('\0') || key.contains('/') || key.contains('\\') {
            return Err(ByteStoreError::invalid_key("Key contains invalid characters"));
        }
        Ok(())
    }

    fn key_to_path(&self, key: &str) -> Result<PathBuf, ByteStoreError> {
        Self::validate_key(key)?;
        Ok(self.base_path.join(format!("{key}.json")))
    }
}

impl ByteStore for FileByteStore {
    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), ByteStoreError> {
        let path = self.key_to_path(key)?;
        let temp_path = path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path).map_err(|e| {
            ByteStoreError::WriteFailed(format!("Failed to create temp file: {e}"))
        })?;
        file.write_all(&value)
            .map_err(|e| ByteStoreError::WriteFailed(format!("Failed to write data: {e}")))?;
        file.sync_all()
            .map_err(|e| ByteStoreError::WriteFailed(format!("Failed to sync: {e}")))?;
        fs::rename(&temp_path, &path).map_err(|e| {
            ByteStoreError::WriteFailed(format!("Failed to rename temp file: {e}"))
        })?;

        debug!(key, bytes = value.len(), "Stored value");
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ByteStoreError> {
        let path = self.key_to_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ByteStoreError::ReadFailed(format!(
                "Failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    fn remove(&self, key: &str) -> Result<bool, ByteStoreError> {
        let path = self.key_to_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ByteStoreError::DeleteFailed(format!(
                "Failed to remove {}: {e}",
                path.display()
            ))),
        }
    }
}
