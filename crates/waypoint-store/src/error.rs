//! Byte store errors

use waypoint_core::StoreError;

/// Failures of a [`crate::ByteStore`] backend.
#[derive(Debug, thiserror::Error)]
pub enum ByteStoreError {
    /// The key cannot be used by this backend
    #[error("Invalid key: {reason}")]
    InvalidKey {
        /// Why the key was rejected
        reason: String,
    },

    /// Reading a value failed
    #[error("Read failed: {0}")]
    ReadFailed(String),

    /// Writing a value failed
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// Removing a value failed
    #[error("Delete failed: {0}")]
    DeleteFailed(String),
}

impl ByteStoreError {
    /// Create an invalid key error
    pub fn invalid_key(reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            reason: reason.into(),
        }
    }
}

impl From<ByteStoreError> for StoreError {
    fn from(err: ByteStoreError) -> Self {
        StoreError::Backend(err.to_string())
    }
}
