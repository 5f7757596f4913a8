//! In-memory byte store for testing

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::ByteStoreError;
use crate::ByteStore;

/// In-memory byte store. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryByteStore {
    data: Rc<RefCell<HashMap<String, Vec<u8>>>>,
}

impl MemoryByteStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.data.borrow().is_empty()
    }
}

impl ByteStore for MemoryByteStore {
    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), ByteStoreError> {
        self.data.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ByteStoreError> {
        Ok(self.data.borrow().get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<bool, ByteStoreError> {
        Ok(self.data.borrow_mut().remove(key).is_some())
    }
}

impl std::fmt::Debug for MemoryByteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.data.borrow();
        let mut keys: Vec<&String> = data.keys().collect();
        keys.sort();
        f.debug_struct("MemoryByteStore").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_remove() {
        let store = MemoryByteStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.put("k", b"v".to_vec()).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(b"v".to_vec()));

        assert!(store.remove("k").unwrap());
        assert!(!store.remove("k").unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_clones_share_data() {
        let a = MemoryByteStore::new();
        let b = a.clone();
        a.put("k", vec![1]).unwrap();
        assert_eq!(b.len(), 1);
    }
}
