//! Storage collaborator interface
//!
//! The navigator never talks to a storage backend directly. The persistence
//! driver hands encoded trees to a [`NavigationStore`] and restores from it at
//! startup.

use std::cell::RefCell;
use std::rc::Rc;

use crate::codec::NodeRecord;
use crate::errors::StoreError;
use crate::types::Routes;

/// Saves and loads one navigator tree.
pub trait NavigationStore<R: Routes> {
    /// Persist `tree`, replacing any previously stored tree
    fn store(&self, tree: &NodeRecord<R>) -> Result<(), StoreError>;

    /// Load the stored tree, if any
    fn load(&self) -> Result<Option<NodeRecord<R>>, StoreError>;
}

impl<R: Routes, S: NavigationStore<R> + ?Sized> NavigationStore<R> for Rc<S> {
    fn store(&self, tree: &NodeRecord<R>) -> Result<(), StoreError> {
        (**self).store(tree)
    }

    fn load(&self) -> Result<Option<NodeRecord<R>>, StoreError> {
        (**self).load()
    }
}

/// Keeps the last stored record in memory without encoding it.
pub struct InMemoryNavigationStore<R: Routes> {
    record: RefCell<Option<NodeRecord<R>>>,
    writes: std::cell::Cell<usize>,
}

impl<R: Routes> Default for InMemoryNavigationStore<R> {
    fn default() -> Self {
        Self {
            record: RefCell::new(None),
            writes: std::cell::Cell::new(0),
        }
    }
}

impl<R: Routes> InMemoryNavigationStore<R> {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `store` calls
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    /// The last stored record
    pub fn snapshot(&self) -> Option<NodeRecord<R>> {
        self.record.borrow().clone()
    }
}

impl<R: Routes> NavigationStore<R> for InMemoryNavigationStore<R> {
    fn store(&self, tree: &NodeRecord<R>) -> Result<(), StoreError> {
        *self.record.borrow_mut() = Some(tree.clone());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn load(&self) -> Result<Option<NodeRecord<R>>, StoreError> {
        Ok(self.snapshot())
    }
}
