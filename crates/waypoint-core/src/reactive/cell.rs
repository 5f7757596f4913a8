//! Cell<T> - A single-threaded observable slot
//!
//! `Cell<T>` holds a value and notifies registered observers synchronously on
//! every write. Observers run in registration order after the cell has
//! released its internal borrows, so an observer may read the cell, write
//! other cells or write this cell again.
//!
//! Poll-driven consumers use [`Cell::poll_subscription`] instead, which tracks
//! the version counter and never runs code on the writer's stack.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Identifier returned by [`Cell::subscribe`] and [`Cell::watch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

type Observer<T> = Rc<dyn Fn(&T)>;

struct CellInner<T> {
    value: RefCell<T>,
    version: std::cell::Cell<u64>,
    observers: RefCell<Vec<(ObserverId, Observer<T>)>>,
    next_observer: std::cell::Cell<u64>,
}

/// A reactive value with push observers and poll subscriptions.
///
/// Clones share state.
///
/// ```rust,ignore
/// use waypoint_core::reactive::Cell;
///
/// let depth = Cell::new(0usize);
/// let id = depth.subscribe(|d| println!("depth = {d}"));
/// depth.set(2);
/// depth.unsubscribe(id);
/// ```
pub struct Cell<T> {
    inner: Rc<CellInner<T>>,
}

impl<T> Clone for Cell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> Cell<T> {
    /// Create a new cell holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(CellInner {
                value: RefCell::new(value),
                version: std::cell::Cell::new(0),
                observers: RefCell::new(Vec::new()),
                next_observer: std::cell::Cell::new(0),
            }),
        }
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Read the current value without cloning it.
    pub fn with<U>(&self, f: impl FnOnce(&T) -> U) -> U {
        f(&self.inner.value.borrow())
    }

    /// Number of writes since creation.
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Store `value` and notify every observer.
    pub fn set(&self, value: T) {
        {
            let mut slot = self.inner.value.borrow_mut();
            *slot = value;
        }
        self.inner.version.set(self.inner.version.get() + 1);
        self.notify();
    }

    /// Replace the value with `f(current)`.
    pub fn update(&self, f: impl FnOnce(T) -> T) {
        let next = f(self.get());
        self.set(next);
    }

    /// Register an observer and immediately call it with the current value.
    pub fn subscribe(&self, observer: impl Fn(&T) + 'static) -> ObserverId {
        let observer: Observer<T> = Rc::new(observer);
        let id = self.register(Rc::clone(&observer));
        let current = self.get();
        observer(&current);
        id
    }

    /// Register an observer without replaying the current value.
    pub fn watch(&self, observer: impl Fn(&T) + 'static) -> ObserverId {
        self.register(Rc::new(observer))
    }

    /// Remove an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.inner.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    /// Create a poll-based subscription starting at the current version.
    pub fn poll_subscription(&self) -> Subscription<T> {
        Subscription {
            source: self.clone(),
            last_version: self.version(),
        }
    }

    /// Whether two handles share the same underlying slot.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn register(&self, observer: Observer<T>) -> ObserverId {
        let id = ObserverId(self.inner.next_observer.get());
        self.inner.next_observer.set(id.0 + 1);
        self.inner.observers.borrow_mut().push((id, observer));
        id
    }

    fn notify(&self) {
        // Snapshot so observers can subscribe/unsubscribe while being notified.
        let observers: Vec<Observer<T>> = self
            .inner
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        if observers.is_empty() {
            return;
        }
        let value = self.get();
        for observer in observers {
            observer(&value);
        }
    }
}

impl<T: Clone + Default + 'static> Default for Cell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug + 'static> fmt::Debug for Cell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("value", &*self.inner.value.borrow())
            .field("version", &self.version())
            .field("observers", &self.observer_count())
            .finish()
    }
}

/// A version-tracking view of a [`Cell`] for poll-driven renderers.
pub struct Subscription<T> {
    source: Cell<T>,
    last_version: u64,
}

impl<T: Clone + 'static> Subscription<T> {
    /// Check if the source has changed since the last poll.
    pub fn has_changed(&self) -> bool {
        self.source.version() > self.last_version
    }

    /// Returns the new value if the source was written since the last poll.
    pub fn poll(&mut self) -> Option<T> {
        let current = self.source.version();
        if current > self.last_version {
            self.last_version = current;
            Some(self.source.get())
        } else {
            None
        }
    }

    /// Get the current value regardless of whether it changed.
    pub fn get(&self) -> T {
        self.source.get()
    }

    /// Get the last version this subscription observed.
    pub fn last_observed_version(&self) -> u64 {
        self.last_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_new_and_get() {
        let c = Cell::new(42);
        assert_eq!(c.get(), 42);
        assert_eq!(c.version(), 0);
    }

    #[test]
    fn test_cell_set_bumps_version() {
        let c = Cell::new(0);
        c.set(1);
        c.set(2);
        assert_eq!(c.get(), 2);
        assert_eq!(c.version(), 2);
    }

    #[test]
    fn test_cell_clone_shares_state() {
        let c1 = Cell::new(String::from("a"));
        let c2 = c1.clone();
        c1.set("b".into());
        assert_eq!(c2.get(), "b");
        assert!(c1.ptr_eq(&c2));
    }

    #[test]
    fn test_subscribe_replays_current_value() {
        let c = Cell::new(7);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        c.subscribe(move |v| sink.borrow_mut().push(*v));
        c.set(8);
        assert_eq!(*seen.borrow(), vec![7, 8]);
    }

    #[test]
    fn test_watch_does_not_replay() {
        let c = Cell::new(7);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        c.watch(move |v| sink.borrow_mut().push(*v));
        assert!(seen.borrow().is_empty());
        c.set(9);
        assert_eq!(*seen.borrow(), vec![9]);
    }

    #[test]
    fn test_observers_run_in_registration_order() {
        let c = Cell::new(0);
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let sink = Rc::clone(&order);
            c.watch(move |_| sink.borrow_mut().push(tag));
        }
        c.set(1);
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unsubscribe() {
        let c = Cell::new(0);
        let count = Rc::new(std::cell::Cell::new(0));
        let sink = Rc::clone(&count);
        let id = c.watch(move |_| sink.set(sink.get() + 1));
        c.set(1);
        assert!(c.unsubscribe(id));
        assert!(!c.unsubscribe(id));
        c.set(2);
        assert_eq!(count.get(), 1);
        assert_eq!(c.observer_count(), 0);
    }

    #[test]
    fn test_observer_may_write_the_cell() {
        let c = Cell::new(0);
        let writer = c.clone();
        c.watch(move |v| {
            if *v < 3 {
                writer.set(v + 1);
            }
        });
        c.set(1);
        assert_eq!(c.get(), 3);
    }

    #[test]
    fn test_update() {
        let c = Cell::new(vec![1, 2]);
        c.update(|mut v| {
            v.push(3);
            v
        });
        assert_eq!(c.get(), vec![1, 2, 3]);
    }

    #[test]
    fn test_poll_subscription() {
        let c = Cell::new(0);
        let mut sub = c.poll_subscription();
        assert!(!sub.has_changed());
        assert_eq!(sub.poll(), None);

        c.set(5);
        assert!(sub.has_changed());
        assert_eq!(sub.poll(), Some(5));
        assert_eq!(sub.poll(), None);
        assert_eq!(sub.get(), 5);
        assert_eq!(sub.last_observed_version(), 1);
    }

    #[test]
    fn test_cell_debug() {
        let c = Cell::new(42);
        let debug_str = format!("{c:?}");
        assert!(debug_str.contains("Cell"));
        assert!(debug_str.contains("42"));
    }
}
