//! Persistence driver
//!
//! Saves a navigator tree whenever it settles and restores it at startup.
//! Every state change bumps the root's persist signal; the driver waits for
//! the signal to stay quiet for the debounce interval before writing.

use std::cell::{Cell as StdCell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::{debug, info, warn};
use waypoint_core::reactive::{Cell, ObserverId};
use waypoint_core::{
    NavigationStore, Navigator, NavigatorTree, Routes, Scheduler, StoreError, WeakNavigator,
};

struct DriverState<R: Routes, S> {
    store: S,
    scheduler: Rc<dyn Scheduler>,
    debounce: Duration,
    root: RefCell<Option<WeakNavigator<R>>>,
    subscription: RefCell<Option<(Cell<u64>, ObserverId)>>,
    generation: StdCell<u64>,
    pending: StdCell<bool>,
}

impl<R: Routes, S: NavigationStore<R>> DriverState<R, S> {
    fn write(&self) -> Result<(), StoreError> {
        self.pending.set(false);
        let root = self
            .root
            .borrow()
            .as_ref()
            .and_then(WeakNavigator::upgrade)
            .map(|navigator| navigator.root_navigator());
        let Some(root) = root else {
            debug!("Navigator tree released; nothing to persist");
            return Ok(());
        };
        let record = root.encode()?;
        self.store.store(&record)?;
        debug!(
            navigator = %root.id(),
            nodes = record.node_count(),
            "Persisted navigation tree"
        );
        Ok(())
    }

    fn write_logged(&self) {
        if let Err(err) = self.write() {
            warn!(error = %err, "Failed to persist navigation tree");
        }
    }

    fn unwatch(&self) {
        if let Some((signal, id)) = self.subscription.borrow_mut().take() {
            signal.unsubscribe(id);
        }
    }
}

/// Writes a navigator tree to a [`NavigationStore`] on a trailing-edge
/// debounce.
///
/// Only the last change of a burst is written, one debounce interval after
/// it happened. Dropping the driver stops watching; a pending write then
/// never happens, so call [`flush`](Self::flush) first when shutting down.
pub struct PersistenceDriver<R: Routes, S> {
    state: Rc<DriverState<R, S>>,
}

impl<R: Routes, S: NavigationStore<R> + 'static> PersistenceDriver<R, S> {
    /// Watch the tree containing `navigator`, using the tree's scheduler and
    /// configured debounce interval
    pub fn new(navigator: &Navigator<R>, store: S) -> Self {
        let tree = navigator.tree();
        Self::with_scheduler(
            navigator,
            store,
            tree.scheduler(),
            tree.config().persist_debounce(),
        )
    }

    /// Watch the tree containing `navigator` with an explicit scheduler and
    /// debounce interval
    pub fn with_scheduler(
        navigator: &Navigator<R>,
        store: S,
        scheduler: Rc<dyn Scheduler>,
        debounce: Duration,
    ) -> Self {
        let driver = Self {
            state: Rc::new(DriverState {
                store,
                scheduler,
                debounce,
                root: RefCell::new(None),
                subscription: RefCell::new(None),
                generation: StdCell::new(0),
                pending: StdCell::new(false),
            }),
        };
        driver.attach(navigator);
        driver
    }

    /// Follow the tree containing `navigator` instead of the current one.
    ///
    /// Used after the root has been replaced. A pending write for the old
    /// tree is dropped.
    pub fn attach(&self, navigator: &Navigator<R>) {
        self.state.unwatch();
        self.cancel_pending();

        let root = navigator.root_navigator();
        *self.state.root.borrow_mut() = Some(root.downgrade());
        let Some(signal) = root.persist_signal() else {
            debug!(navigator = %root.id(), "Persistence attached to released navigator");
            return;
        };
        let weak = Rc::downgrade(&self.state);
        let id = signal.watch(move |_: &u64| {
            if let Some(state) = weak.upgrade() {
                schedule_write(&state);
            }
        });
        *self.state.subscription.borrow_mut() = Some((signal, id));
        debug!(
            navigator = %root.id(),
            debounce_ms = self.state.debounce.as_millis() as u64,
            "Persistence attached"
        );
    }

    /// Write the tree now, dropping any pending debounced write
    pub fn flush(&self) -> Result<(), StoreError> {
        self.cancel_pending();
        self.state.write()
    }

    /// Whether a debounced write is waiting
    pub fn is_pending(&self) -> bool {
        self.state.pending.get()
    }

    /// The backing store
    pub fn store(&self) -> &S {
        &self.state.store
    }

    fn cancel_pending(&self) {
        let generation = self.state.generation.get().wrapping_add(1);
        self.state.generation.set(generation);
        self.state.pending.set(false);
    }
}

fn schedule_write<R, S>(state: &Rc<DriverState<R, S>>)
where
    R: Routes,
    S: NavigationStore<R> + 'static,
{
    let generation = state.generation.get().wrapping_add(1);
    state.generation.set(generation);
    state.pending.set(true);
    if state.debounce.is_zero() {
        state.write_logged();
        return;
    }

    let weak: Weak<DriverState<R, S>> = Rc::downgrade(state);
    state.scheduler.schedule(
        state.debounce,
        Box::new(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            // Superseded by a later change or a flush
            if state.generation.get() == generation {
                state.write_logged();
            }
        }),
    );
}

impl<R: Routes, S> Drop for PersistenceDriver<R, S> {
    fn drop(&mut self) {
        if let Some((signal, id)) = self.state.subscription.borrow_mut().take() {
            signal.unsubscribe(id);
        }
    }
}

impl<R: Routes, S> fmt::Debug for PersistenceDriver<R, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistenceDriver")
            .field("debounce", &self.state.debounce)
            .field("pending", &self.state.pending.get())
            .finish()
    }
}

/// Rebuild the stored tree into `tree`, or build a fresh one with `fallback`.
///
/// A missing record, a load error and a record that fails to decode all
/// fall back; the reason is logged.
pub fn restore_or_else<R, S>(
    tree: &NavigatorTree<R>,
    store: &S,
    fallback: impl FnOnce(&NavigatorTree<R>) -> Navigator<R>,
) -> Navigator<R>
where
    R: Routes,
    S: NavigationStore<R> + ?Sized,
{
    let record = match store.load() {
        Ok(Some(record)) => record,
        Ok(None) => {
            debug!("No stored navigation tree");
            return fallback(tree);
        }
        Err(err) => {
            warn!(error = %err, "Failed to load navigation tree; starting fresh");
            return fallback(tree);
        }
    };
    match tree.decode(&record) {
        Ok(root) => {
            info!(
                navigator = %root.id(),
                nodes = record.node_count(),
                "Restored navigation tree"
            );
            root
        }
        Err(err) => {
            warn!(error = %err, "Stored navigation tree is invalid; starting fresh");
            fallback(tree)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_core::{InMemoryNavigationStore, NavigatorConfig, NavigatorKind, NodeRecord};
    use waypoint_testkit::{article_stack, immediate_tree, manual_tree, DemoRoutes, Screen};

    type Store = Rc<InMemoryNavigationStore<DemoRoutes>>;

    #[test]
    fn test_trailing_edge_debounce() {
        let (tree, clock) = manual_tree();
        let nav = article_stack(&tree, 0);
        let store: Store = Rc::new(InMemoryNavigationStore::new());
        let driver = PersistenceDriver::new(&nav, Rc::clone(&store));

        nav.push(Screen::Feed);
        clock.advance(Duration::from_millis(4_000));
        nav.push(Screen::Search);
        clock.advance(Duration::from_millis(4_000));
        assert!(driver.is_pending());
        assert_eq!(store.writes(), 0);

        clock.advance(Duration::from_millis(1_000));
        assert!(!driver.is_pending());
        assert_eq!(store.writes(), 1);
        assert_eq!(
            store.snapshot().unwrap().destinations,
            vec![Screen::Feed, Screen::Search]
        );
    }

    #[test]
    fn test_flush_cancels_pending_write() {
        let (tree, clock) = manual_tree();
        let nav = article_stack(&tree, 0);
        let store: Store = Rc::new(InMemoryNavigationStore::new());
        let driver = PersistenceDriver::new(&nav, Rc::clone(&store));

        nav.push(Screen::Feed);
        driver.flush().unwrap();
        assert_eq!(store.writes(), 1);

        clock.run_until_idle();
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn test_zero_debounce_writes_inline() {
        let config = NavigatorConfig {
            persist_debounce_ms: 0,
            ..NavigatorConfig::immediate()
        };
        let tree = waypoint_testkit::manual_tree_with(config).0;
        let nav = article_stack(&tree, 0);
        let store: Store = Rc::new(InMemoryNavigationStore::new());
        let _driver = PersistenceDriver::new(&nav, Rc::clone(&store));

        nav.push(Screen::Feed);
        nav.pop();
        assert_eq!(store.writes(), 2);
    }

    #[test]
    fn test_dropped_driver_stops_watching() {
        let (tree, clock) = manual_tree();
        let nav = article_stack(&tree, 0);
        let store: Store = Rc::new(InMemoryNavigationStore::new());
        let driver = PersistenceDriver::new(&nav, Rc::clone(&store));
        nav.push(Screen::Feed);
        drop(driver);

        clock.run_until_idle();
        nav.push(Screen::Search);
        clock.run_until_idle();
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn test_restore_prefers_stored_tree() {
        let store = InMemoryNavigationStore::<DemoRoutes>::new();
        let mut record = NodeRecord::new(NavigatorKind::Stack, Some(Screen::Home));
        record.destinations = vec![Screen::Settings];
        store.store(&record).unwrap();

        let tree = immediate_tree();
        let root = restore_or_else(&tree, &store, |tree| article_stack(tree, 0));
        assert_eq!(root.id(), record.id);
        assert_eq!(root.destinations(), vec![Screen::Settings]);
    }

    #[test]
    fn test_restore_falls_back_when_empty() {
        let store = InMemoryNavigationStore::<DemoRoutes>::new();
        let tree = immediate_tree();
        let root = restore_or_else(&tree, &store, |tree| article_stack(tree, 2));
        assert_eq!(root.destinations().len(), 2);
    }
}
