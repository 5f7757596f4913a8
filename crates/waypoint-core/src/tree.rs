//! Navigator tree arena
//!
//! A [`NavigatorTree`] owns every navigator node in a generational arena.
//! Structural ownership follows the navigation shape: a node owns its tabs and
//! its presented child, so clearing or replacing a presented child frees the
//! old subtree. Handles ([`Navigator`]) carry a generational key and detect
//! released nodes instead of dereferencing them.
//!
//! Borrow discipline: the arena is borrowed only for short reads and
//! structural edits. Reactive cells are cloned out of the arena before they
//! are written, so observers may freely call back into the tree.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::codec::NodeRecord;
use crate::config::NavigatorConfig;
use crate::errors::Diagnostic;
use crate::navigator::Navigator;
use crate::reactive::Cell;
use crate::scheduler::{ImmediateScheduler, Scheduler, Task};
use crate::types::{NavigatorId, NavigatorKind, NodeKey, PresentationStyle, Routes};

/// Callback receiving diagnostics reported by navigation operations
pub type DiagnosticHook = Rc<dyn Fn(&Diagnostic)>;

/// Callback swapping out the whole navigator tree
pub type ReplaceRootHandler<R> = Rc<dyn Fn(Navigator<R>)>;

// ============================================================================
// Nodes and arena
// ============================================================================

pub(crate) struct Node<R: Routes> {
    pub(crate) id: NavigatorId,
    pub(crate) kind: NavigatorKind,
    pub(crate) root: Cell<Option<R::Destination>>,
    pub(crate) destinations: Cell<Vec<R::Destination>>,
    pub(crate) tabs: Vec<NodeKey>,
    pub(crate) selected_tab: Cell<Option<R::TabTag>>,
    pub(crate) presented: Cell<Option<NodeKey>>,
    pub(crate) presentation: PresentationStyle<R::SheetTag>,
    pub(crate) tab_tag: Option<R::TabTag>,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) replace_root: Option<ReplaceRootHandler<R>>,
    pub(crate) persist_signal: Cell<u64>,
    bound: bool,
}

struct Slot<R: Routes> {
    generation: u32,
    node: Option<Node<R>>,
}

pub(crate) struct Arena<R: Routes> {
    slots: Vec<Slot<R>>,
    free_list: Vec<u32>,
    live: usize,
}

impl<R: Routes> Arena<R> {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
        }
    }

    fn insert(&mut self, node: Node<R>) -> NodeKey {
        self.live += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeKey::new(index, slot.generation);
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeKey::new(index, 0)
    }

    pub(crate) fn get(&self, key: NodeKey) -> Option<&Node<R>> {
        let slot = self.slots.get(key.index as usize)?;
        if slot.generation != key.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn get_mut(&mut self, key: NodeKey) -> Option<&mut Node<R>> {
        let slot = self.slots.get_mut(key.index as usize)?;
        if slot.generation != key.generation {
            return None;
        }
        slot.node.as_mut()
    }

    fn remove(&mut self, key: NodeKey) -> Option<Node<R>> {
        let slot = self.slots.get_mut(key.index as usize)?;
        if slot.generation != key.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(key.index);
        self.live -= 1;
        Some(node)
    }

    fn find(&self, id: NavigatorId) -> Option<NodeKey> {
        self.slots.iter().enumerate().find_map(|(index, slot)| {
            let node = slot.node.as_ref()?;
            (node.id == id).then(|| NodeKey::new(index as u32, slot.generation))
        })
    }
}

// ============================================================================
// Tree
// ============================================================================

pub(crate) struct TreeShared<R: Routes> {
    pub(crate) arena: RefCell<Arena<R>>,
    config: NavigatorConfig,
    scheduler: Rc<dyn Scheduler>,
    diagnostic_hook: RefCell<Option<DiagnosticHook>>,
}

/// Owner of a set of navigator nodes.
///
/// Cloning the tree clones a handle; all clones share the same nodes.
pub struct NavigatorTree<R: Routes> {
    pub(crate) shared: Rc<TreeShared<R>>,
}

impl<R: Routes> Clone for NavigatorTree<R> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<R: Routes> Default for NavigatorTree<R> {
    fn default() -> Self {
        Self::new(NavigatorConfig::default(), ImmediateScheduler)
    }
}

impl<R: Routes> fmt::Debug for NavigatorTree<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigatorTree")
            .field("nodes", &self.len())
            .field("config", &self.shared.config)
            .finish()
    }
}

impl<R: Routes> NavigatorTree<R> {
    /// Create an empty tree using `scheduler` for deferred steps
    pub fn new(config: NavigatorConfig, scheduler: impl Scheduler + 'static) -> Self {
        Self::with_shared_scheduler(config, Rc::new(scheduler))
    }

    /// Create an empty tree sharing an existing scheduler
    pub fn with_shared_scheduler(config: NavigatorConfig, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            shared: Rc::new(TreeShared {
                arena: RefCell::new(Arena::new()),
                config,
                scheduler,
                diagnostic_hook: RefCell::new(None),
            }),
        }
    }

    /// Configuration shared by every navigator in this tree
    pub fn config(&self) -> &NavigatorConfig {
        &self.shared.config
    }

    /// Scheduler running deferred steps
    pub fn scheduler(&self) -> Rc<dyn Scheduler> {
        Rc::clone(&self.shared.scheduler)
    }

    /// Install a hook receiving every diagnostic in addition to the log
    pub fn set_diagnostic_hook(&self, hook: impl Fn(&Diagnostic) + 'static) {
        *self.shared.diagnostic_hook.borrow_mut() = Some(Rc::new(hook));
    }

    /// Remove the diagnostic hook
    pub fn clear_diagnostic_hook(&self) {
        self.shared.diagnostic_hook.borrow_mut().take();
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.shared.arena.borrow().live
    }

    /// Whether the tree holds no nodes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handle for `key`, if it is still alive
    pub fn navigator(&self, key: NodeKey) -> Option<Navigator<R>> {
        let (id, kind) = self.with_node(key, |node| (node.id, node.kind))?;
        Some(Navigator::from_parts(self.clone(), key, id, kind))
    }

    /// Find a live node by id
    pub fn find(&self, id: NavigatorId) -> Option<Navigator<R>> {
        let key = self.shared.arena.borrow().find(id)?;
        self.navigator(key)
    }

    /// Free a detached navigator and everything it owns.
    ///
    /// Returns `false` when the navigator is stale or still attached to a
    /// parent.
    pub fn release(&self, navigator: &Navigator<R>) -> bool {
        if !navigator.belongs_to(self) {
            return false;
        }
        match self.with_node(navigator.key(), |node| node.parent) {
            Some(None) => {
                self.free_subtree(navigator.key());
                true
            }
            _ => false,
        }
    }

    /// Whether two handles refer to the same tree
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    // ------------------------------------------------------------------------
    // Crate-internal plumbing
    // ------------------------------------------------------------------------

    pub(crate) fn with_node<T>(&self, key: NodeKey, f: impl FnOnce(&Node<R>) -> T) -> Option<T> {
        let arena = self.shared.arena.borrow();
        arena.get(key).map(f)
    }

    pub(crate) fn with_node_mut<T>(
        &self,
        key: NodeKey,
        f: impl FnOnce(&mut Node<R>) -> T,
    ) -> Option<T> {
        let mut arena = self.shared.arena.borrow_mut();
        arena.get_mut(key).map(f)
    }

    pub(crate) fn schedule(&self, delay: std::time::Duration, task: Task) {
        if delay.is_zero() {
            task();
        } else {
            self.shared.scheduler.schedule(delay, task);
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<TreeShared<R>> {
        Rc::downgrade(&self.shared)
    }

    pub(crate) fn upgrade(weak: &Weak<TreeShared<R>>) -> Option<Self> {
        weak.upgrade().map(|shared| Self { shared })
    }

    /// Log a diagnostic and forward it to the hook.
    pub(crate) fn report(&self, diagnostic: Diagnostic) {
        tracing::warn!(
            operation = diagnostic.operation(),
            diagnostic = %diagnostic,
            "Navigation operation failed"
        );
        let hook = self.shared.diagnostic_hook.borrow().clone();
        if let Some(hook) = hook {
            hook(&diagnostic);
        }
    }

    /// Insert a typed record and everything below it. Nodes are left unbound.
    pub(crate) fn insert_record(&self, record: &NodeRecord<R>) -> NodeKey {
        let tabs: Vec<NodeKey> = record.tabs.iter().map(|tab| self.insert_record(tab)).collect();
        let presented = record
            .navigator
            .as_deref()
            .map(|child| self.insert_record(child));
        let root = match record.kind {
            NavigatorKind::TabContainer => None,
            _ => record.root.clone(),
        };

        let node = Node {
            id: record.id,
            kind: record.kind,
            root: Cell::new(root),
            destinations: Cell::new(record.destinations.clone()),
            tabs,
            selected_tab: Cell::new(record.selected_tab.clone()),
            presented: Cell::new(presented),
            presentation: record.presentation.clone(),
            tab_tag: record.tab_item.clone(),
            parent: None,
            replace_root: None,
            persist_signal: Cell::new(0),
            bound: false,
        };
        self.shared.arena.borrow_mut().insert(node)
    }

    /// Wire parent links and persistence watchers below `key`.
    ///
    /// Idempotent per node.
    pub(crate) fn bind(&self, key: NodeKey) {
        let wiring = self.with_node_mut(key, |node| {
            if node.bound {
                return None;
            }
            node.bound = true;
            Some((
                node.tabs.clone(),
                node.presented.get(),
                node.root.clone(),
                node.destinations.clone(),
                node.selected_tab.clone(),
                node.presented.clone(),
            ))
        });
        let Some(Some((tabs, presented, root, destinations, selected_tab, presented_cell))) = wiring
        else {
            return;
        };

        for child in tabs.into_iter().chain(presented) {
            self.with_node_mut(child, |node| node.parent = Some(key));
            self.bind(child);
        }

        root.watch(self.dirty_watcher(key));
        destinations.watch(self.dirty_watcher(key));
        selected_tab.watch(self.dirty_watcher(key));
        presented_cell.watch(self.dirty_watcher(key));
        tracing::trace!(?key, "Navigator bound");
    }

    fn dirty_watcher<T: 'static>(&self, key: NodeKey) -> impl Fn(&T) + 'static {
        let weak = self.downgrade();
        move |_| {
            if let Some(tree) = Self::upgrade(&weak) {
                tree.mark_dirty(key);
            }
        }
    }

    /// Bump the persist signal of the parentless ancestor of `key`.
    pub(crate) fn mark_dirty(&self, key: NodeKey) {
        let Some(root) = self.root_key(key) else {
            return;
        };
        if let Some(signal) = self.with_node(root, |node| node.persist_signal.clone()) {
            signal.update(|generation| generation.wrapping_add(1));
        }
    }

    /// Walk parent links up to the parentless ancestor.
    pub(crate) fn root_key(&self, key: NodeKey) -> Option<NodeKey> {
        let arena = self.shared.arena.borrow();
        let mut current = key;
        loop {
            match arena.get(current)?.parent {
                Some(parent) => current = parent,
                None => return Some(current),
            }
        }
    }

    /// Whether `ancestor` is `key` or lies on its parent chain.
    pub(crate) fn is_ancestor_or_self(&self, ancestor: NodeKey, key: NodeKey) -> bool {
        let arena = self.shared.arena.borrow();
        let mut current = Some(key);
        while let Some(k) = current {
            if k == ancestor {
                return true;
            }
            current = arena.get(k).and_then(|node| node.parent);
        }
        false
    }

    /// Replace the presented child of `host`, freeing the previous one.
    pub(crate) fn set_presented(&self, host: NodeKey, child: Option<NodeKey>) -> bool {
        let Some(cell) = self.with_node(host, |node| node.presented.clone()) else {
            return false;
        };
        if let Some(child) = child {
            self.with_node_mut(child, |node| node.parent = Some(host));
            self.bind(child);
        }
        let previous = cell.get();
        cell.set(child);
        if let Some(previous) = previous.filter(|previous| Some(*previous) != child) {
            self.free_subtree(previous);
        }
        true
    }

    /// Remove `key` and everything it owns from the arena.
    pub(crate) fn free_subtree(&self, key: NodeKey) {
        let removed = {
            let mut arena = self.shared.arena.borrow_mut();
            let mut removed = Vec::new();
            let mut queue = vec![key];
            while let Some(next) = queue.pop() {
                if let Some(node) = arena.remove(next) {
                    queue.extend(node.tabs.iter().copied());
                    queue.extend(node.presented.get());
                    removed.push(node);
                }
            }
            removed
        };
        tracing::debug!(?key, released = removed.len(), "Released navigator subtree");
        drop(removed);
    }
}
