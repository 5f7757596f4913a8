//! Navigator handles and derived properties
//!
//! A [`Navigator`] is a cheap handle to one node of a [`NavigatorTree`]. Reads
//! on a released node return empty values; operations on a released node
//! report [`Diagnostic::StaleNavigator`].

use std::fmt;
use std::rc::{Rc, Weak};

use crate::errors::Diagnostic;
use crate::reactive::Cell;
use crate::tree::{NavigatorTree, ReplaceRootHandler, TreeShared};
use crate::types::{NavigatorId, NavigatorKind, NodeKey, PresentationStyle, Routes};

/// Handle to one navigator node.
pub struct Navigator<R: Routes> {
    tree: NavigatorTree<R>,
    key: NodeKey,
    id: NavigatorId,
    kind: NavigatorKind,
}

impl<R: Routes> Clone for Navigator<R> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            key: self.key,
            id: self.id,
            kind: self.kind,
        }
    }
}

impl<R: Routes> PartialEq for Navigator<R> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.tree.ptr_eq(&other.tree)
    }
}

impl<R: Routes> Eq for Navigator<R> {}

impl<R: Routes> fmt::Debug for Navigator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("key", &self.key)
            .finish()
    }
}

impl<R: Routes> Navigator<R> {
    pub(crate) fn from_parts(
        tree: NavigatorTree<R>,
        key: NodeKey,
        id: NavigatorId,
        kind: NavigatorKind,
    ) -> Self {
        Self {
            tree,
            key,
            id,
            kind,
        }
    }

    pub(crate) fn belongs_to(&self, tree: &NavigatorTree<R>) -> bool {
        self.tree.ptr_eq(tree)
    }

    pub(crate) fn stale(&self, operation: &'static str) -> bool {
        if self.is_alive() {
            return false;
        }
        self.tree.report(Diagnostic::StaleNavigator { operation });
        true
    }

    /// A handle that does not keep the tree alive.
    ///
    /// Observers stored inside the tree's own cells hold one of these.
    pub fn downgrade(&self) -> WeakNavigator<R> {
        WeakNavigator {
            tree: self.tree.downgrade(),
            key: self.key,
            id: self.id,
        }
    }

    /// The tree owning this navigator
    pub fn tree(&self) -> &NavigatorTree<R> {
        &self.tree
    }

    /// Arena key of this navigator
    pub fn key(&self) -> NodeKey {
        self.key
    }

    /// Stable id
    pub fn id(&self) -> NavigatorId {
        self.id
    }

    /// Node kind
    pub fn kind(&self) -> NavigatorKind {
        self.kind
    }

    /// Whether the node has not been released
    pub fn is_alive(&self) -> bool {
        self.tree.with_node(self.key, |_| ()).is_some()
    }

    /// How this node was presented by its parent
    pub fn presentation(&self) -> PresentationStyle<R::SheetTag> {
        self.tree
            .with_node(self.key, |node| node.presentation.clone())
            .unwrap_or_default()
    }

    /// Tag of this node within its parent tab container
    pub fn tab_tag(&self) -> Option<R::TabTag> {
        self.tree
            .with_node(self.key, |node| node.tab_tag.clone())
            .flatten()
    }

    /// Containing or presenting navigator
    pub fn parent(&self) -> Option<Navigator<R>> {
        let parent = self.tree.with_node(self.key, |node| node.parent).flatten()?;
        self.tree.navigator(parent)
    }

    /// Tab children, in order
    pub fn tabs(&self) -> Vec<Navigator<R>> {
        self.tree
            .with_node(self.key, |node| node.tabs.clone())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|key| self.tree.navigator(key))
            .collect()
    }

    /// Current root destination
    pub fn root(&self) -> Option<R::Destination> {
        self.tree
            .with_node(self.key, |node| node.root.get())
            .flatten()
    }

    /// Destinations pushed on top of the root
    pub fn destinations(&self) -> Vec<R::Destination> {
        self.tree
            .with_node(self.key, |node| node.destinations.get())
            .unwrap_or_default()
    }

    /// Selected tab tag of this node
    pub fn selected_tab(&self) -> Option<R::TabTag> {
        self.tree
            .with_node(self.key, |node| node.selected_tab.get())
            .flatten()
    }

    /// Navigator modally presented on top of this one
    pub fn presented_child(&self) -> Option<Navigator<R>> {
        let child = self
            .tree
            .with_node(self.key, |node| node.presented.get())
            .flatten()?;
        self.tree.navigator(child)
    }

    /// True when nothing has been pushed on top of the root
    pub fn is_root_view(&self) -> bool {
        self.tree
            .with_node(self.key, |node| node.destinations.with(Vec::is_empty))
            .unwrap_or(true)
    }

    /// The visible child: the active tab of a container, or the presented
    /// child of any other node.
    pub fn top_child(&self) -> Option<Navigator<R>> {
        match self.kind {
            NavigatorKind::TabContainer => {
                let selected = self.selected_tab();
                let tabs = self.tabs();
                let active = selected
                    .and_then(|tag| {
                        tabs.iter()
                            .position(|tab| tab.tab_tag().as_ref() == Some(&tag))
                    })
                    .unwrap_or(0);
                tabs.into_iter().nth(active)
            }
            NavigatorKind::Stack | NavigatorKind::SingleView => self.presented_child(),
        }
    }

    /// The active tab for a container, otherwise this navigator
    pub fn or_tab_child(&self) -> Navigator<R> {
        match self.kind {
            NavigatorKind::TabContainer => self.top_child().unwrap_or_else(|| self.clone()),
            _ => self.clone(),
        }
    }

    /// The innermost currently visible navigator
    pub fn top_navigator(&self) -> Navigator<R> {
        let mut current = self.clone();
        while let Some(child) = current.top_child() {
            current = child;
        }
        current
    }

    /// The parentless ancestor of this navigator
    pub fn root_navigator(&self) -> Navigator<R> {
        self.tree
            .root_key(self.key)
            .and_then(|key| self.tree.navigator(key))
            .unwrap_or_else(|| self.clone())
    }

    fn nearest_container(&self) -> Option<Navigator<R>> {
        let mut current = Some(self.clone());
        while let Some(navigator) = current {
            if navigator.kind == NavigatorKind::TabContainer {
                return Some(navigator);
            }
            current = navigator.parent();
        }
        None
    }

    /// Selected tab of the nearest enclosing tab container
    pub fn current_tab(&self) -> Option<R::TabTag> {
        self.nearest_container()?.selected_tab()
    }

    /// Select a tab of the nearest enclosing tab container.
    ///
    /// Returns `false` when there is no enclosing container or no tab carries
    /// `tag`.
    pub fn set_current_tab(&self, tag: R::TabTag) -> bool {
        if self.stale("set_current_tab") {
            return false;
        }
        let Some(container) = self.nearest_container() else {
            tracing::debug!(navigator = %self.id, "No tab container above navigator");
            return false;
        };
        let known = container
            .tabs()
            .iter()
            .any(|tab| tab.tab_tag().as_ref() == Some(&tag));
        if !known {
            self.tree.report(Diagnostic::TargetNotFound {
                operation: "set_current_tab",
                navigator: container.id,
            });
            return false;
        }
        match container.selected_tab_cell() {
            Some(cell) => {
                tracing::debug!(navigator = %container.id, tab = ?tag, "Tab selected");
                cell.set(Some(tag));
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------------
    // Replace-root handler
    // ------------------------------------------------------------------------

    /// Install the handler that swaps out the whole tree.
    ///
    /// The handler is stored at the parentless ancestor regardless of which
    /// navigator it is set from.
    pub fn set_replace_root_handler(&self, handler: impl Fn(Navigator<R>) + 'static) {
        let root = self.root_navigator();
        let handler: ReplaceRootHandler<R> = Rc::new(handler);
        self.tree
            .with_node_mut(root.key, |node| node.replace_root = Some(handler));
    }

    /// Remove the replace-root handler
    pub fn clear_replace_root_handler(&self) {
        let root = self.root_navigator();
        self.tree
            .with_node_mut(root.key, |node| node.replace_root = None);
    }

    /// The replace-root handler as seen from this navigator.
    ///
    /// Calling it resets the current tree to its initial state, then after
    /// the configured replace-root delay hands the new tree to the installed
    /// handler.
    pub fn replace_root_handler(&self) -> Option<ReplaceRootHandler<R>> {
        let root = self.root_navigator();
        let installed = self
            .tree
            .with_node(root.key, |node| node.replace_root.clone())
            .flatten()?;
        let wrapped: ReplaceRootHandler<R> = Rc::new(move |new_root: Navigator<R>| {
            run_replace_root(&root, Rc::clone(&installed), new_root);
        });
        Some(wrapped)
    }

    /// Swap out the whole tree for `new_root`.
    ///
    /// Returns `false` when no handler is installed.
    pub fn replace_root(&self, new_root: Navigator<R>) -> bool {
        if self.stale("replace_root") {
            return false;
        }
        match self.replace_root_handler() {
            Some(handler) => {
                handler(new_root);
                true
            }
            None => {
                self.tree
                    .report(Diagnostic::MissingReplaceRootHandler { navigator: self.id });
                false
            }
        }
    }

    // ------------------------------------------------------------------------
    // Reactive cells for the rendering layer
    // ------------------------------------------------------------------------

    /// Observable root destination
    pub fn root_cell(&self) -> Option<Cell<Option<R::Destination>>> {
        self.tree.with_node(self.key, |node| node.root.clone())
    }

    /// Observable destination stack
    pub fn destinations_cell(&self) -> Option<Cell<Vec<R::Destination>>> {
        self.tree.with_node(self.key, |node| node.destinations.clone())
    }

    /// Observable selected tab
    pub fn selected_tab_cell(&self) -> Option<Cell<Option<R::TabTag>>> {
        self.tree.with_node(self.key, |node| node.selected_tab.clone())
    }

    /// Observable presented child key
    pub fn presented_cell(&self) -> Option<Cell<Option<NodeKey>>> {
        self.tree.with_node(self.key, |node| node.presented.clone())
    }

    /// Change counter of the whole tree, bumped on any state change below
    /// the parentless ancestor
    pub fn persist_signal(&self) -> Option<Cell<u64>> {
        let root = self.root_navigator();
        self.tree
            .with_node(root.key, |node| node.persist_signal.clone())
    }
}

/// Non-owning counterpart of [`Navigator`].
pub struct WeakNavigator<R: Routes> {
    tree: Weak<TreeShared<R>>,
    key: NodeKey,
    id: NavigatorId,
}

impl<R: Routes> WeakNavigator<R> {
    /// The navigator, if its tree is alive and the node was not released
    pub fn upgrade(&self) -> Option<Navigator<R>> {
        NavigatorTree::upgrade(&self.tree)?.navigator(self.key)
    }

    /// Id of the navigator this handle was created from
    pub fn id(&self) -> NavigatorId {
        self.id
    }
}

impl<R: Routes> Clone for WeakNavigator<R> {
    fn clone(&self) -> Self {
        Self {
            tree: Weak::clone(&self.tree),
            key: self.key,
            id: self.id,
        }
    }
}

impl<R: Routes> fmt::Debug for WeakNavigator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakNavigator")
            .field("id", &self.id)
            .field("key", &self.key)
            .finish()
    }
}

fn run_replace_root<R: Routes>(
    root: &Navigator<R>,
    installed: ReplaceRootHandler<R>,
    new_root: Navigator<R>,
) {
    tracing::info!(from = %root.id, to = %new_root.id, "Replacing navigator tree");
    root.close_to_initial();
    let delay = root.tree.config().replace_root_delay();
    root.tree.schedule(
        delay,
        Box::new(move || {
            let carry_over = new_root
                .tree
                .with_node_mut(new_root.key, |node| {
                    if node.parent.is_none() && node.replace_root.is_none() {
                        node.replace_root = Some(Rc::clone(&installed));
                    }
                })
                .is_some();
            if !carry_over {
                tracing::warn!(navigator = %new_root.id, "Replacement navigator was released");
            }
            installed(new_root);
        }),
    );
}
