//! Rendering observers
//!
//! A rendering layer mirrors one navigator node per on-screen container. It
//! attaches a [`RenderObserver`] to that node, immediately receives the
//! node's current state and then every change to it.

use std::fmt;
use std::rc::Rc;

use tracing::debug;
use waypoint_core::reactive::{Cell, ObserverId};
use waypoint_core::{Navigator, NodeKey, PresentationStyle, Routes, WeakNavigator};

/// How a presented navigator is shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalRoute<S> {
    /// Partial-height sheet
    Sheet {
        /// Tag distinguishing the sheet, if any
        tag: Option<S>,
    },
    /// Full-screen cover
    FullScreen,
}

impl<S: Clone> From<&PresentationStyle<S>> for ModalRoute<S> {
    fn from(style: &PresentationStyle<S>) -> Self {
        match style {
            PresentationStyle::Sheet { tag } => ModalRoute::Sheet { tag: tag.clone() },
            PresentationStyle::FullScreenCover {} => ModalRoute::FullScreen,
        }
    }
}

/// Change of the navigator presented on top of the observed node.
pub enum ModalChange<R: Routes> {
    /// A navigator is presented
    Presented {
        /// The presented navigator
        navigator: Navigator<R>,
        /// How to show it
        route: ModalRoute<R::SheetTag>,
    },
    /// Nothing is presented
    Dismissed,
}

impl<R: Routes> ModalChange<R> {
    /// The presented navigator, if any
    pub fn navigator(&self) -> Option<&Navigator<R>> {
        match self {
            ModalChange::Presented { navigator, .. } => Some(navigator),
            ModalChange::Dismissed => None,
        }
    }

    /// Route of the presented navigator, if any
    pub fn route(&self) -> Option<&ModalRoute<R::SheetTag>> {
        match self {
            ModalChange::Presented { route, .. } => Some(route),
            ModalChange::Dismissed => None,
        }
    }
}

impl<R: Routes> fmt::Debug for ModalChange<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModalChange::Presented { navigator, route } => f
                .debug_struct("Presented")
                .field("navigator", &navigator.id())
                .field("route", route)
                .finish(),
            ModalChange::Dismissed => f.write_str("Dismissed"),
        }
    }
}

/// Receives state changes of one navigator node.
///
/// Every callback has an empty default so a rendering layer only implements
/// what its container shows. Callbacks run synchronously on the thread that
/// changed the navigator.
pub trait RenderObserver<R: Routes> {
    /// Root destination changed
    fn root_changed(&self, _root: Option<&R::Destination>) {}

    /// Pushed destinations changed
    fn stack_changed(&self, _destinations: &[R::Destination]) {}

    /// Selected tab changed (tab containers only)
    fn tab_changed(&self, _selected: Option<&R::TabTag>) {}

    /// Presented navigator changed
    fn modal_changed(&self, _change: &ModalChange<R>) {}
}

/// Subscriptions created by [`attach`].
///
/// Dropping the handle detaches the observer.
#[must_use = "dropping the handle detaches the observer"]
pub struct BridgeHandle {
    unsubscribers: Vec<Box<dyn FnOnce()>>,
}

impl BridgeHandle {
    /// Unsubscribe from every cell
    pub fn detach(mut self) {
        self.unsubscribe_all();
    }

    /// Whether the handle holds any subscriptions
    pub fn is_attached(&self) -> bool {
        !self.unsubscribers.is_empty()
    }

    fn unsubscribe_all(&mut self) {
        for unsubscribe in self.unsubscribers.drain(..) {
            unsubscribe();
        }
    }
}

impl Drop for BridgeHandle {
    fn drop(&mut self) {
        self.unsubscribe_all();
    }
}

impl fmt::Debug for BridgeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeHandle")
            .field("subscriptions", &self.unsubscribers.len())
            .finish()
    }
}

/// Subscribe `observer` to `navigator`'s root, stack, selected tab and
/// presented child.
///
/// Each callback fires once right away with the current value. A stale
/// navigator yields a handle with no subscriptions.
pub fn attach<R: Routes>(
    navigator: &Navigator<R>,
    observer: Rc<dyn RenderObserver<R>>,
) -> BridgeHandle {
    let mut handle = BridgeHandle {
        unsubscribers: Vec::with_capacity(4),
    };
    if !navigator.is_alive() {
        debug!(navigator = %navigator.id(), "Attach to released navigator");
        return handle;
    }

    if let Some(cell) = navigator.root_cell() {
        let observer = Rc::clone(&observer);
        let id = cell.subscribe(move |root: &Option<R::Destination>| {
            observer.root_changed(root.as_ref());
        });
        handle.unsubscribers.push(unsubscriber(cell, id));
    }

    if let Some(cell) = navigator.destinations_cell() {
        let observer = Rc::clone(&observer);
        let id = cell.subscribe(move |destinations: &Vec<R::Destination>| {
            observer.stack_changed(destinations);
        });
        handle.unsubscribers.push(unsubscriber(cell, id));
    }

    if let Some(cell) = navigator.selected_tab_cell() {
        let observer = Rc::clone(&observer);
        let id = cell.subscribe(move |selected: &Option<R::TabTag>| {
            observer.tab_changed(selected.as_ref());
        });
        handle.unsubscribers.push(unsubscriber(cell, id));
    }

    if let Some(cell) = navigator.presented_cell() {
        let host = navigator.downgrade();
        let id = cell.subscribe(move |presented: &Option<NodeKey>| {
            observer.modal_changed(&modal_change(&host, *presented));
        });
        handle.unsubscribers.push(unsubscriber(cell, id));
    }

    debug!(navigator = %navigator.id(), "Render observer attached");
    handle
}

fn unsubscriber<T: Clone + 'static>(cell: Cell<T>, id: ObserverId) -> Box<dyn FnOnce()> {
    Box::new(move || {
        cell.unsubscribe(id);
    })
}

fn modal_change<R: Routes>(host: &WeakNavigator<R>, presented: Option<NodeKey>) -> ModalChange<R> {
    let child = presented
        .zip(host.upgrade())
        .and_then(|(key, host)| host.tree().navigator(key));
    match child {
        Some(navigator) => {
            let route = ModalRoute::from(&navigator.presentation());
            ModalChange::Presented { navigator, route }
        }
        None => ModalChange::Dismissed,
    }
}
