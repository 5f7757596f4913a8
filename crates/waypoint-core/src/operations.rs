//! Navigation operations
//!
//! Every operation is synchronous and total: failures are reported as
//! [`Diagnostic`]s and surface as a `false` return or a no-op, never as a
//! panic or an `Err`.
//!
//! `close` and `dismiss` answer the same question ("get back to X") with
//! different traversals. `dismiss` walks up from this navigator and only
//! looks at each ancestor's root destination. `close` starts at the topmost
//! visible navigator and, at each ancestor, searches the pushed stack before
//! the root.

use crate::dsl::{AnyValue, NavigationData};
use crate::errors::{Diagnostic, NavigationError};
use crate::navigator::Navigator;
use crate::types::{NavigatorId, NavigatorKind, PresentStrategy, Routes};

impl<R: Routes> Navigator<R> {
    fn downcast_or_report<T: 'static>(&self, operation: &'static str, value: AnyValue) -> Option<T> {
        match value.downcast::<T>() {
            Ok(value) => Some(value),
            Err(NavigationError::TypeMismatch { expected, found }) => {
                self.tree().report(Diagnostic::TypeMismatch {
                    operation,
                    expected,
                    found,
                });
                None
            }
            Err(err) => {
                tracing::warn!(operation, error = %err, "Unexpected downcast failure");
                None
            }
        }
    }

    fn clear_presented(&self) -> bool {
        if self.presented_child().is_none() {
            return false;
        }
        self.tree().set_presented(self.key(), None)
    }

    // ------------------------------------------------------------------------
    // Stack
    // ------------------------------------------------------------------------

    /// Push onto the stack of the topmost visible navigator.
    ///
    /// Returns `false` when that navigator is not a stack.
    pub fn push(&self, destination: R::Destination) -> bool {
        if self.stale("push") {
            return false;
        }
        let target = self.top_navigator().or_tab_child();
        if target.kind() != NavigatorKind::Stack {
            self.tree().report(Diagnostic::StructuralImpossibility {
                operation: "push",
                navigator: target.id(),
                kind: target.kind(),
            });
            return false;
        }
        let Some(cell) = target.destinations_cell() else {
            return false;
        };
        tracing::debug!(navigator = %target.id(), ?destination, "Push");
        cell.update(|mut stack| {
            stack.push(destination);
            stack
        });
        true
    }

    /// Push a loosely typed destination.
    pub fn push_any(&self, destination: AnyValue) -> bool {
        self.downcast_or_report::<R::Destination>("push", destination)
            .is_some_and(|destination| self.push(destination))
    }

    /// Remove the last pushed destination of this navigator.
    pub fn pop(&self) {
        if self.stale("pop") {
            return;
        }
        if self.is_root_view() {
            self.tree().report(Diagnostic::AlreadyAtRoot {
                operation: "pop",
                navigator: self.id(),
            });
            return;
        }
        if let Some(cell) = self.destinations_cell() {
            tracing::debug!(navigator = %self.id(), "Pop");
            cell.update(|mut stack| {
                stack.pop();
                stack
            });
        }
    }

    /// Remove every pushed destination of this navigator.
    pub fn pop_to_root(&self) {
        if self.stale("pop_to_root") || self.is_root_view() {
            return;
        }
        if let Some(cell) = self.destinations_cell() {
            tracing::debug!(navigator = %self.id(), "Pop to root");
            cell.set(Vec::new());
        }
    }

    /// Truncate the stack right after an occurrence of `target`.
    ///
    /// `is_first` picks the first occurrence, otherwise the last. Returns
    /// `false` when `target` is absent or already on top.
    pub fn pop_to(&self, target: &R::Destination, is_first: bool) -> bool {
        if self.stale("pop_to") {
            return false;
        }
        let Some(cell) = self.destinations_cell() else {
            return false;
        };
        let stack = cell.get();
        let position = if is_first {
            stack.iter().position(|d| d == target)
        } else {
            stack.iter().rposition(|d| d == target)
        };
        let Some(index) = position else {
            self.tree().report(Diagnostic::TargetNotFound {
                operation: "pop_to",
                navigator: self.id(),
            });
            return false;
        };
        if index + 1 == stack.len() {
            return false;
        }
        tracing::debug!(navigator = %self.id(), index, "Pop to destination");
        let mut stack = stack;
        stack.truncate(index + 1);
        cell.set(stack);
        true
    }

    /// Overwrite the root destination, optionally popping to it first.
    pub fn replace(&self, root: R::Destination, pop_to_root: bool) {
        if self.stale("replace") {
            return;
        }
        if self.kind() == NavigatorKind::TabContainer {
            self.tree().report(Diagnostic::StructuralImpossibility {
                operation: "replace",
                navigator: self.id(),
                kind: self.kind(),
            });
            return;
        }
        if pop_to_root {
            self.pop_to_root();
        }
        if let Some(cell) = self.root_cell() {
            tracing::debug!(navigator = %self.id(), ?root, "Replace root");
            cell.set(Some(root));
        }
    }

    // ------------------------------------------------------------------------
    // Modals
    // ------------------------------------------------------------------------

    /// Build a navigator from `data` and present it.
    ///
    /// Returns `false` when the description does not match the route scheme;
    /// the tree is left untouched in that case.
    pub fn present(&self, data: NavigationData, strategy: PresentStrategy) -> bool {
        if self.stale("present") {
            return false;
        }
        match self.tree().build(data) {
            Ok(child) => self.present_navigator(child, strategy),
            Err(err) => {
                tracing::debug!(navigator = %self.id(), error = %err, "Present aborted");
                false
            }
        }
    }

    /// Present an already built, detached navigator.
    pub fn present_navigator(&self, child: Navigator<R>, strategy: PresentStrategy) -> bool {
        if self.stale("present") {
            return false;
        }
        if !child.belongs_to(self.tree()) || !child.is_alive() {
            self.tree()
                .report(Diagnostic::StaleNavigator { operation: "present" });
            return false;
        }

        let host = match strategy {
            PresentStrategy::OnTop => self.top_navigator(),
            PresentStrategy::ReplaceCurrent | PresentStrategy::FromCurrent => self.or_tab_child(),
        };
        if child.parent().is_some() || self.tree().is_ancestor_or_self(child.key(), host.key()) {
            self.tree().report(Diagnostic::StructuralImpossibility {
                operation: "present",
                navigator: child.id(),
                kind: child.kind(),
            });
            return false;
        }

        tracing::debug!(host = %host.id(), child = %child.id(), ?strategy, "Present");
        match strategy {
            PresentStrategy::OnTop | PresentStrategy::FromCurrent => {
                self.tree().set_presented(host.key(), Some(child.key()))
            }
            PresentStrategy::ReplaceCurrent => {
                self.tree().set_presented(host.key(), None);
                let delay = self.tree().config().present_delay();
                self.tree().schedule(
                    delay,
                    Box::new(move || {
                        let tree = host.tree().clone();
                        if !child.is_alive() || child.parent().is_some() {
                            tracing::debug!(child = %child.id(), "Deferred present skipped");
                            return;
                        }
                        if !host.is_alive() {
                            tracing::debug!(child = %child.id(), "Deferred present host released");
                            tree.release(&child);
                            return;
                        }
                        tree.set_presented(host.key(), Some(child.key()));
                    }),
                );
                true
            }
        }
    }

    /// Dismiss this navigator by clearing its parent's presented child.
    pub fn dismiss_top(&self) {
        if self.stale("dismiss_top") {
            return;
        }
        match self.parent() {
            Some(parent) => {
                tracing::debug!(navigator = %parent.id(), "Dismiss top");
                parent.clear_presented();
            }
            None => tracing::debug!(navigator = %self.id(), "Dismiss top without parent"),
        }
    }

    /// Clear the presented child of the nearest navigator (self included)
    /// whose id is `id`.
    pub fn dismiss_to(&self, id: NavigatorId) -> bool {
        self.dismiss_matching("dismiss_to", |navigator| navigator.id() == id)
    }

    /// Clear the presented child of the nearest navigator (self included)
    /// whose root is `target`.
    pub fn dismiss(&self, target: &R::Destination) -> bool {
        self.dismiss_matching("dismiss", |navigator| navigator.root().as_ref() == Some(target))
    }

    fn dismiss_matching(
        &self,
        operation: &'static str,
        matches: impl Fn(&Navigator<R>) -> bool,
    ) -> bool {
        if self.stale(operation) {
            return false;
        }
        let mut current = Some(self.clone());
        while let Some(navigator) = current {
            if matches(&navigator) {
                tracing::debug!(navigator = %navigator.id(), operation, "Dismiss");
                navigator.clear_presented();
                return true;
            }
            current = navigator.parent();
        }
        self.tree().report(Diagnostic::TargetNotFound {
            operation,
            navigator: self.id(),
        });
        false
    }

    // ------------------------------------------------------------------------
    // Close
    // ------------------------------------------------------------------------

    /// Unwind to the nearest screen equal to `target`.
    pub fn close(&self, target: &R::Destination) -> bool {
        self.close_matching("close", |destination| destination == target)
    }

    /// Unwind to a loosely typed target.
    pub fn close_any(&self, target: AnyValue) -> bool {
        self.downcast_or_report::<R::Destination>("close", target)
            .is_some_and(|target| self.close(&target))
    }

    /// Unwind to the nearest screen satisfying `predicate`.
    ///
    /// Starting at the topmost visible navigator and walking up, each
    /// navigator's stack is searched from the top, then its root. On the
    /// first match the navigator's modal is dismissed and its stack is cut
    /// back so the match is on top.
    pub fn close_where(&self, predicate: impl Fn(&R::Destination) -> bool) -> bool {
        self.close_matching("close", predicate)
    }

    fn close_matching(
        &self,
        operation: &'static str,
        predicate: impl Fn(&R::Destination) -> bool,
    ) -> bool {
        if self.stale(operation) {
            return false;
        }
        let mut current = Some(self.top_navigator());
        while let Some(navigator) = current {
            let stack = navigator.destinations();
            if let Some(index) = stack.iter().rposition(|d| predicate(d)) {
                tracing::debug!(navigator = %navigator.id(), index, "Close within stack");
                navigator.clear_presented();
                if index + 1 < stack.len() {
                    if let Some(cell) = navigator.destinations_cell() {
                        let mut stack = stack;
                        stack.truncate(index + 1);
                        cell.set(stack);
                    }
                }
                return true;
            }
            if navigator.root().as_ref().is_some_and(|root| predicate(root)) {
                tracing::debug!(navigator = %navigator.id(), "Close to root");
                navigator.clear_presented();
                navigator.pop_to_root();
                return true;
            }
            current = navigator.parent();
        }
        self.tree().report(Diagnostic::TargetNotFound {
            operation,
            navigator: self.id(),
        });
        false
    }

    /// Reset the whole tree to its initial screen.
    pub fn close_to_initial(&self) {
        if self.stale("close_to_initial") {
            return;
        }
        let root = self.root_navigator();
        tracing::debug!(navigator = %root.id(), kind = %root.kind(), "Close to initial");
        match root.kind() {
            NavigatorKind::TabContainer => {
                for tab in root.tabs() {
                    tab.clear_presented();
                    tab.pop_to_root();
                }
            }
            NavigatorKind::Stack => {
                root.clear_presented();
                root.pop_to_root();
            }
            NavigatorKind::SingleView => {
                root.clear_presented();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::{stack, tab, view};
    use crate::tree::NavigatorTree;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug)]
    struct Plain;

    impl Routes for Plain {
        type Destination = &'static str;
        type TabTag = u8;
        type SheetTag = ();
    }

    fn capture(tree: &NavigatorTree<Plain>) -> Rc<RefCell<Vec<Diagnostic>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        tree.set_diagnostic_hook(move |d| sink.borrow_mut().push(d.clone()));
        log
    }

    #[test]
    fn test_push_onto_single_view_is_rejected() {
        let tree = NavigatorTree::<Plain>::default();
        let log = capture(&tree);
        let nav = tree.build(view("home")).unwrap();
        assert!(!nav.push("detail"));
        assert!(matches!(
            log.borrow()[0],
            Diagnostic::StructuralImpossibility { operation: "push", .. }
        ));
    }

    #[test]
    fn test_push_targets_selected_tab() {
        let tree = NavigatorTree::<Plain>::default();
        let nav = tree
            .build(tab([stack("a").tab_item(1u8), stack("b").tab_item(2u8)]).selected(2u8))
            .unwrap();
        assert!(nav.push("detail"));
        assert_eq!(nav.tabs()[1].destinations(), vec!["detail"]);
        assert!(nav.tabs()[0].destinations().is_empty());
    }

    #[test]
    fn test_pop_at_root_reports() {
        let tree = NavigatorTree::<Plain>::default();
        let log = capture(&tree);
        let nav = tree.build(stack("home")).unwrap();
        nav.pop();
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0].operation(), "pop");
    }

    #[test]
    fn test_push_any_type_mismatch() {
        let tree = NavigatorTree::<Plain>::default();
        let log = capture(&tree);
        let nav = tree.build(stack("home")).unwrap();
        assert!(!nav.push_any(AnyValue::new(42u32)));
        assert!(nav.push_any(AnyValue::new("ok")));
        assert!(matches!(log.borrow()[0], Diagnostic::TypeMismatch { .. }));
        assert_eq!(nav.destinations(), vec!["ok"]);
    }

    #[test]
    fn test_replace_on_tab_container_is_rejected() {
        let tree = NavigatorTree::<Plain>::default();
        let log = capture(&tree);
        let nav = tree.build(tab([view("a")])).unwrap();
        nav.replace("b", true);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_present_rejects_attached_child() {
        let tree = NavigatorTree::<Plain>::default();
        let host = tree.build(stack("home")).unwrap();
        let child = tree.build(view("modal")).unwrap();
        assert!(host.present_navigator(child.clone(), PresentStrategy::OnTop));

        let other = tree.build(stack("other")).unwrap();
        assert!(!other.present_navigator(child, PresentStrategy::OnTop));
    }

    #[test]
    fn test_present_rejects_ancestor() {
        let tree = NavigatorTree::<Plain>::default();
        let host = tree.build(stack("home")).unwrap();
        let log = capture(&tree);
        assert!(!host.present_navigator(host.clone(), PresentStrategy::OnTop));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_dismiss_to_unknown_id() {
        let tree = NavigatorTree::<Plain>::default();
        let nav = tree.build(stack("home")).unwrap();
        assert!(!nav.dismiss_to(NavigatorId::new()));
    }

    #[test]
    fn test_close_any_wrong_type() {
        let tree = NavigatorTree::<Plain>::default();
        let log = capture(&tree);
        let nav = tree.build(stack("home")).unwrap();
        assert!(!nav.close_any(AnyValue::new(1u8)));
        assert!(matches!(
            log.borrow()[0],
            Diagnostic::TypeMismatch { operation: "close", .. }
        ));
    }

    #[test]
    fn test_stale_operations_report() {
        let tree = NavigatorTree::<Plain>::default();
        let log = capture(&tree);
        let nav = tree.build(stack("home")).unwrap();
        tree.release(&nav);
        assert!(!nav.push("x"));
        nav.pop();
        assert_eq!(
            *log.borrow(),
            vec![
                Diagnostic::StaleNavigator { operation: "push" },
                Diagnostic::StaleNavigator { operation: "pop" },
            ]
        );
    }
}
