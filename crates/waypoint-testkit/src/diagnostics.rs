//! Diagnostic capture

use std::cell::RefCell;
use std::rc::Rc;

use waypoint_core::{Diagnostic, NavigatorTree, Routes};

/// Collects every diagnostic a tree reports.
#[derive(Clone, Default)]
pub struct DiagnosticLog {
    entries: Rc<RefCell<Vec<Diagnostic>>>,
}

impl DiagnosticLog {
    /// Install a fresh log as the diagnostic hook of `tree`
    pub fn install<R: Routes>(tree: &NavigatorTree<R>) -> Self {
        let log = Self::default();
        let sink = Rc::clone(&log.entries);
        tree.set_diagnostic_hook(move |diagnostic| sink.borrow_mut().push(diagnostic.clone()));
        log
    }

    /// Everything reported so far
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    /// Number of diagnostics reported
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether nothing was reported
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Drain the log
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.borrow_mut())
    }

    /// Operation names of every entry, in order
    pub fn operations(&self) -> Vec<&'static str> {
        self.entries.borrow().iter().map(Diagnostic::operation).collect()
    }
}

impl std::fmt::Debug for DiagnosticLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries.borrow().iter()).finish()
    }
}
