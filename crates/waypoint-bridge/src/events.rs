//! Render events
//!
//! Some navigation happens in the rendering layer first: a swipe-back gesture
//! shortens a stack, a tab bar tap selects a tab, a sheet is dragged away.
//! [`apply`] replays these on the navigator through regular operations, so
//! diagnostics and persistence behave as if the app had called them.

use std::fmt;

use tracing::debug;
use waypoint_core::{Navigator, Routes};

/// A navigation change originating in the rendering layer.
pub enum RenderEvent<R: Routes> {
    /// The displayed stack now holds `len` pushed destinations
    StackTruncated {
        /// Remaining pushed destinations
        len: usize,
    },
    /// A tab was selected
    TabSelected(R::TabTag),
    /// The modal presented by the navigator was dismissed interactively
    ModalDismissed,
    /// System back button or gesture
    BackRequested,
}

impl<R: Routes> fmt::Debug for RenderEvent<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderEvent::StackTruncated { len } => {
                f.debug_struct("StackTruncated").field("len", len).finish()
            }
            RenderEvent::TabSelected(tag) => f.debug_tuple("TabSelected").field(tag).finish(),
            RenderEvent::ModalDismissed => f.write_str("ModalDismissed"),
            RenderEvent::BackRequested => f.write_str("BackRequested"),
        }
    }
}

/// Apply `event` to `navigator`. Returns whether the navigator changed.
pub fn apply<R: Routes>(navigator: &Navigator<R>, event: RenderEvent<R>) -> bool {
    debug!(navigator = %navigator.id(), ?event, "Render event");
    match event {
        RenderEvent::StackTruncated { len } => truncate(navigator, len),
        RenderEvent::TabSelected(tag) => navigator.set_current_tab(tag),
        RenderEvent::ModalDismissed => match navigator.presented_child() {
            Some(child) => {
                child.dismiss_top();
                true
            }
            None => false,
        },
        RenderEvent::BackRequested => back(navigator),
    }
}

fn truncate<R: Routes>(navigator: &Navigator<R>, len: usize) -> bool {
    let depth = navigator.destinations().len();
    if len >= depth {
        return false;
    }
    if len == 0 {
        navigator.pop_to_root();
    } else {
        for _ in len..depth {
            navigator.pop();
        }
    }
    true
}

/// Pop the visible stack, or dismiss the visible modal when its stack is at
/// the root.
fn back<R: Routes>(navigator: &Navigator<R>) -> bool {
    let top = navigator.top_navigator();
    if !top.is_root_view() {
        top.pop();
        return true;
    }
    let presented = top
        .parent()
        .and_then(|parent| parent.presented_child())
        .is_some_and(|child| child == top);
    if presented {
        top.dismiss_top();
    }
    presented
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use waypoint_core::{stack, PresentStrategy};
    use waypoint_testkit::{
        article_stack, immediate_tree, tabbed_app, AppTab, DemoRoutes, DiagnosticLog, Screen,
    };

    #[test]
    fn test_stack_truncated() {
        let tree = immediate_tree();
        let nav = article_stack(&tree, 4);

        assert!(apply(&nav, RenderEvent::StackTruncated { len: 2 }));
        assert_eq!(
            nav.destinations(),
            vec![Screen::article("a0"), Screen::article("a1")]
        );
        assert!(apply(&nav, RenderEvent::StackTruncated { len: 0 }));
        assert!(nav.is_root_view());
        assert!(!apply(&nav, RenderEvent::StackTruncated { len: 0 }));
    }

    proptest! {
        #[test]
        fn prop_stack_truncated_keeps_prefix(depth in 0usize..6, len in 0usize..8) {
            let tree = immediate_tree();
            let nav = article_stack(&tree, depth);
            let before = nav.destinations();

            let changed = apply(&nav, RenderEvent::StackTruncated { len });
            prop_assert_eq!(changed, len < depth);
            prop_assert_eq!(nav.destinations(), before[..len.min(depth)].to_vec());
        }
    }

    #[test]
    fn test_truncate_never_grows() {
        let tree = immediate_tree();
        let nav = article_stack(&tree, 1);
        assert!(!apply(&nav, RenderEvent::StackTruncated { len: 3 }));
        assert_eq!(nav.destinations().len(), 1);
    }

    #[test]
    fn test_tab_selected() {
        let tree = immediate_tree();
        let app = tabbed_app(&tree);
        let log = DiagnosticLog::install(&tree);

        assert!(apply(&app, RenderEvent::TabSelected(AppTab::Profile)));
        assert_eq!(app.current_tab(), Some(AppTab::Profile));
        assert!(log.is_empty());
    }

    #[test]
    fn test_modal_dismissed() {
        let tree = immediate_tree();
        let nav = article_stack(&tree, 0);
        assert!(!apply(&nav, RenderEvent::ModalDismissed));

        nav.present(stack(Screen::Compose), PresentStrategy::OnTop);
        assert!(apply(&nav, RenderEvent::ModalDismissed));
        assert!(nav.presented_child().is_none());
    }

    #[test]
    fn test_back_pops_then_dismisses() {
        let tree = immediate_tree();
        let app = tabbed_app(&tree);
        app.push(Screen::article("intro"));
        app.present(stack(Screen::Compose), PresentStrategy::OnTop);
        app.push(Screen::Settings);

        let feed = app.or_tab_child();
        let modal = feed.presented_child().unwrap();
        assert_eq!(modal.destinations(), vec![Screen::Settings]);

        assert!(apply(&app, RenderEvent::<DemoRoutes>::BackRequested));
        assert!(modal.is_root_view());
        assert!(apply(&app, RenderEvent::<DemoRoutes>::BackRequested));
        assert!(feed.presented_child().is_none());
        assert!(apply(&app, RenderEvent::<DemoRoutes>::BackRequested));
        assert!(feed.is_root_view());
        assert!(!apply(&app, RenderEvent::<DemoRoutes>::BackRequested));
    }
}
