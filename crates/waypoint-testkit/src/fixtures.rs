//! Tree fixtures
//!
//! Ready-made trees for the demo route scheme. Every builder panics on
//! failure; fixtures are only used from tests.

use waypoint_core::{
    stack, tab, view, ImmediateScheduler, ManualScheduler, Navigator, NavigatorConfig,
    NavigatorTree,
};

use crate::routes::{AppTab, DemoRoutes, Screen};

/// Tree running deferred steps immediately
pub fn immediate_tree() -> NavigatorTree<DemoRoutes> {
    NavigatorTree::new(NavigatorConfig::default(), ImmediateScheduler)
}

/// Tree driven by a virtual clock, with the default delays
pub fn manual_tree() -> (NavigatorTree<DemoRoutes>, ManualScheduler) {
    manual_tree_with(NavigatorConfig::default())
}

/// Tree driven by a virtual clock with `config`
pub fn manual_tree_with(config: NavigatorConfig) -> (NavigatorTree<DemoRoutes>, ManualScheduler) {
    let scheduler = ManualScheduler::new();
    let tree = NavigatorTree::new(config, scheduler.clone());
    (tree, scheduler)
}

/// Three-tab application: feed stack, search stack, profile view.
pub fn tabbed_app(tree: &NavigatorTree<DemoRoutes>) -> Navigator<DemoRoutes> {
    tree.build(
        tab([
            stack(Screen::Feed).tab_item(AppTab::Feed),
            stack(Screen::Search).tab_item(AppTab::Search),
            view(Screen::profile("me")).tab_item(AppTab::Profile),
        ])
        .selected(AppTab::Feed),
    )
    .expect("tabbed app fixture")
}

/// Stack rooted at [`Screen::Home`] with `depth` articles pushed.
pub fn article_stack(tree: &NavigatorTree<DemoRoutes>, depth: usize) -> Navigator<DemoRoutes> {
    tree.build(
        stack(Screen::Home).destinations((0..depth).map(|i| Screen::article(format!("a{i}")))),
    )
    .expect("article stack fixture")
}

/// Fresh tree whose root is the onboarding flow
pub fn onboarding(tree: &NavigatorTree<DemoRoutes>) -> Navigator<DemoRoutes> {
    tree.build(stack(Screen::Onboarding))
        .expect("onboarding fixture")
}
