//! Property test strategies for Waypoint types
//!
//! Generated records are always well formed: they pass
//! [`NodeRecord::validate`] and can be decoded into a tree.

use proptest::prelude::*;

// Re-export proptest for convenience
pub use proptest;

use uuid::Uuid;
use waypoint_core::{NavigatorId, NavigatorKind, NodeRecord, PresentationStyle};

use crate::routes::{AppSheet, AppTab, DemoRoutes, Screen};

/// Strategy for deterministic navigator ids
pub fn arb_navigator_id() -> impl Strategy<Value = NavigatorId> {
    any::<u128>().prop_map(|n| NavigatorId::from_uuid(Uuid::from_u128(n)))
}

/// Strategy for demo screens
pub fn arb_screen() -> impl Strategy<Value = Screen> {
    prop_oneof![
        Just(Screen::Home),
        Just(Screen::Feed),
        Just(Screen::Settings),
        "[a-z]{1,8}".prop_map(Screen::article),
        "[a-z]{1,8}".prop_map(Screen::profile),
        (0u32..100).prop_map(Screen::photo),
    ]
}

/// Strategy for demo tab tags
pub fn arb_tab() -> impl Strategy<Value = AppTab> {
    prop_oneof![Just(AppTab::Feed), Just(AppTab::Search), Just(AppTab::Profile)]
}

/// Strategy for presentation styles
pub fn arb_presentation() -> impl Strategy<Value = PresentationStyle<AppSheet>> {
    prop_oneof![
        Just(PresentationStyle::sheet()),
        Just(PresentationStyle::sheet_tagged(AppSheet::Share)),
        Just(PresentationStyle::sheet_tagged(AppSheet::Filters)),
        Just(PresentationStyle::full_screen_cover()),
    ]
}

/// Strategy for a destination stack of up to `max` screens
pub fn arb_stack(max: usize) -> impl Strategy<Value = Vec<Screen>> {
    prop::collection::vec(arb_screen(), 0..=max)
}

/// Strategy for single-view or stack records without children
pub fn arb_leaf_record() -> impl Strategy<Value = NodeRecord<DemoRoutes>> {
    (
        arb_navigator_id(),
        any::<bool>(),
        arb_screen(),
        arb_stack(4),
        arb_presentation(),
    )
        .prop_map(|(id, is_stack, root, destinations, presentation)| {
            let kind = if is_stack {
                NavigatorKind::Stack
            } else {
                NavigatorKind::SingleView
            };
            let mut record = NodeRecord::new(kind, Some(root));
            record.id = id;
            record.presentation = presentation;
            if is_stack {
                record.destinations = destinations;
            }
            record
        })
}

/// Strategy for a leaf record, optionally presenting another leaf
pub fn arb_leaf_with_modal() -> impl Strategy<Value = NodeRecord<DemoRoutes>> {
    (arb_leaf_record(), prop::option::of(arb_leaf_record())).prop_map(|(mut record, modal)| {
        record.navigator = modal.map(Box::new);
        record
    })
}

/// Strategy for a tab container whose tabs carry distinct tags
pub fn arb_tab_record() -> impl Strategy<Value = NodeRecord<DemoRoutes>> {
    (
        arb_navigator_id(),
        prop::collection::vec(arb_leaf_with_modal(), 1..=3),
        prop::option::of(0usize..3),
    )
        .prop_map(|(id, tabs, selected)| {
            let tags = [AppTab::Feed, AppTab::Search, AppTab::Profile];
            let mut record = NodeRecord::new(NavigatorKind::TabContainer, None);
            record.id = id;
            record.tabs = tabs
                .into_iter()
                .zip(tags)
                .map(|(mut tab, tag)| {
                    tab.tab_item = Some(tag);
                    tab
                })
                .collect();
            record.selected_tab = selected
                .filter(|index| *index < record.tabs.len())
                .map(|index| tags[index]);
            record
        })
}

/// Strategy for any well-formed record
pub fn arb_record() -> impl Strategy<Value = NodeRecord<DemoRoutes>> {
    prop_oneof![arb_leaf_with_modal(), arb_tab_record()]
}
