#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]
//! # Tree Codec Round Trips
//!
//! Encoding a live tree and decoding it into a fresh tree must preserve ids,
//! kinds, roots, stacks, tabs, selections and presentation styles at every
//! level. Transition metadata is the single exception: it always decodes to
//! none.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use waypoint_core::{
    stack, tab, view, NavigationError, Navigator, NavigatorKind, NavigatorTree, NodeRecord,
    PresentStrategy, PresentationSpec, PresentationStyle, Routes, Transition, TransitionNamespace,
};

// ============================================================================
// Route Scheme
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum Screen {
    Home,
    Article { slug: String },
    Photo { index: u32, transition: Transition },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
enum Tab {
    News,
    Saved,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
enum Sheet {
    Share,
}

#[derive(Debug)]
struct App;

impl Routes for App {
    type Destination = Screen;
    type TabTag = Tab;
    type SheetTag = Sheet;
}

fn round_trip(nav: &Navigator<App>) -> (NodeRecord<App>, Navigator<App>) {
    let encoded = nav.encode().unwrap();
    let bytes = encoded.to_json_bytes().unwrap();
    let decoded = NodeRecord::<App>::from_json_bytes(&bytes).unwrap();
    let fresh = NavigatorTree::<App>::default();
    let restored = fresh.decode(&decoded).unwrap();
    (encoded, restored)
}

fn article(slug: &str) -> Screen {
    Screen::Article { slug: slug.into() }
}

// ============================================================================
// Shapes
// ============================================================================

#[test]
fn single_view_round_trip() {
    let tree = NavigatorTree::<App>::default();
    let nav = tree
        .build(view(Screen::Home).presentation(PresentationSpec::full_screen_cover()))
        .unwrap();

    let (encoded, restored) = round_trip(&nav);
    assert_eq!(restored.id(), nav.id());
    assert_eq!(restored.kind(), NavigatorKind::SingleView);
    assert_eq!(restored.root(), Some(Screen::Home));
    assert_eq!(restored.presentation(), PresentationStyle::full_screen_cover());
    assert_eq!(restored.encode().unwrap(), encoded);
}

#[test]
fn stack_with_modal_round_trip() {
    let tree = NavigatorTree::<App>::default();
    let nav = tree
        .build(stack(Screen::Home).destinations([article("a"), article("b")]))
        .unwrap();
    nav.present(
        view(article("c")).presentation(PresentationSpec::sheet_tagged(Sheet::Share)),
        PresentStrategy::OnTop,
    );

    let (encoded, restored) = round_trip(&nav);
    assert_eq!(restored.destinations(), vec![article("a"), article("b")]);

    let modal = restored.presented_child().unwrap();
    assert_eq!(modal.parent(), Some(restored.clone()));
    assert_eq!(modal.presentation(), PresentationStyle::sheet_tagged(Sheet::Share));
    assert_eq!(restored.encode().unwrap(), encoded);
}

#[test]
fn tab_container_round_trip() {
    let tree = NavigatorTree::<App>::default();
    let nav = tree
        .build(
            tab([
                stack(Screen::Home).tab_item(Tab::News).destination(article("x")),
                view(article("bookmarks")).tab_item(Tab::Saved),
            ])
            .selected(Tab::Saved),
        )
        .unwrap();

    let (encoded, restored) = round_trip(&nav);
    assert_eq!(restored.kind(), NavigatorKind::TabContainer);
    assert_eq!(restored.current_tab(), Some(Tab::Saved));
    let tabs = restored.tabs();
    assert_eq!(tabs.len(), 2);
    assert_eq!(tabs[0].tab_tag(), Some(Tab::News));
    assert_eq!(tabs[0].destinations(), vec![article("x")]);
    assert_eq!(tabs[1].parent(), Some(restored.clone()));
    assert_eq!(restored.encode().unwrap(), encoded);
}

#[test]
fn transition_metadata_decodes_to_none() {
    let namespace = TransitionNamespace::new();
    let tree = NavigatorTree::<App>::default();
    let nav = tree
        .build(stack(Screen::Home).destination(Screen::Photo {
            index: 3,
            transition: Transition::matched("thumb-3", namespace),
        }))
        .unwrap();

    let json = serde_json::to_value(nav.encode().unwrap()).unwrap();
    assert_eq!(
        json["destinations"][0],
        serde_json::json!({ "photo": { "index": 3, "transition": null } })
    );

    let (_, restored) = round_trip(&nav);
    match &restored.destinations()[0] {
        Screen::Photo { index, transition } => {
            assert_eq!(*index, 3);
            assert!(transition.is_none());
        }
        other => panic!("unexpected destination {other:?}"),
    }
}

#[test]
fn decoded_tree_reports_changes() {
    let tree = NavigatorTree::<App>::default();
    let nav = tree
        .build(tab([stack(Screen::Home).tab_item(Tab::News)]))
        .unwrap();
    let (_, restored) = round_trip(&nav);

    let signal = restored.persist_signal().unwrap();
    let before = signal.get();
    restored.push(article("new"));
    assert!(signal.get() > before);
}

#[test]
fn malformed_payloads_are_decode_errors() {
    let missing_root = serde_json::json!({
        "id": "00000000-0000-4000-8000-000000000000",
        "kind": "stack",
        "destinations": [],
        "tabs": [],
        "presentation": { "sheet": {} }
    });
    let bytes = serde_json::to_vec(&missing_root).unwrap();
    assert!(matches!(
        NodeRecord::<App>::from_json_bytes(&bytes),
        Err(NavigationError::Decode { .. })
    ));

    let bad_kind = br#"{"id":"00000000-0000-4000-8000-000000000000","kind":"carousel"}"#;
    assert!(matches!(
        NodeRecord::<App>::from_json_bytes(bad_kind),
        Err(NavigationError::Decode { .. })
    ));
}

// ============================================================================
// Property-Based Round Trips
// ============================================================================

fn slug_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

proptest! {
    /// Property: any stack survives an encode/decode cycle unchanged
    #[test]
    fn prop_stack_round_trip(slugs in prop::collection::vec(slug_strategy(), 0..6)) {
        let tree = NavigatorTree::<App>::default();
        let destinations: Vec<Screen> = slugs.iter().map(|s| article(s)).collect();
        let nav = tree.build(stack(Screen::Home).destinations(destinations.clone())).unwrap();

        let (encoded, restored) = round_trip(&nav);
        prop_assert_eq!(restored.destinations(), destinations);
        prop_assert_eq!(restored.encode().unwrap(), encoded);
    }
}
