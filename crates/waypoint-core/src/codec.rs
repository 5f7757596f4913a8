//! Tree codec
//!
//! [`NodeRecord`] is the transport-neutral form of a navigator subtree. It is
//! produced by [`Navigator::encode`], consumed by [`NavigatorTree::decode`],
//! and is also the typed intermediate form the construction DSL lowers into.
//!
//! Persisted JSON shape (camelCase):
//!
//! ```text
//! { id, kind, root?, destinations, navigator?, tabItem?, selectedTab?,
//!   tabs, presentation }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::NavigationError;
use crate::navigator::Navigator;
use crate::tree::NavigatorTree;
use crate::types::{NavigatorId, NavigatorKind, PresentationStyle, Routes};

/// Persisted form of one navigator and everything it owns.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(
    serialize = "R::Destination: Serialize, R::TabTag: Serialize, R::SheetTag: Serialize",
    deserialize = "R::Destination: serde::de::DeserializeOwned, \
                   R::TabTag: serde::de::DeserializeOwned, \
                   R::SheetTag: serde::de::DeserializeOwned"
))]
pub struct NodeRecord<R: Routes> {
    /// Navigator id
    pub id: NavigatorId,
    /// Navigator kind
    pub kind: NavigatorKind,
    /// Root destination; required unless `kind` is a tab container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<R::Destination>,
    /// Destinations pushed on top of the root
    #[serde(default)]
    pub destinations: Vec<R::Destination>,
    /// Presented child
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigator: Option<Box<NodeRecord<R>>>,
    /// Tag within the parent tab container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_item: Option<R::TabTag>,
    /// Selected tab of a tab container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_tab: Option<R::TabTag>,
    /// Tab children of a tab container
    #[serde(default)]
    pub tabs: Vec<NodeRecord<R>>,
    /// How this navigator was presented
    #[serde(default)]
    pub presentation: PresentationStyle<R::SheetTag>,
}

impl<R: Routes> NodeRecord<R> {
    /// A record with a fresh id and nothing but a kind and root
    pub fn new(kind: NavigatorKind, root: Option<R::Destination>) -> Self {
        Self {
            id: NavigatorId::new(),
            kind,
            root,
            destinations: Vec::new(),
            navigator: None,
            tab_item: None,
            selected_tab: None,
            tabs: Vec::new(),
            presentation: PresentationStyle::default(),
        }
    }

    /// Check the record and everything below it for shape errors.
    pub fn validate(&self) -> Result<(), NavigationError> {
        match self.kind {
            NavigatorKind::SingleView | NavigatorKind::Stack => {
                if self.root.is_none() {
                    return Err(NavigationError::decode(format!(
                        "{} navigator {} has no root",
                        self.kind, self.id
                    )));
                }
                if !self.tabs.is_empty() {
                    return Err(NavigationError::decode(format!(
                        "{} navigator {} carries tabs",
                        self.kind, self.id
                    )));
                }
            }
            NavigatorKind::TabContainer => {
                if !self.destinations.is_empty() {
                    return Err(NavigationError::decode(format!(
                        "tabView navigator {} carries destinations",
                        self.id
                    )));
                }
            }
        }
        if let Some(selected) = &self.selected_tab {
            let known = self
                .tabs
                .iter()
                .any(|tab| tab.tab_item.as_ref() == Some(selected));
            if self.kind != NavigatorKind::TabContainer || !known {
                return Err(NavigationError::decode(format!(
                    "navigator {} selects tab {selected:?} it does not contain",
                    self.id
                )));
            }
        }
        if self.kind == NavigatorKind::SingleView && !self.destinations.is_empty() {
            return Err(NavigationError::decode(format!(
                "singleView navigator {} carries destinations",
                self.id
            )));
        }

        for tab in &self.tabs {
            tab.validate()?;
        }
        if let Some(child) = &self.navigator {
            child.validate()?;
        }
        Ok(())
    }

    /// Number of records in this subtree
    pub fn node_count(&self) -> usize {
        1 + self.tabs.iter().map(Self::node_count).sum::<usize>()
            + self.navigator.as_ref().map_or(0, |child| child.node_count())
    }
}

impl<R: Routes> NodeRecord<R>
where
    R::Destination: Serialize + serde::de::DeserializeOwned,
    R::TabTag: Serialize + serde::de::DeserializeOwned,
    R::SheetTag: Serialize + serde::de::DeserializeOwned,
{
    /// Encode as JSON bytes
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, NavigationError> {
        serde_json::to_vec(self).map_err(|e| NavigationError::encode(e.to_string()))
    }

    /// Decode from JSON bytes and validate the shape
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, NavigationError> {
        let record: Self = serde_json::from_slice(bytes)?;
        record.validate()?;
        Ok(record)
    }
}

impl<R: Routes> Clone for NodeRecord<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            kind: self.kind,
            root: self.root.clone(),
            destinations: self.destinations.clone(),
            navigator: self.navigator.clone(),
            tab_item: self.tab_item.clone(),
            selected_tab: self.selected_tab.clone(),
            tabs: self.tabs.clone(),
            presentation: self.presentation.clone(),
        }
    }
}

impl<R: Routes> PartialEq for NodeRecord<R> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.kind == other.kind
            && self.root == other.root
            && self.destinations == other.destinations
            && self.navigator == other.navigator
            && self.tab_item == other.tab_item
            && self.selected_tab == other.selected_tab
            && self.tabs == other.tabs
            && self.presentation == other.presentation
    }
}

impl<R: Routes> fmt::Debug for NodeRecord<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRecord")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("root", &self.root)
            .field("destinations", &self.destinations)
            .field("navigator", &self.navigator)
            .field("tab_item", &self.tab_item)
            .field("selected_tab", &self.selected_tab)
            .field("tabs", &self.tabs)
            .field("presentation", &self.presentation)
            .finish()
    }
}

impl<R: Routes> Navigator<R> {
    /// Snapshot this navigator and everything it owns.
    pub fn encode(&self) -> Result<NodeRecord<R>, NavigationError> {
        let snapshot = self.tree().with_node(self.key(), |node| {
            (
                NodeRecord::<R> {
                    id: node.id,
                    kind: node.kind,
                    root: match node.kind {
                        NavigatorKind::TabContainer => None,
                        _ => node.root.get(),
                    },
                    destinations: node.destinations.get(),
                    navigator: None,
                    tab_item: node.tab_tag.clone(),
                    selected_tab: node.selected_tab.get(),
                    tabs: Vec::new(),
                    presentation: node.presentation.clone(),
                },
                node.tabs.clone(),
                node.presented.get(),
            )
        });
        let Some((mut record, tabs, presented)) = snapshot else {
            return Err(NavigationError::StaleNavigator);
        };

        for tab in tabs {
            let tab = self
                .tree()
                .navigator(tab)
                .ok_or(NavigationError::StaleNavigator)?;
            record.tabs.push(tab.encode()?);
        }
        if let Some(child) = presented.and_then(|key| self.tree().navigator(key)) {
            record.navigator = Some(Box::new(child.encode()?));
        }
        Ok(record)
    }
}

impl<R: Routes> NavigatorTree<R> {
    /// Rebuild a detached navigator subtree from a record.
    ///
    /// The record is validated first; nothing is inserted on error.
    pub fn decode(&self, record: &NodeRecord<R>) -> Result<Navigator<R>, NavigationError> {
        record.validate()?;
        let key = self.insert_record(record);
        self.bind(key);
        tracing::debug!(
            navigator = %record.id,
            nodes = record.node_count(),
            "Decoded navigator tree"
        );
        self.navigator(key).ok_or(NavigationError::StaleNavigator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[derive(Debug)]
    struct Plain;

    impl Routes for Plain {
        type Destination = String;
        type TabTag = String;
        type SheetTag = String;
    }

    #[test]
    fn test_record_json_shape() {
        let mut record = NodeRecord::<Plain>::new(NavigatorKind::Stack, Some("home".into()));
        record.destinations = vec!["detail".into()];
        record.tab_item = Some("feed".into());
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["kind"], "stack");
        assert_eq!(value["root"], "home");
        assert_eq!(value["destinations"], serde_json::json!(["detail"]));
        assert_eq!(value["tabItem"], "feed");
        assert_eq!(value["tabs"], serde_json::json!([]));
        assert!(value.get("navigator").is_none());
        assert!(value.get("selectedTab").is_none());
        assert_eq!(value["presentation"], serde_json::json!({ "sheet": { "tag": null } }));
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = serde_json::json!({
            "id": NavigatorId::new(),
            "kind": "tabView",
        });
        let record: NodeRecord<Plain> = serde_json::from_value(json).unwrap();
        assert!(record.tabs.is_empty());
        assert_eq!(record.presentation, PresentationStyle::sheet());
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_root() {
        let record = NodeRecord::<Plain>::new(NavigatorKind::SingleView, None);
        assert_matches!(record.validate(), Err(NavigationError::Decode { .. }));
    }

    #[test]
    fn test_validate_rejects_tabs_on_stack() {
        let mut record = NodeRecord::<Plain>::new(NavigatorKind::Stack, Some("a".into()));
        record
            .tabs
            .push(NodeRecord::new(NavigatorKind::SingleView, Some("b".into())));
        assert_matches!(record.validate(), Err(NavigationError::Decode { .. }));
    }

    #[test]
    fn test_validate_rejects_destinations_on_single_view() {
        let mut record = NodeRecord::<Plain>::new(NavigatorKind::SingleView, Some("a".into()));
        record.destinations.push("b".into());
        assert_matches!(record.validate(), Err(NavigationError::Decode { .. }));
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Unpersistable;

    impl Serialize for Unpersistable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("not persistable"))
        }
    }

    impl<'de> Deserialize<'de> for Unpersistable {
        fn deserialize<D: serde::Deserializer<'de>>(_: D) -> Result<Self, D::Error> {
            Err(serde::de::Error::custom("not persistable"))
        }
    }

    #[derive(Debug)]
    struct Opaque;

    impl Routes for Opaque {
        type Destination = Unpersistable;
        type TabTag = String;
        type SheetTag = String;
    }

    #[test]
    fn test_serializer_failure_is_encode_error() {
        let record = NodeRecord::<Opaque>::new(NavigatorKind::Stack, Some(Unpersistable));
        assert_matches!(record.to_json_bytes(), Err(NavigationError::Encode { .. }));
    }

    #[test]
    fn test_validate_rejects_unknown_selected_tab() {
        let mut tab = NodeRecord::<Plain>::new(NavigatorKind::Stack, Some("a".into()));
        tab.tab_item = Some("feed".into());
        let mut record = NodeRecord::<Plain>::new(NavigatorKind::TabContainer, None);
        record.tabs = vec![tab];
        record.selected_tab = Some("feed".into());
        assert!(record.validate().is_ok());

        record.selected_tab = Some("missing".into());
        assert_matches!(record.validate(), Err(NavigationError::Decode { .. }));

        let tree = NavigatorTree::<Plain>::default();
        assert!(tree.decode(&record).is_err());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_validate_recurses_into_presented_child() {
        let mut record = NodeRecord::<Plain>::new(NavigatorKind::Stack, Some("a".into()));
        record.navigator = Some(Box::new(NodeRecord::new(NavigatorKind::Stack, None)));
        assert_matches!(record.validate(), Err(NavigationError::Decode { .. }));
    }

    #[test]
    fn test_from_json_bytes_rejects_garbage() {
        let err = NodeRecord::<Plain>::from_json_bytes(b"{\"id\":");
        assert_matches!(err, Err(NavigationError::Decode { .. }));
    }

    #[test]
    fn test_decode_failure_inserts_nothing() {
        let tree = NavigatorTree::<Plain>::default();
        let record = NodeRecord::<Plain>::new(NavigatorKind::Stack, None);
        assert!(tree.decode(&record).is_err());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_encode_tab_container_drops_root() {
        let tree = NavigatorTree::<Plain>::default();
        let mut record = NodeRecord::<Plain>::new(NavigatorKind::TabContainer, Some("x".into()));
        record
            .tabs
            .push(NodeRecord::new(NavigatorKind::Stack, Some("a".into())));
        let nav = tree.decode(&record).unwrap();
        let encoded = nav.encode().unwrap();
        assert_eq!(encoded.root, None);
        assert_eq!(encoded.tabs.len(), 1);
    }

    #[test]
    fn test_encode_stale_navigator() {
        let tree = NavigatorTree::<Plain>::default();
        let record = NodeRecord::<Plain>::new(NavigatorKind::Stack, Some("a".into()));
        let nav = tree.decode(&record).unwrap();
        tree.release(&nav);
        assert_matches!(nav.encode(), Err(NavigationError::StaleNavigator));
    }
}
