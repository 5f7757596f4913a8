//! Core navigator identifiers and value types

use std::fmt::{self, Debug};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The application's route scheme.
///
/// Each navigator tree is parameterised by one implementation of this trait
/// which names the destination, tab-tag and sheet-tag types it carries.
/// Persistence additionally requires the three types to implement
/// `Serialize + DeserializeOwned`.
pub trait Routes: 'static {
    /// A screen that can be shown as a root or pushed onto a stack
    type Destination: Clone + PartialEq + Debug + 'static;
    /// Identifies one tab of a tab container
    type TabTag: Clone + PartialEq + Debug + 'static;
    /// Optional tag distinguishing sheets from each other
    type SheetTag: Clone + PartialEq + Debug + 'static;
}

/// Stable identifier of a navigator node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavigatorId(Uuid);

impl NavigatorId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID
    pub const fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NavigatorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NavigatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for NavigatorId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Generational index of a node inside a navigator tree's arena.
///
/// A key whose generation no longer matches its slot refers to a released
/// node and is never dereferenced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeKey {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Slot generation
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// The three shapes a navigator node can take.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavigatorKind {
    /// A single fixed screen; cannot be pushed onto
    #[serde(rename = "singleView")]
    SingleView,
    /// A root screen plus a stack of pushed destinations
    #[serde(rename = "stack")]
    Stack,
    /// A set of child navigators, one of which is selected
    #[serde(rename = "tabView")]
    TabContainer,
}

impl NavigatorKind {
    /// Name used in the persisted form
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SingleView => "singleView",
            Self::Stack => "stack",
            Self::TabContainer => "tabView",
        }
    }
}

impl fmt::Display for NavigatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a node was presented by its parent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PresentationStyle<S> {
    /// A partial-height modal sheet, optionally tagged
    Sheet {
        /// Distinguishes sheets in the rendering layer
        #[serde(default = "Option::default")]
        tag: Option<S>,
    },
    /// A modal covering the whole screen
    FullScreenCover {},
}

impl<S> PresentationStyle<S> {
    /// An untagged sheet
    pub const fn sheet() -> Self {
        Self::Sheet { tag: None }
    }

    /// A sheet carrying `tag`
    pub const fn sheet_tagged(tag: S) -> Self {
        Self::Sheet { tag: Some(tag) }
    }

    /// A full-screen cover
    pub const fn full_screen_cover() -> Self {
        Self::FullScreenCover {}
    }

    /// Whether this is a full-screen cover
    pub const fn is_full_screen(&self) -> bool {
        matches!(self, Self::FullScreenCover {})
    }
}

impl<S> Default for PresentationStyle<S> {
    fn default() -> Self {
        Self::sheet()
    }
}

/// Where [`crate::Navigator::present`] places the new child.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PresentStrategy {
    /// Present on the topmost visible navigator
    #[default]
    OnTop,
    /// Clear the current modal of this navigator, then present after the
    /// configured present delay
    ReplaceCurrent,
    /// Present directly from this navigator, replacing any modal it shows
    FromCurrent,
}
