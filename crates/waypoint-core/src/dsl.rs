//! Construction DSL
//!
//! Describes a navigator subtree with loosely typed values and lowers it into
//! a typed [`NodeRecord`] once the route scheme is known. Lowering checks every
//! value against the expected concrete type; a mismatch aborts the whole build
//! before anything is inserted into the tree.
//!
//! ```rust,ignore
//! use waypoint_core::dsl::{stack, tab, view, PresentationSpec};
//!
//! let data = tab([
//!     stack(Screen::Feed).tab_item(Tab::Feed),
//!     view(Screen::Profile).tab_item(Tab::Profile),
//! ])
//! .selected(Tab::Feed);
//! let root = tree.build(data)?;
//!
//! root.present(view(Screen::Compose).presentation(PresentationSpec::full_screen_cover()),
//!              PresentStrategy::OnTop);
//! ```

use std::any::{self, Any};
use std::fmt;

use crate::codec::NodeRecord;
use crate::errors::{Diagnostic, NavigationError};
use crate::navigator::Navigator;
use crate::tree::NavigatorTree;
use crate::types::{NavigatorId, NavigatorKind, PresentationStyle, Routes};

// ============================================================================
// Type-erased values
// ============================================================================

/// A value of any `'static` type, remembered together with its type name.
pub struct AnyValue {
    value: Box<dyn Any>,
    type_name: &'static str,
}

impl AnyValue {
    /// Wrap `value`. Wrapping an `AnyValue` returns it unchanged.
    pub fn new<T: Any>(value: T) -> Self {
        let boxed: Box<dyn Any> = Box::new(value);
        match boxed.downcast::<AnyValue>() {
            Ok(inner) => *inner,
            Err(value) => Self {
                value,
                type_name: any::type_name::<T>(),
            },
        }
    }

    /// Name of the wrapped type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the wrapped value is a `T`
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Recover the concrete value.
    pub fn downcast<T: Any>(self) -> Result<T, NavigationError> {
        let found = self.type_name;
        self.value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| NavigationError::type_mismatch::<T>(found))
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnyValue<{}>", self.type_name)
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Loosely typed presentation style.
#[derive(Debug, Default)]
pub enum PresentationSpec {
    /// Sheet with an optional tag
    #[default]
    Sheet,
    /// Sheet tagged with a sheet-tag value
    TaggedSheet(AnyValue),
    /// Full-screen cover
    FullScreenCover,
}

impl PresentationSpec {
    /// Untagged sheet
    pub fn sheet() -> Self {
        Self::Sheet
    }

    /// Sheet carrying `tag`
    pub fn sheet_tagged(tag: impl Any) -> Self {
        Self::TaggedSheet(AnyValue::new(tag))
    }

    /// Full-screen cover
    pub fn full_screen_cover() -> Self {
        Self::FullScreenCover
    }
}

#[derive(Debug)]
enum Shape {
    View(AnyValue),
    Stack {
        root: AnyValue,
        destinations: Vec<AnyValue>,
    },
    Tab {
        tabs: Vec<NavigationData>,
        selected: Option<AnyValue>,
    },
}

/// Description of a navigator subtree.
#[derive(Debug)]
#[must_use]
pub struct NavigationData {
    shape: Shape,
    id: Option<NavigatorId>,
    presentation: PresentationSpec,
    tab_item: Option<AnyValue>,
}

/// A single-screen navigator showing `root`
pub fn view(root: impl Any) -> NavigationData {
    NavigationData::new(Shape::View(AnyValue::new(root)))
}

/// A stack navigator rooted at `root`
pub fn stack(root: impl Any) -> NavigationData {
    NavigationData::new(Shape::Stack {
        root: AnyValue::new(root),
        destinations: Vec::new(),
    })
}

/// A tab container holding `tabs`
pub fn tab(tabs: impl IntoIterator<Item = NavigationData>) -> NavigationData {
    NavigationData::new(Shape::Tab {
        tabs: tabs.into_iter().collect(),
        selected: None,
    })
}

impl NavigationData {
    fn new(shape: Shape) -> Self {
        Self {
            shape,
            id: None,
            presentation: PresentationSpec::default(),
            tab_item: None,
        }
    }

    /// Use a fixed id instead of a fresh one
    pub fn id(mut self, id: NavigatorId) -> Self {
        self.id = Some(id);
        self
    }

    /// How the navigator is presented
    pub fn presentation(mut self, presentation: PresentationSpec) -> Self {
        self.presentation = presentation;
        self
    }

    /// Tag of this navigator within a tab container
    pub fn tab_item(mut self, tag: impl Any) -> Self {
        self.tab_item = Some(AnyValue::new(tag));
        self
    }

    /// Append one pushed destination. Only stacks carry destinations.
    pub fn destination(mut self, destination: impl Any) -> Self {
        match &mut self.shape {
            Shape::Stack { destinations, .. } => destinations.push(AnyValue::new(destination)),
            _ => tracing::warn!("Destinations ignored on a non-stack navigator"),
        }
        self
    }

    /// Append pushed destinations. Only stacks carry destinations.
    pub fn destinations<T: Any>(self, destinations: impl IntoIterator<Item = T>) -> Self {
        destinations
            .into_iter()
            .fold(self, |data, destination| data.destination(destination))
    }

    /// Initially selected tab. Only tab containers select tabs.
    pub fn selected(mut self, tag: impl Any) -> Self {
        match &mut self.shape {
            Shape::Tab { selected, .. } => *selected = Some(AnyValue::new(tag)),
            _ => tracing::warn!("Tab selection ignored on a non-tab navigator"),
        }
        self
    }

    /// Lower into a typed record, checking every value against `R`.
    pub fn into_record<R: Routes>(self) -> Result<NodeRecord<R>, NavigationError> {
        let (kind, root, destinations, tabs, selected_tab) = match self.shape {
            Shape::View(root) => (
                NavigatorKind::SingleView,
                Some(root.downcast::<R::Destination>()?),
                Vec::new(),
                Vec::new(),
                None,
            ),
            Shape::Stack { root, destinations } => (
                NavigatorKind::Stack,
                Some(root.downcast::<R::Destination>()?),
                destinations
                    .into_iter()
                    .map(AnyValue::downcast::<R::Destination>)
                    .collect::<Result<Vec<_>, _>>()?,
                Vec::new(),
                None,
            ),
            Shape::Tab { tabs, selected } => (
                NavigatorKind::TabContainer,
                None,
                Vec::new(),
                tabs.into_iter()
                    .map(NavigationData::into_record::<R>)
                    .collect::<Result<Vec<_>, _>>()?,
                selected.map(AnyValue::downcast::<R::TabTag>).transpose()?,
            ),
        };

        if let Some(selected) = &selected_tab {
            if !tabs.iter().any(|tab| tab.tab_item.as_ref() == Some(selected)) {
                return Err(NavigationError::target_not_found(format!(
                    "selected tab {selected:?} is not one of the container's tabs"
                )));
            }
        }

        let presentation = match self.presentation {
            PresentationSpec::Sheet => PresentationStyle::sheet(),
            PresentationSpec::TaggedSheet(tag) => {
                PresentationStyle::sheet_tagged(tag.downcast::<R::SheetTag>()?)
            }
            PresentationSpec::FullScreenCover => PresentationStyle::full_screen_cover(),
        };

        Ok(NodeRecord {
            id: self.id.unwrap_or_default(),
            kind,
            root,
            destinations,
            navigator: None,
            tab_item: self.tab_item.map(AnyValue::downcast::<R::TabTag>).transpose()?,
            selected_tab,
            tabs,
            presentation,
        })
    }
}

impl<R: Routes> NavigatorTree<R> {
    /// Build a detached navigator subtree from a description.
    ///
    /// A type mismatch anywhere in the description is reported as a
    /// diagnostic and nothing is inserted.
    pub fn build(&self, data: NavigationData) -> Result<Navigator<R>, NavigationError> {
        let record = match data.into_record::<R>() {
            Ok(record) => record,
            Err(err) => {
                match &err {
                    NavigationError::TypeMismatch { expected, found } => {
                        self.report(Diagnostic::TypeMismatch {
                            operation: "build",
                            expected: *expected,
                            found: *found,
                        });
                    }
                    other => tracing::warn!(error = %other, "Navigation data rejected"),
                }
                return Err(err);
            }
        };
        let key = self.insert_record(&record);
        self.bind(key);
        tracing::debug!(navigator = %record.id, kind = %record.kind, "Built navigator");
        self.navigator(key).ok_or(NavigationError::StaleNavigator)
    }
}
