//! # Waypoint Core
//!
//! Declarative navigation state for tree-shaped UIs built from stacks, tabs
//! and modals.
//!
//! A [`NavigatorTree`] owns navigator nodes. Each node is a single view, a
//! stack or a tab container, holds its mutable state in reactive
//! [`reactive::Cell`]s, and may present one child modally. [`Navigator`]
//! handles expose derived properties (`top_navigator`, `current_tab`, ...)
//! and the navigation operations (`push`, `pop`, `present`, `dismiss`,
//! `close`, ...).
//!
//! ## Modules
//!
//! - [`types`]: ids, node kinds, presentation styles, the [`Routes`] scheme
//! - [`reactive`]: observable cells
//! - [`tree`], [`navigator`], [`operations`]: the navigator arena and its API
//! - [`dsl`]: building subtrees from loosely typed descriptions
//! - [`codec`], [`transition`]: persisted form of a tree
//! - [`scheduler`]: deferred steps
//! - [`store`]: storage collaborator interface
//! - [`config`], [`errors`]: ambient settings and error types
//!
//! Everything here is single-threaded; cells and handles are `!Send`.

#![forbid(unsafe_code)]

pub mod codec;
pub mod config;
pub mod dsl;
pub mod errors;
pub mod navigator;
pub mod operations;
pub mod reactive;
pub mod scheduler;
pub mod store;
pub mod transition;
pub mod tree;
pub mod types;

pub use codec::NodeRecord;
pub use config::NavigatorConfig;
pub use dsl::{stack, tab, view, AnyValue, NavigationData, PresentationSpec};
pub use errors::{Diagnostic, NavigationError, StoreError};
pub use navigator::{Navigator, WeakNavigator};
pub use scheduler::{ImmediateScheduler, ManualScheduler, Scheduler, Task};
pub use store::{InMemoryNavigationStore, NavigationStore};
pub use transition::{MatchedTransition, Transition, TransitionNamespace};
pub use tree::{DiagnosticHook, NavigatorTree, ReplaceRootHandler};
pub use types::{NavigatorId, NavigatorKind, NodeKey, PresentStrategy, PresentationStyle, Routes};
