//! Waypoint Testing Infrastructure
//!
//! Common fixtures for tests of the Waypoint crates: a demo route scheme,
//! ready-made trees, diagnostic capture, log setup and proptest strategies.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! waypoint-testkit = { workspace = true }
//! ```
//!
//! ```rust,ignore
//! use waypoint_testkit::*;
//!
//! #[test]
//! fn my_test() {
//!     let tree = immediate_tree();
//!     let app = tabbed_app(&tree);
//!     assert!(app.push(Screen::article("intro")));
//! }
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod diagnostics;
pub mod fixtures;
pub mod logging;
pub mod routes;
pub mod strategies;

pub use diagnostics::DiagnosticLog;
pub use fixtures::*;
pub use logging::init_test_tracing;
pub use routes::{AppSheet, AppTab, DemoRoutes, Screen};
