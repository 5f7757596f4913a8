//! # Waypoint Bridge
//!
//! Glue between a navigator tree and the outside world.
//!
//! - [`attach`] / [`RenderObserver`]: push navigator state to a rendering layer
//! - [`apply`] / [`RenderEvent`]: feed user-driven changes back as operations
//! - [`PersistenceDriver`] / [`restore_or_else`]: debounced saving and startup restore
//! - [`TokioScheduler`]: deferred steps on a tokio `LocalSet`

#![forbid(unsafe_code)]
#![deny(clippy::dbg_macro)]
#![deny(clippy::todo)]

mod events;
mod observer;
mod persistence;
mod runtime;

pub use events::{apply, RenderEvent};
pub use observer::{attach, BridgeHandle, ModalChange, ModalRoute, RenderObserver};
pub use persistence::{restore_or_else, PersistenceDriver};
pub use runtime::TokioScheduler;
