//! # Reactive cells for navigator state
//!
//! Every mutable piece of navigator state (root destination, stack, selected
//! tab, presented child) lives in a [`Cell<T>`]. The rendering layer observes
//! these cells either by push ([`Cell::subscribe`] / [`Cell::watch`]) or by
//! poll ([`Cell::poll_subscription`]).
//!
//! Cells are `Rc`-based and therefore `!Send`; the whole navigator tree is
//! owned by one thread.

mod cell;

pub use cell::{Cell, ObserverId, Subscription};
