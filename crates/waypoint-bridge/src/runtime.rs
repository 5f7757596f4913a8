//! Tokio scheduler
//!
//! Runs deferred navigation steps as local tasks. Navigator trees are not
//! `Send`, so every task is spawned on a [`LocalSet`] and only makes progress
//! while that set is driven (`run_until`, `block_on` or awaiting it).

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::LocalSet;
use waypoint_core::{Scheduler, Task};

/// [`Scheduler`] sleeping on the tokio timer.
#[derive(Clone)]
pub struct TokioScheduler {
    local: Rc<LocalSet>,
}

impl TokioScheduler {
    /// Spawn deferred steps onto `local`
    pub fn new(local: Rc<LocalSet>) -> Self {
        Self { local }
    }

    /// The set tasks are spawned onto
    pub fn local_set(&self) -> &Rc<LocalSet> {
        &self.local
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        self.local.spawn_local(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            task();
        });
    }
}

impl fmt::Debug for TokioScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioScheduler").finish_non_exhaustive()
    }
}
