//! Deferred-step scheduling
//!
//! Navigation operations that must wait for the rendering layer (the
//! replace-current presentation and the replace-root handler) hand their
//! second step to a [`Scheduler`]. There is no cancellation: a scheduled step
//! always runs, and steps run in the order their due times and issue order
//! dictate.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce()>;

/// Runs a task after a delay on the navigator's thread.
pub trait Scheduler {
    /// Schedule `task` to run once `delay` has elapsed.
    fn schedule(&self, delay: Duration, task: Task);
}

/// Runs every task immediately, ignoring the delay.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
    fn schedule(&self, _delay: Duration, task: Task) {
        task();
    }
}

struct PendingTask {
    due: Duration,
    seq: u64,
    task: Task,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_seq: u64,
    pending: Vec<PendingTask>,
}

impl ManualState {
    fn take_next_due(&mut self, limit: Option<Duration>) -> Option<PendingTask> {
        let position = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, entry)| limit.map_or(true, |limit| entry.due <= limit))
            .min_by_key(|(_, entry)| (entry.due, entry.seq))
            .map(|(position, _)| position)?;
        Some(self.pending.remove(position))
    }
}

/// A virtual-clock scheduler driven explicitly by tests.
///
/// Clones share the same clock and queue.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<ManualState>>,
}

impl ManualScheduler {
    /// Create a scheduler at virtual time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Number of tasks waiting to run
    pub fn pending(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Move the clock forward by `by`, running every task that falls due.
    ///
    /// Tasks scheduled by running tasks also run if they fall due within the
    /// window. Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut ran = 0;
        loop {
            let next = self.state.borrow_mut().take_next_due(Some(target));
            let Some(entry) = next else { break };
            self.state.borrow_mut().now = entry.due;
            (entry.task)();
            ran += 1;
        }
        self.state.borrow_mut().now = target;
        ran
    }

    /// Run tasks until none remain, moving the clock to each due time.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.state.borrow_mut().take_next_due(None);
            let Some(entry) = next else { break };
            {
                let mut state = self.state.borrow_mut();
                state.now = state.now.max(entry.due);
            }
            (entry.task)();
            ran += 1;
        }
        ran
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        let mut state = self.state.borrow_mut();
        let due = state.now + delay;
        let seq = state.next_seq;
        state.next_seq += 1;
        state.pending.push(PendingTask { due, seq, task });
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ManualScheduler")
            .field("now", &state.now)
            .field("pending", &state.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Task) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let make = move |label: &'static str| -> Task {
            let sink = Rc::clone(&sink);
            Box::new(move || sink.borrow_mut().push(label))
        };
        (log, make)
    }

    #[test]
    fn test_immediate_runs_inline() {
        let (log, task) = recorder();
        ImmediateScheduler.schedule(Duration::from_secs(10), task("now"));
        assert_eq!(*log.borrow(), vec!["now"]);
    }

    #[test]
    fn test_manual_runs_only_due_tasks() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();
        scheduler.schedule(Duration::from_millis(100), task("late"));
        scheduler.schedule(Duration::from_millis(50), task("early"));

        assert_eq!(scheduler.advance(Duration::from_millis(60)), 1);
        assert_eq!(*log.borrow(), vec!["early"]);
        assert_eq!(scheduler.now(), Duration::from_millis(60));
        assert_eq!(scheduler.pending(), 1);

        scheduler.advance(Duration::from_millis(40));
        assert_eq!(*log.borrow(), vec!["early", "late"]);
    }

    #[test]
    fn test_manual_equal_due_times_run_in_issue_order() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();
        scheduler.schedule(Duration::from_millis(10), task("a"));
        scheduler.schedule(Duration::from_millis(10), task("b"));
        scheduler.schedule(Duration::from_millis(10), task("c"));
        scheduler.advance(Duration::from_millis(10));
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_manual_nested_scheduling() {
        let scheduler = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let inner_scheduler = scheduler.clone();
        let sink = Rc::clone(&log);
        scheduler.schedule(
            Duration::from_millis(10),
            Box::new(move || {
                sink.borrow_mut().push("outer");
                let sink = Rc::clone(&sink);
                inner_scheduler.schedule(
                    Duration::from_millis(10),
                    Box::new(move || sink.borrow_mut().push("inner")),
                );
            }),
        );

        assert_eq!(scheduler.run_until_idle(), 2);
        assert_eq!(*log.borrow(), vec!["outer", "inner"]);
        assert_eq!(scheduler.now(), Duration::from_millis(20));
    }
}
