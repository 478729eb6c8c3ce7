//! Delayed callbacks on the single UI scheduling context
//!
//! Every scheduled task is paired with a [`TimerHandle`]. A task only runs if
//! its handle is still pending when the deadline is reached, so cancelling a
//! handle turns the callback into a no-op regardless of how the backing timer
//! is implemented.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerStatus {
    Pending,
    Fired,
    Cancelled,
}

/// Shared view of a scheduled task
#[derive(Debug, Clone)]
pub struct TimerHandle {
    status: Rc<Cell<TimerStatus>>,
}

impl TimerHandle {
    pub fn new() -> Self {
        Self {
            status: Rc::new(Cell::new(TimerStatus::Pending)),
        }
    }

    /// Cancels the task. Returns true if it had not run or been cancelled yet.
    pub fn cancel(&self) -> bool {
        if self.status.get() == TimerStatus::Pending {
            self.status.set(TimerStatus::Cancelled);
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status.get() == TimerStatus::Pending
    }

    pub fn is_cancelled(&self) -> bool {
        self.status.get() == TimerStatus::Cancelled
    }

    pub fn has_fired(&self) -> bool {
        self.status.get() == TimerStatus::Fired
    }

    /// Marks the task as fired. Returns false if it was cancelled or already ran;
    /// schedulers call this right before running the task and skip it on false.
    pub fn claim(&self) -> bool {
        if self.status.get() == TimerStatus::Pending {
            self.status.set(TimerStatus::Fired);
            true
        } else {
            false
        }
    }
}

impl Default for TimerHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs tasks after a delay on the caller's scheduling context
pub trait Scheduler {
    /// Monotonic time since the scheduler was created
    fn now(&self) -> Duration;

    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerHandle;
}

struct ScheduledTask {
    handle: TimerHandle,
    task: Box<dyn FnOnce()>,
}

/// Scheduler driven by a virtual clock.
///
/// Time only moves when [`ManualScheduler::advance`] is called. Tasks due at
/// the same instant run in the order they were scheduled.
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<Duration>,
    next_seq: Cell<u64>,
    queue: RefCell<BTreeMap<(Duration, u64), ScheduledTask>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward, running every task whose deadline is reached.
    ///
    /// Returns the number of tasks that ran. Tasks scheduled by a running task
    /// run in the same call if they fall due within the advanced window.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now.get() + by;
        let mut ran = 0;

        loop {
            let next = {
                let mut queue = self.queue.borrow_mut();
                let due = queue.keys().next().copied().filter(|(at, _)| *at <= target);
                due.and_then(|key| queue.remove(&key).map(|task| (key.0, task)))
            };

            let Some((at, scheduled)) = next else {
                break;
            };

            self.now.set(at);
            if scheduled.handle.claim() {
                (scheduled.task)();
                ran += 1;
            } else {
                debug!(at_ms = at.as_millis() as u64, "Skipping cancelled timer");
            }
        }

        self.now.set(target);
        ran
    }

    /// Earliest deadline among tasks that are still waiting
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue
            .borrow()
            .iter()
            .find(|(_, scheduled)| scheduled.handle.is_pending())
            .map(|((at, _), _)| *at)
    }

    /// Number of tasks that are still waiting and not cancelled
    pub fn pending_count(&self) -> usize {
        self.queue
            .borrow()
            .values()
            .filter(|scheduled| scheduled.handle.is_pending())
            .count()
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerHandle {
        let handle = TimerHandle::new();
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);

        self.queue.borrow_mut().insert(
            (self.now.get() + delay, seq),
            ScheduledTask {
                handle: handle.clone(),
                task,
            },
        );

        handle
    }
}

impl<S: Scheduler + ?Sized> Scheduler for Rc<S> {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerHandle {
        (**self).schedule(delay, task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_runs_at_deadline() {
        let scheduler = ManualScheduler::new();
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();

        let handle = scheduler.schedule(Duration::from_millis(1200), Box::new(move || flag.set(true)));

        assert_eq!(scheduler.advance(Duration::from_millis(1199)), 0);
        assert!(!ran.get());
        assert!(handle.is_pending());

        assert_eq!(scheduler.advance(Duration::from_millis(1)), 1);
        assert!(ran.get());
        assert!(handle.has_fired());
        assert_eq!(scheduler.now(), Duration::from_millis(1200));
    }

    #[test]
    fn test_cancelled_task_never_runs() {
        let scheduler = ManualScheduler::new();
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();

        let handle = scheduler.schedule(Duration::from_millis(10), Box::new(move || flag.set(true)));
        assert!(handle.cancel());
        assert!(!handle.cancel());
        assert_eq!(scheduler.pending_count(), 0);

        assert_eq!(scheduler.advance(Duration::from_secs(1)), 0);
        assert!(!ran.get());
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_next_deadline_skips_cancelled() {
        let scheduler = ManualScheduler::new();
        assert_eq!(scheduler.next_deadline(), None);

        let early = scheduler.schedule(Duration::from_millis(100), Box::new(|| {}));
        scheduler.schedule(Duration::from_secs(3600), Box::new(|| {}));
        assert_eq!(scheduler.next_deadline(), Some(Duration::from_millis(100)));

        early.cancel();
        assert_eq!(scheduler.next_deadline(), Some(Duration::from_secs(3600)));

        scheduler.advance(Duration::from_secs(3600));
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn test_cancel_after_fire_is_noop() {
        let scheduler = ManualScheduler::new();
        let handle = scheduler.schedule(Duration::ZERO, Box::new(|| {}));
        scheduler.advance(Duration::ZERO);

        assert!(!handle.cancel());
        assert!(handle.has_fired());
    }

    #[test]
    fn test_same_deadline_runs_in_schedule_order() {
        let scheduler = Rc::new(ManualScheduler::new());
        let order = Rc::new(RefCell::new(Vec::new()));

        for i in 0..3 {
            let order = order.clone();
            scheduler.schedule(Duration::from_millis(5), Box::new(move || order.borrow_mut().push(i)));
        }

        assert_eq!(scheduler.advance(Duration::from_millis(5)), 3);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_nested_schedule_within_window() {
        let scheduler = Rc::new(ManualScheduler::new());
        let hits = Rc::new(Cell::new(0));

        let inner_scheduler = scheduler.clone();
        let inner_hits = hits.clone();
        scheduler.schedule(
            Duration::from_millis(10),
            Box::new(move || {
                inner_hits.set(inner_hits.get() + 1);
                let hits = inner_hits.clone();
                inner_scheduler.schedule(
                    Duration::from_millis(10),
                    Box::new(move || hits.set(hits.get() + 1)),
                );
            }),
        );

        assert_eq!(scheduler.advance(Duration::from_millis(25)), 2);
        assert_eq!(hits.get(), 2);
        assert_eq!(scheduler.now(), Duration::from_millis(25));
    }
}
