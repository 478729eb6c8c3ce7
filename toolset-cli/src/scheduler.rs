///! Tokio-backed scheduler for real-time replays

use std::time::Duration;
use tokio::time::Instant;
use toolset_common::{Scheduler, TimerHandle};

/// Runs delayed tasks on the current `LocalSet`.
///
/// `schedule` must be called from within a `LocalSet`, since the coordinator's
/// tasks are not `Send`.
pub struct TokioScheduler {
    origin: Instant,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn origin(&self) -> Instant {
        self.origin
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerHandle {
        let handle = TimerHandle::new();
        let claim = handle.clone();

        tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            if claim.claim() {
                task();
            }
        });

        handle
    }
}
