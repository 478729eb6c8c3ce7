//! Linear tween for the content offset

use std::time::Duration;

/// Linear animation between two offsets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetAnimation {
    from: f64,
    to: f64,
    start: Duration,
    duration: Duration,
}

impl OffsetAnimation {
    /// An animation that has already settled at `value`
    pub fn settled(value: f64) -> Self {
        Self {
            from: value,
            to: value,
            start: Duration::ZERO,
            duration: Duration::ZERO,
        }
    }

    pub fn new(from: f64, to: f64, start: Duration, duration: Duration) -> Self {
        Self {
            from,
            to,
            start,
            duration,
        }
    }

    /// Restarts toward `to` from wherever this animation is at `now`
    pub fn retarget(&self, to: f64, now: Duration, duration: Duration) -> Self {
        Self::new(self.value_at(now), to, now, duration)
    }

    pub fn value_at(&self, now: Duration) -> f64 {
        self.from + (self.to - self.from) * self.progress(now)
    }

    pub fn is_finished(&self, now: Duration) -> bool {
        self.progress(now) >= 1.0
    }

    pub fn target(&self) -> f64 {
        self.to
    }

    fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }
}

impl Default for OffsetAnimation {
    fn default() -> Self {
        Self::settled(0.0)
    }
}
