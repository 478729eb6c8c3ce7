//! Browser implementations of the coordinator's collaborators

use gloo_timers::callback::Timeout;
use std::time::Duration;
use toolset_common::{HapticFeedback, HapticStyle, Scheduler, TimerHandle};
use tracing::debug;

/// Schedules work on the browser event loop with `setTimeout`
pub struct GlooScheduler {
    origin_ms: f64,
}

impl GlooScheduler {
    pub fn new() -> Self {
        Self {
            origin_ms: js_sys::Date::now(),
        }
    }
}

impl Default for GlooScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for GlooScheduler {
    fn now(&self) -> Duration {
        let elapsed_ms = (js_sys::Date::now() - self.origin_ms).max(0.0);
        Duration::from_secs_f64(elapsed_ms / 1000.0)
    }

    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerHandle {
        let handle = TimerHandle::new();
        let claim = handle.clone();
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);

        // The browser keeps the timeout alive; cancellation goes through the handle
        let _id = Timeout::new(millis, move || {
            if claim.claim() {
                task();
            }
        })
        .forget();

        handle
    }
}

/// Haptic feedback through `navigator.vibrate`
#[derive(Debug, Default, Clone, Copy)]
pub struct WebVibration;

impl HapticFeedback for WebVibration {
    fn vibrate(&self, style: HapticStyle) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if !window.navigator().vibrate_with_duration(style.duration_ms()) {
            debug!(%style, "Vibration not supported");
        }
    }
}
