//! Common test utilities and helpers

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use toolset_common::{
    FrameSample, HapticFeedback, HapticStyle, LayoutHub, LayoutObserver, ManualScheduler,
    RefreshBinding, RefreshConfig, RefreshCoordinator, SubscriptionId,
};

pub const TRIGGER_DELAY: Duration = Duration::from_millis(1200);

/// Haptic sink that records every call
#[derive(Default)]
pub struct RecordingHaptics {
    pub calls: RefCell<Vec<HapticStyle>>,
}

impl HapticFeedback for RecordingHaptics {
    fn vibrate(&self, style: HapticStyle) {
        self.calls.borrow_mut().push(style);
    }
}

/// A coordinator wired to a layout hub and a virtual clock
pub struct TestEnv {
    pub hub: LayoutHub,
    pub scheduler: Rc<ManualScheduler>,
    pub binding: RefreshBinding,
    pub actions: Rc<Cell<usize>>,
    pub haptics: Rc<RecordingHaptics>,
    pub coordinator: Rc<RefCell<RefreshCoordinator>>,
    pub subscription: SubscriptionId,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_config(RefreshConfig::default())
    }

    pub fn with_config(config: RefreshConfig) -> Self {
        let scheduler = Rc::new(ManualScheduler::new());
        let binding = RefreshBinding::default();
        let actions = Rc::new(Cell::new(0));
        let haptics = Rc::new(RecordingHaptics::default());

        let counter = actions.clone();
        let coordinator = RefreshCoordinator::new(config, scheduler.clone(), binding.clone(), move || {
            counter.set(counter.get() + 1)
        })
        .expect("Failed to create coordinator")
        .with_haptics(haptics.clone());
        let coordinator = Rc::new(RefCell::new(coordinator));

        let mut hub = LayoutHub::new();
        let subscription = hub.subscribe(coordinator.clone());

        TestEnv {
            hub,
            scheduler,
            binding,
            actions,
            haptics,
            coordinator,
            subscription,
        }
    }

    /// Reports one fixed and one moving sample and commits the pass
    pub fn layout(&mut self, moving_y: f64, fixed_y: f64) {
        self.hub.report(FrameSample::fixed(fixed_y));
        self.hub.report(FrameSample::moving(moving_y));
        self.hub.commit_pass();
    }

    /// Pull distance relative to a container at y = 0
    pub fn pull(&mut self, offset: f64) {
        self.layout(offset, 0.0);
    }

    pub fn ready(&self) -> bool {
        self.coordinator.borrow().is_ready_to_refresh()
    }

    pub fn refreshing(&self) -> bool {
        self.coordinator.borrow().is_refreshing()
    }

    pub fn rotation(&self) -> f64 {
        self.coordinator.borrow().rotation_angle().as_degrees()
    }

    pub fn wait(&self, duration: Duration) {
        self.scheduler.advance(duration);
    }
}
