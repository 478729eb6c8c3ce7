//! Pull-to-refresh state machine
//!
//! Each layout pass the coordinator measures how far the moving content has
//! been pulled below the fixed container, maps that distance to an indicator
//! rotation, and fires the caller's refresh action once per pull that crosses
//! the threshold. Pulling back below half the threshold re-arms the trigger.

use crate::binding::RefreshBinding;
use crate::frame::{self, FrameSample, FrameTag};
use crate::geometry::Angle;
use crate::haptics::HapticFeedback;
use crate::observer::LayoutSubscriber;
use crate::refresh::animation::OffsetAnimation;
use crate::refresh::config::RefreshConfig;
use crate::refresh::indicator::RefreshActivityIndicator;
use crate::scheduler::{Scheduler, TimerHandle};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Snapshot of the coordinator's observable state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RefreshState {
    pub is_refreshing: bool,
    pub ready_to_refresh: bool,
    pub rotation_angle: Angle,
    pub content_offset: f64,
}

/// Outcome of one layout pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollUpdate {
    pub offset: f64,
    pub rotation: Angle,
    pub triggered: bool,
}

pub struct RefreshCoordinator {
    config: RefreshConfig,
    scheduler: Rc<dyn Scheduler>,
    action: Rc<dyn Fn()>,
    haptics: Option<Rc<dyn HapticFeedback>>,
    binding: RefreshBinding,
    binding_rx: watch::Receiver<bool>,
    observed_refreshing: bool,
    ready_to_refresh: bool,
    rotation_angle: Angle,
    animation: OffsetAnimation,
    pending_actions: Vec<TimerHandle>,
    mounted: bool,
}

impl RefreshCoordinator {
    /// Creates a coordinator bound to `binding`.
    ///
    /// `action` is the caller's refresh work. It runs on `scheduler` after the
    /// configured trigger delay and is expected to clear the binding when done.
    pub fn new(
        config: RefreshConfig,
        scheduler: Rc<dyn Scheduler>,
        binding: RefreshBinding,
        action: impl Fn() + 'static,
    ) -> Result<Self> {
        config.validate()?;

        let mut binding_rx = binding.subscribe();
        let observed_refreshing = *binding_rx.borrow_and_update();
        let settled_offset = if observed_refreshing {
            config.refreshing_offset()
        } else {
            0.0
        };

        Ok(Self {
            config,
            scheduler,
            action: Rc::new(action),
            haptics: None,
            binding,
            binding_rx,
            observed_refreshing,
            ready_to_refresh: !observed_refreshing,
            rotation_angle: Angle::ZERO,
            animation: OffsetAnimation::settled(settled_offset),
            pending_actions: Vec::new(),
            mounted: true,
        })
    }

    pub fn with_haptics(mut self, haptics: Rc<dyn HapticFeedback>) -> Self {
        self.haptics = Some(haptics);
        self
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    pub fn binding(&self) -> &RefreshBinding {
        &self.binding
    }

    /// Processes one batch of frame samples.
    pub fn calculate_scroll_position(&mut self, samples: &[FrameSample]) -> ScrollUpdate {
        if !self.mounted {
            warn!("Ignoring layout pass on unmounted refresh coordinator");
            return ScrollUpdate {
                offset: 0.0,
                rotation: self.rotation_angle,
                triggered: false,
            };
        }

        self.poll();

        let moving = frame::vertical_origin(samples, FrameTag::Moving);
        let fixed = frame::vertical_origin(samples, FrameTag::Fixed);
        let offset = moving - fixed;

        self.rotation_angle = self.rotation_for(offset);

        if offset < self.config.rearm_offset() && !self.ready_to_refresh {
            debug!(offset, "Pull re-armed");
            self.ready_to_refresh = true;
        }

        let triggered = self.ready_to_refresh && offset > self.config.threshold;
        if triggered {
            self.refresh();
        }

        ScrollUpdate {
            offset,
            rotation: self.rotation_angle,
            triggered,
        }
    }

    /// Indicator rotation for a pull distance: one full turn per threshold.
    pub fn rotation_for(&self, offset: f64) -> Angle {
        Angle::degrees(offset / self.config.threshold * 360.0)
    }

    fn refresh(&mut self) {
        if let (Some(style), Some(haptics)) = (self.config.haptic, self.haptics.as_ref()) {
            haptics.vibrate(style);
        }

        self.ready_to_refresh = false;
        self.binding.set(true);
        self.poll();

        let action = Rc::clone(&self.action);
        let delay = self.config.trigger_delay();
        info!(delay_ms = delay.as_millis() as u64, "Refresh triggered");

        let handle = self.scheduler.schedule(delay, Box::new(move || action()));
        self.pending_actions.retain(TimerHandle::is_pending);
        self.pending_actions.push(handle);
    }

    /// Observes writes to the bound refreshing flag.
    ///
    /// Each transition restarts the content offset animation. Returns true if
    /// the flag changed since the last poll.
    pub fn poll(&mut self) -> bool {
        if !self.binding_rx.has_changed().unwrap_or(false) {
            return false;
        }

        let refreshing = *self.binding_rx.borrow_and_update();
        if refreshing == self.observed_refreshing {
            return false;
        }
        self.observed_refreshing = refreshing;

        let target = if refreshing {
            self.config.refreshing_offset()
        } else {
            0.0
        };
        let now = self.scheduler.now();
        self.animation = self
            .animation
            .retarget(target, now, self.config.offset_animation());

        debug!(refreshing, target, "Refreshing state changed");
        true
    }

    pub fn is_refreshing(&self) -> bool {
        self.observed_refreshing
    }

    pub fn is_ready_to_refresh(&self) -> bool {
        self.ready_to_refresh
    }

    pub fn rotation_angle(&self) -> Angle {
        self.rotation_angle
    }

    /// Current animated content offset
    pub fn content_offset(&self) -> f64 {
        self.animation.value_at(self.scheduler.now())
    }

    pub fn is_animating(&self) -> bool {
        !self.animation.is_finished(self.scheduler.now())
    }

    pub fn state(&self) -> RefreshState {
        RefreshState {
            is_refreshing: self.observed_refreshing,
            ready_to_refresh: self.ready_to_refresh,
            rotation_angle: self.rotation_angle,
            content_offset: self.content_offset(),
        }
    }

    pub fn indicator(&self) -> RefreshActivityIndicator {
        RefreshActivityIndicator::new(
            self.config.threshold,
            self.config.tint.clone(),
            self.observed_refreshing,
            self.rotation_angle,
            self.config.indicator_period(),
        )
    }

    /// Whether a caller's action is scheduled but has not run yet
    pub fn has_pending_action(&self) -> bool {
        self.pending_actions.iter().any(TimerHandle::is_pending)
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Tears the coordinator down: cancels a pending refresh action and ignores
    /// further layout passes.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;

        for handle in self.pending_actions.drain(..) {
            if handle.cancel() {
                debug!("Cancelled pending refresh action");
            }
        }
    }
}

impl LayoutSubscriber for RefreshCoordinator {
    fn on_layout(&mut self, batch: &[FrameSample]) {
        self.calculate_scroll_position(batch);
    }
}

impl Drop for RefreshCoordinator {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("pending_action", &self.has_pending_action())
            .field("mounted", &self.mounted)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::haptics::HapticStyle;
    use crate::scheduler::ManualScheduler;
    use std::cell::{Cell, RefCell};
    use std::time::Duration;

    struct Fixture {
        scheduler: Rc<ManualScheduler>,
        binding: RefreshBinding,
        calls: Rc<Cell<usize>>,
        coordinator: RefreshCoordinator,
    }

    fn fixture(config: RefreshConfig) -> Fixture {
        let scheduler = Rc::new(ManualScheduler::new());
        let binding = RefreshBinding::default();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let coordinator = RefreshCoordinator::new(
            config,
            scheduler.clone(),
            binding.clone(),
            move || counter.set(counter.get() + 1),
        )
        .unwrap();

        Fixture {
            scheduler,
            binding,
            calls,
            coordinator,
        }
    }

    fn pass(moving: f64, fixed: f64) -> Vec<FrameSample> {
        vec![FrameSample::fixed(fixed), FrameSample::moving(moving)]
    }

    #[test]
    fn test_rotation_mapping() {
        let f = fixture(RefreshConfig::default());
        assert_eq!(f.coordinator.rotation_for(0.0), Angle::degrees(0.0));
        assert_eq!(f.coordinator.rotation_for(40.0), Angle::degrees(180.0));
        assert_eq!(f.coordinator.rotation_for(80.0), Angle::degrees(360.0));
        assert_eq!(f.coordinator.rotation_for(160.0), Angle::degrees(720.0));
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut f = fixture(RefreshConfig::default());

        let update = f.coordinator.calculate_scroll_position(&pass(100.0, 20.0));
        assert_eq!(update.offset, 80.0);
        assert!(!update.triggered);
        assert!(f.coordinator.is_ready_to_refresh());

        let update = f.coordinator.calculate_scroll_position(&pass(101.0, 20.0));
        assert_eq!(update.offset, 81.0);
        assert!(update.triggered);
        assert!(!f.coordinator.is_ready_to_refresh());
        assert!(f.coordinator.is_refreshing());
        assert!(f.binding.get());
    }

    #[test]
    fn test_action_runs_after_delay() {
        let mut f = fixture(RefreshConfig::default());
        f.coordinator.calculate_scroll_position(&pass(90.0, 0.0));

        assert_eq!(f.calls.get(), 0);
        assert!(f.coordinator.has_pending_action());

        f.scheduler.advance(Duration::from_millis(1199));
        assert_eq!(f.calls.get(), 0);

        f.scheduler.advance(Duration::from_millis(1));
        assert_eq!(f.calls.get(), 1);
        assert!(!f.coordinator.has_pending_action());
    }

    #[test]
    fn test_unmount_cancels_pending_action() {
        let mut f = fixture(RefreshConfig::default());
        f.coordinator.calculate_scroll_position(&pass(90.0, 0.0));
        f.coordinator.unmount();

        assert!(!f.coordinator.is_mounted());
        assert!(!f.coordinator.has_pending_action());
        f.scheduler.advance(Duration::from_secs(5));
        assert_eq!(f.calls.get(), 0);

        let update = f.coordinator.calculate_scroll_position(&pass(0.0, 0.0));
        assert!(!update.triggered);
    }

    #[test]
    fn test_drop_cancels_pending_action() {
        let f = fixture(RefreshConfig::default());
        let Fixture {
            scheduler,
            calls,
            mut coordinator,
            ..
        } = f;
        coordinator.calculate_scroll_position(&pass(90.0, 0.0));
        drop(coordinator);

        scheduler.advance(Duration::from_secs(5));
        assert_eq!(calls.get(), 0);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_haptics_fire_on_trigger() {
        struct Recorder(RefCell<Vec<HapticStyle>>);
        impl HapticFeedback for Recorder {
            fn vibrate(&self, style: HapticStyle) {
                self.0.borrow_mut().push(style);
            }
        }

        let recorder = Rc::new(Recorder(RefCell::new(Vec::new())));
        let f = fixture(RefreshConfig::default().with_haptic(HapticStyle::Light));
        let mut coordinator = f.coordinator.with_haptics(recorder.clone());

        coordinator.calculate_scroll_position(&pass(50.0, 0.0));
        assert!(recorder.0.borrow().is_empty());

        coordinator.calculate_scroll_position(&pass(85.0, 0.0));
        assert_eq!(*recorder.0.borrow(), vec![HapticStyle::Light]);
    }

    #[test]
    fn test_no_haptics_without_style() {
        struct Counter(Cell<usize>);
        impl HapticFeedback for Counter {
            fn vibrate(&self, _style: HapticStyle) {
                self.0.set(self.0.get() + 1);
            }
        }

        let counter = Rc::new(Counter(Cell::new(0)));
        let f = fixture(RefreshConfig::default());
        let mut coordinator = f.coordinator.with_haptics(counter.clone());
        coordinator.calculate_scroll_position(&pass(85.0, 0.0));

        assert_eq!(counter.0.get(), 0);
    }

    #[test]
    fn test_content_offset_animation() {
        let mut f = fixture(RefreshConfig::default());
        assert_eq!(f.coordinator.content_offset(), 0.0);

        f.coordinator.calculate_scroll_position(&pass(85.0, 0.0));
        assert!(f.coordinator.is_animating());

        f.scheduler.advance(Duration::from_millis(75));
        assert!((f.coordinator.content_offset() - 20.0).abs() < 1e-9);

        f.scheduler.advance(Duration::from_millis(75));
        assert_eq!(f.coordinator.content_offset(), 40.0);
        assert!(!f.coordinator.is_animating());

        f.binding.finish();
        assert!(f.coordinator.poll());
        assert!(!f.coordinator.is_refreshing());

        f.scheduler.advance(Duration::from_millis(150));
        assert_eq!(f.coordinator.content_offset(), 0.0);
    }

    #[test]
    fn test_poll_ignores_redundant_writes() {
        let mut f = fixture(RefreshConfig::default());
        f.binding.set(false);
        assert!(!f.coordinator.poll());
        assert!(!f.coordinator.poll());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = RefreshCoordinator::new(
            RefreshConfig::default().with_threshold(0.0),
            Rc::new(ManualScheduler::new()),
            RefreshBinding::default(),
            || {},
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_indicator_follows_state() {
        let mut f = fixture(RefreshConfig::default());
        f.coordinator.calculate_scroll_position(&pass(40.0, 0.0));
        let indicator = f.coordinator.indicator();
        assert!(!indicator.is_animating());
        assert_eq!(indicator.rotation_at(Duration::ZERO), Angle::degrees(180.0));

        f.coordinator.calculate_scroll_position(&pass(90.0, 0.0));
        assert!(f.coordinator.indicator().is_animating());
    }
}
