//! Refresh Coordinator Tests
//! Drives the coordinator through a layout hub the way a rendering host does

mod common;

use common::{TestEnv, TRIGGER_DELAY};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use toolset_common::{
    FrameSample, HapticStyle, LayoutObserver, RefreshBinding, RefreshConfig, RefreshCoordinator,
    ScrollTrace,
};

// ============== Offset & Rotation Tests ==============

#[test]
fn test_no_samples_is_safe() {
    let mut env = TestEnv::new();
    env.hub.commit_pass();

    assert!(env.ready());
    assert!(!env.refreshing());
    assert_eq!(env.rotation(), 0.0);
    assert_eq!(env.actions.get(), 0);
}

#[test]
fn test_rotation_angles_at_default_threshold() {
    let mut env = TestEnv::new();

    env.pull(0.0);
    assert_eq!(env.rotation(), 0.0);

    env.pull(40.0);
    assert_eq!(env.rotation(), 180.0);

    env.pull(80.0);
    assert_eq!(env.rotation(), 360.0);
}

#[test]
fn test_last_sample_per_tag_wins() {
    let mut env = TestEnv::new();
    env.hub.report(FrameSample::moving(500.0));
    env.hub.report(FrameSample::fixed(0.0));
    env.hub.report(FrameSample::moving(40.0));
    env.hub.commit_pass();

    assert_eq!(env.rotation(), 180.0);
    assert_eq!(env.actions.get(), 0);
    assert!(!env.refreshing());
}

#[test]
fn test_same_batch_is_idempotent() {
    let mut env = TestEnv::new();
    env.pull(60.0);
    let first = (env.rotation(), env.ready());
    env.pull(60.0);
    let second = (env.rotation(), env.ready());

    assert_eq!(first, second);
}

// ============== Trigger Tests ==============

#[test]
fn test_boundary_scenario() {
    let mut env = TestEnv::new();

    env.layout(100.0, 20.0);
    assert!(!env.refreshing(), "offset 80 is not past the threshold");

    env.layout(101.0, 20.0);
    assert!(env.refreshing());
    assert!(!env.ready(), "disarm must happen before the delayed action");
    assert_eq!(env.actions.get(), 0);

    env.wait(TRIGGER_DELAY);
    assert_eq!(env.actions.get(), 1);
}

#[test]
fn test_no_retrigger_until_rearmed() {
    let mut env = TestEnv::new();

    env.pull(90.0);
    for offset in [95.0, 120.0, 85.0, 60.0, 45.0, 110.0] {
        env.pull(offset);
    }
    env.wait(TRIGGER_DELAY);
    assert_eq!(env.actions.get(), 1);

    // Dropping below half the threshold re-arms, even while still refreshing
    env.pull(39.0);
    assert!(env.ready());
    assert!(env.refreshing());

    env.pull(81.0);
    env.wait(TRIGGER_DELAY);
    assert_eq!(env.actions.get(), 2);
}

#[test]
fn test_oscillation_below_threshold_rearms_repeatedly() {
    let mut env = TestEnv::new();

    for _ in 0..5 {
        env.pull(30.0);
        assert!(env.ready());
        env.pull(70.0);
        assert!(env.ready());
    }

    env.wait(Duration::from_secs(10));
    assert_eq!(env.actions.get(), 0);
}

#[test]
fn test_readiness_stays_true_below_half_threshold() {
    let mut env = TestEnv::new();
    for offset in [-50.0, -1.0, 0.0, 10.0, 39.9] {
        env.pull(offset);
        assert!(env.ready(), "offset {} should leave the pull armed", offset);
    }
}

#[test]
fn test_caller_finishes_refresh() {
    let mut env = TestEnv::new();
    let caller = env.binding.clone();

    env.pull(100.0);
    env.wait(TRIGGER_DELAY);
    caller.finish();

    env.pull(0.0);
    assert!(!env.refreshing());
    assert!(env.ready());

    env.pull(100.0);
    assert!(env.refreshing());
}

#[test]
fn test_custom_threshold() {
    let mut env = TestEnv::with_config(RefreshConfig::default().with_threshold(120.0));

    env.pull(100.0);
    assert!(!env.refreshing());
    assert!((env.rotation() - 300.0).abs() < 1e-9);

    env.pull(121.0);
    assert!(env.refreshing());
}

#[test]
fn test_haptic_style_forwarded() {
    let mut env =
        TestEnv::with_config(RefreshConfig::default().with_haptic(HapticStyle::Rigid));
    env.pull(100.0);
    env.pull(110.0);

    assert_eq!(*env.haptics.calls.borrow(), vec![HapticStyle::Rigid]);
}

// ============== Lifecycle Tests ==============

#[test]
fn test_unsubscribed_coordinator_stops_receiving() {
    let mut env = TestEnv::new();
    assert!(env.hub.unsubscribe(env.subscription));

    env.pull(100.0);
    assert!(!env.refreshing());
}

#[test]
fn test_unmount_before_delay_fires() {
    let mut env = TestEnv::new();
    env.pull(100.0);
    env.wait(Duration::from_millis(600));

    env.coordinator.borrow_mut().unmount();
    env.wait(Duration::from_secs(2));

    assert_eq!(env.actions.get(), 0);
    assert_eq!(env.scheduler.pending_count(), 0);

    // Late layout passes after teardown are ignored
    env.pull(0.0);
    env.pull(100.0);
    env.wait(Duration::from_secs(2));
    assert_eq!(env.actions.get(), 0);
}

#[test]
fn test_dropped_coordinator_cancels_action() {
    let mut env = TestEnv::new();
    env.pull(100.0);

    let replacement = RefreshCoordinator::new(
        RefreshConfig::default(),
        env.scheduler.clone(),
        RefreshBinding::default(),
        || {},
    )
    .unwrap();
    let coordinator = std::mem::replace(&mut env.coordinator, Rc::new(RefCell::new(replacement)));
    drop(coordinator);

    assert_eq!(env.hub.subscriber_count(), 0);
    env.wait(Duration::from_secs(2));
    assert_eq!(env.actions.get(), 0);
}

// ============== Animation Tests ==============

#[test]
fn test_content_offset_follows_binding() {
    let mut env = TestEnv::new();
    env.pull(100.0);

    env.wait(Duration::from_millis(150));
    assert_eq!(env.coordinator.borrow().content_offset(), 40.0);

    env.binding.finish();
    env.coordinator.borrow_mut().poll();
    env.wait(Duration::from_millis(150));

    let state = env.coordinator.borrow().state();
    assert!(!state.is_refreshing);
    assert_eq!(state.content_offset, 0.0);
}

// ============== Trace Replay Tests ==============

#[test]
fn test_synthetic_pull_triggers_once() {
    let mut env = TestEnv::new();
    let trace = ScrollTrace::synthetic_pull(160.0, 8, 16).unwrap();

    for pass in &trace.passes {
        for sample in pass.samples() {
            env.hub.report(sample);
        }
        env.hub.commit_pass();
    }

    env.wait(TRIGGER_DELAY);
    assert_eq!(env.actions.get(), 1);
    assert!(env.ready(), "release back to rest re-arms the pull");
}
