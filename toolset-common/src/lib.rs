//! Framework-independent core shared between toolset-mobile and toolset-cli
//!
//! The pull-to-refresh coordinator lives here together with the small set of
//! collaborators it talks to: a layout observer that delivers frame samples,
//! a scheduler for the delayed refresh action, a bound refreshing flag and an
//! optional haptic feedback sink. Hosts (a Yew component, the CLI simulator)
//! plug concrete implementations into these seams.

pub mod binding;
pub mod frame;
pub mod geometry;
pub mod haptics;
pub mod observer;
pub mod refresh;
pub mod scheduler;
pub mod trace;

pub use binding::RefreshBinding;
pub use frame::{FrameSample, FrameTag, StickyElement};
pub use geometry::{Angle, Rect, Size};
pub use haptics::{HapticFeedback, HapticStyle};
pub use observer::{LayoutHub, LayoutObserver, LayoutSubscriber, SubscriptionId};
pub use refresh::{
    IndicatorPose, OffsetAnimation, RefreshActivityIndicator, RefreshConfig, RefreshCoordinator,
    RefreshState, ScrollUpdate,
};
pub use scheduler::{ManualScheduler, Scheduler, TimerHandle};
pub use trace::{ScrollTrace, TracePass};

/// Core error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid scroll trace: {0}")]
    InvalidTrace(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
