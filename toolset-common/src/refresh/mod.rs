//! Pull-to-refresh coordination

pub mod animation;
pub mod config;
pub mod coordinator;
pub mod indicator;

pub use animation::OffsetAnimation;
pub use config::RefreshConfig;
pub use coordinator::{RefreshCoordinator, RefreshState, ScrollUpdate};
pub use indicator::{IndicatorPose, RefreshActivityIndicator};
