//! Pull-to-refresh components

pub mod refresh_activity_indicator;
pub mod refreshable_scroll_view;

pub use refresh_activity_indicator::RefreshActivityIndicator;
pub use refreshable_scroll_view::RefreshableScrollView;
