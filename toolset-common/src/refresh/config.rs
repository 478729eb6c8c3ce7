//! Tunables for the refresh coordinator

use crate::haptics::HapticStyle;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_THRESHOLD: f64 = 80.0;
pub const DEFAULT_TRIGGER_DELAY_MS: u64 = 1200;
pub const DEFAULT_OFFSET_ANIMATION_MS: u64 = 150;
pub const DEFAULT_INDICATOR_PERIOD_MS: u64 = 1000;
pub const DEFAULT_TINT: &str = "#007aff";

/// Refresh coordinator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Pull distance past which a refresh is triggered
    pub threshold: f64,
    /// Delay between the trigger and the caller's refresh action
    pub trigger_delay_ms: u64,
    /// Duration of the content offset animation
    pub offset_animation_ms: u64,
    /// One full indicator turn while refreshing
    pub indicator_period_ms: u64,
    /// Indicator color (CSS color syntax)
    pub tint: String,
    /// Feedback fired on trigger; none disables it
    pub haptic: Option<HapticStyle>,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            trigger_delay_ms: DEFAULT_TRIGGER_DELAY_MS,
            offset_animation_ms: DEFAULT_OFFSET_ANIMATION_MS,
            indicator_period_ms: DEFAULT_INDICATOR_PERIOD_MS,
            tint: DEFAULT_TINT.to_string(),
            haptic: None,
        }
    }
}

impl RefreshConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_haptic(mut self, style: HapticStyle) -> Self {
        self.haptic = Some(style);
        self
    }

    pub fn with_tint(mut self, tint: impl Into<String>) -> Self {
        self.tint = tint.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "threshold must be a positive number, got {}",
                self.threshold
            )));
        }
        if self.offset_animation_ms == 0 {
            return Err(Error::InvalidConfig(
                "offset_animation_ms must be greater than zero".to_string(),
            ));
        }
        if self.indicator_period_ms == 0 {
            return Err(Error::InvalidConfig(
                "indicator_period_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Offset below which a pull re-arms the trigger
    pub fn rearm_offset(&self) -> f64 {
        self.threshold / 2.0
    }

    /// Content offset held while refreshing
    pub fn refreshing_offset(&self) -> f64 {
        self.threshold / 2.0
    }

    pub fn trigger_delay(&self) -> Duration {
        Duration::from_millis(self.trigger_delay_ms)
    }

    pub fn offset_animation(&self) -> Duration {
        Duration::from_millis(self.offset_animation_ms)
    }

    pub fn indicator_period(&self) -> Duration {
        Duration::from_millis(self.indicator_period_ms)
    }
}
