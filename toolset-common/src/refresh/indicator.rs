//! Render model for the pull-to-refresh activity indicator

use crate::geometry::Angle;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fraction of the ring that is drawn
pub const RING_TRIM: f64 = 0.6;
pub const RING_LINE_WIDTH: f64 = 4.0;
/// Ring diameter relative to the trigger threshold
pub const DIAMETER_RATIO: f64 = 0.25;

/// How the ring is oriented
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IndicatorPose {
    /// Follows the pull distance
    Static { angle: Angle },
    /// Turns continuously, one full rotation per period
    Spinning {
        #[serde(with = "millis")]
        period: Duration,
    },
}

/// Partial ring drawn above the scrolled content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshActivityIndicator {
    pub diameter: f64,
    pub trim: f64,
    pub line_width: f64,
    pub tint: String,
    pub pose: IndicatorPose,
}

impl RefreshActivityIndicator {
    pub fn new(
        threshold: f64,
        tint: impl Into<String>,
        is_refreshing: bool,
        rotation: Angle,
        period: Duration,
    ) -> Self {
        let pose = if is_refreshing {
            IndicatorPose::Spinning { period }
        } else {
            IndicatorPose::Static { angle: rotation }
        };

        Self {
            diameter: threshold * DIAMETER_RATIO,
            trim: RING_TRIM,
            line_width: RING_LINE_WIDTH,
            tint: tint.into(),
            pose,
        }
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.pose, IndicatorPose::Spinning { .. })
    }

    /// Ring orientation `elapsed` after the spin started
    pub fn rotation_at(&self, elapsed: Duration) -> Angle {
        match self.pose {
            IndicatorPose::Static { angle } => angle,
            IndicatorPose::Spinning { period } => {
                if period.is_zero() {
                    return Angle::ZERO;
                }
                let turns = elapsed.as_secs_f64() / period.as_secs_f64();
                Angle::degrees(turns.fract() * 360.0)
            }
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_indicator_shows_static_angle() {
        let indicator = RefreshActivityIndicator::new(
            80.0,
            "#007aff",
            false,
            Angle::degrees(180.0),
            Duration::from_secs(1),
        );

        assert_eq!(indicator.diameter, 20.0);
        assert!(!indicator.is_animating());
        assert_eq!(
            indicator.rotation_at(Duration::from_millis(750)),
            Angle::degrees(180.0)
        );
    }

    #[test]
    fn test_refreshing_indicator_spins() {
        let indicator = RefreshActivityIndicator::new(
            80.0,
            "red",
            true,
            Angle::degrees(180.0),
            Duration::from_secs(1),
        );

        assert!(indicator.is_animating());
        assert_eq!(indicator.rotation_at(Duration::ZERO), Angle::ZERO);
        assert!((indicator.rotation_at(Duration::from_millis(250)).as_degrees() - 90.0).abs() < 1e-9);
        assert!((indicator.rotation_at(Duration::from_millis(1500)).as_degrees() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_pose_serialization() {
        let pose = IndicatorPose::Spinning {
            period: Duration::from_millis(1000),
        };
        let json = serde_json::to_string(&pose).unwrap();
        assert_eq!(json, r#"{"kind":"spinning","period":1000}"#);
    }
}
