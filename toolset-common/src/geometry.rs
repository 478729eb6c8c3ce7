//! Plain geometry types used by frame samples and the indicator

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in a scroll container's coordinate space.
///
/// The y-axis points down, so a positive `y` means the rectangle sits below
/// the container's origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Zero-sized rectangle at the given vertical origin
    pub fn at_y(y: f64) -> Self {
        Self {
            y,
            ..Self::default()
        }
    }

    pub fn min_y(&self) -> f64 {
        self.y
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }
}

/// Width and height of a view
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Rotation angle stored in degrees.
///
/// Not normalized: a long pull maps to more than one full turn.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Angle(f64);

impl Angle {
    pub const ZERO: Angle = Angle(0.0);

    pub fn degrees(degrees: f64) -> Self {
        Angle(degrees)
    }

    pub fn as_degrees(&self) -> f64 {
        self.0
    }

    pub fn as_radians(&self) -> f64 {
        self.0.to_radians()
    }
}

impl std::fmt::Display for Angle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}°", self.0)
    }
}
