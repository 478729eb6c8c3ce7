//! Tagged frame samples reported by layout passes

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};

/// Role of an observed view inside a refreshable scroll container
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FrameTag {
    /// The container itself; does not move while scrolling
    Fixed,
    /// The scrolled content
    Moving,
    /// A header pinned to the top of the container
    Sticky,
}

impl std::fmt::Display for FrameTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Moving => write!(f, "moving"),
            Self::Sticky => write!(f, "sticky"),
        }
    }
}

/// One observation of a tagged view's bounding rectangle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FrameSample {
    pub tag: FrameTag,
    pub rect: Rect,
}

impl FrameSample {
    pub fn new(tag: FrameTag, rect: Rect) -> Self {
        Self { tag, rect }
    }

    pub fn fixed(y: f64) -> Self {
        Self::new(FrameTag::Fixed, Rect::at_y(y))
    }

    pub fn moving(y: f64) -> Self {
        Self::new(FrameTag::Moving, Rect::at_y(y))
    }

    pub fn sticky(y: f64) -> Self {
        Self::new(FrameTag::Sticky, Rect::at_y(y))
    }
}

/// Most recent sample with `tag` in a batch (last wins).
pub fn latest(samples: &[FrameSample], tag: FrameTag) -> Option<&FrameSample> {
    samples.iter().rev().find(|sample| sample.tag == tag)
}

/// Vertical origin of the latest sample with `tag`, or 0 when none was observed.
pub fn vertical_origin(samples: &[FrameSample], tag: FrameTag) -> f64 {
    latest(samples, tag).map(|sample| sample.rect.min_y()).unwrap_or(0.0)
}

/// Placement rule for a header that stays pinned while content scrolls under it
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StickyElement {
    /// Whether scrolled content is drawn over the header
    #[serde(default)]
    pub covered: bool,
}

impl StickyElement {
    pub fn new(covered: bool) -> Self {
        Self { covered }
    }

    /// Vertical translation that cancels the element's scroll displacement.
    pub fn offset_for(&self, sample: &FrameSample) -> f64 {
        -sample.rect.min_y()
    }

    pub fn z_index(&self) -> i32 {
        if self.covered {
            0
        } else {
            1
        }
    }
}
