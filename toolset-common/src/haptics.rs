//! Haptic feedback fired when a pull arms a refresh

use serde::{Deserialize, Serialize};

/// Intensity of the feedback
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HapticStyle {
    Light,
    #[default]
    Medium,
    Heavy,
    Soft,
    Rigid,
}

impl HapticStyle {
    /// Vibration length for hosts that can only vibrate for a duration
    pub fn duration_ms(&self) -> u32 {
        match self {
            Self::Light => 10,
            Self::Soft => 15,
            Self::Medium => 20,
            Self::Rigid => 25,
            Self::Heavy => 35,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "light" => Some(Self::Light),
            "medium" => Some(Self::Medium),
            "heavy" => Some(Self::Heavy),
            "soft" => Some(Self::Soft),
            "rigid" => Some(Self::Rigid),
            _ => None,
        }
    }
}

impl std::fmt::Display for HapticStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Medium => write!(f, "medium"),
            Self::Heavy => write!(f, "heavy"),
            Self::Soft => write!(f, "soft"),
            Self::Rigid => write!(f, "rigid"),
        }
    }
}

/// Device capability that produces the feedback
pub trait HapticFeedback {
    fn vibrate(&self, style: HapticStyle);
}
