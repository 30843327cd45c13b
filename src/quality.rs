use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{BlackboardError, Result};

/// Resolution/frame-rate preset handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    /// 480p at 15 fps
    Low,
    /// 720p at 30 fps
    Medium,
    /// 1080p at 60 fps
    High,
    /// 2160p at 60 fps
    #[serde(rename = "4k")]
    FourK,
}

impl QualityTier {
    pub const ALL: [QualityTier; 4] = [
        QualityTier::Low,
        QualityTier::Medium,
        QualityTier::High,
        QualityTier::FourK,
    ];

    /// Single-letter flag understood by `manim -q<flag>`
    pub fn flag(&self) -> char {
        match self {
            Self::Low => 'l',
            Self::Medium => 'm',
            Self::High => 'h',
            Self::FourK => 'k',
        }
    }

    /// Directory label the renderer writes videos under
    pub fn resolution_label(&self) -> &'static str {
        match self {
            Self::Low => "480p15",
            Self::Medium => "720p30",
            Self::High => "1080p60",
            Self::FourK => "2160p60",
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Self::Low => 480,
            Self::Medium => 720,
            Self::High => 1080,
            Self::FourK => 2160,
        }
    }

    pub fn frame_rate(&self) -> u32 {
        match self {
            Self::Low => 15,
            Self::Medium => 30,
            Self::High | Self::FourK => 60,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::FourK => "4k",
        }
    }

    /// Reverse lookup from a rendered video folder name such as `1080p60`
    pub fn from_resolution_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.resolution_label() == label)
    }
}

impl Default for QualityTier {
    fn default() -> Self {
        Self::High
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityTier {
    type Err = BlackboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" | "l" => Ok(Self::Low),
            "medium" | "m" => Ok(Self::Medium),
            "high" | "h" => Ok(Self::High),
            "4k" | "k" => Ok(Self::FourK),
            _ => Err(BlackboardError::Config(format!(
                "Invalid quality tier '{}'. Valid tiers: low, medium, high, 4k",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_labels() {
        assert_eq!(QualityTier::Low.resolution_label(), "480p15");
        assert_eq!(QualityTier::Medium.resolution_label(), "720p30");
        assert_eq!(QualityTier::High.resolution_label(), "1080p60");
        assert_eq!(QualityTier::FourK.resolution_label(), "2160p60");
    }

    #[test]
    fn test_label_matches_height_and_fps() {
        for tier in QualityTier::ALL {
            let expected = format!("{}p{}", tier.height(), tier.frame_rate());
            assert_eq!(tier.resolution_label(), expected);
            assert_eq!(QualityTier::from_resolution_label(&expected), Some(tier));
        }
    }

    #[test]
    fn test_parse_names_and_flags() {
        assert_eq!("high".parse::<QualityTier>().unwrap(), QualityTier::High);
        assert_eq!("4K".parse::<QualityTier>().unwrap(), QualityTier::FourK);
        assert_eq!("k".parse::<QualityTier>().unwrap(), QualityTier::FourK);
        assert_eq!(" m ".parse::<QualityTier>().unwrap(), QualityTier::Medium);
    }

    #[test]
    fn test_unknown_tier_is_config_error() {
        let err = "ultra".parse::<QualityTier>().unwrap_err();
        assert!(matches!(err, BlackboardError::Config(_)));
    }
}
