//! Emotion taxonomy used to tag comments and collaborator moods.
//!
//! The set is closed: every variant has an entry in the palette table and
//! parsing an unknown name is an error instead of a silent default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HarmonicError;

/// An emotion tag.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Frustrated,
    #[default]
    Neutral,
    Excited,
    Calm,
    Anxious,
    Inspired,
    Confused,
    Nostalgic,
}

/// Presentation attributes for an emotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmotionPalette {
    /// Human-readable label.
    pub label: &'static str,
    /// Hex color, `#rrggbb`.
    pub color: &'static str,
    /// Icon name understood by the front end.
    pub icon: &'static str,
}

impl Emotion {
    /// All emotions, core tags first.
    pub const ALL: [Emotion; 10] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Frustrated,
        Emotion::Neutral,
        Emotion::Excited,
        Emotion::Calm,
        Emotion::Anxious,
        Emotion::Inspired,
        Emotion::Confused,
        Emotion::Nostalgic,
    ];

    /// The four tags every comment surface supports.
    pub const CORE: [Emotion; 4] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Frustrated,
        Emotion::Neutral,
    ];

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Frustrated => "frustrated",
            Emotion::Neutral => "neutral",
            Emotion::Excited => "excited",
            Emotion::Calm => "calm",
            Emotion::Anxious => "anxious",
            Emotion::Inspired => "inspired",
            Emotion::Confused => "confused",
            Emotion::Nostalgic => "nostalgic",
        }
    }

    pub fn palette(&self) -> EmotionPalette {
        let (label, color, icon) = match self {
            Emotion::Happy => ("Happy", "#facc15", "smile"),
            Emotion::Sad => ("Sad", "#60a5fa", "frown"),
            Emotion::Frustrated => ("Frustrated", "#f87171", "angry"),
            Emotion::Neutral => ("Neutral", "#9ca3af", "meh"),
            Emotion::Excited => ("Excited", "#fb923c", "zap"),
            Emotion::Calm => ("Calm", "#34d399", "leaf"),
            Emotion::Anxious => ("Anxious", "#a78bfa", "alert-circle"),
            Emotion::Inspired => ("Inspired", "#f472b6", "sparkles"),
            Emotion::Confused => ("Confused", "#fbbf24", "help-circle"),
            Emotion::Nostalgic => ("Nostalgic", "#c084fc", "clock"),
        };
        EmotionPalette { label, color, icon }
    }

    /// Whether this is one of the four core tags.
    pub fn is_core(&self) -> bool {
        Self::CORE.contains(self)
    }

    /// Whether the emotion reads as negative feedback.
    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            Emotion::Sad | Emotion::Frustrated | Emotion::Anxious | Emotion::Confused
        )
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = HarmonicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == needle)
            .ok_or_else(|| HarmonicError::Validation(format!("unknown emotion '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known() {
        assert_eq!("happy".parse::<Emotion>().unwrap(), Emotion::Happy);
        assert_eq!(" Frustrated ".parse::<Emotion>().unwrap(), Emotion::Frustrated);
    }

    #[test]
    fn test_parse_unknown_is_error() {
        assert!("ecstatic".parse::<Emotion>().is_err());
        assert!("".parse::<Emotion>().is_err());
    }

    #[test]
    fn test_every_emotion_roundtrips_through_name() {
        for emotion in Emotion::ALL {
            assert_eq!(emotion.as_str().parse::<Emotion>().unwrap(), emotion);
        }
    }

    #[test]
    fn test_palette_colors_are_distinct() {
        let mut colors: Vec<&str> = Emotion::ALL.iter().map(|e| e.palette().color).collect();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), Emotion::ALL.len());
    }

    #[test]
    fn test_serde_uses_lowercase() {
        let json = serde_json::to_string(&Emotion::Nostalgic).unwrap();
        assert_eq!(json, "\"nostalgic\"");
    }

    #[test]
    fn test_core_tags() {
        assert!(Emotion::Sad.is_core());
        assert!(!Emotion::Inspired.is_core());
    }
}
