use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConcatError, Result};

/// Shortest transition the pipeline accepts (seconds)
pub const MIN_TRANSITION_SECS: f64 = 0.1;

/// Longest transition the pipeline accepts (seconds)
pub const MAX_TRANSITION_SECS: f64 = 10.0;

/// Visual transition styles understood by ffmpeg's `xfade` filter, plus `None`
/// for a hard cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    #[default]
    None,
    Fade,
    SlideLeft,
    SlideRight,
    SlideUp,
    SlideDown,
    WipeLeft,
    WipeRight,
    WipeUp,
    WipeDown,
    Dissolve,
    CircleCrop,
    RectCrop,
    Distance,
    Radial,
    Pixelize,
    HBlur,
}

impl TransitionKind {
    pub const ALL: [TransitionKind; 17] = [
        Self::None,
        Self::Fade,
        Self::SlideLeft,
        Self::SlideRight,
        Self::SlideUp,
        Self::SlideDown,
        Self::WipeLeft,
        Self::WipeRight,
        Self::WipeUp,
        Self::WipeDown,
        Self::Dissolve,
        Self::CircleCrop,
        Self::RectCrop,
        Self::Distance,
        Self::Radial,
        Self::Pixelize,
        Self::HBlur,
    ];

    /// Name as passed to `xfade=transition=<name>`
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Fade => "fade",
            Self::SlideLeft => "slideleft",
            Self::SlideRight => "slideright",
            Self::SlideUp => "slideup",
            Self::SlideDown => "slidedown",
            Self::WipeLeft => "wipeleft",
            Self::WipeRight => "wiperight",
            Self::WipeUp => "wipeup",
            Self::WipeDown => "wipedown",
            Self::Dissolve => "dissolve",
            Self::CircleCrop => "circlecrop",
            Self::RectCrop => "rectcrop",
            Self::Distance => "distance",
            Self::Radial => "radial",
            Self::Pixelize => "pixelize",
            Self::HBlur => "hblur",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransitionKind {
    type Err = ConcatError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| ConcatError::invalid_request(format!("unknown transition '{}'", s)))
    }
}

/// Requested join style: a transition kind and how long it lasts.
///
/// The duration is only meaningful when `kind` is not [`TransitionKind::None`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionSpec {
    kind: TransitionKind,
    duration: f64,
}

impl TransitionSpec {
    /// Build a transition, rejecting durations outside 0.1..=10.0 seconds
    /// unless the kind is `None`.
    pub fn new(kind: TransitionKind, duration: f64) -> Result<Self> {
        if !kind.is_none()
            && !(duration.is_finite()
                && (MIN_TRANSITION_SECS..=MAX_TRANSITION_SECS).contains(&duration))
        {
            return Err(ConcatError::invalid_request(format!(
                "transition duration {} is outside {}..={} seconds",
                duration, MIN_TRANSITION_SECS, MAX_TRANSITION_SECS
            )));
        }
        Ok(Self { kind, duration })
    }

    /// Hard cut between every clip
    pub fn none() -> Self {
        Self {
            kind: TransitionKind::None,
            duration: 0.0,
        }
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_none(&self) -> bool {
        self.kind.is_none()
    }
}

impl Default for TransitionSpec {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_names() {
        for kind in TransitionKind::ALL {
            assert_eq!(kind.name().parse::<TransitionKind>().unwrap(), kind);
        }
        assert_eq!("HBlur".parse::<TransitionKind>().unwrap(), TransitionKind::HBlur);
        assert!("spin".parse::<TransitionKind>().is_err());
    }

    #[test]
    fn test_serde_names_match_filter_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            kind: TransitionKind,
        }

        let parsed: Wrapper = toml::from_str("kind = \"circlecrop\"").unwrap();
        assert_eq!(parsed.kind, TransitionKind::CircleCrop);
        let parsed: Wrapper = toml::from_str("kind = \"slideleft\"").unwrap();
        assert_eq!(parsed.kind, TransitionKind::SlideLeft);
    }

    #[test]
    fn test_duration_bounds() {
        assert!(TransitionSpec::new(TransitionKind::Fade, 1.0).is_ok());
        assert!(TransitionSpec::new(TransitionKind::Fade, 0.1).is_ok());
        assert!(TransitionSpec::new(TransitionKind::Fade, 10.0).is_ok());
        assert!(TransitionSpec::new(TransitionKind::Fade, 0.0).is_err());
        assert!(TransitionSpec::new(TransitionKind::Fade, 10.5).is_err());
        assert!(TransitionSpec::new(TransitionKind::Fade, f64::NAN).is_err());
    }

    #[test]
    fn test_none_ignores_duration() {
        let spec = TransitionSpec::new(TransitionKind::None, -3.0).unwrap();
        assert!(spec.is_none());
        assert_eq!(TransitionSpec::default(), TransitionSpec::none());
    }
}
