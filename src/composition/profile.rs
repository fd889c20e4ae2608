use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConcatError, Result};

/// Container formats the concatenated output can be written as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Mp4,
    Mkv,
    Mov,
    Webm,
    Avi,
    Gif,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 6] = [
        Self::Mp4,
        Self::Mkv,
        Self::Mov,
        Self::Webm,
        Self::Avi,
        Self::Gif,
    ];

    /// File extension (without the dot)
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mkv => "mkv",
            Self::Mov => "mov",
            Self::Webm => "webm",
            Self::Avi => "avi",
            Self::Gif => "gif",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ConcatError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().trim_start_matches('.').to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|format| format.extension() == wanted)
            .ok_or_else(|| ConcatError::invalid_request(format!("unsupported output format '{}'", s)))
    }
}

/// Rate control of an encoding profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    /// Engine default
    Default,
    /// Constant rate factor (`-crf`)
    Crf(u8),
    /// Fixed quantizer scale (`-q:v`)
    QScale(u8),
}

/// Encoder parameters applied to the final output of a concatenation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingProfile {
    pub video_codec: Option<&'static str>,
    pub quality: Quality,
    pub preset: Option<&'static str>,
    pub pixel_format: Option<&'static str>,
    pub video_bitrate: Option<&'static str>,
}

impl EncodingProfile {
    /// Profile that leaves every choice to the engine
    pub fn empty() -> Self {
        Self {
            video_codec: None,
            quality: Quality::Default,
            preset: None,
            pixel_format: None,
            video_bitrate: None,
        }
    }

    /// Fixed profile table keyed by the output container
    pub fn for_format(format: OutputFormat) -> Self {
        match format {
            // yuv420p keeps the result playable by stock desktop players
            OutputFormat::Mp4 | OutputFormat::Mkv | OutputFormat::Mov => Self {
                video_codec: Some("libx264"),
                quality: Quality::Crf(23),
                preset: Some("medium"),
                pixel_format: Some("yuv420p"),
                video_bitrate: None,
            },
            OutputFormat::Avi => Self {
                video_codec: Some("mpeg4"),
                quality: Quality::QScale(3),
                ..Self::empty()
            },
            OutputFormat::Webm => Self {
                video_codec: Some("libvpx-vp9"),
                quality: Quality::Crf(30),
                video_bitrate: Some("0"),
                ..Self::empty()
            },
            OutputFormat::Gif => Self::empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }

    /// Output options in the order ffmpeg expects them before the output path
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if let Some(codec) = self.video_codec {
            args.extend(["-c:v".to_string(), codec.to_string()]);
        }

        match self.quality {
            Quality::Default => {}
            Quality::Crf(crf) => args.extend(["-crf".to_string(), crf.to_string()]),
            Quality::QScale(q) => args.extend(["-q:v".to_string(), q.to_string()]),
        }

        if let Some(preset) = self.preset {
            args.extend(["-preset".to_string(), preset.to_string()]);
        }
        if let Some(pix_fmt) = self.pixel_format {
            args.extend(["-pix_fmt".to_string(), pix_fmt.to_string()]);
        }
        if let Some(bitrate) = self.video_bitrate {
            args.extend(["-b:v".to_string(), bitrate.to_string()]);
        }

        args
    }
}

impl Default for EncodingProfile {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_h264_family_shares_profile() {
        let mp4 = EncodingProfile::for_format(OutputFormat::Mp4);
        assert_eq!(mp4, EncodingProfile::for_format(OutputFormat::Mkv));
        assert_eq!(mp4, EncodingProfile::for_format(OutputFormat::Mov));
        assert_eq!(
            mp4.to_args(),
            vec!["-c:v", "libx264", "-crf", "23", "-preset", "medium", "-pix_fmt", "yuv420p"]
        );
    }

    #[test]
    fn test_avi_and_webm_profiles() {
        assert_eq!(
            EncodingProfile::for_format(OutputFormat::Avi).to_args(),
            vec!["-c:v", "mpeg4", "-q:v", "3"]
        );
        assert_eq!(
            EncodingProfile::for_format(OutputFormat::Webm).to_args(),
            vec!["-c:v", "libvpx-vp9", "-crf", "30", "-b:v", "0"]
        );
    }

    #[test]
    fn test_gif_uses_engine_defaults() {
        let gif = EncodingProfile::for_format(OutputFormat::Gif);
        assert!(gif.is_empty());
        assert!(gif.to_args().is_empty());
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("MP4".parse::<OutputFormat>().unwrap(), OutputFormat::Mp4);
        assert_eq!(".webm".parse::<OutputFormat>().unwrap(), OutputFormat::Webm);
        assert!("flv".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Mkv.extension(), "mkv");
    }
}
