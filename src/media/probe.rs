use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::media::MediaEngine;

/// Subset of `ffprobe -show_format -show_streams` JSON the pipeline reads
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProbeReport {
    #[serde(default)]
    pub format: Option<FormatInfo>,
    #[serde(default)]
    pub streams: Vec<StreamInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FormatInfo {
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub format_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StreamInfo {
    #[serde(default)]
    pub codec_type: Option<String>,
    #[serde(default)]
    pub codec_name: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl ProbeReport {
    /// Parse ffprobe's JSON output
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Container-level duration in seconds, if present and usable
    pub fn duration(&self) -> Option<f64> {
        self.format
            .as_ref()?
            .duration
            .as_deref()?
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite() && *d > 0.0)
    }

    /// Width and height of the first video stream
    pub fn video_dimensions(&self) -> Option<(u32, u32)> {
        let video = self
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))?;
        Some((video.width?, video.height?))
    }
}

/// Playable duration of `path`, or `None` when the engine cannot tell.
///
/// Failures are logged here and never propagated.
pub fn probe_duration(engine: &dyn MediaEngine, path: &Path) -> Option<f64> {
    match engine.probe(path) {
        Ok(report) => match report.duration() {
            Some(duration) => {
                debug!("Probed {:?}: {:.3}s", path, duration);
                Some(duration)
            }
            None => {
                warn!("Error probing video {:?}: no usable container duration", path);
                None
            }
        },
        Err(e) => {
            warn!("Error probing video {:?}: {}", path, e);
            None
        }
    }
}
