//! # External Media Engine
//!
//! The pipeline never decodes video itself. Everything it needs from a media
//! engine goes through [`MediaEngine`]: stream inspection (`ffprobe`) and
//! single-shot, overwriting encode runs (`ffmpeg`) described by an
//! [`Invocation`].

pub mod engine;
pub mod invocation;
pub mod probe;

pub use engine::{FfmpegEngine, MediaEngine};
pub use invocation::{EngineOutput, Invocation};
pub use probe::{probe_duration, FormatInfo, ProbeReport, StreamInfo};

#[cfg(test)]
pub use engine::MockMediaEngine;
