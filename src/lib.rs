//! # Video-Concat
//!
//! Join up to five videos into one file with ffmpeg, with optional
//! cross-fade transitions between them.
//!
//! Inputs arrive in loosely typed shapes (plain paths, nested lists, JSON
//! objects, handles produced by an earlier run). They are flattened into
//! paths, resolved against the storage roots and encoded in a single ffmpeg
//! run. When a run fails, simpler joins are tried before giving up.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use video_concat::{
//!     composition::{ConcatRequest, ConcatSettings, Concatenator, TransitionKind, TransitionSpec},
//!     config::Config,
//!     media::FfmpegEngine,
//!     video::{LocalStorage, VideoRef},
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let engine = Arc::new(FfmpegEngine::new(&config.engine));
//! let storage = Arc::new(LocalStorage::from_config(&config.storage));
//!
//! let concatenator = Concatenator::new(engine, storage, ConcatSettings::default());
//! let request = ConcatRequest::new(vec![
//!     Some(VideoRef::from("intro.mp4")),
//!     Some(VideoRef::from("main.mp4")),
//! ])
//! .with_transition(TransitionSpec::new(TransitionKind::Fade, 1.0)?);
//!
//! let handle = concatenator.concatenate(&request).into_result()?;
//! println!("{:?} {:?}", handle.path(), handle.dimensions());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`video`] - Input extraction, path resolution, storage roots, output handles
//! - [`composition`] - Encoding profiles, filter graphs and the concatenation pipeline
//! - [`media`] - The ffmpeg/ffprobe process boundary
//! - [`config`] - Configuration management
//!
//! ## Custom Inputs
//!
//! Upstream objects become inputs by implementing [`VideoSource`](video::VideoSource):
//!
//! ```rust
//! use video_concat::video::{VideoRef, VideoSource, extract_paths};
//!
//! struct RenderedClip {
//!     file: String,
//! }
//!
//! impl VideoSource for RenderedClip {
//!     fn type_name(&self) -> &str {
//!         "RenderedClip"
//!     }
//!
//!     fn video_path(&self) -> Option<String> {
//!         Some(self.file.clone())
//!     }
//! }
//!
//! let clip = VideoRef::object(RenderedClip { file: "take_3.mp4".into() });
//! assert_eq!(extract_paths(&clip), vec!["take_3.mp4"]);
//! ```

pub mod composition;
pub mod config;
pub mod error;
pub mod media;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    composition::{ConcatRequest, ConcatResult, Concatenator, OutputFormat, TransitionKind, TransitionSpec},
    config::Config,
    error::{ConcatError, Result},
    media::{FfmpegEngine, MediaEngine},
    video::{OutputHandle, VideoRef, VideoSource},
};
