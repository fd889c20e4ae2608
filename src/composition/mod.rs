//! # Composition
//!
//! Picks encoder settings, builds the ffmpeg filter graph and drives the
//! fallback cascade that turns resolved inputs into one output file.

pub mod concatenator;
pub mod graph;
pub mod profile;
pub mod transition;

// Re-exports for convenience
pub use concatenator::{
    ConcatRequest, ConcatResult, ConcatSettings, Concatenator, DEFAULT_FILENAME_PREFIX,
    MAX_VIDEO_SLOTS,
};
pub use graph::{
    cross_fade, crossfade_offsets, hard_cut, transition_overlaps, FilterGraph, InputStreams,
    Stream, StreamKind,
};
pub use profile::{EncodingProfile, OutputFormat, Quality};
pub use transition::{TransitionKind, TransitionSpec, MAX_TRANSITION_SECS, MIN_TRANSITION_SECS};
