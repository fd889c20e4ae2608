//! # Video Inputs and Outputs
//!
//! Turns whatever upstream nodes hand over into files on disk, and wraps the
//! produced file in an [`OutputHandle`].

pub mod extractor;
pub mod output;
pub mod resolver;
pub mod storage;
pub mod types;

pub use extractor::{extract_paths, extract_slots, FALLBACK_ATTRIBUTES};
pub use output::OutputHandle;
pub use resolver::PathResolver;
pub use storage::{LocalStorage, StorageRoots};
pub use types::{ResolvedPath, StreamSource, VideoRef, VideoSource};
