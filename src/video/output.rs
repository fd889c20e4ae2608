use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    error::Result,
    media::{Invocation, MediaEngine},
    video::types::VideoSource,
};

/// Handle to a produced video file.
///
/// Immutable once created. Can be passed back into another concatenation as a
/// [`crate::VideoRef::Object`].
#[derive(Clone)]
pub struct OutputHandle {
    path: PathBuf,
    engine: Arc<dyn MediaEngine>,
}

impl OutputHandle {
    pub fn new<P: Into<PathBuf>>(path: P, engine: Arc<dyn MediaEngine>) -> Self {
        Self {
            path: path.into(),
            engine,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Width and height of the first video stream, re-probed on every call.
    /// `(0, 0)` when the file cannot be probed.
    pub fn dimensions(&self) -> (u32, u32) {
        match self.engine.probe(&self.path) {
            Ok(report) => report.video_dimensions().unwrap_or((0, 0)),
            Err(e) => {
                debug!("Could not probe {:?} for dimensions: {}", self.path, e);
                (0, 0)
            }
        }
    }

    /// Copy the video to `destination`.
    ///
    /// Tries a stream copy (remux without re-encoding) through the engine
    /// first and falls back to copying the bytes. The source file is never
    /// modified.
    pub fn materialize<P: AsRef<Path>>(&self, destination: P) -> Result<()> {
        let destination = destination.as_ref();

        if same_file(&self.path, destination) {
            debug!("Destination {:?} is the source itself, nothing to copy", destination);
            return Ok(());
        }

        let remux = Invocation::new(destination)
            .input(&self.path)
            .output_args(["-c", "copy"]);

        match self.engine.execute(&remux) {
            Ok(_) => {
                info!("Saved {:?} to {:?} (stream copy)", self.path, destination);
                Ok(())
            }
            Err(e) => {
                warn!("Error saving to final path, copying file instead: {}", e);
                std::fs::copy(&self.path, destination)?;
                info!("Saved {:?} to {:?} (file copy)", self.path, destination);
                Ok(())
            }
        }
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

impl fmt::Debug for OutputHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputHandle").field("path", &self.path).finish()
    }
}

impl VideoSource for OutputHandle {
    fn type_name(&self) -> &str {
        "OutputHandle"
    }

    fn video_path(&self) -> Option<String> {
        Some(self.path.to_string_lossy().into_owned())
    }

    fn attribute_names(&self) -> Vec<String> {
        vec!["video_path".to_string()]
    }
}
