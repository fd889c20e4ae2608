use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result of invoking an upstream object's stream-source accessor
pub type StreamSource = std::result::Result<VideoRef, Box<dyn std::error::Error + Send + Sync>>;

/// A "video" value handed over by an upstream node.
///
/// Upstream nodes disagree on how they represent a video, so this is a sum of
/// every shape seen in practice. Paths are pulled out of it with
/// [`crate::video::extract_paths`].
#[derive(Clone)]
pub enum VideoRef {
    /// A single path
    Path(String),

    /// Several references, in order
    List(Vec<VideoRef>),

    /// Dictionary-like value, e.g. `{"filenames": [...]}` or `{"video": "..."}`
    Map(BTreeMap<String, VideoRef>),

    /// A host object exposing accessors or attributes
    Object(Arc<dyn VideoSource>),

    /// Anything else (numbers, booleans, null, ...), described for diagnostics
    Unsupported(String),
}

impl VideoRef {
    /// Interpret a command-line value: JSON when it parses as an array or an
    /// object, a plain path otherwise.
    pub fn from_arg(arg: &str) -> Self {
        let trimmed = arg.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(arg) {
                return value.into();
            }
        }
        Self::Path(arg.to_string())
    }

    pub fn object<S: VideoSource + 'static>(source: S) -> Self {
        Self::Object(Arc::new(source))
    }

    /// Whether this is a string, sequence or dictionary-like value
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Path(_) | Self::List(_) | Self::Map(_))
    }

    /// Short type description used in diagnostics
    pub fn type_name(&self) -> String {
        match self {
            Self::Path(_) => "str".to_string(),
            Self::List(_) => "list".to_string(),
            Self::Map(_) => "dict".to_string(),
            Self::Object(source) => source.type_name().to_string(),
            Self::Unsupported(description) => description.clone(),
        }
    }
}

impl fmt::Debug for VideoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            Self::Object(source) => write!(f, "Object({})", source.type_name()),
            Self::Unsupported(description) => f.debug_tuple("Unsupported").field(description).finish(),
        }
    }
}

impl From<&str> for VideoRef {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<String> for VideoRef {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl<T: Into<VideoRef>> From<Vec<T>> for VideoRef {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for VideoRef {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::String(path) => Self::Path(path),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
            other => Self::Unsupported(other.to_string()),
        }
    }
}

/// An upstream object that can point at a video file.
///
/// Each accessor is optional; the extractor tries them in a fixed order.
pub trait VideoSource: Send + Sync {
    /// Type name shown in diagnostics
    fn type_name(&self) -> &str;

    /// Stream-source accessor. `None` means the object has no such capability;
    /// `Some(Err(..))` means calling it failed.
    fn stream_source(&self) -> Option<StreamSource> {
        None
    }

    /// Direct path of a produced video (implemented by [`crate::OutputHandle`])
    fn video_path(&self) -> Option<String> {
        None
    }

    /// Look up a named attribute
    fn attribute(&self, _name: &str) -> Option<VideoRef> {
        None
    }

    /// Public attribute names, for diagnostics
    fn attribute_names(&self) -> Vec<String> {
        Vec::new()
    }
}

/// A path that referred to an existing regular file when it was resolved.
///
/// Only valid for the run that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedPath(PathBuf);

impl ResolvedPath {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}
