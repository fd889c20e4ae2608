//! Path Extractor: flatten upstream video values into path strings.

use tracing::{debug, warn};

use crate::video::types::{VideoRef, VideoSource};

/// Attribute names scanned, in order, when an object offers no accessor
pub const FALLBACK_ATTRIBUTES: [&str; 4] = ["video", "filename", "path", "full_path"];

/// Flatten `video` into path strings, depth first and in order, without
/// deduplication. Unsupported shapes yield nothing.
pub fn extract_paths(video: &VideoRef) -> Vec<String> {
    let mut paths = Vec::new();
    collect(video, &mut paths);
    paths
}

/// Extract every provided slot in slot order; slots that yield no path are
/// logged and skipped.
pub fn extract_slots(slots: &[Option<VideoRef>]) -> Vec<String> {
    let mut paths = Vec::new();

    for (index, slot) in slots.iter().enumerate() {
        let Some(video) = slot else {
            continue;
        };

        debug!("Input video{} type: {}", index + 1, video.type_name());

        let extracted = extract_paths(video);
        if extracted.is_empty() {
            warn!("Input video{} could not be parsed: {:?}", index + 1, video);
        }
        paths.extend(extracted);
    }

    paths
}

fn collect(video: &VideoRef, out: &mut Vec<String>) {
    match video {
        VideoRef::Path(path) => out.push(path.clone()),
        VideoRef::List(items) => {
            for item in items {
                collect(item, out);
            }
        }
        VideoRef::Map(entries) => {
            if let Some(filenames) = entries.get("filenames") {
                collect(filenames, out);
            } else if let Some(inner) = entries.get("video") {
                collect(inner, out);
            }
        }
        VideoRef::Object(source) => collect_object(source.as_ref(), out),
        VideoRef::Unsupported(_) => {}
    }
}

fn collect_object(source: &dyn VideoSource, out: &mut Vec<String>) {
    let before = out.len();

    if let Some(result) = source.stream_source() {
        match result {
            Ok(VideoRef::Path(path)) => out.push(path),
            Ok(other) => warn!(
                "{}: stream source returned non-string: {}",
                source.type_name(),
                other.type_name()
            ),
            Err(e) => warn!("{}: error calling stream source: {}", source.type_name(), e),
        }
    } else if let Some(path) = source.video_path() {
        out.push(path);
    }

    if out.len() == before {
        for name in FALLBACK_ATTRIBUTES {
            match source.attribute(name) {
                Some(value) if value.is_structural() => {
                    collect(&value, out);
                    break;
                }
                _ => {}
            }
        }
    }

    if out.len() == before {
        warn!(
            "Could not parse {}. Attributes: {:?}",
            source.type_name(),
            source.attribute_names()
        );
    }
}
