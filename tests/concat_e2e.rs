//! End-to-end runs against the real ffmpeg/ffprobe binaries.
//!
//! Each test returns early when the tools (or libx264) are not installed.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use tempfile::{tempdir, TempDir};
use video_concat::{
    composition::{ConcatRequest, ConcatSettings, Concatenator, TransitionKind, TransitionSpec},
    config::EngineConfig,
    media::{FfmpegEngine, MediaEngine},
    video::{LocalStorage, StorageRoots, VideoRef},
    ConcatError,
};

fn tools_available() -> bool {
    let runs = |program: &str| {
        Command::new(program)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    };
    if !runs("ffmpeg") || !runs("ffprobe") {
        eprintln!("ffmpeg/ffprobe not found, skipping");
        return false;
    }

    let encoders = Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .output()
        .map(|o| String::from_utf8_lossy(&o.stdout).into_owned())
        .unwrap_or_default();
    if !encoders.contains("libx264") {
        eprintln!("ffmpeg built without libx264, skipping");
        return false;
    }
    true
}

/// Two seconds of test pattern with a sine tone
fn make_clip(path: &Path, size: &str, frequency: u32) {
    let status = Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", "-y"])
        .args(["-f", "lavfi", "-i", &format!("testsrc=size={}:rate=25:duration=2", size)])
        .args(["-f", "lavfi", "-i", &format!("sine=frequency={}:duration=2", frequency)])
        .args(["-c:v", "libx264", "-pix_fmt", "yuv420p", "-c:a", "aac", "-shortest"])
        .arg(path)
        .status()
        .unwrap();
    assert!(status.success(), "could not generate {:?}", path);
}

struct Studio {
    root: TempDir,
    engine: Arc<FfmpegEngine>,
    storage: Arc<LocalStorage>,
}

impl Studio {
    fn new() -> Self {
        let root = tempdir().unwrap();
        let storage = LocalStorage::new(
            root.path().join("output"),
            root.path().join("input"),
            root.path().join("temp"),
        );
        let engine = FfmpegEngine::new(&EngineConfig::default());
        Self {
            root,
            engine: Arc::new(engine),
            storage: Arc::new(storage),
        }
    }

    fn clip(&self, name: &str, frequency: u32) -> PathBuf {
        let path = self.storage.input_dir().unwrap().join(name);
        make_clip(&path, "320x240", frequency);
        path
    }

    fn concatenator(&self) -> Concatenator {
        Concatenator::new(self.engine.clone(), self.storage.clone(), ConcatSettings::default())
    }

    fn files_under(&self, dir: &str) -> usize {
        let dir = self.root.path().join(dir);
        if !dir.exists() {
            return 0;
        }
        fs::read_dir(dir).unwrap().count()
    }
}

#[test]
fn hard_cut_of_three_clips_keeps_first_resolution() {
    if !tools_available() {
        return;
    }
    let studio = Studio::new();
    studio.clip("a.mp4", 440);
    studio.clip("b.mp4", 550);
    let absolute = studio.clip("c.mp4", 660);

    let request = ConcatRequest::new(vec![
        Some(VideoRef::from("a.mp4")),
        None,
        Some(VideoRef::from(vec!["b.mp4"])),
        Some(VideoRef::from(absolute.to_string_lossy().into_owned())),
    ]);
    let handle = studio.concatenator().concatenate(&request).into_result().unwrap();

    assert!(handle.path().is_file());
    assert_eq!(handle.dimensions(), (320, 240));

    let duration = studio.engine.probe(handle.path()).unwrap().duration().unwrap();
    assert!((5.5..6.6).contains(&duration), "unexpected duration {}", duration);
}

#[test]
fn cross_fade_shortens_timeline_by_overlap() {
    if !tools_available() {
        return;
    }
    let studio = Studio::new();
    studio.clip("a.mp4", 440);
    studio.clip("b.mp4", 880);

    let request = ConcatRequest::new(vec![
        Some(VideoRef::from_arg(r#"{"filenames": ["a.mp4", "b.mp4"]}"#)),
    ])
    .with_transition(TransitionSpec::new(TransitionKind::Fade, 0.5).unwrap());
    let handle = studio.concatenator().concatenate(&request).into_result().unwrap();

    let duration = studio.engine.probe(handle.path()).unwrap().duration().unwrap();
    assert!((3.2..3.9).contains(&duration), "unexpected duration {}", duration);
}

#[test]
fn zero_resolvable_inputs_write_nothing() {
    if !tools_available() {
        return;
    }
    let studio = Studio::new();

    let request = ConcatRequest::new(vec![
        Some(VideoRef::from("missing.mp4")),
        Some(VideoRef::from("also_missing.mp4 [temp]")),
    ]);
    let result = studio.concatenator().concatenate(&request);

    assert!(matches!(
        result.error(),
        Some(ConcatError::NoResolvedInput { recognized: 2 })
    ));
    assert_eq!(studio.files_under("output"), 0);
    assert_eq!(studio.files_under("temp"), 0);
}

#[test]
fn output_can_be_materialized_and_fed_back() {
    if !tools_available() {
        return;
    }
    let studio = Studio::new();
    studio.clip("a.mp4", 440);
    studio.clip("b.mp4", 550);

    let first = studio
        .concatenator()
        .concatenate(&ConcatRequest::new(vec![
            Some(VideoRef::from("a.mp4")),
            Some(VideoRef::from("b.mp4")),
        ]))
        .into_result()
        .unwrap();

    let copy = studio.root.path().join("copy.mp4");
    first.materialize(&copy).unwrap();
    assert!(copy.is_file());

    let second = studio
        .concatenator()
        .concatenate(
            &ConcatRequest::new(vec![
                Some(VideoRef::object(first.clone())),
                Some(VideoRef::from("a.mp4")),
            ])
            .with_prefix("second_pass"),
        )
        .into_result()
        .unwrap();

    assert_ne!(second.path(), first.path());
    assert_eq!(second.dimensions(), (320, 240));
}
