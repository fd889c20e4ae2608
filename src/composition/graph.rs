//! Filter-graph construction for the two join styles.
//!
//! A hard cut feeds every input's streams into one `concat` filter. A
//! cross-fade chains `xfade` (video) and `acrossfade` (audio) pairwise: the
//! accumulated stream is blended with the next input at a running offset
//! `O`, starting at `D[0] - T` and advanced by `D[i] - T` after each join.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::{
    composition::{EncodingProfile, TransitionSpec},
    error::{ConcatError, Result},
    media::Invocation,
    video::ResolvedPath,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Audio,
}

impl StreamKind {
    fn specifier(&self) -> &'static str {
        match self {
            Self::Video => "v",
            Self::Audio => "a",
        }
    }
}

/// A stream inside a filter graph: an input's elementary stream or the
/// labelled output of a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stream {
    Input { index: usize, kind: StreamKind },
    Label(String),
}

impl Stream {
    /// Argument for `-map`
    pub fn map_arg(&self) -> String {
        match self {
            Self::Input { index, kind } => format!("{}:{}", index, kind.specifier()),
            Self::Label(label) => format!("[{}]", label),
        }
    }
}

impl fmt::Display for Stream {
    /// Pad notation used inside the graph, e.g. `[0:v]` or `[s3]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input { index, kind } => write!(f, "[{}:{}]", index, kind.specifier()),
            Self::Label(label) => write!(f, "[{}]", label),
        }
    }
}

/// The video and audio streams of one input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputStreams {
    pub video: Stream,
    pub audio: Stream,
}

/// Incrementally built ffmpeg filter graph
#[derive(Debug, Default)]
pub struct FilterGraph {
    inputs: Vec<PathBuf>,
    chains: Vec<String>,
    next_label: usize,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an input file
    pub fn input<P: AsRef<Path>>(&mut self, path: P) -> InputStreams {
        let index = self.inputs.len();
        self.inputs.push(path.as_ref().to_path_buf());
        InputStreams {
            video: Stream::Input {
                index,
                kind: StreamKind::Video,
            },
            audio: Stream::Input {
                index,
                kind: StreamKind::Audio,
            },
        }
    }

    /// Apply a named single-output filter with keyword parameters
    pub fn filter(&mut self, inputs: &[&Stream], name: &str, params: &[(&str, String)]) -> Stream {
        let mut spec = name.to_string();
        if !params.is_empty() {
            let joined: Vec<String> = params
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect();
            spec.push('=');
            spec.push_str(&joined.join(":"));
        }

        let mut outputs = self.apply(inputs, &spec, 1);
        outputs.remove(0)
    }

    /// Concatenate `segments` (grouped per segment as `v` video then `a`
    /// audio streams) into `v + a` output streams.
    pub fn concat(&mut self, streams: &[&Stream], segments: usize, video: usize, audio: usize) -> Vec<Stream> {
        let spec = format!("concat=n={}:v={}:a={}", segments, video, audio);
        self.apply(streams, &spec, video + audio)
    }

    fn apply(&mut self, inputs: &[&Stream], spec: &str, outputs: usize) -> Vec<Stream> {
        let mut chain: String = inputs.iter().map(|s| s.to_string()).collect();
        chain.push_str(spec);

        let labels: Vec<Stream> = (0..outputs)
            .map(|_| {
                let label = Stream::Label(format!("s{}", self.next_label));
                self.next_label += 1;
                label
            })
            .collect();
        for label in &labels {
            chain.push_str(&label.to_string());
        }

        self.chains.push(chain);
        labels
    }

    /// The `-filter_complex` argument, if any filter was applied
    pub fn render(&self) -> Option<String> {
        if self.chains.is_empty() {
            None
        } else {
            Some(self.chains.join(";"))
        }
    }

    /// Finish the graph into an invocation writing `outputs` to `output`
    pub fn into_invocation(self, outputs: &[Stream], profile: &EncodingProfile, output: &Path) -> Invocation {
        let graph = self.render();
        let mut invocation = self
            .inputs
            .into_iter()
            .fold(Invocation::new(output), |invocation, input| invocation.input(input));

        if let Some(graph) = graph {
            invocation = invocation.filter_complex(graph);
        }
        for stream in outputs {
            invocation = invocation.map(stream.map_arg());
        }
        invocation.output_args(profile.to_args())
    }
}

/// Join `inputs` back to back. Without audio, only the video streams are
/// concatenated.
pub fn hard_cut(
    inputs: &[ResolvedPath],
    output: &Path,
    profile: &EncodingProfile,
    with_audio: bool,
) -> Result<Invocation> {
    if inputs.is_empty() {
        return Err(ConcatError::invalid_request("hard cut needs at least one input"));
    }

    let mut graph = FilterGraph::new();
    let streams: Vec<InputStreams> = inputs.iter().map(|p| graph.input(p)).collect();

    let segment_streams: Vec<&Stream> = streams
        .iter()
        .flat_map(|s| {
            if with_audio {
                vec![&s.video, &s.audio]
            } else {
                vec![&s.video]
            }
        })
        .collect();

    let audio_outputs = usize::from(with_audio);
    let joined = graph.concat(&segment_streams, inputs.len(), 1, audio_outputs);
    Ok(graph.into_invocation(&joined, profile, output))
}

/// `xfade` offsets for each join, in order. Offset `k` is where the
/// transition into clip `k + 1` starts on the accumulated timeline.
pub fn crossfade_offsets(durations: &[f64], transition: f64) -> Vec<f64> {
    let Some((first, rest)) = durations.split_first() else {
        return Vec::new();
    };

    let mut offset = first - transition;
    rest.iter()
        .map(|duration| {
            let current = offset;
            offset += duration - transition;
            current
        })
        .collect()
}

/// Whether the transition is at least as long as either clip of some
/// adjacent pair; ffmpeg rejects such a graph.
pub fn transition_overlaps(durations: &[f64], transition: f64) -> bool {
    durations
        .windows(2)
        .any(|pair| transition >= pair[0].min(pair[1]))
}

/// Chain cross-fades between consecutive inputs.
///
/// `durations` must hold one entry per input. Overlong transitions are not
/// rejected here; the engine run fails instead.
pub fn cross_fade(
    inputs: &[ResolvedPath],
    durations: &[f64],
    spec: &TransitionSpec,
    output: &Path,
    profile: &EncodingProfile,
) -> Result<Invocation> {
    if inputs.is_empty() || spec.is_none() {
        return Err(ConcatError::invalid_request(
            "cross-fade needs inputs and a transition kind",
        ));
    }
    if durations.len() != inputs.len() {
        return Err(ConcatError::invalid_request(format!(
            "{} durations for {} inputs",
            durations.len(),
            inputs.len()
        )));
    }

    let mut graph = FilterGraph::new();
    let streams: Vec<InputStreams> = inputs.iter().map(|p| graph.input(p)).collect();
    let offsets = crossfade_offsets(durations, spec.duration());
    let duration = format_seconds(spec.duration());

    let mut video = streams[0].video.clone();
    let mut audio = streams[0].audio.clone();

    for (next, offset) in streams.iter().skip(1).zip(offsets) {
        video = graph.filter(
            &[&video, &next.video],
            "xfade",
            &[
                ("transition", spec.kind().name().to_string()),
                ("duration", duration.clone()),
                ("offset", format_seconds(offset)),
            ],
        );
        audio = graph.filter(&[&audio, &next.audio], "acrossfade", &[("d", duration.clone())]);
    }

    Ok(graph.into_invocation(&[video, audio], profile, output))
}

/// Seconds with at most microsecond precision and no trailing zeros
fn format_seconds(seconds: f64) -> String {
    let fixed = format!("{:.6}", seconds);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}
