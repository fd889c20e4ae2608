use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::{
    composition::{
        graph::{cross_fade, hard_cut, transition_overlaps},
        EncodingProfile, OutputFormat, TransitionSpec,
    },
    config::ConcatConfig,
    error::{ConcatError, Result},
    media::{probe_duration, Invocation, MediaEngine},
    video::{extract_slots, OutputHandle, PathResolver, ResolvedPath, StorageRoots, VideoRef},
};

/// Maximum number of video slots per request
pub const MAX_VIDEO_SLOTS: usize = 5;

pub const DEFAULT_FILENAME_PREFIX: &str = "concatenated_video";

/// One concatenation job
#[derive(Debug, Clone)]
pub struct ConcatRequest {
    /// Optional inputs, joined in slot order
    pub slots: Vec<Option<VideoRef>>,
    pub transition: TransitionSpec,
    pub format: OutputFormat,
    pub filename_prefix: String,
}

impl ConcatRequest {
    pub fn new(slots: Vec<Option<VideoRef>>) -> Self {
        Self {
            slots,
            transition: TransitionSpec::none(),
            format: OutputFormat::default(),
            filename_prefix: DEFAULT_FILENAME_PREFIX.to_string(),
        }
    }

    /// Request with transition, format and prefix taken from configuration
    pub fn from_config(slots: Vec<Option<VideoRef>>, config: &ConcatConfig) -> Result<Self> {
        Ok(Self {
            slots,
            transition: config.transition_spec()?,
            format: config.format,
            filename_prefix: config.filename_prefix.clone(),
        })
    }

    pub fn with_transition(mut self, transition: TransitionSpec) -> Self {
        self.transition = transition;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.filename_prefix = prefix.into();
        self
    }

    fn validate(&self) -> Result<()> {
        if self.slots.len() > MAX_VIDEO_SLOTS {
            return Err(ConcatError::invalid_request(format!(
                "{} video slots given, at most {} are supported",
                self.slots.len(),
                MAX_VIDEO_SLOTS
            )));
        }

        let prefix = self.filename_prefix.as_str();
        if prefix.is_empty() || prefix.contains(['/', '\\']) || prefix == "." || prefix == ".." {
            return Err(ConcatError::invalid_request(format!(
                "filename prefix {:?} is not a plain file name",
                prefix
            )));
        }

        Ok(())
    }
}

/// Orchestrator behaviour switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConcatSettings {
    /// Skip the cross-fade tier when the transition is at least as long as
    /// an adjacent clip instead of letting the engine reject it.
    pub validate_transition_overlap: bool,
}

impl From<&ConcatConfig> for ConcatSettings {
    fn from(config: &ConcatConfig) -> Self {
        Self {
            validate_transition_overlap: config.validate_transition_overlap,
        }
    }
}

/// Outcome of [`Concatenator::concatenate`]. Collaborator errors never escape
/// as panics; they end up in `Failed`.
#[derive(Debug)]
pub enum ConcatResult {
    Completed(OutputHandle),
    Failed(ConcatError),
}

impl ConcatResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn output_path(&self) -> Option<&Path> {
        match self {
            Self::Completed(handle) => Some(handle.path()),
            Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ConcatError> {
        match self {
            Self::Completed(_) => None,
            Self::Failed(e) => Some(e),
        }
    }

    pub fn into_result(self) -> Result<OutputHandle> {
        match self {
            Self::Completed(handle) => Ok(handle),
            Self::Failed(e) => Err(e),
        }
    }
}

/// One tier of the fallback cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    CrossFade,
    HardCut { with_audio: bool },
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CrossFade => write!(f, "cross-fade"),
            Self::HardCut { with_audio: true } => write!(f, "hard cut (video + audio)"),
            Self::HardCut { with_audio: false } => write!(f, "hard cut (video only)"),
        }
    }
}

/// Joins up to [`MAX_VIDEO_SLOTS`] videos into one file.
///
/// The pipeline runs synchronously:
/// 1. Extraction - flatten every slot into path strings
/// 2. Resolution - map paths onto files in the storage roots
/// 3. Probing - segment durations, only when a transition is requested
/// 4. Encoding - try each cascade tier until one writes the output file
pub struct Concatenator {
    engine: Arc<dyn MediaEngine>,
    storage: Arc<dyn StorageRoots>,
    settings: ConcatSettings,
}

impl Concatenator {
    pub fn new(
        engine: Arc<dyn MediaEngine>,
        storage: Arc<dyn StorageRoots>,
        settings: ConcatSettings,
    ) -> Self {
        Self {
            engine,
            storage,
            settings,
        }
    }

    /// Run one concatenation
    pub fn concatenate(&self, request: &ConcatRequest) -> ConcatResult {
        match self.run(request) {
            Ok(handle) => {
                info!("🎉 Concatenation complete: {:?}", handle.path());
                ConcatResult::Completed(handle)
            }
            Err(e) => {
                error!("Concatenation failed: {}", e);
                ConcatResult::Failed(e)
            }
        }
    }

    fn run(&self, request: &ConcatRequest) -> Result<OutputHandle> {
        request.validate()?;

        info!("🎬 Starting concatenation");
        info!("   Transition: {} ({}s)", request.transition.kind(), request.transition.duration());
        info!("   Format: {}", request.format);

        let resolved = self.collect_inputs(request)?;
        let durations = self.probe_durations(&resolved, &request.transition);
        let strategies = self.plan(&request.transition, durations.as_deref());

        // Allocated only once there is something to encode
        let output = self
            .storage
            .allocate_output_path(&request.filename_prefix, request.format.extension())?;
        let profile = EncodingProfile::for_format(request.format);
        debug!("Writing to {:?} with {:?}", output, profile.to_args());

        for (tier, strategy) in strategies.iter().enumerate() {
            let invocation = match self.build(
                *strategy,
                &resolved,
                durations.as_deref(),
                &request.transition,
                &output,
                &profile,
            ) {
                Ok(invocation) => invocation,
                Err(e) => {
                    warn!("Could not build {} graph: {}", strategy, e);
                    continue;
                }
            };

            info!("🎞️  Tier {}/{}: {}", tier + 1, strategies.len(), strategy);
            // A leftover from an earlier tier must not pass for this tier's output
            discard_partial_output(&output);
            if self.attempt(*strategy, &invocation) {
                return Ok(OutputHandle::new(output, Arc::clone(&self.engine)));
            }
        }

        discard_partial_output(&output);
        Err(ConcatError::AllStrategiesFailed {
            attempts: strategies.len(),
        })
    }

    // ==========================================
    // EXTRACTION AND RESOLUTION
    // ==========================================

    fn collect_inputs(&self, request: &ConcatRequest) -> Result<Vec<ResolvedPath>> {
        let paths = extract_slots(&request.slots);
        if paths.is_empty() {
            return Err(ConcatError::NoRecognizedInput);
        }

        let resolved = PathResolver::new(self.storage.as_ref()).resolve(&paths);
        if resolved.is_empty() {
            return Err(ConcatError::NoResolvedInput {
                recognized: paths.len(),
            });
        }

        info!("   Inputs: {} of {} paths resolved", resolved.len(), paths.len());
        for input in &resolved {
            debug!("      {:?}", input.as_path());
        }
        Ok(resolved)
    }

    /// Durations of every input, or `None` when no transition is wanted or
    /// any probe fails. A single failure disables transitions for the whole
    /// run.
    fn probe_durations(&self, inputs: &[ResolvedPath], transition: &TransitionSpec) -> Option<Vec<f64>> {
        if transition.is_none() {
            return None;
        }

        let mut durations = Vec::with_capacity(inputs.len());
        for input in inputs {
            match probe_duration(self.engine.as_ref(), input.as_path()) {
                Some(duration) => durations.push(duration),
                None => {
                    warn!(
                        "Could not get duration for {:?}, falling back to no transitions",
                        input.as_path()
                    );
                    return None;
                }
            }
        }

        debug!("Segment durations: {:?}", durations);
        Some(durations)
    }

    // ==========================================
    // FALLBACK CASCADE
    // ==========================================

    fn plan(&self, transition: &TransitionSpec, durations: Option<&[f64]>) -> Vec<Strategy> {
        let mut strategies = Vec::with_capacity(3);

        if let Some(durations) = durations {
            if self.settings.validate_transition_overlap
                && transition_overlaps(durations, transition.duration())
            {
                warn!(
                    "Transition of {}s does not fit between adjacent clips, skipping cross-fade",
                    transition.duration()
                );
            } else {
                strategies.push(Strategy::CrossFade);
            }
        }

        strategies.push(Strategy::HardCut { with_audio: true });
        strategies.push(Strategy::HardCut { with_audio: false });
        strategies
    }

    fn build(
        &self,
        strategy: Strategy,
        inputs: &[ResolvedPath],
        durations: Option<&[f64]>,
        transition: &TransitionSpec,
        output: &Path,
        profile: &EncodingProfile,
    ) -> Result<Invocation> {
        match strategy {
            Strategy::CrossFade => cross_fade(
                inputs,
                durations.unwrap_or_default(),
                transition,
                output,
                profile,
            ),
            Strategy::HardCut { with_audio } => hard_cut(inputs, output, profile, with_audio),
        }
    }

    /// Run one tier. Success needs both a clean engine exit and a regular
    /// file at the output path.
    fn attempt(&self, strategy: Strategy, invocation: &Invocation) -> bool {
        match self.engine.execute(invocation) {
            Ok(_) if invocation.output().is_file() => {
                info!("   ✅ {} succeeded", strategy);
                true
            }
            Ok(_) => {
                warn!(
                    "{} reported success but {:?} was not written",
                    strategy,
                    invocation.output()
                );
                false
            }
            Err(e) => {
                warn!("{} failed: {}", strategy, e);
                if let Some(stderr) = e.stderr() {
                    debug!("ffmpeg stderr:\n{}", stderr);
                }
                false
            }
        }
    }
}

fn discard_partial_output(output: &Path) {
    if output.exists() {
        match std::fs::remove_file(output) {
            Ok(()) => debug!("Removed partial output {:?}", output),
            Err(e) => warn!("Could not remove partial output {:?}: {}", output, e),
        }
    }
}
