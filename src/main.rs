use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, Level};

use video_concat::{
    composition::{ConcatRequest, ConcatSettings, Concatenator, OutputFormat, TransitionKind, MAX_VIDEO_SLOTS},
    config::Config,
    media::FfmpegEngine,
    video::{LocalStorage, VideoRef},
};

#[derive(Parser)]
#[command(
    name = "video-concat",
    version,
    about = "Join up to five videos into one, with optional transitions",
    long_about = "Video-Concat resolves the given videos against the input and output directories and joins them with ffmpeg. If a cross-fade cannot be rendered it falls back to a hard cut, and to a video-only hard cut as a last resort."
)]
struct Cli {
    /// Video to join: a path, or a JSON value such as '{"filenames": ["a.mp4"]}' (repeatable, up to 5)
    #[arg(long = "video", value_name = "REF", required = true)]
    videos: Vec<String>,

    /// Transition between clips (none, fade, slideleft, wipeup, dissolve, ...)
    #[arg(short, long)]
    transition: Option<TransitionKind>,

    /// Transition length in seconds (0.1 - 10.0)
    #[arg(long)]
    transition_duration: Option<f64>,

    /// Output container (mp4, mkv, mov, webm, avi, gif)
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Output filename prefix
    #[arg(short, long)]
    prefix: Option<String>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for produced videos, overriding the configuration
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also copy the result to this path
    #[arg(short, long)]
    save_to: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<video_concat::ConcatError>() {
            Some(concat_error) => error!("{}", concat_error.user_message()),
            None => error!("{:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    info!("Starting Video-Concat v{}", env!("CARGO_PKG_VERSION"));

    if cli.videos.len() > MAX_VIDEO_SLOTS {
        anyhow::bail!(
            "At most {} videos can be joined, got {}",
            MAX_VIDEO_SLOTS,
            cli.videos.len()
        );
    }

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };

    if let Some(dir) = cli.output_dir {
        config.storage.output_dir = dir;
    }
    if let Some(transition) = cli.transition {
        config.concat.transition = transition;
    }
    if let Some(duration) = cli.transition_duration {
        config.concat.transition_duration = duration;
    }
    if let Some(format) = cli.format {
        config.concat.format = format;
    }
    if let Some(prefix) = cli.prefix {
        config.concat.filename_prefix = prefix;
    }
    config.validate()?;

    let engine = Arc::new(FfmpegEngine::new(&config.engine));
    if !engine.is_available() {
        anyhow::bail!(
            "'{}' is not runnable. Please check that FFmpeg is installed and on PATH.",
            config.engine.ffmpeg.display()
        );
    }
    let storage = Arc::new(LocalStorage::from_config(&config.storage));

    let slots = cli
        .videos
        .iter()
        .map(|arg| Some(VideoRef::from_arg(arg)))
        .collect();
    let request = ConcatRequest::from_config(slots, &config.concat)?;

    let concatenator = Concatenator::new(engine, storage, ConcatSettings::from(&config.concat));
    let handle = concatenator.concatenate(&request).into_result()?;

    let (width, height) = handle.dimensions();
    println!("{}", handle.path().display());
    info!("Output: {:?} ({}x{})", handle.path(), width, height);

    if let Some(destination) = cli.save_to {
        handle.materialize(&destination)?;
        info!("Saved copy to {:?}", destination);
    }

    Ok(())
}
