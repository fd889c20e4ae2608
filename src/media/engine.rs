use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tokio::runtime::{Builder, Handle};
use tracing::{debug, info};

use crate::{
    config::EngineConfig,
    error::EngineError,
    media::{EngineOutput, Invocation, ProbeReport},
};

/// External media engine: stream inspection plus single-shot encodes.
///
/// Implementations must capture stdout and stderr completely before reporting
/// success or failure of a run.
#[cfg_attr(test, mockall::automock)]
pub trait MediaEngine: Send + Sync {
    /// Inspect container and streams of `path`
    fn probe(&self, path: &Path) -> Result<ProbeReport, EngineError>;

    /// Run one invocation to completion; non-zero exit is an error
    fn execute(&self, invocation: &Invocation) -> Result<EngineOutput, EngineError>;
}

/// [`MediaEngine`] backed by the `ffmpeg` and `ffprobe` executables.
///
/// Every process runs under a deadline and is killed when the deadline
/// passes. Calls block the calling thread. From inside a tokio runtime the
/// wait moves to a dedicated thread, since blocking on a nested runtime panics.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    timeout: Duration,
}

impl FfmpegEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            ffmpeg: config.ffmpeg.clone(),
            ffprobe: config.ffprobe.clone(),
            timeout: config.timeout(),
        }
    }

    /// Whether `ffmpeg -version` runs successfully
    pub fn is_available(&self) -> bool {
        self.run(&self.ffmpeg, vec![OsString::from("-version")])
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    fn run(&self, program: &Path, args: Vec<OsString>) -> Result<Output, EngineError> {
        if Handle::try_current().is_err() {
            return self.run_blocking(program, &args);
        }

        debug!("Async context detected, waiting for {:?} on a worker thread", program);
        std::thread::scope(|scope| {
            scope
                .spawn(|| self.run_blocking(program, &args))
                .join()
                .unwrap_or_else(|_| {
                    Err(EngineError::Spawn {
                        program: program.display().to_string(),
                        source: io::Error::new(io::ErrorKind::Other, "engine worker thread panicked"),
                    })
                })
        })
    }

    /// Spawn and wait on a private current-thread runtime
    fn run_blocking(&self, program: &Path, args: &[OsString]) -> Result<Output, EngineError> {
        let name = program.display().to_string();
        let timeout = self.timeout;

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|source| EngineError::Spawn {
                program: name.clone(),
                source,
            })?;

        debug!("Running {} {:?}", name, args);

        runtime.block_on(async {
            let child = Command::new(program)
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(|source| EngineError::Spawn {
                    program: name.clone(),
                    source,
                })?;

            // Dropping the pending future drops the child, which kills it.
            match tokio::time::timeout(timeout, child.wait_with_output()).await {
                Ok(result) => result.map_err(|source| EngineError::Spawn {
                    program: name.clone(),
                    source,
                }),
                Err(_) => Err(EngineError::TimedOut {
                    program: name.clone(),
                    timeout,
                }),
            }
        })
    }

    fn check_status(program: &Path, output: Output) -> Result<EngineOutput, EngineError> {
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(EngineError::Failed {
                program: program.display().to_string(),
                status: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(EngineOutput { stdout, stderr })
    }
}

impl MediaEngine for FfmpegEngine {
    fn probe(&self, path: &Path) -> Result<ProbeReport, EngineError> {
        let args = vec![
            OsString::from("-v"),
            OsString::from("quiet"),
            OsString::from("-print_format"),
            OsString::from("json"),
            OsString::from("-show_format"),
            OsString::from("-show_streams"),
            path.as_os_str().to_owned(),
        ];

        let output = self.run(&self.ffprobe, args)?;
        let output = Self::check_status(&self.ffprobe, output)?;

        ProbeReport::from_json(&output.stdout).map_err(|e| EngineError::MalformedOutput {
            program: self.ffprobe.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn execute(&self, invocation: &Invocation) -> Result<EngineOutput, EngineError> {
        info!(
            "ffmpeg: {} input(s) -> {:?}",
            invocation.inputs().len(),
            invocation.output()
        );
        let output = self.run(&self.ffmpeg, invocation.to_args())?;
        Self::check_status(&self.ffmpeg, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with(ffmpeg: &str, ffprobe: &str, timeout_secs: u64) -> FfmpegEngine {
        let config = EngineConfig {
            ffmpeg: PathBuf::from(ffmpeg),
            ffprobe: PathBuf::from(ffprobe),
            timeout_secs,
        };
        FfmpegEngine::new(&config)
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let engine = engine_with("/nonexistent/ffmpeg", "/nonexistent/ffprobe", 5);

        let result = engine.probe(Path::new("clip.mp4"));
        assert!(matches!(result, Err(EngineError::Spawn { .. })));
        assert!(!engine.is_available());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_failure() {
        // `false` ignores its arguments and exits with status 1
        let engine = engine_with("false", "false", 5);

        let result = engine.execute(&Invocation::new("out.mp4").input("in.mp4"));
        match result {
            Err(EngineError::Failed { status, .. }) => assert_eq!(status, Some(1)),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_unparseable_probe_output() {
        // `echo` succeeds and prints its arguments, which is not JSON
        let engine = engine_with("echo", "echo", 5);

        let result = engine.probe(Path::new("clip.mp4"));
        assert!(matches!(result, Err(EngineError::MalformedOutput { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_process() {
        let engine = engine_with("sleep", "sleep", 1);

        let started = std::time::Instant::now();
        let result = engine.run(Path::new("sleep"), vec![OsString::from("30")]);

        assert!(matches!(result, Err(EngineError::TimedOut { .. })));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[tokio::test(flavor = "current_thread")]
    async fn test_blocking_calls_inside_async_runtime() {
        let engine = engine_with("false", "echo", 5);

        let result = engine.execute(&Invocation::new("out.mp4").input("in.mp4"));
        assert!(matches!(result, Err(EngineError::Failed { status: Some(1), .. })));

        let result = engine.probe(Path::new("clip.mp4"));
        assert!(matches!(result, Err(EngineError::MalformedOutput { .. })));

        // Dropping inside the runtime must not panic either
        drop(engine);
    }
}
