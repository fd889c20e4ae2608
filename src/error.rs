use std::time::Duration;

use thiserror::Error;

/// Main error type for the video-concat library
#[derive(Error, Debug)]
pub enum ConcatError {
    #[error("No video paths recognized in the inputs")]
    NoRecognizedInput,

    #[error("No valid video files found on disk among {recognized} recognized paths")]
    NoResolvedInput { recognized: usize },

    #[error("All {attempts} concatenation strategies failed")]
    AllStrategiesFailed { attempts: usize },

    #[error("Invalid concatenation request: {details}")]
    InvalidRequest { details: String },

    #[error("Media engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reported by the external media engine (ffmpeg / ffprobe)
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {status:?}: {stderr}")]
    Failed {
        program: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("{program} did not finish within {timeout:?} and was killed")]
    TimedOut { program: String, timeout: Duration },

    #[error("Unexpected output from {program}: {reason}")]
    MalformedOutput { program: String, reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path} ({reason})")]
    ParseFailed { path: String, reason: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using ConcatError
pub type Result<T> = std::result::Result<T, ConcatError>;

impl ConcatError {
    /// Create an invalid-request error with a custom message
    pub fn invalid_request<S: Into<String>>(details: S) -> Self {
        Self::InvalidRequest {
            details: details.into(),
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::NoRecognizedInput => {
                "None of the video inputs could be read as a file path.".to_string()
            }
            Self::NoResolvedInput { recognized } => format!(
                "{} path(s) were recognized but none exists in the output or input directories.",
                recognized
            ),
            Self::AllStrategiesFailed { .. } => {
                "ffmpeg could not join the videos, even without audio. Run with --verbose for the engine output.".to_string()
            }
            Self::Engine(EngineError::Spawn { program, .. }) => format!(
                "Could not run '{}'. Please check that FFmpeg is installed and on PATH.",
                program
            ),
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

impl EngineError {
    /// Captured diagnostic output of the failed invocation, if any
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Failed { stderr, .. } => Some(stderr.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_converts_into_concat_error() {
        let engine = EngineError::Failed {
            program: "ffmpeg".to_string(),
            status: Some(1),
            stderr: "Invalid data found when processing input".to_string(),
        };
        let err: ConcatError = engine.into();

        assert!(matches!(err, ConcatError::Engine(EngineError::Failed { .. })));
        assert!(err.to_string().contains("Invalid data found"));
    }

    #[test]
    fn test_user_message_for_missing_ffmpeg() {
        let err = ConcatError::from(EngineError::Spawn {
            program: "ffmpeg".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        });

        assert!(err.user_message().contains("FFmpeg is installed"));
    }

    #[test]
    fn test_stderr_only_for_failed_runs() {
        let timed_out = EngineError::TimedOut {
            program: "ffmpeg".to_string(),
            timeout: Duration::from_secs(5),
        };
        assert!(timed_out.stderr().is_none());

        let failed = EngineError::Failed {
            program: "ffprobe".to_string(),
            status: None,
            stderr: "boom".to_string(),
        };
        assert_eq!(failed.stderr(), Some("boom"));
    }
}
