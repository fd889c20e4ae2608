use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    composition::{
        OutputFormat, TransitionKind, TransitionSpec, MAX_TRANSITION_SECS, MIN_TRANSITION_SECS,
    },
    error::{ConfigError, Result},
};

/// Main configuration for video-concat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where inputs are looked up and outputs are written
    pub storage: StorageConfig,

    /// External media engine settings
    pub engine: EngineConfig,

    /// Default concatenation parameters
    pub concat: ConcatConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.display().to_string(),
            reason: e.message().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "config".to_string(),
            value: e.to_string(),
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.storage.validate()?;
        self.engine.validate()?;
        self.concat.validate()?;
        Ok(())
    }
}

/// Storage roots; each directory is created on first use
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Output directory, also searched for relative input paths first
    pub output_dir: PathBuf,

    /// Input directory, searched after the output directory
    pub input_dir: PathBuf,

    /// Scratch directory
    pub temp_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            input_dir: PathBuf::from("input"),
            temp_dir: PathBuf::from("temp"),
        }
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        for (key, dir) in [
            ("storage.output_dir", &self.output_dir),
            ("storage.input_dir", &self.input_dir),
            ("storage.temp_dir", &self.temp_dir),
        ] {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: String::new(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// External media engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// ffmpeg executable
    pub ffmpeg: PathBuf,

    /// ffprobe executable
    pub ffprobe: PathBuf,

    /// Upper bound for any single engine invocation (seconds)
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            timeout_secs: 3600,
        }
    }
}

impl EngineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "engine.timeout_secs".to_string(),
                value: self.timeout_secs.to_string(),
            }
            .into());
        }

        if self.ffmpeg.as_os_str().is_empty() || self.ffprobe.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "engine.ffmpeg/ffprobe".to_string(),
                value: String::new(),
            }
            .into());
        }

        Ok(())
    }
}

/// Default parameters for a concatenation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcatConfig {
    /// Transition between clips
    pub transition: TransitionKind,

    /// Transition length in seconds (0.1 - 10.0)
    pub transition_duration: f64,

    /// Output container
    pub format: OutputFormat,

    /// Output filename prefix
    pub filename_prefix: String,

    /// Skip the cross-fade attempt when a transition is at least as long as
    /// one of the clips it joins
    pub validate_transition_overlap: bool,
}

impl Default for ConcatConfig {
    fn default() -> Self {
        Self {
            transition: TransitionKind::None,
            transition_duration: 1.0,
            format: OutputFormat::Mp4,
            filename_prefix: "concatenated_video".to_string(),
            validate_transition_overlap: false,
        }
    }
}

impl ConcatConfig {
    /// The configured transition as a validated spec
    pub fn transition_spec(&self) -> Result<TransitionSpec> {
        TransitionSpec::new(self.transition, self.transition_duration)
    }

    fn validate(&self) -> Result<()> {
        if !(MIN_TRANSITION_SECS..=MAX_TRANSITION_SECS).contains(&self.transition_duration) {
            return Err(ConfigError::InvalidValue {
                key: "concat.transition_duration".to_string(),
                value: self.transition_duration.to_string(),
            }
            .into());
        }

        if self.filename_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "concat.filename_prefix".to_string(),
                value: self.filename_prefix.clone(),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("concat.toml");

        let mut original_config = Config::default();
        original_config.concat.transition = TransitionKind::WipeLeft;
        original_config.concat.format = OutputFormat::Webm;

        original_config.save_to_file(&file_path).unwrap();
        let loaded_config = Config::from_file(&file_path).unwrap();

        assert_eq!(loaded_config.concat.transition, TransitionKind::WipeLeft);
        assert_eq!(loaded_config.concat.format, OutputFormat::Webm);
        assert_eq!(loaded_config.engine.timeout_secs, original_config.engine.timeout_secs);
        assert_eq!(loaded_config.storage.output_dir, original_config.storage.output_dir);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("partial.toml");
        std::fs::write(&file_path, "[concat]\ntransition = \"fade\"\n").unwrap();

        let config = Config::from_file(&file_path).unwrap();
        assert_eq!(config.concat.transition, TransitionKind::Fade);
        assert_eq!(config.concat.filename_prefix, "concatenated_video");
        assert_eq!(config.engine.ffmpeg, PathBuf::from("ffmpeg"));
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_file("/definitely/not/here.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_transition_duration() {
        let mut config = Config::default();
        config.concat.transition_duration = 12.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.engine.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
