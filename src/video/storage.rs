use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config::StorageConfig;

/// Storage roots provided by the host.
///
/// Directory accessors create the directory when it does not exist yet.
pub trait StorageRoots: Send + Sync {
    fn output_dir(&self) -> io::Result<PathBuf>;

    fn input_dir(&self) -> io::Result<PathBuf>;

    fn temp_dir(&self) -> io::Result<PathBuf>;

    /// Resolve a host-managed asset identifier such as `"clip.mp4 [output]"`.
    /// The returned path is not checked for existence.
    fn annotated_filepath(&self, name: &str) -> Option<PathBuf>;

    /// Pick a fresh `{prefix}_{YYYYMMDD}_{NN}.{extension}` path in the output
    /// directory. Uniqueness is only checked against files already on disk.
    fn allocate_output_path(&self, prefix: &str, extension: &str) -> io::Result<PathBuf> {
        let dir = self.output_dir()?;
        Ok(next_free_path(&dir, prefix, &Local::now().format("%Y%m%d").to_string(), extension))
    }
}

fn next_free_path(dir: &Path, prefix: &str, date: &str, extension: &str) -> PathBuf {
    let mut sequence = 1u32;
    loop {
        let candidate = dir.join(format!("{}_{}_{:02}.{}", prefix, date, sequence, extension));
        if !candidate.exists() {
            return candidate;
        }
        sequence += 1;
    }
}

fn ensure_dir(path: &Path) -> io::Result<PathBuf> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(path.to_path_buf())
}

/// Storage roots on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalStorage {
    output_dir: PathBuf,
    input_dir: PathBuf,
    temp_dir: PathBuf,
}

impl LocalStorage {
    pub fn new<P: Into<PathBuf>>(output_dir: P, input_dir: P, temp_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
            input_dir: input_dir.into(),
            temp_dir: temp_dir.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(
            config.output_dir.clone(),
            config.input_dir.clone(),
            config.temp_dir.clone(),
        )
    }

    /// Split `"name [kind]"` into the bare name and its annotation
    fn split_annotation(name: &str) -> (&str, Option<&str>) {
        let trimmed = name.trim_end();
        for kind in ["output", "input", "temp"] {
            let suffix = format!("[{}]", kind);
            if let Some(stripped) = trimmed.strip_suffix(suffix.as_str()) {
                return (stripped.trim_end(), Some(kind));
            }
        }
        (name, None)
    }
}

impl StorageRoots for LocalStorage {
    fn output_dir(&self) -> io::Result<PathBuf> {
        ensure_dir(&self.output_dir)
    }

    fn input_dir(&self) -> io::Result<PathBuf> {
        ensure_dir(&self.input_dir)
    }

    fn temp_dir(&self) -> io::Result<PathBuf> {
        ensure_dir(&self.temp_dir)
    }

    fn annotated_filepath(&self, name: &str) -> Option<PathBuf> {
        let (bare, annotation) = Self::split_annotation(name);
        if bare.is_empty() {
            return None;
        }

        let base = match annotation {
            Some("output") => &self.output_dir,
            Some("temp") => &self.temp_dir,
            _ => &self.input_dir,
        };
        Some(base.join(bare))
    }
}
