use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// One single-shot ffmpeg run: inputs, an optional filter graph, stream maps,
/// encoder options and the output file (always overwritten).
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    inputs: Vec<PathBuf>,
    filter_complex: Option<String>,
    maps: Vec<String>,
    output_args: Vec<String>,
    output: PathBuf,
}

impl Invocation {
    pub fn new<P: Into<PathBuf>>(output: P) -> Self {
        Self {
            inputs: Vec::new(),
            filter_complex: None,
            maps: Vec::new(),
            output_args: Vec::new(),
            output: output.into(),
        }
    }

    pub fn input<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.inputs.push(path.into());
        self
    }

    pub fn filter_complex<S: Into<String>>(mut self, graph: S) -> Self {
        self.filter_complex = Some(graph.into());
        self
    }

    pub fn map<S: Into<String>>(mut self, stream: S) -> Self {
        self.maps.push(stream.into());
        self
    }

    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    pub fn graph(&self) -> Option<&str> {
        self.filter_complex.as_deref()
    }

    pub fn maps(&self) -> &[String] {
        &self.maps
    }

    pub fn encoder_args(&self) -> &[String] {
        &self.output_args
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Full ffmpeg argument list (program name excluded)
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-y"]
            .iter()
            .map(OsString::from)
            .collect();

        for input in &self.inputs {
            args.push("-i".into());
            args.push(input.as_os_str().to_owned());
        }

        if let Some(graph) = &self.filter_complex {
            args.push("-filter_complex".into());
            args.push(graph.into());
        }

        for stream in &self.maps {
            args.push("-map".into());
            args.push(stream.into());
        }

        args.extend(self.output_args.iter().map(OsString::from));
        args.push(self.output.as_os_str().to_owned());
        args
    }
}

/// Captured process output of a successful engine run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutput {
    pub stdout: String,
    pub stderr: String,
}
