use crate::process::{CommandSpec, StdioMode};
use std::path::{Path, PathBuf};

/// The external citation extractor script.
///
/// Its contract is fixed: exactly two positional arguments, the input report
/// followed by the output text file.
#[derive(Debug, Clone)]
pub struct Extractor {
    script: PathBuf,
    working_dir: Option<PathBuf>,
}

impl Extractor {
    pub fn new<P: Into<PathBuf>>(script: P) -> Self {
        Self {
            script: script.into(),
            working_dir: None,
        }
    }

    /// Directory the extractor runs in; relative input, output and script
    /// paths are interpreted against it.
    pub fn with_working_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    /// `python <script> <input> <output>`, sharing the launcher's terminal.
    pub fn command(&self, python: CommandSpec, input: &Path, output: &Path) -> CommandSpec {
        let spec = python
            .arg(&self.script)
            .arg(input)
            .arg(output)
            .with_stdio(StdioMode::Inherit);

        match self.working_dir {
            Some(ref dir) => spec.current_dir(dir),
            None => spec,
        }
    }
}
