use crate::environment::Interpreter;
use crate::error::{LauncherError, Result};
use crate::process::{CommandRunner, CommandSpec, StdioMode};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// An isolated Python environment rooted at a directory.
#[derive(Debug, Clone)]
pub struct VirtualEnv {
    root: PathBuf,
    active: Arc<AtomicBool>,
}

impl VirtualEnv {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    pub fn bin_dir(&self) -> PathBuf {
        if cfg!(windows) {
            self.root.join("Scripts")
        } else {
            self.root.join("bin")
        }
    }

    pub fn python_path(&self) -> PathBuf {
        if cfg!(windows) {
            self.bin_dir().join("python.exe")
        } else {
            self.bin_dir().join("python")
        }
    }

    /// Runs silently; it sits under a ticking spinner.
    pub fn creation_command(&self, interpreter: &Interpreter) -> CommandSpec {
        interpreter
            .command()
            .args(["-m", "venv"])
            .arg(&self.root)
            .with_stdio(StdioMode::Silent)
    }

    /// Creates the environment unless its directory already exists.
    /// Returns `true` when a new environment was created.
    pub fn ensure<R: CommandRunner + ?Sized>(
        &self,
        interpreter: &Interpreter,
        runner: &mut R,
    ) -> Result<bool> {
        if self.exists() {
            return Ok(false);
        }

        let status = runner
            .run(&self.creation_command(interpreter))
            .map_err(|e| LauncherError::EnvironmentCreation {
                path: self.root.display().to_string(),
                message: e.to_string(),
            })?;

        if !status.success {
            return Err(LauncherError::EnvironmentCreation {
                path: self.root.display().to_string(),
                message: match status.code {
                    Some(code) => format!("venv exited with status {}", code),
                    None => "venv was terminated by a signal".to_string(),
                },
            });
        }

        Ok(true)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Activates the environment for child processes until the returned guard
    /// is deactivated or dropped.
    pub fn activate(&self) -> ActiveEnvironment {
        self.active.store(true, Ordering::SeqCst);
        ActiveEnvironment { env: self.clone() }
    }
}

/// Scoped activation of a [`VirtualEnv`].
///
/// The launcher's own process environment is never modified; instead every
/// command built through [`ActiveEnvironment::python`] or passed to
/// [`ActiveEnvironment::decorate`] gets the variables an `activate` script
/// would export.
#[derive(Debug)]
pub struct ActiveEnvironment {
    env: VirtualEnv,
}

impl ActiveEnvironment {
    /// A command running the environment's own interpreter.
    pub fn python(&self) -> CommandSpec {
        self.decorate(CommandSpec::new(self.env.python_path()))
    }

    pub fn decorate(&self, spec: CommandSpec) -> CommandSpec {
        let root = absolute(&self.env.root);
        let bin_dir = absolute(&self.env.bin_dir());

        let existing = std::env::var_os("PATH").unwrap_or_default();
        let path = std::env::join_paths(
            std::iter::once(bin_dir.clone()).chain(std::env::split_paths(&existing)),
        )
        .unwrap_or_else(|_| bin_dir.into_os_string());

        spec.env("VIRTUAL_ENV", root)
            .env("PATH", path)
            .env_remove("PYTHONHOME")
    }

    pub fn deactivate(self) {
        // Drop does the work.
    }
}

impl Drop for ActiveEnvironment {
    fn drop(&mut self) {
        self.env.active.store(false, Ordering::SeqCst);
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
