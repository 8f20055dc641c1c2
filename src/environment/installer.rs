use crate::config::InstallConfig;
use crate::environment::ActiveEnvironment;
use crate::error::{LauncherError, Result};
use crate::process::{CommandRunner, CommandSpec};
use std::path::{Path, PathBuf};

/// Installs the extractor's Python dependencies into an active environment.
#[derive(Debug, Clone)]
pub struct DependencyInstaller {
    requirements: PathBuf,
    upgrade_pip: bool,
}

impl DependencyInstaller {
    pub fn new<P: Into<PathBuf>>(requirements: P) -> Self {
        Self {
            requirements: requirements.into(),
            upgrade_pip: true,
        }
    }

    pub fn from_config(config: &InstallConfig, base_dir: &Path) -> Self {
        Self::new(base_dir.join(&config.requirements)).with_upgrade_pip(config.upgrade_pip)
    }

    pub fn with_upgrade_pip(mut self, upgrade: bool) -> Self {
        self.upgrade_pip = upgrade;
        self
    }

    /// The pip invocations in the order they run.
    pub fn plan(&self, env: &ActiveEnvironment) -> Vec<(String, CommandSpec)> {
        let mut steps = Vec::new();

        if self.upgrade_pip {
            steps.push((
                "upgrade pip".to_string(),
                env.python()
                    .args(["-m", "pip", "install", "--quiet", "--upgrade", "pip"]),
            ));
        }

        steps.push((
            format!("install {}", self.requirements_name()),
            env.python()
                .args(["-m", "pip", "install", "--quiet", "-r"])
                .arg(&self.requirements),
        ));

        steps
    }

    /// Runs every step, stopping at the first failure.
    pub fn install<R: CommandRunner + ?Sized>(
        &self,
        env: &ActiveEnvironment,
        runner: &mut R,
    ) -> Result<()> {
        if !self.requirements.is_file() {
            return Err(LauncherError::InstallFailed {
                step: format!("read {}", self.requirements.display()),
                code: None,
            });
        }

        for (step, spec) in self.plan(env) {
            let status = runner.run(&spec)?;
            if !status.success {
                return Err(LauncherError::InstallFailed {
                    step,
                    code: status.code,
                });
            }
        }

        Ok(())
    }

    fn requirements_name(&self) -> String {
        self.requirements
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.requirements.display().to_string())
    }
}
