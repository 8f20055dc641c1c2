use crate::error::{LauncherError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_FALLBACK_NAME: &str = "citations_dois";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub environment: EnvironmentConfig,
    pub install: InstallConfig,
    pub extractor: ExtractorConfig,
    pub prompts: PromptConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub interpreters: Vec<String>,
    pub venv_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InstallConfig {
    pub enabled: bool,
    pub requirements: PathBuf,
    pub upgrade_pip: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub script: PathBuf,
    pub propagate_exit_code: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PromptConfig {
    pub input_glob: String,
    pub fallback_name: String,
    pub max_name_length: usize,
    pub pause_on_error: bool,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            interpreters: vec!["python3".to_string(), "python".to_string()],
            venv_dir: PathBuf::from("venv"),
        }
    }
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requirements: PathBuf::from("requirements.txt"),
            upgrade_pip: true,
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            script: PathBuf::from("extract_citations.py"),
            propagate_exit_code: true,
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            input_glob: "*.json".to_string(),
            fallback_name: DEFAULT_FALLBACK_NAME.to_string(),
            max_name_length: 50,
            pause_on_error: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(LauncherError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| LauncherError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| LauncherError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    /// Loads the explicit file if given, else the first default file found in
    /// `base_dir`, else built-in defaults.
    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>, base_dir: &Path) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["citelaunch.toml", ".citelaunch.toml"];

                for default_path in &default_paths {
                    let candidate = base_dir.join(default_path);
                    if candidate.exists() {
                        return Self::load_from_file(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref python) = cli_args.python {
            self.environment.interpreters = vec![python.clone()];
        }

        if let Some(ref venv_dir) = cli_args.venv_dir {
            self.environment.venv_dir = venv_dir.clone();
        }

        if let Some(ref requirements) = cli_args.requirements {
            self.install.requirements = requirements.clone();
        }

        if cli_args.skip_install {
            self.install.enabled = false;
        }

        if let Some(ref script) = cli_args.extractor {
            self.extractor.script = script.clone();
        }

        if cli_args.no_pause {
            self.prompts.pause_on_error = false;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.environment.interpreters.iter().all(|i| i.trim().is_empty()) {
            return Err(LauncherError::Config {
                message: "At least one Python interpreter must be specified".to_string(),
            });
        }

        if self.environment.venv_dir.as_os_str().is_empty() {
            return Err(LauncherError::Config {
                message: "Virtual environment directory must not be empty".to_string(),
            });
        }

        if self.extractor.script.as_os_str().is_empty() {
            return Err(LauncherError::Config {
                message: "Extractor script path must not be empty".to_string(),
            });
        }

        if self.prompts.fallback_name.trim().is_empty() {
            return Err(LauncherError::Config {
                message: "Fallback output name must not be empty".to_string(),
            });
        }

        if self.prompts.max_name_length == 0 {
            return Err(LauncherError::Config {
                message: "Maximum output name length must be greater than 0".to_string(),
            });
        }

        globset::Glob::new(&self.prompts.input_glob)?;

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub python: Option<String>,
    pub venv_dir: Option<PathBuf>,
    pub requirements: Option<PathBuf>,
    pub extractor: Option<PathBuf>,
    pub skip_install: bool,
    pub no_pause: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_python(mut self, python: Option<String>) -> Self {
        self.python = python;
        self
    }

    pub fn with_venv_dir(mut self, venv_dir: Option<PathBuf>) -> Self {
        self.venv_dir = venv_dir;
        self
    }

    pub fn with_requirements(mut self, requirements: Option<PathBuf>) -> Self {
        self.requirements = requirements;
        self
    }

    pub fn with_extractor(mut self, extractor: Option<PathBuf>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_skip_install(mut self, skip: bool) -> Self {
        self.skip_install = skip;
        self
    }

    pub fn with_no_pause(mut self, no_pause: bool) -> Self {
        self.no_pause = no_pause;
        self
    }
}
