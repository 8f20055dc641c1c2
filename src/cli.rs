use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "citelaunch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Set up the citation extractor and run it on a report")]
#[command(
    long_about = "citelaunch prepares a Python virtual environment for the citation extractor, \
                  installs its dependencies, asks which JSON report to process and where to \
                  write the DOI list, then runs the extractor."
)]
#[command(after_help = "EXAMPLES:\n  \
    citelaunch\n  \
    citelaunch --skip-install\n  \
    citelaunch --python python3.12 --venv .venv\n  \
    citelaunch --dry-run -v")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Python interpreter used to create the environment
    #[arg(long, env = "CITELAUNCH_PYTHON")]
    pub python: Option<String>,

    /// Virtual environment directory
    #[arg(long = "venv")]
    pub venv_dir: Option<PathBuf>,

    /// Requirements file installed into the environment
    #[arg(long)]
    pub requirements: Option<PathBuf>,

    /// Extractor script to run
    #[arg(long)]
    pub extractor: Option<PathBuf>,

    /// Skip upgrading pip and installing requirements
    #[arg(long)]
    pub skip_install: bool,

    /// Resolve paths and show the extractor command without running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Exit immediately on errors instead of waiting for Enter
    #[arg(long)]
    pub no_pause: bool,

    /// Output format for launcher messages
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only prompts and errors)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self, base_dir: &Path) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref(), base_dir)?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_python(self.python.clone())
            .with_venv_dir(self.venv_dir.clone())
            .with_requirements(self.requirements.clone())
            .with_extractor(self.extractor.clone())
            .with_skip_install(self.skip_install)
            .with_no_pause(self.no_pause)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}
