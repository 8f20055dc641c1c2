use thiserror::Error;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("No Python interpreter found (tried: {})", .candidates.join(", "))]
    InterpreterNotFound { candidates: Vec<String> },

    #[error("Failed to create virtual environment at {path}: {message}")]
    EnvironmentCreation { path: String, message: String },

    #[error("Dependency installation failed during '{step}'")]
    InstallFailed { step: String, code: Option<i32> },

    #[error("Input file not found: {path}")]
    InputNotFound { path: String },

    #[error("Input ended before an answer was given")]
    InputClosed,

    #[error("Extractor exited with status {}", .code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    ExtractorFailed { code: Option<i32> },

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Operation was cancelled by user")]
    Cancelled,
}

impl LauncherError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            LauncherError::Cancelled => 130,
            LauncherError::Config { .. } => 2,
            LauncherError::InstallFailed { .. } => 3,
            LauncherError::ExtractorFailed { code } => match code {
                Some(code) if *code != 0 => *code,
                _ => 1,
            },
            _ => 1,
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for LauncherError {
    fn user_message(&self) -> String {
        match self {
            LauncherError::InterpreterNotFound { .. } => {
                "Python is not installed or not in PATH".to_string()
            }
            LauncherError::InstallFailed { step, code } => match code {
                Some(code) => format!("Dependency installation failed ({}): exit code {}", step, code),
                None => format!("Dependency installation failed ({})", step),
            },
            LauncherError::InputNotFound { path } => {
                format!("File '{}' not found", path)
            }
            LauncherError::Spawn { program, source } => {
                format!("Could not start {}: {}", program, source)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            LauncherError::InterpreterNotFound { .. } => Some(
                "Install Python 3 and make sure it is on your PATH, or pass --python <program>.".to_string()
            ),
            LauncherError::EnvironmentCreation { path, .. } => Some(format!(
                "Remove the partially created '{}' directory and try again. On Debian/Ubuntu the python3-venv package may be missing.",
                path
            )),
            LauncherError::InstallFailed { .. } => Some(
                "Check your network connection and the contents of the requirements file, or rerun with --skip-install.".to_string()
            ),
            LauncherError::InputClosed => Some(
                "Answer both prompts on standard input, one line each.".to_string()
            ),
            LauncherError::InputNotFound { .. } => Some(
                "Run the launcher from the directory containing your report, or type the full path to the file.".to_string()
            ),
            LauncherError::ExtractorFailed { .. } => Some(
                "See the extractor output above for details.".to_string()
            ),
            LauncherError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for LauncherError {
    fn from(error: toml::de::Error) -> Self {
        LauncherError::Config {
            message: error.to_string(),
        }
    }
}

impl From<globset::Error> for LauncherError {
    fn from(error: globset::Error) -> Self {
        LauncherError::Config {
            message: format!("Invalid input glob: {}", error),
        }
    }
}

pub type Result<T> = std::result::Result<T, LauncherError>;
