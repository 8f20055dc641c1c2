use crate::process::RunStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Input and output paths settled by the prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPaths {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Output name offered as the default, without extension.
    pub suggested: String,
}

/// Summary of one launcher run.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchReport {
    pub paths: ResolvedPaths,
    pub interpreter: String,
    pub environment_created: bool,
    pub dependencies_installed: bool,
    /// `None` when the extractor was not run (dry run).
    pub extractor: Option<RunStatus>,
    #[serde(serialize_with = "serialize_duration_ms")]
    pub duration: Duration,
    pub finished_at: DateTime<Utc>,
}

impl LaunchReport {
    pub fn extractor_succeeded(&self) -> bool {
        self.extractor.map(|s| s.success).unwrap_or(false)
    }

    pub fn is_dry_run(&self) -> bool {
        self.extractor.is_none()
    }
}

fn serialize_duration_ms<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}
