use crate::error::{LauncherError, Result};
use crate::process::{CommandRunner, CommandSpec, StdioMode};

/// A Python interpreter that answered `--version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    pub program: String,
}

impl Interpreter {
    pub fn command(&self) -> CommandSpec {
        CommandSpec::new(&self.program)
    }
}

pub fn probe_command(program: &str) -> CommandSpec {
    CommandSpec::new(program)
        .arg("--version")
        .with_stdio(StdioMode::Silent)
}

/// Returns the first candidate that runs `--version` successfully.
///
/// Candidates that cannot be spawned at all are skipped the same way as
/// candidates that exit non-zero.
pub fn find_interpreter<R: CommandRunner + ?Sized>(
    candidates: &[String],
    runner: &mut R,
) -> Result<Interpreter> {
    for program in candidates.iter().filter(|c| !c.trim().is_empty()) {
        match runner.run(&probe_command(program)) {
            Ok(status) if status.success => {
                return Ok(Interpreter {
                    program: program.clone(),
                })
            }
            Ok(_) | Err(LauncherError::Spawn { .. }) => continue,
            Err(e) => return Err(e),
        }
    }

    Err(LauncherError::InterpreterNotFound {
        candidates: candidates.to_vec(),
    })
}
