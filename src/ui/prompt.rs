use crate::error::{LauncherError, Result};
use console::{style, Term};
use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal};

/// Source of interactive answers.
pub trait InputProvider {
    /// Shows `message` and returns the line the user typed, without the
    /// trailing newline.
    fn prompt(&mut self, message: &str) -> Result<String>;

    /// Waits until the user confirms they have read `message`.
    fn acknowledge(&mut self, message: &str) -> Result<()>;
}

/// Writes prompts to the terminal and reads answers line by line from stdin.
pub struct TerminalInput {
    term: Term,
    use_colors: bool,
}

impl TerminalInput {
    pub fn new() -> Self {
        let term = Term::stderr();
        let use_colors = term.features().colors_supported();
        Self { term, use_colors }
    }

    fn show(&self, message: &str) -> Result<()> {
        if self.use_colors {
            self.term.write_str(&style(message).bold().to_string())?;
        } else {
            self.term.write_str(message)?;
        }
        self.term.flush()?;
        Ok(())
    }
}

impl Default for TerminalInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputProvider for TerminalInput {
    fn prompt(&mut self, message: &str) -> Result<String> {
        self.show(message)?;
        read_answer(&mut io::stdin().lock())
    }

    fn acknowledge(&mut self, message: &str) -> Result<()> {
        // Nobody to wait for when stdin is piped.
        if !io::stdin().is_terminal() {
            return Ok(());
        }

        self.show(message)?;
        read_answer(&mut io::stdin().lock())?;
        Ok(())
    }
}

/// Reads one line, stripping the line terminator.
///
/// End of input is [`LauncherError::InputClosed`] rather than an empty
/// answer, so a closed stdin never silently accepts a default.
pub fn read_answer<R: BufRead + ?Sized>(reader: &mut R) -> Result<String> {
    let mut line = String::new();
    let read = reader.read_line(&mut line).map_err(input_error)?;
    if read == 0 {
        return Err(LauncherError::InputClosed);
    }

    let trimmed = line.trim_end_matches(&['\n', '\r'][..]).len();
    line.truncate(trimmed);
    Ok(line)
}

/// An interrupted read means the user hit Ctrl+C at the prompt.
fn input_error(error: io::Error) -> LauncherError {
    match error.kind() {
        io::ErrorKind::Interrupted => LauncherError::Cancelled,
        _ => LauncherError::Io(error),
    }
}

/// Answers prompts from a fixed script; an exhausted script answers with an
/// empty line.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    answers: VecDeque<std::result::Result<String, io::ErrorKind>>,
    prompts: Vec<String>,
    acknowledged: Vec<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(|a| Ok(a.into())).collect(),
            prompts: Vec::new(),
            acknowledged: Vec::new(),
        }
    }

    /// Queues a read failure of `kind` after the scripted answers.
    pub fn then_fail(mut self, kind: io::ErrorKind) -> Self {
        self.answers.push_back(Err(kind));
        self
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn acknowledged(&self) -> &[String] {
        &self.acknowledged
    }
}

impl InputProvider for ScriptedInput {
    fn prompt(&mut self, message: &str) -> Result<String> {
        self.prompts.push(message.to_string());
        match self.answers.pop_front() {
            Some(Ok(answer)) => Ok(answer),
            Some(Err(kind)) => Err(input_error(io::Error::from(kind))),
            None => Ok(String::new()),
        }
    }

    fn acknowledge(&mut self, message: &str) -> Result<()> {
        self.acknowledged.push(message.to_string());
        Ok(())
    }
}
