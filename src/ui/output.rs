use crate::error::{LauncherError, UserFriendlyError};
use crate::report::LaunchReport;
use console::{style, Emoji, Term};
use crate::ui::progress::format_duration;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Success, message),
                OutputMode::Json => self.print_json_message("success", message),
                OutputMode::Plain => println!("SUCCESS: {}", message),
            }
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    // User-friendly error handling
    pub fn print_user_friendly_error(&self, error: &LauncherError) {
        self.error(&error.user_message());

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    /// Lists candidate input files ahead of the filename prompt.
    pub fn print_candidates(&self, title: &str, candidates: &[PathBuf], placeholder: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Json => {
                let files: Vec<String> = candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect();
                self.print_json_object(&serde_json::json!({
                    "type": "candidates",
                    "files": files
                }));
            }
            OutputMode::Human | OutputMode::Plain => {
                println!();
                if self.use_colors {
                    println!("{}", style(title).bold());
                } else {
                    println!("{}", title);
                }

                if candidates.is_empty() {
                    println!("  {}", placeholder);
                }
                for candidate in candidates {
                    println!("  {}", candidate.display());
                }
                println!();
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {} // No separator in JSON mode
        }
    }

    /// Where the citations were written. Shown even in quiet mode.
    pub fn print_output_path(&self, path: &Path) {
        println!("{}", self.output_path_line(path));
    }

    fn output_path_line(&self, path: &Path) -> String {
        let path = path.display().to_string();
        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    format!("{}Citations saved to: {}", CHECKMARK, self.highlight(&path))
                } else {
                    format!("✓ Citations saved to: {}", path)
                }
            }
            OutputMode::Json => serde_json::json!({
                "type": "output",
                "path": path
            })
            .to_string(),
            OutputMode::Plain => format!("OUTPUT: {}", path),
        }
    }

    pub fn print_launch_report(&self, report: &LaunchReport) {
        match self.mode {
            OutputMode::Human => {
                if !self.quiet {
                    self.print_human_report(report)
                }
            }
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => self.print_plain_report(report),
        }
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_report(&self, report: &LaunchReport) {
        println!();
        self.print_separator();

        let headline = if report.is_dry_run() {
            "Dry run completed"
        } else {
            "Citation extraction finished"
        };
        if self.use_colors {
            println!("{} {}", style(headline).green().bold(), CHECKMARK);
        } else {
            println!("✓ {}", headline);
        }

        println!();
        println!("  Input:       {}", report.paths.input.display());
        println!("  Output:      {}", self.highlight(&report.paths.output.display().to_string()));
        println!("  Interpreter: {}", report.interpreter);
        if report.environment_created {
            println!("  Environment: created");
        }
        if let Some(status) = report.extractor {
            if let Some(code) = status.code {
                println!("  Exit status: {}", code);
            }
        }
        println!("  Time taken:  {}", format_duration(report.duration));

        self.print_separator();
    }

    fn print_plain_report(&self, report: &LaunchReport) {
        if report.is_dry_run() {
            println!("COMPLETED: Dry run");
        } else {
            println!("COMPLETED: Citation extraction");
        }
        println!("Input: {}", report.paths.input.display());
        println!("Output: {}", report.paths.output.display());
        println!("Duration: {:?}", report.duration);
    }

    fn highlight(&self, text: &str) -> String {
        if self.use_colors {
            style(text).cyan().bold().to_string()
        } else {
            text.to_string()
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_mode() {
        let formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert_eq!(formatter.verbose_level, 0);
        assert!(formatter.quiet);
        assert!(!formatter.use_colors);
    }

    #[test]
    fn test_output_path_survives_quiet_mode() {
        let path = Path::new("COVID19_Variants.txt");

        let plain = OutputFormatter::new(OutputMode::Plain, 0, true);
        assert!(!plain.should_show_message(0));
        assert_eq!(plain.output_path_line(path), "OUTPUT: COVID19_Variants.txt");

        let human = OutputFormatter::new(OutputMode::Human, 0, true);
        assert_eq!(
            human.output_path_line(path),
            "✓ Citations saved to: COVID19_Variants.txt"
        );

        let json = OutputFormatter::new(OutputMode::Json, 0, true);
        let value: serde_json::Value = serde_json::from_str(&json.output_path_line(path)).unwrap();
        assert_eq!(value["type"], "output");
        assert_eq!(value["path"], "COVID19_Variants.txt");
    }

    #[test]
    fn test_should_show_message() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 1, false);
        assert!(formatter.should_show_message(0));
        assert!(formatter.should_show_message(1));
        assert!(!formatter.should_show_message(2));

        let quiet_formatter = OutputFormatter::new(OutputMode::Plain, 1, true);
        assert!(!quiet_formatter.should_show_message(0));
    }
}
