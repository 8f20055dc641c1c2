pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod process;
pub mod report;
pub mod resolve;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, EnvironmentConfig, ExtractorConfig, InstallConfig, PromptConfig};
pub use error::{LauncherError, Result, UserFriendlyError};

// Core functionality re-exports
pub use environment::{find_interpreter, ActiveEnvironment, DependencyInstaller, Interpreter, VirtualEnv};
pub use process::{CommandRunner, CommandSpec, Extractor, RunStatus, StdioMode, SystemRunner};
pub use report::{LaunchReport, ResolvedPaths};
pub use ui::{GracefulShutdown, InputProvider, OutputFormatter, OutputMode, ProgressManager, ScriptedInput, TerminalInput};

use std::path::{Path, PathBuf};
use std::time::Instant;

const INPUT_PROMPT: &str = "Enter the JSON report filename: ";
const NO_CANDIDATES: &str = "(no JSON files found)";
const EXIT_PROMPT: &str = "Press Enter to exit...";

/// Prepares the Python environment and runs the citation extractor once.
pub struct Launcher {
    config: Config,
    base_dir: PathBuf,
    environment: VirtualEnv,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
    dry_run: bool,
}

impl Launcher {
    /// Create a launcher working in `base_dir`.
    pub fn new(
        config: Config,
        base_dir: PathBuf,
        output_mode: OutputMode,
        verbose: u8,
        quiet: bool,
    ) -> Result<Self> {
        let shutdown = GracefulShutdown::new()?;
        Ok(Self::with_shutdown(config, base_dir, output_mode, verbose, quiet, shutdown))
    }

    fn with_shutdown(
        config: Config,
        base_dir: PathBuf,
        output_mode: OutputMode,
        verbose: u8,
        quiet: bool,
        shutdown: GracefulShutdown,
    ) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager =
            ProgressManager::new(!quiet && output_mode == OutputMode::Human);
        let environment = VirtualEnv::new(base_dir.join(&config.environment.venv_dir));

        Self {
            config,
            base_dir,
            environment,
            output_formatter,
            progress_manager,
            shutdown,
            dry_run: false,
        }
    }

    /// Create a launcher for testing (no signal handler registration).
    #[cfg(test)]
    pub fn new_for_test(config: Config, base_dir: PathBuf) -> Self {
        Self::with_shutdown(
            config,
            base_dir,
            OutputMode::Plain,
            0,
            true,
            GracefulShutdown::new_for_test(),
        )
    }

    /// Create a launcher from CLI arguments, working in the current directory.
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let base_dir = std::env::current_dir()?;
        let config = cli_args.load_config(&base_dir)?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(
            config,
            base_dir,
            output_mode,
            cli_args.verbosity_level(),
            cli_args.quiet,
        )?
            .with_dry_run(cli_args.dry_run))
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run the whole flow: interpreter check, environment, dependencies,
    /// prompts, extractor.
    ///
    /// The environment is deactivated on every path out of this function once
    /// it has been activated. A non-zero extractor exit is returned as
    /// [`LauncherError::ExtractorFailed`] when `propagate_exit_code` is set.
    pub fn run<I, R>(&self, input: &mut I, runner: &mut R) -> Result<LaunchReport>
    where
        I: InputProvider + ?Sized,
        R: CommandRunner + ?Sized,
    {
        let start_time = Instant::now();
        self.shutdown.check_shutdown()?;

        self.output_formatter.start_operation("Checking for Python");
        let interpreter = find_interpreter(&self.config.environment.interpreters, runner)?;
        self.output_formatter
            .debug(&format!("Using interpreter: {}", interpreter.program));

        if self.dry_run {
            return self.plan_only(&interpreter, input, start_time);
        }

        let environment_created = self.progress_manager.with_spinner(
            "Setting up virtual environment",
            || self.environment.ensure(&interpreter, runner),
        )?;
        if environment_created {
            self.output_formatter.success(&format!(
                "Created virtual environment: {}",
                self.environment.root().display()
            ));
        } else {
            self.output_formatter.debug(&format!(
                "Reusing virtual environment: {}",
                self.environment.root().display()
            ));
        }

        let active = self.environment.activate();
        let outcome = self.run_activated(&active, input, runner);
        active.deactivate();
        self.output_formatter.debug("Deactivated virtual environment");

        let (paths, status, dependencies_installed) = outcome?;

        self.output_formatter.print_output_path(&paths.output);

        if !status.success && self.config.extractor.propagate_exit_code {
            return Err(LauncherError::ExtractorFailed { code: status.code });
        }

        Ok(LaunchReport {
            paths,
            interpreter: interpreter.program,
            environment_created,
            dependencies_installed,
            extractor: Some(status),
            duration: start_time.elapsed(),
            finished_at: chrono::Utc::now(),
        })
    }

    fn run_activated<I, R>(
        &self,
        active: &ActiveEnvironment,
        input: &mut I,
        runner: &mut R,
    ) -> Result<(ResolvedPaths, RunStatus, bool)>
    where
        I: InputProvider + ?Sized,
        R: CommandRunner + ?Sized,
    {
        let dependencies_installed = if self.config.install.enabled {
            let installer = DependencyInstaller::from_config(&self.config.install, &self.base_dir);
            self.progress_manager
                .with_spinner("Installing dependencies", || installer.install(active, runner))?;
            true
        } else {
            self.output_formatter.debug("Skipping dependency installation");
            false
        };
        self.shutdown.check_shutdown()?;

        let paths = self.resolve_paths(input)?;

        let spec = self
            .extractor()
            .command(active.python(), &paths.input, &paths.output);
        self.output_formatter.start_operation("Extracting citations");
        self.output_formatter.debug(&spec.display());

        let status = runner.run(&spec)?;
        Ok((paths, status, dependencies_installed))
    }

    fn plan_only<I>(
        &self,
        interpreter: &Interpreter,
        input: &mut I,
        start_time: Instant,
    ) -> Result<LaunchReport>
    where
        I: InputProvider + ?Sized,
    {
        self.output_formatter
            .info("DRY RUN MODE - nothing will be installed or executed");

        let paths = self.resolve_paths(input)?;
        let extractor = self.extractor();
        let spec = extractor.command(
            CommandSpec::new(self.environment.python_path()),
            &paths.input,
            &paths.output,
        );

        if !self.base_dir.join(extractor.script()).is_file() {
            self.output_formatter.warning(&format!(
                "Extractor script not found: {}",
                extractor.script().display()
            ));
        }

        self.output_formatter.info("Extractor command:");
        self.output_formatter.info(&spec.display());
        if !self.environment.exists() {
            self.output_formatter.info(&format!(
                "Would create virtual environment: {}",
                self.environment.root().display()
            ));
        }

        Ok(LaunchReport {
            paths,
            interpreter: interpreter.program.clone(),
            environment_created: false,
            dependencies_installed: false,
            extractor: None,
            duration: start_time.elapsed(),
            finished_at: chrono::Utc::now(),
        })
    }

    /// Ask for the input report and output filename.
    pub fn resolve_paths<I>(&self, input: &mut I) -> Result<ResolvedPaths>
    where
        I: InputProvider + ?Sized,
    {
        let prompts = &self.config.prompts;

        let candidates = resolve::list_candidates(&self.base_dir, &prompts.input_glob)?;
        self.output_formatter
            .print_candidates("Available JSON files:", &candidates, NO_CANDIDATES);

        let answer = self.ask(input, INPUT_PROMPT)?;
        let input_path = resolve::resolve_input(&self.base_dir, &answer)?;

        let hint = resolve::read_query_hint(&self.base_dir.join(&input_path));
        if let Err(ref e) = hint {
            self.output_formatter
                .debug(&format!("No query hint ({}), using '{}'", e, prompts.fallback_name));
        }
        let suggested = resolve::suggest_output_name(
            hint.as_deref(),
            &prompts.fallback_name,
            prompts.max_name_length,
        );

        let answer = self.ask(
            input,
            &format!(
                "Enter output filename [{}{}]: ",
                suggested,
                resolve::output::OUTPUT_EXTENSION
            ),
        )?;
        let output = PathBuf::from(resolve::normalize_output_name(&answer, &suggested));

        Ok(ResolvedPaths {
            input: input_path,
            output,
            suggested,
        })
    }

    /// Ctrl+C at a line prompt only lands once the line is submitted, so the
    /// shutdown flag is checked after every answer.
    fn ask<I>(&self, input: &mut I, message: &str) -> Result<String>
    where
        I: InputProvider + ?Sized,
    {
        let answer = input.prompt(message)?;
        self.shutdown.check_shutdown()?;
        Ok(answer)
    }

    /// After a fatal error, wait for the user before the window closes.
    pub fn acknowledge_failure<I>(&self, error: &LauncherError, input: &mut I)
    where
        I: InputProvider + ?Sized,
    {
        if !self.config.prompts.pause_on_error || matches!(error, LauncherError::Cancelled) {
            return;
        }

        // A broken terminal here changes nothing about the exit status.
        let _ = input.acknowledge(EXIT_PROMPT);
    }

    fn extractor(&self) -> Extractor {
        Extractor::new(&self.config.extractor.script).with_working_dir(&self.base_dir)
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    pub fn environment(&self) -> &VirtualEnv {
        &self.environment
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &LauncherError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::RecordingRunner;
    use std::ffi::OsString;
    use std::fs;
    use tempfile::TempDir;

    /// A working directory with a report, requirements and an existing venv.
    fn workspace(report: &str) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("report.json"), report).unwrap();
        fs::write(temp_dir.path().join("requirements.txt"), "requests\n").unwrap();
        fs::create_dir(temp_dir.path().join("venv")).unwrap();
        temp_dir
    }

    fn launcher(dir: &TempDir) -> Launcher {
        Launcher::new_for_test(Config::default(), dir.path().to_path_buf())
    }

    fn extractor_args(call: &CommandSpec) -> Vec<OsString> {
        call.args.clone()
    }

    #[test]
    fn test_accepting_suggested_output_name() {
        let dir = workspace(r#"{"query": "COVID-19 Variants"}"#);
        let launcher = launcher(&dir);
        let mut input = ScriptedInput::new(["report.json", ""]);
        let mut runner = RecordingRunner::new();

        let report = launcher.run(&mut input, &mut runner).unwrap();

        assert_eq!(report.paths.input, PathBuf::from("report.json"));
        assert_eq!(report.paths.output, PathBuf::from("COVID19_Variants.txt"));
        assert_eq!(input.prompts()[1], "Enter output filename [COVID19_Variants.txt]: ");

        // probe, pip upgrade, pip install, extractor
        assert_eq!(runner.calls.len(), 4);
        let extractor_call = runner.calls.last().unwrap();
        assert_eq!(
            extractor_args(extractor_call),
            vec!["extract_citations.py", "report.json", "COVID19_Variants.txt"]
        );
        assert_eq!(extractor_call.current_dir.as_deref(), Some(dir.path()));
        assert_eq!(
            extractor_call.program,
            launcher.environment().python_path().into_os_string()
        );
        assert!(!launcher.environment().is_active());
        assert!(report.extractor_succeeded());
        assert!(report.dependencies_installed);
        assert!(!report.environment_created);
    }

    #[test]
    fn test_missing_input_file() {
        let dir = workspace("{}");
        let launcher = launcher(&dir);
        let mut input = ScriptedInput::new(["missing"]);
        let mut runner = RecordingRunner::new();

        let error = launcher.run(&mut input, &mut runner).unwrap_err();

        match &error {
            LauncherError::InputNotFound { path } => assert_eq!(path, "missing.json"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_ne!(error.exit_code(), 0);
        assert!(!launcher.environment().is_active());
        // probe + two pip steps, never the extractor
        assert_eq!(runner.calls.len(), 3);
        assert!(runner
            .calls
            .iter()
            .all(|c| !c.args.contains(&OsString::from("extract_citations.py"))));
    }

    #[test]
    fn test_custom_output_name_without_extension() {
        let dir = workspace(r#"{"query": "Anything"}"#);
        let launcher = launcher(&dir);
        let mut input = ScriptedInput::new(["report", "my_refs"]);
        let mut runner = RecordingRunner::new();

        let report = launcher.run(&mut input, &mut runner).unwrap();
        assert_eq!(report.paths.input, PathBuf::from("report.json"));
        assert_eq!(report.paths.output, PathBuf::from("my_refs.txt"));
    }

    #[test]
    fn test_malformed_report_uses_fallback_name() {
        let dir = workspace("{ not json");
        let launcher = launcher(&dir);
        let mut input = ScriptedInput::new(["report.json", ""]);
        let mut runner = RecordingRunner::new();

        let report = launcher.run(&mut input, &mut runner).unwrap();
        assert_eq!(report.paths.suggested, "citations_dois");
        assert_eq!(report.paths.output, PathBuf::from("citations_dois.txt"));
    }

    #[test]
    fn test_missing_interpreter_stops_immediately() {
        let dir = workspace("{}");
        let launcher = launcher(&dir);
        let mut input = ScriptedInput::new(["report.json", ""]);
        let mut runner = RecordingRunner::new()
            .fail_spawn(std::io::ErrorKind::NotFound)
            .fail_spawn(std::io::ErrorKind::NotFound);

        let error = launcher.run(&mut input, &mut runner).unwrap_err();

        assert!(matches!(error, LauncherError::InterpreterNotFound { .. }));
        assert_eq!(error.exit_code(), 1);
        assert!(input.prompts().is_empty());
        assert_eq!(runner.calls.len(), 2);
    }

    #[test]
    fn test_creates_environment_when_missing() {
        let dir = workspace("{}");
        fs::remove_dir(dir.path().join("venv")).unwrap();
        let launcher = launcher(&dir);
        let mut input = ScriptedInput::new(["report.json", ""]);
        let mut runner = RecordingRunner::new();

        let report = launcher.run(&mut input, &mut runner).unwrap();

        assert!(report.environment_created);
        let venv_call = &runner.calls[1];
        assert_eq!(venv_call.args[0], OsString::from("-m"));
        assert_eq!(venv_call.args[1], OsString::from("venv"));
    }

    #[test]
    fn test_install_failure_deactivates_and_skips_prompts() {
        let dir = workspace("{}");
        let launcher = launcher(&dir);
        let mut input = ScriptedInput::new(["report.json", ""]);
        let mut runner = RecordingRunner::new().respond(0).respond(0).respond(1);

        let error = launcher.run(&mut input, &mut runner).unwrap_err();

        assert!(matches!(error, LauncherError::InstallFailed { code: Some(1), .. }));
        assert_eq!(error.exit_code(), 3);
        assert!(!launcher.environment().is_active());
        assert!(input.prompts().is_empty());
    }

    #[test]
    fn test_extractor_failure_is_propagated() {
        let dir = workspace("{}");
        let launcher = launcher(&dir);
        let mut input = ScriptedInput::new(["report.json", ""]);
        // probe, pip upgrade, pip install, extractor
        let mut runner = RecordingRunner::new()
            .respond(0)
            .respond(0)
            .respond(0)
            .respond(4);

        let error = launcher.run(&mut input, &mut runner).unwrap_err();

        assert!(matches!(error, LauncherError::ExtractorFailed { code: Some(4) }));
        assert_eq!(error.exit_code(), 4);
        assert!(!launcher.environment().is_active());
    }

    #[test]
    fn test_extractor_failure_ignored_when_propagation_disabled() {
        let dir = workspace("{}");
        let mut config = Config::default();
        config.extractor.propagate_exit_code = false;
        let launcher = Launcher::new_for_test(config, dir.path().to_path_buf());
        let mut input = ScriptedInput::new(["report.json", ""]);
        let mut runner = RecordingRunner::new()
            .respond(0)
            .respond(0)
            .respond(0)
            .respond(4);

        let report = launcher.run(&mut input, &mut runner).unwrap();
        assert!(!report.extractor_succeeded());
    }

    #[test]
    fn test_skip_install() {
        let dir = workspace("{}");
        let mut config = Config::default();
        config.install.enabled = false;
        let launcher = Launcher::new_for_test(config, dir.path().to_path_buf());
        let mut input = ScriptedInput::new(["report.json", ""]);
        let mut runner = RecordingRunner::new();

        let report = launcher.run(&mut input, &mut runner).unwrap();

        assert!(!report.dependencies_installed);
        assert_eq!(runner.calls.len(), 2);
    }

    #[test]
    fn test_dry_run_spawns_only_the_probe() {
        let dir = workspace(r#"{"query": "Ocean Acidification"}"#);
        fs::remove_dir(dir.path().join("venv")).unwrap();
        let launcher = launcher(&dir).with_dry_run(true);
        let mut input = ScriptedInput::new(["report", ""]);
        let mut runner = RecordingRunner::new();

        let report = launcher.run(&mut input, &mut runner).unwrap();

        assert!(report.is_dry_run());
        assert_eq!(report.paths.output, PathBuf::from("Ocean_Acidification.txt"));
        assert_eq!(runner.calls.len(), 1);
        assert!(!dir.path().join("venv").exists());
    }

    #[test]
    fn test_cancelled_before_start() {
        let dir = workspace("{}");
        let launcher = launcher(&dir);
        launcher.request_shutdown();
        let mut input = ScriptedInput::new(["report.json", ""]);
        let mut runner = RecordingRunner::new();

        let error = launcher.run(&mut input, &mut runner).unwrap_err();

        assert!(matches!(error, LauncherError::Cancelled));
        assert!(runner.calls.is_empty());
    }

    /// Requests shutdown once the wrapped runner has seen `after` commands.
    struct CancellingRunner<'a> {
        inner: RecordingRunner,
        launcher: &'a Launcher,
        after: usize,
    }

    impl CommandRunner for CancellingRunner<'_> {
        fn run(&mut self, spec: &CommandSpec) -> Result<RunStatus> {
            let status = self.inner.run(spec);
            if self.inner.calls.len() == self.after {
                self.launcher.request_shutdown();
            }
            status
        }
    }

    #[test]
    fn test_cancelled_during_install_deactivates() {
        let dir = workspace("{}");
        let launcher = launcher(&dir);
        let mut input = ScriptedInput::new(["report.json", ""]);
        // interpreter check, then Ctrl+C while pip upgrades itself
        let mut runner = CancellingRunner {
            inner: RecordingRunner::new(),
            launcher: &launcher,
            after: 2,
        };

        let error = launcher.run(&mut input, &mut runner).unwrap_err();

        assert!(matches!(error, LauncherError::Cancelled));
        assert_eq!(error.exit_code(), 130);
        assert!(!launcher.environment().is_active());
        assert!(input.prompts().is_empty());
        // the running install step finishes, the extractor never starts
        assert_eq!(runner.inner.calls.len(), 3);
        assert!(runner
            .inner
            .calls
            .iter()
            .all(|c| !c.args.contains(&OsString::from("extract_citations.py"))));

        launcher.acknowledge_failure(&error, &mut input);
        assert!(input.acknowledged().is_empty());
    }

    #[test]
    fn test_interrupt_at_prompt_cancels() {
        let dir = workspace("{}");
        let launcher = launcher(&dir);
        let mut input =
            ScriptedInput::new(["report.json"]).then_fail(std::io::ErrorKind::Interrupted);
        let mut runner = RecordingRunner::new();

        let error = launcher.run(&mut input, &mut runner).unwrap_err();

        assert!(matches!(error, LauncherError::Cancelled));
        assert_eq!(error.exit_code(), 130);
        assert!(!launcher.environment().is_active());
        assert_eq!(input.prompts().len(), 2);
        assert_eq!(runner.calls.len(), 3);
    }

    /// Simulates the Ctrl+C handler firing while a prompt waits for a line.
    struct InterruptingInput<'a> {
        inner: ScriptedInput,
        launcher: &'a Launcher,
    }

    impl InputProvider for InterruptingInput<'_> {
        fn prompt(&mut self, message: &str) -> Result<String> {
            let answer = self.inner.prompt(message);
            self.launcher.request_shutdown();
            answer
        }

        fn acknowledge(&mut self, message: &str) -> Result<()> {
            self.inner.acknowledge(message)
        }
    }

    #[test]
    fn test_ctrl_c_while_typing_cancels_after_answer() {
        let dir = workspace("{}");
        let launcher = launcher(&dir);
        let mut input = InterruptingInput {
            inner: ScriptedInput::new(["report.json", ""]),
            launcher: &launcher,
        };
        let mut runner = RecordingRunner::new();

        let error = launcher.run(&mut input, &mut runner).unwrap_err();

        assert!(matches!(error, LauncherError::Cancelled));
        assert_eq!(input.inner.prompts().len(), 1);
        assert!(!launcher.environment().is_active());
        assert_eq!(runner.calls.len(), 3);
    }

    #[test]
    fn test_acknowledge_failure() {
        let dir = workspace("{}");
        let launcher = launcher(&dir);
        let mut input = ScriptedInput::new(Vec::<String>::new());

        launcher.acknowledge_failure(&LauncherError::InputNotFound { path: "x.json".into() }, &mut input);
        assert_eq!(input.acknowledged(), &[EXIT_PROMPT]);

        launcher.acknowledge_failure(&LauncherError::Cancelled, &mut input);
        assert_eq!(input.acknowledged().len(), 1);

        let mut config = Config::default();
        config.prompts.pause_on_error = false;
        let no_pause = Launcher::new_for_test(config, dir.path().to_path_buf());
        let mut input = ScriptedInput::new(Vec::<String>::new());
        no_pause.acknowledge_failure(&LauncherError::InputNotFound { path: "x.json".into() }, &mut input);
        assert!(input.acknowledged().is_empty());
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("citelaunch.toml");

        Launcher::generate_sample_config(&config_path).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[environment]"));
        assert!(content.contains("[extractor]"));
    }
}
