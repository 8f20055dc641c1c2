use citelaunch::{Cli, Launcher, OutputFormatter, OutputMode, SystemRunner, TerminalInput, UserFriendlyError};
use clap::Parser;
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let launcher = match Launcher::from_cli(&cli) {
        Ok(launcher) => launcher,
        Err(e) => {
            let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
            formatter.print_user_friendly_error(&e);
            return e.exit_code();
        }
    };

    let mut input = TerminalInput::new();
    let mut runner = SystemRunner::new();

    match launcher.run(&mut input, &mut runner) {
        Ok(report) => {
            launcher.output_formatter().print_launch_report(&report);
            0
        }
        Err(e) => {
            launcher.handle_error(&e);
            launcher.acknowledge_failure(&e, &mut input);
            e.exit_code()
        }
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "citelaunch.toml".to_string());

    match Launcher::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nEdit the file to customize settings, then run:");
            println!("  citelaunch --config {}", config_path);
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}
