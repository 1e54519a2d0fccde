//! Shardfold CLI Binary
//!
//! Command-line interface for merging sharded artifacts and comparing hash trees.

use shardfold::cli::{exit_code, map_error, Cli, Outcome, RunContext};
use shardfold::config::ConfigLoader;
use shardfold::logging::{init_logging, LoggingConfig};
use std::path::Path;
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::try_parse_with_default(std::env::args_os()).unwrap_or_else(|e| e.exit());

    let logging_config = build_logging_config(&cli);
    if let Err(e) = init_logging(&logging_config) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(2);
    }

    let context = match RunContext::new(Path::new("."), cli.config.as_deref()) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error loading configuration: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(exit_code(&e));
        }
    };

    match context.execute(&cli.command) {
        Ok(outcome) => {
            info!(exit_code = outcome.exit_code(), "Command completed");
            match &outcome {
                Outcome::Success(text) if text.is_empty() => {}
                Outcome::Success(text) => println!("{}", text),
                Outcome::Differences(text) => print!("{}", text),
            }
            process::exit(outcome.exit_code());
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(exit_code(&e));
        }
    }
}

/// Build logging configuration from CLI args and the config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = match cli.config {
        Some(ref config_path) => ConfigLoader::load_from_file(config_path)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default(),
        None => ConfigLoader::load(Path::new("."))
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default(),
    };

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = file.clone();
    }

    config
}
