//! cet CLI Binary
//!
//! Compile a local source file on a Compiler Explorer server and print the
//! assembly, once or every time the file changes.

use cet::cli::{map_error, Cli, RunContext};
use cet::config::ConfigLoader;
use cet::logging::{init_logging, LoggingConfig};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    let workspace = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    // Build logging config from CLI args, env vars, and config file
    let logging_config = build_logging_config(&cli, &workspace);

    // Initialize logging early
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!(version = env!("CARGO_PKG_VERSION"), "cet starting");

    let context = match RunContext::new(&cli, &workspace) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error loading configuration: {}", e);
            eprintln!("Error: {}", map_error(&e));
            process::exit(1);
        }
    };

    // Unlocked: log writers on runtime worker threads also write to stdout.
    let mut out = std::io::stdout();
    match context.execute(&mut out) {
        Ok(()) => info!("cet finished"),
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("Error: {}", map_error(&e));
            process::exit(1);
        }
    }
}

/// Build logging configuration from CLI args, environment, and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli, workspace: &Path) -> LoggingConfig {
    let mut config = if let Some(ref config_path) = cli.config {
        ConfigLoader::load_from_file(config_path)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    } else {
        ConfigLoader::load(workspace)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    };

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
        // Mirror to stderr so verbose runs are visible without losing file logs.
        if config.output == "file" {
            config.output = "file+stderr".to_string();
        }
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

    let output_uses_file = config.output == "file" || config.output == "file+stderr";
    if config.enabled && output_uses_file {
        let resolved = cet::logging::resolve_log_file_path(
            cli.log_file.clone(),
            config.file.clone(),
            Some(workspace),
        );
        if let Ok(path) = resolved {
            config.file = Some(path);
        }
    } else if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
    }

    config
}
