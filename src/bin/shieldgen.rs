//! shieldgen CLI Binary
//!
//! Runs as a host-driven generator (no command, or `host`) or as a one-shot CLI.

use clap::Parser;
use shieldgen::cli::{Cli, RunContext};
use shieldgen::config::ConfigLoader;
use shieldgen::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    // Build logging config from CLI args, env vars, and config file
    let logging_config = build_logging_config(&cli);

    if let Err(e) = init_logging(Some(&logging_config)) {
        // In host mode stderr belongs to the protocol; keep serving without logs.
        if !cli.is_host_mode() {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    }

    info!("shieldgen starting");

    let context = match RunContext::new(cli.workspace.clone(), cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error loading settings: {}", e);
            if !cli.is_host_mode() {
                eprintln!("{}", shieldgen::cli::map_error(&e));
            }
            process::exit(1);
        }
    };

    let result = match cli.command {
        Some(ref command) => context.execute(command),
        None => context.serve_host().map(|()| String::new()),
    };

    match result {
        Ok(output) => {
            info!("Command completed successfully");
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            error!(stage = e.stage(), "Command failed: {}", e);
            if !cli.is_host_mode() {
                eprintln!("{}", shieldgen::cli::map_error(&e));
            }
            process::exit(1);
        }
    }
}

/// Build logging configuration from CLI args, environment, and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = if let Some(ref config_path) = cli.config {
        ConfigLoader::load_from_file(config_path)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    } else {
        ConfigLoader::load(&cli.workspace)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
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
        config.file = Some(file.clone());
    }

    if cli.is_host_mode() {
        config = config.for_host();
    }
    config
}
