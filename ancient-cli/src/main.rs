use clap::Parser;
use colored::*;
use std::process;
use tracing_subscriber::EnvFilter;

mod cli;

use crate::cli::{Cli, Commands};
use ancient_core::AncientError;

fn main() {
    let cli = Cli::parse();

    // Initialize logging with ANCIENT_LOG environment variable support
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let log_level = std::env::var("ANCIENT_LOG").unwrap_or_else(|_| default_level.to_string());

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::new(&log_level))
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(exit_code(&e));
    }
}

/// Exit status for an error, by the kind of failure it wraps
fn exit_code(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<AncientError>() {
        Some(AncientError::Configuration(_)) => 2,
        Some(AncientError::Io(_)) => 3,
        Some(AncientError::Parse(_)) => 4,
        Some(AncientError::Encoding(_)) => 5,
        _ => 1,
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli::load_run_config(cli.config.as_deref())?;

    // Configure thread pool: the flag wins over the config file
    let requested = if cli.threads > 0 {
        cli.threads
    } else {
        config.performance.threads
    };
    let num_threads = if requested == 0 {
        num_cpus::get()
    } else {
        requested
    };

    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        tracing::warn!("Thread pool already initialized: {}", e);
    }

    if cli.verbose > 0 {
        eprintln!("Using {} threads", num_threads);
    }

    match cli.command {
        Commands::Encode(args) => crate::cli::commands::encode::run(args, config),
        Commands::Predict(args) => crate::cli::commands::predict::run(args, config),
        Commands::Panel(args) => crate::cli::commands::panel::run(args),
    }
}
