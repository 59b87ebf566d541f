pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use ancient_core::config::{default_config, load_config, Config};
use ancient_core::default_config_path;

#[derive(Parser)]
#[command(
    name = "ancient",
    version,
    about = "Encode genotype calls as Hilbert curve images for ancestry classification",
    long_about = "Ancient aligns per-sample genotype calls to a reference panel, lays them out \
                  on a Hilbert space-filling curve and writes the result as value tables, PNG \
                  images or classifier predictions."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Number of threads to use (0 = config value, then all available)
    #[arg(short = 'j', long, default_value = "0", global = true)]
    pub threads: usize,

    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE", env = "ANCIENT_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode genotype files as curve tables and images
    Encode(commands::encode::EncodeArgs),

    /// Predict class probabilities for genotype files
    Predict(commands::predict::PredictArgs),

    /// Summarize a reference panel and optionally check an input against it
    Panel(commands::panel::PanelArgs),
}

/// Configuration for this run: the given file, else `$ANCIENT_HOME/config.toml`
/// when present, else defaults
pub fn load_run_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = path.map(Path::to_path_buf).or_else(default_config_path);
    match path {
        Some(path) => {
            tracing::debug!("Loading configuration from {}", path.display());
            Ok(load_config(&path)?)
        }
        None => Ok(default_config()),
    }
}

/// Fail before any work if an input is missing
pub fn require_inputs(files: &[PathBuf]) -> anyhow::Result<()> {
    for file in files {
        if !file.is_file() {
            return Err(ancient_core::AncientError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("input file not found: {}", file.display()),
            ))
            .into());
        }
    }
    Ok(())
}
