//! Core utilities and types shared across all ancient crates

pub mod config;
pub mod error;
pub mod system;
pub mod types;

// Re-export commonly used types
pub use config::{load_config, save_config, Config};
pub use error::{AncientError, AncientResult};

// Re-export core types
pub use types::{ColorMode, GenotypeCode, OutputFormat, ResampleStrategy};

// Re-export system utilities
pub use system::{ancient_home, default_config_path, file_prefix};
