//! System-level helpers: home directory and output naming

pub mod paths;

pub use paths::{ancient_home, default_config_path, file_prefix};
