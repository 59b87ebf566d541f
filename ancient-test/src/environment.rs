//! Test environment management
//!
//! Provides isolated test environments with automatic cleanup using RAII.

use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Configuration for test environment
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Keep the directory on disk after the test (for debugging)
    pub preserve: bool,
    /// Custom prefix for test directories
    pub prefix: Option<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            preserve: false,
            prefix: None,
        }
    }
}

/// Isolated test environment with `input/` and `output/` directories
pub struct TestEnvironment {
    /// Root temporary directory
    temp_dir: Option<TempDir>,
    /// Path to the test environment root
    root_path: PathBuf,
}

impl TestEnvironment {
    /// Create a new test environment with default config
    pub fn new() -> Result<Self> {
        Self::with_config(TestConfig::default())
    }

    /// Create a new test environment with custom config
    pub fn with_config(config: TestConfig) -> Result<Self> {
        let prefix = config.prefix.as_deref().unwrap_or("ancient-test");
        let temp_dir =
            TempDir::with_prefix(prefix).context("Failed to create temporary directory")?;
        let root_path = temp_dir.path().to_path_buf();

        std::fs::create_dir_all(root_path.join("input"))?;
        std::fs::create_dir_all(root_path.join("output"))?;

        let mut env = Self {
            temp_dir: Some(temp_dir),
            root_path,
        };
        if config.preserve {
            env.preserve();
        }
        Ok(env)
    }

    /// Get the root path of the test environment
    pub fn root(&self) -> &Path {
        &self.root_path
    }

    /// Directory holding generated inputs
    pub fn input_dir(&self) -> PathBuf {
        self.root_path.join("input")
    }

    /// Directory commands should write into
    pub fn output_dir(&self) -> PathBuf {
        self.root_path.join("output")
    }

    /// Path of a file inside the output directory
    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir().join(name)
    }

    /// Write a plain-text input file and return its path
    pub fn create_input_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.input_dir().join(name);
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Write a gzip-compressed input file and return its path
    pub fn create_gz_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.input_dir().join(name);
        std::fs::write(&path, gzip(content.as_bytes())?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Read a file from the output directory as text
    pub fn read_output(&self, name: &str) -> Result<String> {
        let path = self.output_path(name);
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Manually preserve the environment (for debugging)
    pub fn preserve(&mut self) {
        if let Some(temp_dir) = self.temp_dir.take() {
            let path = temp_dir.keep();
            println!("Test environment preserved at: {}", path.display());
        }
    }
}

/// Gzip a byte buffer in memory
pub fn gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
