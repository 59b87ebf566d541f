//! Test utilities for the ancient workspace
//!
//! This crate provides common test helpers, fixtures, and utilities for testing
//! across the ancient workspace.
//!
//! # Features
//!
//! - **Test Environment**: Isolated temporary directories with automatic cleanup
//! - **Fixtures**: Reference panels, genotype matrices and raw vector files
//! - **Assertions**: Custom assertions for genotype and curve data

pub mod assertions;
pub mod environment;
pub mod fixtures;

// Re-export commonly used items
pub use environment::{gzip, TestConfig, TestEnvironment};
pub use fixtures::{
    generate_panel, panel_tsv, random_matrix, vector_file, MatrixFixture, PanelVariant,
};

// Re-export test dependencies for convenience
pub use anyhow::{Context, Result};
pub use tempfile;

/// Initialize test logging (call once per test module)
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .try_init();
}

/// Run a test with a clean environment
///
/// # Example
/// ```rust
/// use ancient_test::with_test_env;
///
/// with_test_env(|env| {
///     let panel = env.create_input_file("panel.txt", "1\t100\trs1\tAX-1\tAlleleA\n")?;
///     assert!(panel.exists());
///     Ok(())
/// })
/// .unwrap();
/// ```
pub fn with_test_env<F, R>(f: F) -> Result<R>
where
    F: FnOnce(&TestEnvironment) -> Result<R>,
{
    let env = TestEnvironment::new()?;
    // Cleanup happens automatically via Drop
    f(&env)
}
