#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use std::path::PathBuf;

pub use ancient_test::{
    generate_panel, panel_tsv, random_matrix, vector_file, MatrixFixture, PanelVariant,
    TestEnvironment,
};

/// Command for the `ancient` binary with logging and progress bars silenced
pub fn ancient_cmd() -> Command {
    let mut cmd = Command::cargo_bin("ancient").unwrap();
    cmd.env("ANCIENT_SILENT", "1")
        .env("ANCIENT_LOG", "error")
        .env_remove("ANCIENT_CONFIG");
    cmd
}

/// Panel of `n` generated variants written into the environment
pub fn write_panel(env: &TestEnvironment, n: usize) -> Result<PathBuf> {
    env.create_input_file("panel.txt", &panel_tsv(&generate_panel(n)))
}

/// Linear model over `labels` for an order-`order` input, favouring the last label
pub fn write_model(env: &TestEnvironment, labels: &[&str], order: u32) -> Result<PathBuf> {
    let cells = 1usize << (2 * order);
    let weights: Vec<Vec<f32>> = (0..labels.len())
        .map(|i| vec![i as f32 * 0.01; cells])
        .collect();
    let model = serde_json::json!({
        "labels": labels,
        "order": order,
        "weights": weights,
        "bias": vec![0.0f32; labels.len()],
    });
    env.create_input_file("model.json", &model.to_string())
}
