//! Core types shared across ancient crates

pub mod format;
pub mod genotype;

pub use format::OutputFormat;
pub use genotype::{ColorMode, GenotypeCode, ResampleStrategy};

/// Class labels of the bundled ancestry model, in output order
pub const DEFAULT_CLASS_LABELS: [&str; 5] = ["AFR", "AMR", "EAS", "EUR", "SAS"];

/// Hilbert order the bundled ancestry model was trained on (128 x 128)
pub const DEFAULT_MODEL_ORDER: u32 = 7;
