//! Genotype encoding for ancient
//!
//! Loads genotype calls against a reference panel, lays them out on a Hilbert
//! curve, encodes them as intensities or colors and writes tables, images or
//! classifier predictions.

pub mod curve;
pub mod encoding;
pub mod formats;
pub mod inference;
pub mod output;
pub mod panel;
pub mod pipeline;

// Re-export commonly used types
pub use curve::HilbertTable;
pub use formats::{GenotypeMatrix, GenotypeVector, LoadStats};
pub use inference::{Classifier, InferenceAdapter, LinearClassifier, Prediction};
pub use panel::{Identifier, IdentifierIndex};
pub use pipeline::{EncodeOptions, InputKind, Pipeline, Resolution};
