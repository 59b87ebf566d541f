//! Classifier boundary
//!
//! The classifier is a black box taking `4^order` grayscale intensities in
//! curve order and returning one probability per class label. The
//! [`InferenceAdapter`] checks both sides of that contract.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use ancient_core::config::MAX_ORDER;
use ancient_core::error::{AncientError, AncientResult};

use crate::curve::cell_count;

/// Black-box image classifier
pub trait Classifier: Send + Sync {
    /// Class labels, aligned with the output of [`Classifier::predict`]
    fn labels(&self) -> &[String];

    /// Curve order of the expected input
    fn order(&self) -> u32;

    /// Class probabilities for one encoded sample
    fn predict(&self, input: &[f32]) -> AncientResult<Vec<f32>>;
}

/// Prediction for one sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub sample: String,
    pub probabilities: IndexMap<String, f32>,
    pub top_label: String,
}

impl Prediction {
    pub fn top_probability(&self) -> f32 {
        self.probabilities
            .get(&self.top_label)
            .copied()
            .unwrap_or_default()
    }
}

/// Validating wrapper around a classifier
pub struct InferenceAdapter {
    classifier: Box<dyn Classifier>,
}

impl InferenceAdapter {
    pub fn new(classifier: Box<dyn Classifier>) -> Self {
        Self { classifier }
    }

    pub fn labels(&self) -> &[String] {
        self.classifier.labels()
    }

    pub fn order(&self) -> u32 {
        self.classifier.order()
    }

    /// Input length the classifier expects
    pub fn input_len(&self) -> usize {
        cell_count(self.order())
    }

    /// Run the classifier on one sample's curve-ordered intensities
    pub fn predict(&self, sample: &str, values: &[f32]) -> AncientResult<Prediction> {
        if values.len() != self.input_len() {
            return Err(AncientError::Inference(format!(
                "sample {}: expected {} values for order {}, got {}",
                sample,
                self.input_len(),
                self.order(),
                values.len()
            )));
        }
        if let Some(v) = values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(AncientError::Inference(format!(
                "sample {}: input value {} is outside [0, 1]",
                sample, v
            )));
        }

        let output = self.classifier.predict(values)?;
        let labels = self.labels();
        if output.len() != labels.len() {
            return Err(AncientError::Inference(format!(
                "classifier returned {} probabilities for {} labels",
                output.len(),
                labels.len()
            )));
        }

        let probabilities: IndexMap<String, f32> =
            labels.iter().cloned().zip(output).collect();
        let top_label = probabilities
            .iter()
            .fold(None::<(&String, f32)>, |best, (label, &p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((label, p)),
            })
            .map(|(label, _)| label.clone())
            .unwrap_or_default();

        tracing::debug!("Predicted {} for sample {}", top_label, sample);
        Ok(Prediction {
            sample: sample.to_string(),
            probabilities,
            top_label,
        })
    }
}

/// Softmax-linear model stored as JSON:
///
/// ```json
/// { "labels": ["AFR", "EUR"], "order": 1,
///   "weights": [[0.1, 0.2, 0.3, 0.4], [0.4, 0.3, 0.2, 0.1]],
///   "bias": [0.0, 0.0] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearClassifier {
    labels: Vec<String>,
    order: u32,
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
}

impl LinearClassifier {
    pub fn new(
        labels: Vec<String>,
        order: u32,
        weights: Vec<Vec<f32>>,
        bias: Vec<f32>,
    ) -> AncientResult<Self> {
        let model = Self {
            labels,
            order,
            weights,
            bias,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn from_json(text: &str) -> AncientResult<Self> {
        let model: Self = serde_json::from_str(text)?;
        model.validate()?;
        Ok(model)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> AncientResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let model = Self::from_json(&text)?;
        tracing::info!(
            "Loaded model {} (order {}, {} classes)",
            path.display(),
            model.order,
            model.labels.len()
        );
        Ok(model)
    }

    pub fn to_json(&self) -> AncientResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> AncientResult<()> {
        if self.labels.is_empty() {
            return Err(AncientError::Inference("model has no class labels".to_string()));
        }
        if self.order > MAX_ORDER {
            return Err(AncientError::Inference(format!(
                "model order {} exceeds {}",
                self.order, MAX_ORDER
            )));
        }
        if self.weights.len() != self.labels.len() || self.bias.len() != self.labels.len() {
            return Err(AncientError::Inference(format!(
                "model has {} labels but {} weight rows and {} biases",
                self.labels.len(),
                self.weights.len(),
                self.bias.len()
            )));
        }
        let inputs = cell_count(self.order);
        if let Some(row) = self.weights.iter().position(|w| w.len() != inputs) {
            return Err(AncientError::Inference(format!(
                "weight row {} has {} entries, expected {}",
                row,
                self.weights[row].len(),
                inputs
            )));
        }
        Ok(())
    }
}

impl Classifier for LinearClassifier {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn order(&self) -> u32 {
        self.order
    }

    fn predict(&self, input: &[f32]) -> AncientResult<Vec<f32>> {
        let logits: Vec<f32> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(w, b)| w.iter().zip(input).map(|(w, x)| w * x).sum::<f32>() + b)
            .collect();
        Ok(softmax(&logits))
    }
}

/// Numerically stable softmax
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}
