//! Configuration types for ancient

use crate::types::{ColorMode, ResampleStrategy, DEFAULT_CLASS_LABELS, DEFAULT_MODEL_ORDER};
use crate::AncientError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Highest Hilbert order accepted anywhere (grid side 32768)
pub const MAX_ORDER: u32 = 15;

/// Widest grid `--width` may bin to (the side of an order-`MAX_ORDER` curve)
pub const MAX_WIDTH: u32 = 1 << MAX_ORDER;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub encoding: EncodingConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EncodingConfig {
    /// Explicit Hilbert order; derived from the vector length when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    /// Bin every vector to `width * width` cells before placing it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default)]
    pub mode: ColorMode,
    #[serde(default)]
    pub strategy: ResampleStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Write a PNG per sample next to the table
    #[serde(default = "default_image")]
    pub image: bool,
    /// Directory for all outputs (defaults to the working directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
    /// Single table collecting every input's rows; a `.gz` suffix compresses it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Worker threads (0 = all available)
    #[serde(default)]
    pub threads: usize,
    /// Log a progress line every this many input lines
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
}

/// Sanity checks on loaded samples. All are opt-in and only produce warnings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValidationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_non_reference_fraction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_line_coverage: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_class_labels")]
    pub class_labels: Vec<String>,
    #[serde(default = "default_model_order")]
    pub order: u32,
}

// Default value functions
fn default_image() -> bool { true }
fn default_progress_interval() -> usize { 100_000 }
fn default_class_labels() -> Vec<String> {
    DEFAULT_CLASS_LABELS.iter().map(|s| s.to_string()).collect()
}
fn default_model_order() -> u32 { DEFAULT_MODEL_ORDER }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            image: default_image(),
            directory: None,
            table_name: None,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            progress_interval: default_progress_interval(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            class_labels: default_class_labels(),
            order: default_model_order(),
        }
    }
}

impl Config {
    /// Reject combinations the pipeline cannot honor
    pub fn validate(&self) -> Result<(), AncientError> {
        if self.encoding.order.is_some() && self.encoding.width.is_some() {
            return Err(AncientError::Configuration(
                "encoding.order and encoding.width are mutually exclusive".to_string(),
            ));
        }
        if let Some(order) = self.encoding.order {
            if order > MAX_ORDER {
                return Err(AncientError::Configuration(format!(
                    "encoding.order must be at most {}, got {}",
                    MAX_ORDER, order
                )));
            }
        }
        if self.encoding.width == Some(0) {
            return Err(AncientError::Configuration(
                "encoding.width must be positive".to_string(),
            ));
        }
        if let Some(width) = self.encoding.width.filter(|w| *w > MAX_WIDTH) {
            return Err(AncientError::Configuration(format!(
                "encoding.width must be at most {}, got {}",
                MAX_WIDTH, width
            )));
        }
        if self.model.order > MAX_ORDER {
            return Err(AncientError::Configuration(format!(
                "model.order must be at most {}, got {}",
                MAX_ORDER, self.model.order
            )));
        }
        if self.model.class_labels.is_empty() {
            return Err(AncientError::Configuration(
                "model.class_labels must not be empty".to_string(),
            ));
        }
        for (name, value) in [
            ("validation.min_non_reference_fraction", self.validation.min_non_reference_fraction),
            ("validation.min_line_coverage", self.validation.min_line_coverage),
        ] {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) {
                    return Err(AncientError::Configuration(format!(
                        "{} must be within [0, 1], got {}",
                        name, v
                    )));
                }
            }
        }
        Ok(())
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, AncientError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| AncientError::Configuration(format!("Failed to parse config: {}", e)))?;
    config.validate()?;
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), AncientError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| AncientError::Configuration(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.encoding.order, None);
        assert_eq!(config.encoding.width, None);
        assert_eq!(config.encoding.mode, ColorMode::Grayscale);
        assert_eq!(config.encoding.strategy, ResampleStrategy::Max);

        assert!(config.output.image);
        assert_eq!(config.output.directory, None);

        assert_eq!(config.performance.threads, 0);
        assert_eq!(config.performance.progress_interval, 100_000);

        assert_eq!(config.validation.min_non_reference_fraction, None);

        assert_eq!(config.model.class_labels, vec!["AFR", "AMR", "EAS", "EUR", "SAS"]);
        assert_eq!(config.model.order, 7);

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_valid_config() {
        let toml_content = r#"
[encoding]
width = 64
mode = "categorical"
strategy = "mode"

[output]
image = false
directory = "/tmp/out"
table_name = "images.tsv.gz"

[performance]
threads = 4

[validation]
min_non_reference_fraction = 0.01

[model]
class_labels = ["A", "B"]
order = 5
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", toml_content).unwrap();

        let config = load_config(temp_file.path()).unwrap();

        assert_eq!(config.encoding.width, Some(64));
        assert_eq!(config.encoding.mode, ColorMode::Categorical);
        assert_eq!(config.encoding.strategy, ResampleStrategy::Mode);
        assert!(!config.output.image);
        assert_eq!(config.output.directory.as_deref(), Some("/tmp/out"));
        assert_eq!(config.output.table_name.as_deref(), Some("images.tsv.gz"));
        assert_eq!(config.performance.threads, 4);
        assert_eq!(config.performance.progress_interval, 100_000);
        assert_eq!(config.validation.min_non_reference_fraction, Some(0.01));
        assert_eq!(config.model.class_labels, vec!["A", "B"]);
        assert_eq!(config.model.order, 5);
    }

    #[test]
    fn test_load_invalid_config() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "this is not valid TOML {{").unwrap();

        match load_config(temp_file.path()).unwrap_err() {
            AncientError::Configuration(msg) => assert!(msg.contains("Failed to parse config")),
            _ => panic!("Expected Configuration error"),
        }
    }

    #[test]
    fn test_order_and_width_are_exclusive() {
        let mut config = Config::default();
        config.encoding.order = Some(7);
        config.encoding.width = Some(128);

        assert!(matches!(config.validate(), Err(AncientError::Configuration(_))));
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let mut config = Config::default();
        config.encoding.order = Some(MAX_ORDER + 1);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.encoding.width = Some(0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.encoding.width = Some(1_000_000);
        assert!(matches!(config.validate(), Err(AncientError::Configuration(_))));
        config.encoding.width = Some(MAX_WIDTH);
        assert!(config.validate().is_ok());

        let mut config = Config::default();
        config.validation.min_line_coverage = Some(1.5);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.model.class_labels.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_nonexistent_file() {
        match load_config("/nonexistent/path/to/config.toml").unwrap_err() {
            AncientError::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = Config::default();
        config.encoding.order = Some(6);
        config.encoding.mode = ColorMode::Categorical;
        config.output.image = false;
        config.validation.min_line_coverage = Some(0.5);

        let temp_file = NamedTempFile::new().unwrap();
        save_config(temp_file.path(), &config).unwrap();
        let loaded = load_config(temp_file.path()).unwrap();

        assert_eq!(loaded.encoding.order, Some(6));
        assert_eq!(loaded.encoding.width, None);
        assert_eq!(loaded.encoding.mode, ColorMode::Categorical);
        assert!(!loaded.output.image);
        assert_eq!(loaded.validation.min_line_coverage, Some(0.5));
        assert_eq!(loaded.model.class_labels, config.model.class_labels);
    }
}
