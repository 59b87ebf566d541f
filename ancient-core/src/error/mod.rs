//! Core error types for ancient

use thiserror::Error;

/// Main error type for ancient operations
///
/// Only fatal conditions are represented here. Unresolved variant identifiers and
/// out-of-domain genotype calls are line-level and non-fatal: the loader counts them
/// in its statistics and keeps going.
#[derive(Error, Debug)]
pub enum AncientError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A genotype code outside {0, 1, 2} reached the encoder
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// Result type alias for ancient operations
pub type AncientResult<T> = Result<T, AncientError>;

impl AncientError {
    /// Build a parse error that names the offending line (1-based)
    pub fn parse_at(source: &str, line: usize, message: impl std::fmt::Display) -> Self {
        AncientError::Parse(format!("{}:{}: {}", source, line, message))
    }
}

// Conversion implementations for common error types
impl From<serde_json::Error> for AncientError {
    fn from(err: serde_json::Error) -> Self {
        AncientError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for AncientError {
    fn from(err: anyhow::Error) -> Self {
        AncientError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let io_error = AncientError::Io(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        assert!(format!("{}", io_error).contains("IO error"));

        let config_error = AncientError::Configuration("missing field".to_string());
        assert_eq!(format!("{}", config_error), "Configuration error: missing field");

        let parse_error = AncientError::Parse("too few columns".to_string());
        assert_eq!(format!("{}", parse_error), "Parsing error: too few columns");

        let encoding_error = AncientError::Encoding("genotype code 7".to_string());
        assert_eq!(format!("{}", encoding_error), "Encoding error: genotype code 7");

        let inference_error = AncientError::Inference("bad shape".to_string());
        assert_eq!(format!("{}", inference_error), "Inference error: bad shape");

        let other = AncientError::Other("unknown".to_string());
        assert_eq!(format!("{}", other), "Other error: unknown");
    }

    #[test]
    fn test_parse_at_names_the_line() {
        let err = AncientError::parse_at("panel.txt", 12, "expected 5 columns, found 3");
        assert_eq!(
            err.to_string(),
            "Parsing error: panel.txt:12: expected 5 columns, found 3"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: AncientError = io_err.into();

        match err {
            AncientError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let parse_result: Result<serde_json::Value, serde_json::Error> =
            serde_json::from_str("{invalid json}");
        let err: AncientError = parse_result.unwrap_err().into();

        match err {
            AncientError::Serialization(msg) => assert!(msg.contains("key must be a string")),
            _ => panic!("Expected Serialization error variant"),
        }
    }

    #[test]
    fn test_anyhow_error_conversion() {
        let err: AncientError = anyhow::anyhow!("custom error message").into();

        match err {
            AncientError::Other(msg) => assert_eq!(msg, "custom error message"),
            _ => panic!("Expected Other error variant"),
        }
    }
}
