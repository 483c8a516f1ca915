//! Error types for the featlab system.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the featlab system.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reference dataset does not exist.
    #[error("Reference data unavailable: {} not found", .0.display())]
    DataUnavailable(PathBuf),

    /// Data error (malformed or inconsistent rows).
    #[error("Data error: {0}")]
    Data(String),

    /// Not enough rows for a computation.
    #[error("Insufficient data: need {required} rows, got {available}")]
    InsufficientData { required: usize, available: usize },

    /// A feature unit failed while computing its column.
    #[error("{0}")]
    Feature(String),

    /// A feature unit exceeded its wall-clock budget.
    #[error("unit {code} exceeded time budget of {budget_ms} ms")]
    Timeout { code: String, budget_ms: u64 },

    /// A unit manifest could not be read or parsed.
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reader/writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create an insufficient data error.
    pub fn insufficient_data(required: usize, available: usize) -> Self {
        Error::InsufficientData { required, available }
    }

    /// Create a feature evaluation error.
    pub fn feature(msg: impl Into<String>) -> Self {
        Error::Feature(msg.into())
    }

    /// Create a manifest error.
    pub fn manifest(msg: impl Into<String>) -> Self {
        Error::Manifest(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_unavailable_message() {
        let err = Error::DataUnavailable(PathBuf::from("eth_5m_test.csv"));
        assert_eq!(
            err.to_string(),
            "Reference data unavailable: eth_5m_test.csv not found"
        );
    }

    #[test]
    fn test_feature_error_message() {
        let err = Error::feature("division by zero in window");
        assert_eq!(err.to_string(), "division by zero in window");
    }

    #[test]
    fn test_insufficient_data_message() {
        let err = Error::insufficient_data(50, 10);
        assert_eq!(err.to_string(), "Insufficient data: need 50 rows, got 10");
    }
}
