//! Error types for the refnorm library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum RefnormError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// A regression was attempted on fewer than 2 rows or on a constant column.
    #[error("Insufficient data for '{predictor}': {reason}")]
    InsufficientData { predictor: String, reason: String },

    /// A (biomarker, nobs) key matched zero or several comparison records.
    #[error("Merge key ('{biomarker}', nobs = {nobs}) matched {matches} comparison records, expected exactly 1")]
    MergeKey {
        biomarker: String,
        nobs: usize,
        matches: usize,
    },

    #[error("No display name for biomarker '{0}'")]
    MissingName(String),

    #[error("Missing column '{0}' in observation table")]
    MissingColumn(String),

    #[error("Column '{0}' already exists in observation table")]
    DuplicateColumn(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RefnormError {
    pub(crate) fn insufficient(predictor: &str, reason: impl Into<String>) -> Self {
        RefnormError::InsufficientData {
            predictor: predictor.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, RefnormError>;
