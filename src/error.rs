//! Error types for the faster-str library.

use thiserror::Error;

/// Main error type for the library.
///
/// The classification core itself never fails: missing or malformed peak
/// data degrades to an empty result for that marker. These variants cover
/// the fallible edges only: configuration loading, file ingestion, and
/// report output.
#[derive(Error, Debug)]
pub enum StrError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing column '{0}' in input table")]
    MissingColumn(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, StrError>;
