//! Error types for the Roomberg heatmap pipeline.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Roomberg heatmap pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data error (invalid or missing data).
    #[error("Data error: {0}")]
    Data(String),

    /// Currency code missing from the rate table.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// Value that is not a strict `YYYY-MM-DD` calendar date.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Dictionary literal that could not be read.
    #[error("Literal error: {0}")]
    Literal(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
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

    /// Create an unknown currency error.
    pub fn unknown_currency(code: impl Into<String>) -> Self {
        Error::UnknownCurrency(code.into())
    }

    /// Create an invalid date error.
    pub fn invalid_date(value: impl Into<String>) -> Self {
        Error::InvalidDate(value.into())
    }

    /// Create a literal error.
    pub fn literal(msg: impl Into<String>) -> Self {
        Error::Literal(msg.into())
    }
}
