//! Error types for data operations.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading prices and factor data.
#[derive(Debug, Error)]
pub enum DataError {
    /// An input file could not be opened
    #[error("Cannot open {}: {source}", path.display())]
    Open {
        /// File that was tried
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// CSV reader error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// A required column is absent from the input header
    #[error("Missing column '{column}' in {input}")]
    MissingColumn {
        /// Column that was looked up
        column: String,
        /// Input that was being read
        input: String,
    },

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// The same date appears more than once in a series
    #[error("Duplicate date {0} in series")]
    DuplicateDate(NaiveDate),

    /// A price that cannot produce a relative change
    #[error("Invalid price {price} on {date}: prices must be finite and positive")]
    InvalidPrice {
        /// Date of the offending observation
        date: NaiveDate,
        /// Offending value
        price: f64,
    },

    /// Invalid date range
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date of the range
        start: NaiveDate,
        /// End date of the range
        end: NaiveDate,
    },

    /// Missing data
    #[error("Missing data in {input}: {reason}")]
    MissingData {
        /// Input that was being read
        input: String,
        /// Reason for missing data
        reason: String,
    },
}
