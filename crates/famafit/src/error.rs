//! Error types for a full analysis run.

use famafit_data::DataError;
use famafit_output::{ExportError, ReportError};
use famafit_regression::RegressionError;
use thiserror::Error;

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Anything that can stop an analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Loading or aligning input data failed.
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// A model could not be estimated.
    #[error("Regression error: {0}")]
    Regression(#[from] RegressionError),

    /// Rendering diagnostics or the report failed.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Writing the result table failed.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Reading the config file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid JSON for [`crate::AnalysisConfig`].
    #[error("Invalid config: {0}")]
    Config(#[from] serde_json::Error),
}
