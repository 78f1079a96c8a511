//! Errors raised while fitting regressions.

use thiserror::Error;

/// Result type for regression operations.
pub type Result<T> = std::result::Result<T, RegressionError>;

/// Errors that can occur during estimation.
#[derive(Debug, Error)]
pub enum RegressionError {
    /// Fewer observations than parameters plus one
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// Inputs of incompatible shape
    #[error("Dimension mismatch for {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
        /// Which input was inconsistent
        context: String,
    },

    /// Columns of the design matrix are linearly dependent
    #[error("Rank deficient design matrix: rank {rank} < columns {columns}")]
    RankDeficient {
        /// Numerical rank
        rank: usize,
        /// Number of columns including the intercept
        columns: usize,
    },

    /// Reference distribution could not be built
    #[error("Distribution error: {0}")]
    Distribution(String),
}
