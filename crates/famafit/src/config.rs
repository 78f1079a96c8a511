//! Analysis configuration.

use crate::error::Result;
use chrono::NaiveDate;
use famafit_data::factors::french::DEFAULT_FILE_NAME;
use famafit_regression::CovarianceType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Ticker used when none is configured.
pub const DEFAULT_TICKER: &str = "AAPL";

/// Configuration for one analysis run.
///
/// Every field is optional in a config file; missing fields take the
/// [`Default`] value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Asset identifier, used for the default price file and in reports.
    pub ticker: String,

    /// Price CSV. Defaults to `<TICKER>.csv` in the working directory.
    pub prices_path: Option<PathBuf>,

    /// Daily five-factor CSV from the French data library.
    pub factors_path: PathBuf,

    /// Coefficient covariance estimator.
    pub covariance: CovarianceType,

    /// First price date to keep (inclusive).
    pub start: Option<NaiveDate>,

    /// Last price date to keep (inclusive).
    pub end: Option<NaiveDate>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ticker: DEFAULT_TICKER.to_string(),
            prices_path: None,
            factors_path: PathBuf::from(DEFAULT_FILE_NAME),
            covariance: CovarianceType::default(),
            start: None,
            end: None,
        }
    }
}

impl AnalysisConfig {
    /// Default configuration for `ticker`.
    pub fn for_ticker(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            ..Self::default()
        }
    }

    /// Read a JSON config file.
    ///
    /// # Errors
    /// Returns an IO error if the file cannot be read, or a config error if
    /// it is not valid JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading config");
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a JSON config document.
    ///
    /// # Errors
    /// Returns [`crate::AnalysisError::Config`] on malformed JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolved price file path.
    pub fn prices_path(&self) -> PathBuf {
        self.prices_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.csv", self.ticker)))
    }
}
