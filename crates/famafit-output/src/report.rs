//! Machine readable report of a factor regression run.

use crate::table::ResultTable;
use chrono::{DateTime, NaiveDate, Utc};
use famafit_data::DataError;
use famafit_regression::FactorRegressions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Source data could not be rendered.
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// A required builder field was never set.
    #[error("Missing report field: {0}")]
    MissingField(&'static str),
}

/// A report for one ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Ticker being analyzed.
    pub ticker: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// First and last date of the regression sample.
    pub period: Option<(NaiveDate, NaiveDate)>,

    /// All three fits.
    pub regressions: FactorRegressions,

    /// Side-by-side coefficient table.
    pub table: ResultTable,
}

impl Report {
    /// Create a new report, deriving the table from the fits.
    pub fn new(
        ticker: String,
        period: Option<(NaiveDate, NaiveDate)>,
        regressions: FactorRegressions,
    ) -> Self {
        let table = ResultTable::from_regressions(&regressions);
        Self {
            ticker,
            timestamp: Utc::now(),
            period,
            regressions,
            table,
        }
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    ticker: Option<String>,
    period: Option<(NaiveDate, NaiveDate)>,
    regressions: Option<FactorRegressions>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ticker.
    pub fn ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }

    /// Set the sample period.
    pub const fn period(mut self, period: Option<(NaiveDate, NaiveDate)>) -> Self {
        self.period = period;
        self
    }

    /// Set the fitted models.
    pub fn regressions(mut self, regressions: FactorRegressions) -> Self {
        self.regressions = Some(regressions);
        self
    }

    /// Build the report.
    ///
    /// # Errors
    /// Returns [`ReportError::MissingField`] if no regressions were supplied.
    pub fn build(self) -> Result<Report, ReportError> {
        let regressions = self
            .regressions
            .ok_or(ReportError::MissingField("regressions"))?;
        Ok(Report::new(
            self.ticker.unwrap_or_default(),
            self.period,
            regressions,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::sample_regressions;

    #[test]
    fn test_report_builder() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        let report = ReportBuilder::new()
            .ticker("MSFT")
            .period(Some((start, end)))
            .regressions(sample_regressions())
            .build()
            .unwrap();

        assert_eq!(report.ticker, "MSFT");
        assert_eq!(report.period, Some((start, end)));
        assert_eq!(report.table.rows().len(), 6);
    }

    #[test]
    fn test_builder_requires_regressions() {
        let err = ReportBuilder::new().ticker("AAPL").build().unwrap_err();
        assert!(matches!(err, ReportError::MissingField("regressions")));
    }

    #[test]
    fn test_report_json() {
        let report = Report::new("AAPL".to_string(), None, sample_regressions());
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["ticker"], "AAPL");
        assert_eq!(value["regressions"]["capm"]["model"], "Capm");
        assert_eq!(value["table"]["rows"][0]["term"], "Intercept");
    }
}
