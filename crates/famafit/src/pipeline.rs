//! End-to-end analysis: prices and factors in, fitted models and table out.

use crate::config::AnalysisConfig;
use crate::error::Result;
use famafit_data::{
    FactorDataSource, FactorSeries, MergedFrame, PriceSeries, RawFactorTable, merge,
};
use famafit_output::{Diagnostics, ExportFormat, Exporter, Report, ResultTable};
use famafit_regression::{FactorRegressions, fit_models};
use std::path::Path;
use tracing::{debug, info};

/// A configured analysis run.
#[derive(Debug, Clone)]
pub struct Analysis {
    config: AnalysisConfig,
}

impl Analysis {
    /// Create a run from its configuration.
    pub const fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// The run configuration.
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load the configured price file and run the analysis against `source`.
    ///
    /// # Errors
    /// Fails if the price file or factor source cannot be read, or if any
    /// model cannot be estimated on the merged sample.
    pub fn run(&self, source: &dyn FactorDataSource) -> Result<AnalysisOutcome> {
        let path = self.config.prices_path();
        info!(ticker = %self.config.ticker, path = %path.display(), "loading prices");
        let prices = PriceSeries::from_path(&path)?;
        self.run_with_prices(&prices, source)
    }

    /// Run the analysis on already loaded prices.
    ///
    /// # Errors
    /// See [`Analysis::run`].
    pub fn run_with_prices(
        &self,
        prices: &PriceSeries,
        source: &dyn FactorDataSource,
    ) -> Result<AnalysisOutcome> {
        let windowed = prices.between(self.config.start, self.config.end)?;
        debug!(
            total = prices.len(),
            kept = windowed.len(),
            "applied date window"
        );
        let returns = windowed.returns();

        info!(source = source.name(), "fetching factors");
        let raw = source.fetch()?;
        let factors = FactorSeries::from_raw(&raw);

        let merged = merge(&returns, &factors);
        info!(
            returns = returns.len(),
            factors = factors.len(),
            rows = merged.len(),
            "merged returns with factors"
        );

        let regressions = fit_models(&merged, self.config.covariance)?;
        let table = ResultTable::from_regressions(&regressions);
        info!(covariance = %self.config.covariance, "analysis complete");

        Ok(AnalysisOutcome {
            ticker: self.config.ticker.clone(),
            raw,
            merged,
            regressions,
            table,
        })
    }
}

/// Everything produced by one run.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    ticker: String,
    raw: RawFactorTable,
    merged: MergedFrame,
    regressions: FactorRegressions,
    table: ResultTable,
}

impl AnalysisOutcome {
    /// Ticker the run was configured for.
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Factor table as delivered by the source, in percentage points.
    pub const fn raw_factors(&self) -> &RawFactorTable {
        &self.raw
    }

    /// Returns and decimal factors on their common dates.
    pub const fn merged(&self) -> &MergedFrame {
        &self.merged
    }

    /// CAPM, FF3 and FF5 fits.
    pub const fn regressions(&self) -> &FactorRegressions {
        &self.regressions
    }

    /// Side-by-side coefficient table.
    pub const fn table(&self) -> &ResultTable {
        &self.table
    }

    /// Source table, fit quality and p-values.
    ///
    /// # Errors
    /// Fails if the source table cannot be rendered.
    pub fn diagnostics(&self) -> Result<Diagnostics> {
        Ok(Diagnostics::new(&self.raw, &self.regressions)?)
    }

    /// Write the result table to `path`, as CSV or JSON by extension.
    ///
    /// # Errors
    /// Returns [`crate::AnalysisError::Export`] for an unsupported extension
    /// or a failed write.
    pub fn export_table(&self, path: &Path) -> Result<()> {
        let format = ExportFormat::from_path(path)?;
        self.table.export_to_file(path, format)?;
        Ok(())
    }

    /// JSON-serializable report of the run.
    pub fn report(&self) -> Report {
        Report::new(
            self.ticker.clone(),
            self.merged.coverage(),
            self.regressions.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnalysisError;
    use chrono::{Days, NaiveDate};
    use famafit_data::{DataError, FactorValues, InMemoryFactorSource};
    use famafit_output::ExportError;
    use famafit_regression::RegressionError;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn source(start: NaiveDate, days: u64) -> InMemoryFactorSource {
        let rows = (0..days).map(|t| {
            let x = t as f64;
            (
                start + Days::new(t),
                FactorValues {
                    mkt: (0.7 * x).sin(),
                    smb: (1.3 * x).cos(),
                    hml: (0.5 * x + 0.2).sin(),
                    rmw: (2.1 * x).cos(),
                    cma: (1.7 * x + 0.4).sin(),
                    rf: 0.01,
                },
            )
        });
        InMemoryFactorSource::new("fixture", RawFactorTable::from_rows(rows).unwrap())
    }

    #[test]
    fn test_disjoint_dates_fail_to_fit() {
        let prices =
            PriceSeries::from_points((1..=5).map(|d| (date(d), 100.0 + d as f64))).unwrap();
        let later = source(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(), 20);

        let err = Analysis::new(AnalysisConfig::default())
            .run_with_prices(&prices, &later)
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Regression(RegressionError::InsufficientData { actual: 0, .. })
        ));
    }

    #[test]
    fn test_inverted_window_rejected() {
        let prices = PriceSeries::from_points((1..=5).map(|d| (date(d), 100.0))).unwrap();
        let config = AnalysisConfig {
            start: Some(date(5)),
            end: Some(date(1)),
            ..AnalysisConfig::default()
        };

        let err = Analysis::new(config)
            .run_with_prices(&prices, &source(date(1), 5))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Data(_)));
    }

    #[test]
    fn test_missing_price_file() {
        let config = AnalysisConfig {
            prices_path: Some("/nonexistent/prices.csv".into()),
            ..AnalysisConfig::default()
        };
        let err = Analysis::new(config).run(&source(date(1), 5)).unwrap_err();
        assert!(matches!(err, AnalysisError::Data(DataError::Open { .. })));
        assert!(err.to_string().contains("/nonexistent/prices.csv"));
    }

    #[test]
    fn test_export_rejects_unknown_extension() {
        let prices =
            PriceSeries::from_points((1..=20).map(|d| (date(d), 100.0 + (1.3 * d as f64).sin())))
                .unwrap();
        let outcome = Analysis::new(AnalysisConfig::default())
            .run_with_prices(&prices, &source(date(1), 25))
            .unwrap();
        assert_eq!(outcome.merged().len(), 19);

        let err = outcome.export_table(Path::new("results.xlsx")).unwrap_err();
        assert!(matches!(err, AnalysisError::Export(ExportError::InvalidFormat(_))));
    }
}
