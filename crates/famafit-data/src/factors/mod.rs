//! Research factor data.
//!
//! Factor sources publish daily returns in percentage points. A
//! [`RawFactorTable`] keeps them in those units for display; the
//! [`FactorSeries`] built from it holds decimal fractions, ready to be
//! merged with asset returns.

pub mod french;
pub mod memory;
pub mod source;

pub use french::{FrenchCsvSource, parse_french_csv};
pub use memory::InMemoryFactorSource;
pub use source::FactorDataSource;

use crate::error::Result;
use crate::prices::sort_unique;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column header of the risk-free rate, shared by raw and rescaled tables.
pub const RISK_FREE_COLUMN: &str = "RF";

/// Percentage-point to decimal conversion factor.
const PERCENT: f64 = 100.0;

/// A Fama-French risk factor usable as a regressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Factor {
    /// Market excess return (`Mkt-RF`)
    Market,
    /// Small minus big (`SMB`)
    Size,
    /// High minus low book-to-market (`HML`)
    Value,
    /// Robust minus weak operating profitability (`RMW`)
    Profitability,
    /// Conservative minus aggressive investment (`CMA`)
    Investment,
}

impl Factor {
    /// All factors, in the order the five-factor model lists them.
    pub const ALL: [Self; 5] = [
        Self::Market,
        Self::Size,
        Self::Value,
        Self::Profitability,
        Self::Investment,
    ];

    /// Regressor name used once the table has been rescaled.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Market => "MKT",
            Self::Size => "SMB",
            Self::Value => "HML",
            Self::Profitability => "RMW",
            Self::Investment => "CMA",
        }
    }

    /// Column header in the published source table.
    pub const fn source_label(&self) -> &'static str {
        match self {
            Self::Market => "Mkt-RF",
            other => other.label(),
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One day of factor returns plus the risk-free rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorValues {
    /// Market excess return
    pub mkt: f64,
    /// Size factor
    pub smb: f64,
    /// Value factor
    pub hml: f64,
    /// Profitability factor
    pub rmw: f64,
    /// Investment factor
    pub cma: f64,
    /// Risk-free rate
    pub rf: f64,
}

impl FactorValues {
    /// Value of a single factor.
    pub const fn get(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Market => self.mkt,
            Factor::Size => self.smb,
            Factor::Value => self.hml,
            Factor::Profitability => self.rmw,
            Factor::Investment => self.cma,
        }
    }

    /// Apply `f` to every field, risk-free rate included.
    fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            mkt: f(self.mkt),
            smb: f(self.smb),
            hml: f(self.hml),
            rmw: f(self.rmw),
            cma: f(self.cma),
            rf: f(self.rf),
        }
    }
}

/// Shared storage for date-keyed factor rows.
#[derive(Debug, Clone, Default, PartialEq)]
struct DatedRows {
    dates: Vec<NaiveDate>,
    rows: Vec<FactorValues>,
}

impl DatedRows {
    fn new(points: Vec<(NaiveDate, FactorValues)>) -> Result<Self> {
        let (dates, rows) = sort_unique(points)?.into_iter().unzip();
        Ok(Self { dates, rows })
    }

    fn get(&self, date: NaiveDate) -> Option<&FactorValues> {
        self.dates
            .binary_search(&date)
            .ok()
            .map(|idx| &self.rows[idx])
    }

    fn column(&self, f: impl Fn(&FactorValues) -> f64) -> Vec<f64> {
        self.rows.iter().map(f).collect()
    }

    fn to_dataframe(&self, market_header: &str) -> Result<DataFrame> {
        let df = DataFrame::new(vec![
            Series::new("Date".into(), self.dates.clone()).into(),
            Series::new(market_header.into(), self.column(|r| r.mkt)).into(),
            Series::new("SMB".into(), self.column(|r| r.smb)).into(),
            Series::new("HML".into(), self.column(|r| r.hml)).into(),
            Series::new("RMW".into(), self.column(|r| r.rmw)).into(),
            Series::new("CMA".into(), self.column(|r| r.cma)).into(),
            Series::new(RISK_FREE_COLUMN.into(), self.column(|r| r.rf)).into(),
        ])?;
        Ok(df)
    }
}

/// Factor table exactly as a source publishes it, in percentage points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFactorTable {
    inner: DatedRows,
}

impl RawFactorTable {
    /// Build a table from arbitrary-order rows.
    ///
    /// # Errors
    /// Returns [`crate::DataError::DuplicateDate`] if a date repeats.
    pub fn from_rows(rows: impl IntoIterator<Item = (NaiveDate, FactorValues)>) -> Result<Self> {
        Ok(Self {
            inner: DatedRows::new(rows.into_iter().collect())?,
        })
    }

    /// Number of rows.
    pub const fn len(&self) -> usize {
        self.inner.dates.len()
    }

    /// Whether the table has no rows.
    pub const fn is_empty(&self) -> bool {
        self.inner.dates.is_empty()
    }

    /// Row dates, ascending.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.inner.dates
    }

    /// Rows aligned with [`RawFactorTable::dates`].
    pub fn rows(&self) -> &[FactorValues] {
        &self.inner.rows
    }

    /// First and last date covered, if any.
    pub fn coverage(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((*self.inner.dates.first()?, *self.inner.dates.last()?))
    }

    /// Render as a DataFrame with the source's own headers (`Mkt-RF`, ...).
    ///
    /// # Errors
    /// Propagates DataFrame construction errors.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        self.inner.to_dataframe(Factor::Market.source_label())
    }
}

/// Date-keyed factor returns expressed as decimal fractions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactorSeries {
    inner: DatedRows,
}

impl FactorSeries {
    /// Rescale a published table from percentage points to decimals.
    ///
    /// Every column, the risk-free rate included, is divided by 100.
    pub fn from_raw(raw: &RawFactorTable) -> Self {
        let rows = raw.inner.rows.iter().map(|r| r.map(|v| v / PERCENT)).collect();
        Self {
            inner: DatedRows {
                dates: raw.inner.dates.clone(),
                rows,
            },
        }
    }

    /// Build a series from rows already in decimal units.
    ///
    /// # Errors
    /// Returns [`crate::DataError::DuplicateDate`] if a date repeats.
    pub fn from_rows(rows: impl IntoIterator<Item = (NaiveDate, FactorValues)>) -> Result<Self> {
        Ok(Self {
            inner: DatedRows::new(rows.into_iter().collect())?,
        })
    }

    /// Number of rows.
    pub const fn len(&self) -> usize {
        self.inner.dates.len()
    }

    /// Whether the series has no rows.
    pub const fn is_empty(&self) -> bool {
        self.inner.dates.is_empty()
    }

    /// Row dates, ascending.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.inner.dates
    }

    /// Rows aligned with [`FactorSeries::dates`].
    pub fn rows(&self) -> &[FactorValues] {
        &self.inner.rows
    }

    /// Factor values on `date`.
    pub fn get(&self, date: NaiveDate) -> Option<&FactorValues> {
        self.inner.get(date)
    }

    /// Render as a DataFrame with regressor headers (`MKT`, ...).
    ///
    /// # Errors
    /// Propagates DataFrame construction errors.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        self.inner.to_dataframe(Factor::Market.label())
    }
}
