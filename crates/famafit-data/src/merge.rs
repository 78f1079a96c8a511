//! Date alignment of asset returns with factor returns.

use crate::error::Result;
use crate::factors::{Factor, FactorSeries, FactorValues};
use crate::prices::ReturnSeries;
use chrono::NaiveDate;
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::cmp::Ordering;
use tracing::debug;

/// One trading day present in both the return and factor series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedRow {
    /// Trading day
    pub date: NaiveDate,
    /// Simple return of the asset
    pub asset_return: f64,
    /// Factor returns in decimal units
    pub factors: FactorValues,
    /// `asset_return - factors.rf`
    pub excess_return: f64,
}

/// Inner join of asset returns and factors, ascending by date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedFrame {
    rows: Vec<MergedRow>,
}

/// Join `returns` and `factors` on date, keeping only the dates both contain.
pub fn merge(returns: &ReturnSeries, factors: &FactorSeries) -> MergedFrame {
    let mut rows = Vec::with_capacity(returns.len().min(factors.len()));
    let mut asset = returns.iter().peekable();
    let mut factor = factors.dates().iter().zip(factors.rows()).peekable();

    while let (Some(&(asset_date, asset_return)), Some(&(factor_date, values))) =
        (asset.peek(), factor.peek())
    {
        match asset_date.cmp(factor_date) {
            Ordering::Less => {
                asset.next();
            }
            Ordering::Greater => {
                factor.next();
            }
            Ordering::Equal => {
                rows.push(MergedRow {
                    date: asset_date,
                    asset_return,
                    factors: *values,
                    excess_return: asset_return - values.rf,
                });
                asset.next();
                factor.next();
            }
        }
    }

    debug!(
        returns = returns.len(),
        factors = factors.len(),
        merged = rows.len(),
        "merged returns with factors"
    );
    MergedFrame { rows }
}

impl MergedFrame {
    /// Number of aligned trading days.
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the two inputs shared no dates.
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Aligned rows in date order.
    pub fn rows(&self) -> &[MergedRow] {
        &self.rows
    }

    /// First and last aligned date, if any.
    pub fn coverage(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.rows.first()?.date, self.rows.last()?.date))
    }

    /// The regression response.
    pub fn excess_returns(&self) -> Array1<f64> {
        self.rows.iter().map(|r| r.excess_return).collect()
    }

    /// One factor column.
    pub fn factor(&self, factor: Factor) -> Array1<f64> {
        self.rows.iter().map(|r| r.factors.get(factor)).collect()
    }

    /// Regressor matrix, one column per entry of `factors`, without an intercept.
    pub fn design(&self, factors: &[Factor]) -> Array2<f64> {
        Array2::from_shape_fn((self.rows.len(), factors.len()), |(i, j)| {
            self.rows[i].factors.get(factors[j])
        })
    }

    /// Render the joined frame, including `Returns` and `XsRet`.
    ///
    /// # Errors
    /// Propagates DataFrame construction errors.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let column = |f: fn(&MergedRow) -> f64| self.rows.iter().map(f).collect::<Vec<f64>>();
        let mut columns: Vec<Column> = vec![
            Series::new(
                "Date".into(),
                self.rows.iter().map(|r| r.date).collect::<Vec<_>>(),
            )
            .into(),
            Series::new("Returns".into(), column(|r| r.asset_return)).into(),
        ];
        for factor in Factor::ALL {
            let values: Vec<f64> = self.rows.iter().map(|r| r.factors.get(factor)).collect();
            columns.push(Series::new(factor.label().into(), values).into());
        }
        columns.push(Series::new("RF".into(), column(|r| r.factors.rf)).into());
        columns.push(Series::new("XsRet".into(), column(|r| r.excess_return)).into());

        Ok(DataFrame::new(columns)?)
    }
}
