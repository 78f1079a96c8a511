//! Reader for the Kenneth R. French data library CSV layout.
//!
//! The published daily files look like:
//!
//! ```text
//! This file was created by CMPT_ME_BEME_OP_INV_RETS_DAILY using the 202401 CRSP database.
//! The Tbill return is the simple daily rate that, over the number of trading days
//! in the month, compounds to 1-month TBill rate from Ibbotson and Associates Inc.
//!
//! ,Mkt-RF,SMB,HML,RMW,CMA,RF
//! 19630701,   -0.67,    0.02,   -0.35,    0.03,    0.13,   0.012
//! 19630702,    0.79,   -0.28,    0.28,   -0.08,   -0.21,   0.012
//!
//! Copyright 2024 Kenneth R. French
//! ```
//!
//! Everything before the header row is skipped. Data ends at the first row
//! whose leading field is not a `YYYYMMDD` date.

use super::{Factor, FactorDataSource, FactorValues, RISK_FREE_COLUMN, RawFactorTable};
use crate::error::{DataError, Result};
use crate::prices::{open_file, parse_date};
use csv::StringRecord;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name of the daily five-factor (2x3) dataset.
pub const DEFAULT_FILE_NAME: &str = "F-F_Research_Data_5_Factors_2x3_daily.CSV";

/// Placeholder values the library uses for missing observations.
const MISSING_SENTINELS: [f64; 2] = [-99.99, -999.0];

/// Factor source backed by a French-library CSV on disk.
#[derive(Debug, Clone)]
pub struct FrenchCsvSource {
    path: PathBuf,
    name: String,
}

impl FrenchCsvSource {
    /// Create a source that reads `path` on every fetch.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FactorDataSource for FrenchCsvSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<RawFactorTable> {
        let file = open_file(&self.path)?;
        let table = parse_french_csv(file)?;
        info!(source = %self.name, rows = table.len(), "loaded factor table");
        Ok(table)
    }
}

/// Column positions of the six required fields.
#[derive(Debug)]
struct ColumnLayout {
    factors: [usize; 5],
    rf: usize,
}

impl ColumnLayout {
    /// Recognise the header row. Returns `Ok(None)` for rows that are not the header.
    fn from_header(record: &StringRecord) -> Result<Option<Self>> {
        let find = |name: &str| record.iter().position(|field| field == name);

        if find(Factor::Market.source_label()).is_none() {
            return Ok(None);
        }

        let require = |name: &str| {
            find(name).ok_or_else(|| DataError::MissingColumn {
                column: name.to_string(),
                input: "factor header".to_string(),
            })
        };

        let mut factors = [0; 5];
        for (slot, factor) in factors.iter_mut().zip(Factor::ALL) {
            *slot = require(factor.source_label())?;
        }
        let rf = require(RISK_FREE_COLUMN)?;

        Ok(Some(Self { factors, rf }))
    }

    fn parse_row(&self, record: &StringRecord, line: u64) -> Result<FactorValues> {
        let field = |idx: usize| -> Result<f64> {
            let raw = record.get(idx).unwrap_or_default();
            let value = raw.parse::<f64>().map_err(|_| {
                DataError::Parse(format!("factor line {line}: invalid value '{raw}'"))
            })?;
            if MISSING_SENTINELS.iter().any(|s| (value - s).abs() < 1e-9) {
                return Err(DataError::MissingData {
                    input: format!("factor line {line}"),
                    reason: format!("missing-value sentinel {raw}"),
                });
            }
            Ok(value)
        };

        let [mkt, smb, hml, rmw, cma] = self.factors;
        Ok(FactorValues {
            mkt: field(mkt)?,
            smb: field(smb)?,
            hml: field(hml)?,
            rmw: field(rmw)?,
            cma: field(cma)?,
            rf: field(self.rf)?,
        })
    }
}

/// Parse a French-library daily factor file.
///
/// # Errors
/// Returns [`DataError::MissingData`] if no header or no data rows are found,
/// [`DataError::MissingColumn`] if the header lacks one of the five factors or
/// `RF`, and [`DataError::Parse`] for unreadable values.
pub fn parse_french_csv<R: Read>(reader: R) -> Result<RawFactorTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = csv_reader.records();

    let layout = loop {
        let Some(record) = records.next() else {
            return Err(DataError::MissingData {
                input: "factor file".to_string(),
                reason: format!("no header row naming {}", Factor::Market.source_label()),
            });
        };
        if let Some(layout) = ColumnLayout::from_header(&record?)? {
            break layout;
        }
    };
    debug!(?layout, "found factor header");

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        let Some(date) = record
            .get(0)
            .filter(|field| field.len() == 8)
            .and_then(parse_date)
        else {
            break;
        };
        let line = record.position().map_or(0, |p| p.line());
        rows.push((date, layout.parse_row(&record, line)?));
    }

    if rows.is_empty() {
        return Err(DataError::MissingData {
            input: "factor file".to_string(),
            reason: "header row is not followed by dated rows".to_string(),
        });
    }

    debug!(rows = rows.len(), "parsed factor rows");
    RawFactorTable::from_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    const SAMPLE: &str = "\
This file was created by CMPT_ME_BEME_OP_INV_RETS_DAILY using the 202401 CRSP database.
The Tbill return is the simple daily rate that compounds to 1-month TBill rate.

,Mkt-RF,SMB,HML,RMW,CMA,RF
20240102,   -0.71,    0.63,    1.12,    0.28,    0.44,   0.021
20240103,   -1.01,   -0.61,    0.15,    0.05,    0.18,   0.021

 Copyright 2024 Kenneth R. French
";

    #[test]
    fn test_parse_sample() {
        let table = parse_french_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.dates()[0],
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
        let first = table.rows()[0];
        assert_eq!(first.mkt, -0.71);
        assert_eq!(first.cma, 0.44);
        assert_eq!(first.rf, 0.021);
    }

    #[test]
    fn test_column_order_follows_header() {
        let csv = ",RF,CMA,RMW,HML,SMB,Mkt-RF\n20240102,0.02,5,4,3,2,1\n";
        let row = parse_french_csv(csv.as_bytes()).unwrap().rows()[0];
        assert_eq!(
            (row.mkt, row.smb, row.hml, row.rmw, row.cma, row.rf),
            (1.0, 2.0, 3.0, 4.0, 5.0, 0.02)
        );
    }

    #[test]
    fn test_three_factor_header_rejected() {
        let csv = ",Mkt-RF,SMB,HML,RF\n20240102,1,2,3,0.02\n";
        let err = parse_french_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { ref column, .. } if column == "RMW"));
    }

    #[test]
    fn test_missing_header() {
        let err = parse_french_csv("just some text\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::MissingData { .. }));
    }

    #[test]
    fn test_header_without_rows() {
        let csv = ",Mkt-RF,SMB,HML,RMW,CMA,RF\n\nCopyright\n";
        let err = parse_french_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::MissingData { .. }));
    }

    #[rstest]
    #[case("-99.99")]
    #[case("-999")]
    #[case("-999.00")]
    fn test_sentinel_rejected(#[case] sentinel: &str) {
        let csv = format!(",Mkt-RF,SMB,HML,RMW,CMA,RF\n20240102,0.5,0,{sentinel},0,0,0.02\n");
        let err = parse_french_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::MissingData { .. }));
    }

    #[test]
    fn test_unreadable_value() {
        let csv = ",Mkt-RF,SMB,HML,RMW,CMA,RF\n20240102,abc,0,0,0,0,0.02\n";
        let err = parse_french_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let source = FrenchCsvSource::new("no/such/dir/factors.CSV");
        assert!(matches!(source.fetch(), Err(DataError::Open { .. })));
        assert_eq!(source.name(), "no/such/dir/factors.CSV");
    }
}
