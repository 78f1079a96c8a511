//! Adjusted close prices and the simple returns derived from them.
//!
//! The loader expects the layout produced by the usual end-of-day download
//! tools: a header row with at least `Date` and `Adj Close`, one row per
//! trading day. Any other columns (`Open`, `High`, `Volume`, ...) are ignored.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Header of the date column.
pub const DATE_COLUMN: &str = "Date";

/// Header of the adjusted close column.
pub const ADJ_CLOSE_COLUMN: &str = "Adj Close";

/// Parse a calendar date written as `YYYY-MM-DD` or `YYYYMMDD`.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().or_else(|| {
        if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
            NaiveDate::parse_from_str(value, "%Y%m%d").ok()
        } else {
            None
        }
    })
}

/// Open `path`, keeping the path in the error.
pub(crate) fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| DataError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Sort `(date, value)` pairs ascending and reject repeated dates.
pub(crate) fn sort_unique<T>(mut points: Vec<(NaiveDate, T)>) -> Result<Vec<(NaiveDate, T)>> {
    points.sort_by_key(|(date, _)| *date);
    if let Some(pair) = points.windows(2).find(|pair| pair[0].0 == pair[1].0) {
        return Err(DataError::DuplicateDate(pair[0].0));
    }
    Ok(points)
}

/// Date-indexed adjusted close prices, sorted ascending with unique dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    dates: Vec<NaiveDate>,
    prices: Vec<f64>,
}

impl PriceSeries {
    /// Build a series from arbitrary-order observations.
    ///
    /// # Errors
    /// Returns [`DataError::DuplicateDate`] if a date repeats and
    /// [`DataError::InvalidPrice`] for non-finite or non-positive prices.
    pub fn from_points(points: impl IntoIterator<Item = (NaiveDate, f64)>) -> Result<Self> {
        let points = sort_unique(points.into_iter().collect())?;

        if let Some(&(date, price)) = points.iter().find(|(_, p)| !p.is_finite() || *p <= 0.0) {
            return Err(DataError::InvalidPrice { date, price });
        }

        let (dates, prices) = points.into_iter().unzip();
        Ok(Self { dates, prices })
    }

    /// Load a price CSV from disk.
    ///
    /// # Errors
    /// Fails if the file cannot be opened or its contents are malformed,
    /// see [`PriceSeries::from_reader`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading price file");
        let file = open_file(path)?;
        Self::read_csv(file, &path.display().to_string())
    }

    /// Load a price CSV from any reader.
    ///
    /// # Errors
    /// Returns [`DataError::MissingColumn`] if `Date` or `Adj Close` is absent,
    /// [`DataError::Parse`] for an unreadable date or price, and the errors of
    /// [`PriceSeries::from_points`].
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::read_csv(reader, "price data")
    }

    fn read_csv<R: Read>(reader: R, input: &str) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let position = |column: &str| {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| DataError::MissingColumn {
                    column: column.to_string(),
                    input: input.to_string(),
                })
        };
        let date_idx = position(DATE_COLUMN)?;
        let price_idx = position(ADJ_CLOSE_COLUMN)?;

        let mut points = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line());
            let raw_date = record.get(date_idx).unwrap_or_default();
            let raw_price = record.get(price_idx).unwrap_or_default();

            let date = parse_date(raw_date).ok_or_else(|| {
                DataError::Parse(format!("{input} line {line}: invalid date '{raw_date}'"))
            })?;
            let price = raw_price.parse::<f64>().map_err(|_| {
                DataError::Parse(format!("{input} line {line}: invalid price '{raw_price}'"))
            })?;
            points.push((date, price));
        }

        debug!(rows = points.len(), "parsed price rows");
        Self::from_points(points)
    }

    /// Number of observations.
    pub const fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the series has no observations.
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Observation dates, ascending.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Adjusted close prices aligned with [`PriceSeries::dates`].
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Restrict the series to an inclusive date window. `None` leaves that side open.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidDateRange`] when `start` is after `end`.
    pub fn between(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self> {
        if let (Some(start), Some(end)) = (start, end)
            && start > end
        {
            return Err(DataError::InvalidDateRange { start, end });
        }

        let (dates, prices) = self
            .dates
            .iter()
            .zip(&self.prices)
            .filter(|(date, _)| {
                start.is_none_or(|s| **date >= s) && end.is_none_or(|e| **date <= e)
            })
            .map(|(d, p)| (*d, *p))
            .unzip();
        Ok(Self { dates, prices })
    }

    /// Simple returns `(p[t] - p[t-1]) / p[t-1]`, dated at `t`.
    ///
    /// The first observation has no predecessor and is dropped, so a series of
    /// `n` prices yields `n - 1` returns.
    pub fn returns(&self) -> ReturnSeries {
        let (dates, returns) = self
            .prices
            .windows(2)
            .zip(self.dates.iter().skip(1))
            .map(|(pair, date)| (*date, (pair[1] - pair[0]) / pair[0]))
            .unzip();
        ReturnSeries { dates, returns }
    }
}

/// Date-indexed simple returns, sorted ascending with unique dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnSeries {
    dates: Vec<NaiveDate>,
    returns: Vec<f64>,
}

impl ReturnSeries {
    /// Build a return series directly from observations.
    ///
    /// # Errors
    /// Returns [`DataError::DuplicateDate`] if a date repeats.
    pub fn from_points(points: impl IntoIterator<Item = (NaiveDate, f64)>) -> Result<Self> {
        let (dates, returns) = sort_unique(points.into_iter().collect())?
            .into_iter()
            .unzip();
        Ok(Self { dates, returns })
    }

    /// Number of observations.
    pub const fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the series has no observations.
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Observation dates, ascending.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Returns aligned with [`ReturnSeries::dates`].
    pub fn values(&self) -> &[f64] {
        &self.returns
    }

    /// Iterate over `(date, return)` pairs in date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.returns.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const SAMPLE: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2024-01-04,182.15,183.09,180.88,181.91,181.18,71983600
2024-01-02,187.15,188.44,183.89,185.64,184.94,82488700
2024-01-03,184.22,185.88,183.43,184.25,183.56,58414500
";

    #[test]
    fn test_from_reader_sorts_by_date() {
        let series = PriceSeries::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(
            series.dates(),
            &[date(2024, 1, 2), date(2024, 1, 3), date(2024, 1, 4)]
        );
        assert_eq!(series.prices(), &[184.94, 183.56, 181.18]);
    }

    #[test]
    fn test_returns_are_relative_changes() {
        let series = PriceSeries::from_reader(SAMPLE.as_bytes()).unwrap();
        let returns = series.returns();

        assert_eq!(returns.len(), 2);
        assert_eq!(returns.dates(), &[date(2024, 1, 3), date(2024, 1, 4)]);
        assert_abs_diff_eq!(returns.values()[0], (183.56 - 184.94) / 184.94, epsilon = 1e-15);
        assert_abs_diff_eq!(returns.values()[1], (181.18 - 183.56) / 183.56, epsilon = 1e-15);
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(10)]
    #[case(250)]
    fn test_returns_length_is_one_less(#[case] n: usize) {
        let start = date(2020, 1, 1);
        let series = PriceSeries::from_points(
            (0..n).map(|i| (start + chrono::Days::new(i as u64), 100.0 + i as f64)),
        )
        .unwrap();
        assert_eq!(series.returns().len(), n - 1);
    }

    #[test]
    fn test_empty_series_has_no_returns() {
        assert!(PriceSeries::default().returns().is_empty());
    }

    #[rstest]
    #[case("Date,Close\n2024-01-02,1.0\n", "Adj Close")]
    #[case("Day,Adj Close\n2024-01-02,1.0\n", "Date")]
    fn test_missing_column(#[case] csv: &str, #[case] expected: &str) {
        let err = PriceSeries::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { ref column, .. } if column == expected));
    }

    #[test]
    fn test_invalid_price_text() {
        let csv = "Date,Adj Close\n2024-01-02,null\n";
        let err = PriceSeries::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::Parse(ref msg) if msg.contains("null")));
    }

    #[test]
    fn test_invalid_date_text() {
        let csv = "Date,Adj Close\nJan 2,1.0\n";
        let err = PriceSeries::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::Parse(_)));
    }

    #[test]
    fn test_duplicate_date_rejected() {
        let csv = "Date,Adj Close\n2024-01-02,1.0\n2024-01-02,1.1\n";
        let err = PriceSeries::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::DuplicateDate(d) if d == date(2024, 1, 2)));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-3.0)]
    #[case(f64::NAN)]
    fn test_non_positive_price_rejected(#[case] price: f64) {
        let err = PriceSeries::from_points([(date(2024, 1, 2), price)]).unwrap_err();
        assert!(matches!(err, DataError::InvalidPrice { .. }));
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = PriceSeries::from_path("definitely/not/here/XYZ.csv").unwrap_err();
        assert!(matches!(
            &err,
            DataError::Open { path, .. } if path == Path::new("definitely/not/here/XYZ.csv")
        ));
        assert!(err.to_string().contains("definitely/not/here/XYZ.csv"));
    }

    #[test]
    fn test_compact_dates_accepted() {
        assert_eq!(parse_date("20240105"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("202401"), None);
    }

    #[test]
    fn test_between_is_inclusive() {
        let series = PriceSeries::from_reader(SAMPLE.as_bytes()).unwrap();
        let window = series
            .between(Some(date(2024, 1, 3)), Some(date(2024, 1, 4)))
            .unwrap();
        assert_eq!(window.dates(), &[date(2024, 1, 3), date(2024, 1, 4)]);

        let open_start = series.between(None, Some(date(2024, 1, 2))).unwrap();
        assert_eq!(open_start.len(), 1);
    }

    #[test]
    fn test_between_rejects_inverted_range() {
        let series = PriceSeries::from_reader(SAMPLE.as_bytes()).unwrap();
        let err = series
            .between(Some(date(2024, 2, 1)), Some(date(2024, 1, 1)))
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidDateRange { .. }));
    }
}
