//! CSV and JSON export of result tables.

use crate::table::ResultTable;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Writer produced invalid UTF-8.
    #[error("Encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }

    /// Pick a format from a file extension (`.csv` or `.json`).
    ///
    /// # Errors
    /// Returns [`ExportError::InvalidFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(format!(
                "unsupported export extension {:?} for {}",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Exporter for ResultTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for row in self.rows() {
                    wtr.serialize(row)?;
                }
                let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
                Ok(String::from_utf8(bytes)?)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self.rows())?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self.rows())?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::sample_regressions;
    use rstest::rstest;

    fn table() -> ResultTable {
        ResultTable::from_regressions(&sample_regressions())
    }

    #[test]
    fn test_csv_export() {
        let csv = table().export_to_string(ExportFormat::Csv).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "term,CAPM_coeff,CAPM_tstat,FF3_coeff,FF3_tstat,FF5_coeff,FF5_tstat"
        );
        assert_eq!(lines.next().unwrap(), "Intercept,0.0,0.0,10.0,20.0,20.0,40.0");
        // SMB is absent from CAPM, so its cells are empty.
        let smb = csv.lines().find(|l| l.starts_with("SMB")).unwrap();
        assert!(smb.starts_with("SMB,,,"));
        assert_eq!(csv.lines().count(), 7);
    }

    #[test]
    fn test_json_export() {
        let json = table().export_to_string(ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value.as_array().unwrap().len(), 6);
        assert_eq!(value[1]["term"], "MKT");
        assert_eq!(value[1]["CAPM_coeff"], 1.0);
        assert!(value[5]["CAPM_coeff"].is_null());
    }

    #[test]
    fn test_export_to_file() {
        let path = std::env::temp_dir().join("famafit_export_test.csv");
        table().export_to_file(&path, ExportFormat::Csv).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("term,"));
        std::fs::remove_file(&path).ok();
    }

    #[rstest]
    #[case("out.csv", Some(ExportFormat::Csv))]
    #[case("OUT.CSV", Some(ExportFormat::Csv))]
    #[case("out.json", Some(ExportFormat::PrettyJson))]
    #[case("out.xlsx", None)]
    #[case("out", None)]
    fn test_format_from_path(#[case] path: &str, #[case] expected: Option<ExportFormat>) {
        assert_eq!(ExportFormat::from_path(Path::new(path)).ok(), expected);
    }

    #[test]
    fn test_extension() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }
}
