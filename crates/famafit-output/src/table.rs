//! The side-by-side CAPM / FF3 / FF5 result table.

use famafit_data::Factor;
use famafit_regression::{FactorModel, FactorRegressions, INTERCEPT, ModelFit};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of the term column.
const TERM_WIDTH: usize = 12;

/// Width of each value column.
const CELL_WIDTH: usize = 11;

/// Magnitude from which cells switch to scientific notation, so that six
/// decimals still fit in [`CELL_WIDTH`].
const SCIENTIFIC_THRESHOLD: f64 = 1e3;

fn format_cell(value: f64) -> String {
    if value.abs() >= SCIENTIFIC_THRESHOLD {
        format!("{value:.4e}")
    } else {
        format!("{value:.6}")
    }
}

/// One row of the result table. Cells are `None` where a model lacks the term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// `Intercept` or a regressor name
    #[serde(rename = "term")]
    pub term: String,
    /// CAPM coefficient
    #[serde(rename = "CAPM_coeff")]
    pub capm_coeff: Option<f64>,
    /// CAPM t-statistic
    #[serde(rename = "CAPM_tstat")]
    pub capm_tstat: Option<f64>,
    /// FF3 coefficient
    #[serde(rename = "FF3_coeff")]
    pub ff3_coeff: Option<f64>,
    /// FF3 t-statistic
    #[serde(rename = "FF3_tstat")]
    pub ff3_tstat: Option<f64>,
    /// FF5 coefficient
    #[serde(rename = "FF5_coeff")]
    pub ff5_coeff: Option<f64>,
    /// FF5 t-statistic
    #[serde(rename = "FF5_tstat")]
    pub ff5_tstat: Option<f64>,
}

impl TableRow {
    fn cells(&self) -> [Option<f64>; 6] {
        [
            self.capm_coeff,
            self.capm_tstat,
            self.ff3_coeff,
            self.ff3_tstat,
            self.ff5_coeff,
            self.ff5_tstat,
        ]
    }

    /// Coefficient for `model`.
    pub const fn coeff(&self, model: FactorModel) -> Option<f64> {
        match model {
            FactorModel::Capm => self.capm_coeff,
            FactorModel::FamaFrench3 => self.ff3_coeff,
            FactorModel::FamaFrench5 => self.ff5_coeff,
        }
    }

    /// t-statistic for `model`.
    pub const fn tstat(&self, model: FactorModel) -> Option<f64> {
        match model {
            FactorModel::Capm => self.capm_tstat,
            FactorModel::FamaFrench3 => self.ff3_tstat,
            FactorModel::FamaFrench5 => self.ff5_tstat,
        }
    }
}

/// Coefficients and t-statistics of all three models, one row per term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    rows: Vec<TableRow>,
}

impl ResultTable {
    /// Column headers after the term column.
    pub const COLUMNS: [&'static str; 6] = [
        "CAPM_coeff",
        "CAPM_tstat",
        "FF3_coeff",
        "FF3_tstat",
        "FF5_coeff",
        "FF5_tstat",
    ];

    /// Row labels in table order.
    pub fn terms() -> impl Iterator<Item = &'static str> {
        std::iter::once(INTERCEPT).chain(Factor::ALL.into_iter().map(|f| f.label()))
    }

    /// Assemble the table from fitted models.
    pub fn from_regressions(fits: &FactorRegressions) -> Self {
        let lookup = |fit: &ModelFit, term: &str| {
            fit.results
                .coefficient(term)
                .map(|c| (c.estimate, c.t_stat))
                .unzip()
        };

        let rows = Self::terms()
            .map(|term| {
                let (capm_coeff, capm_tstat) = lookup(&fits.capm, term);
                let (ff3_coeff, ff3_tstat) = lookup(&fits.ff3, term);
                let (ff5_coeff, ff5_tstat) = lookup(&fits.ff5, term);
                TableRow {
                    term: term.to_string(),
                    capm_coeff,
                    capm_tstat,
                    ff3_coeff,
                    ff3_tstat,
                    ff5_coeff,
                    ff5_tstat,
                }
            })
            .collect();

        Self { rows }
    }

    /// Rows in table order.
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Row for `term`.
    pub fn row(&self, term: &str) -> Option<&TableRow> {
        self.rows.iter().find(|r| r.term == term)
    }

    /// Render as a fixed-width text table. Missing cells print as `NaN`.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("{:<TERM_WIDTH$}", ""));
        for column in Self::COLUMNS {
            output.push_str(&format!(" {column:>CELL_WIDTH$}"));
        }
        output.push('\n');
        output.push_str(&"-".repeat(TERM_WIDTH + (CELL_WIDTH + 1) * Self::COLUMNS.len()));
        output.push('\n');

        for row in &self.rows {
            output.push_str(&format!("{:<TERM_WIDTH$}", row.term));
            for cell in row.cells() {
                match cell {
                    Some(value) => {
                        output.push_str(&format!(" {:>CELL_WIDTH$}", format_cell(value)));
                    }
                    None => output.push_str(&format!(" {:>CELL_WIDTH$}", "NaN")),
                }
            }
            output.push('\n');
        }

        output
    }

    /// Render as a Markdown table. Missing cells are left blank.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("| Term |");
        for column in Self::COLUMNS {
            output.push_str(&format!(" {column} |"));
        }
        output.push('\n');
        output.push_str("|------|");
        output.push_str(&"---:|".repeat(Self::COLUMNS.len()));
        output.push('\n');

        for row in &self.rows {
            output.push_str(&format!("| {} |", row.term));
            for cell in row.cells() {
                match cell {
                    Some(value) => output.push_str(&format!(" {} |", format_cell(value))),
                    None => output.push_str("  |"),
                }
            }
            output.push('\n');
        }

        output
    }
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii_table())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use famafit_regression::{Coefficient, CovarianceType, OlsResults};

    fn fit(model: FactorModel, base: f64) -> ModelFit {
        let coefficients = std::iter::once(INTERCEPT)
            .chain(model.regressors().iter().map(Factor::label))
            .enumerate()
            .map(|(i, name)| Coefficient {
                name: name.to_string(),
                estimate: base + i as f64,
                std_error: 0.5,
                t_stat: 2.0 * (base + i as f64),
                p_value: 0.05,
            })
            .collect();
        ModelFit {
            model,
            results: OlsResults {
                coefficients,
                r_squared: 0.5,
                adj_r_squared: 0.45,
                f_statistic: 10.0,
                residual_std_error: 0.01,
                nobs: 100,
                df_resid: 100 - model.regressors().len() - 1,
                covariance: CovarianceType::NonRobust,
                residuals: Vec::new(),
            },
        }
    }

    pub(crate) fn sample_regressions() -> FactorRegressions {
        FactorRegressions {
            capm: fit(FactorModel::Capm, 0.0),
            ff3: fit(FactorModel::FamaFrench3, 10.0),
            ff5: fit(FactorModel::FamaFrench5, 20.0),
        }
    }

    #[test]
    fn test_row_order() {
        let table = ResultTable::from_regressions(&sample_regressions());
        let terms: Vec<&str> = table.rows().iter().map(|r| r.term.as_str()).collect();
        assert_eq!(terms, ["Intercept", "MKT", "SMB", "HML", "RMW", "CMA"]);
    }

    #[test]
    fn test_cells_missing_where_model_lacks_term() {
        let table = ResultTable::from_regressions(&sample_regressions());

        let mkt = table.row("MKT").unwrap();
        assert_eq!(mkt.capm_coeff, Some(1.0));
        assert_eq!(mkt.capm_tstat, Some(2.0));
        assert_eq!(mkt.ff3_coeff, Some(11.0));
        assert_eq!(mkt.ff5_coeff, Some(21.0));

        let hml = table.row("HML").unwrap();
        assert_eq!(hml.coeff(FactorModel::Capm), None);
        assert_eq!(hml.coeff(FactorModel::FamaFrench3), Some(13.0));

        let cma = table.row("CMA").unwrap();
        assert_eq!(cma.tstat(FactorModel::FamaFrench3), None);
        assert_eq!(cma.coeff(FactorModel::FamaFrench5), Some(25.0));
    }

    #[test]
    fn test_ascii_table() {
        let table = ResultTable::from_regressions(&sample_regressions());
        let ascii = table.to_ascii_table();

        assert!(ascii.contains("CAPM_coeff"));
        assert!(ascii.contains("FF5_tstat"));
        let rmw_line = ascii.lines().find(|l| l.starts_with("RMW")).unwrap();
        assert_eq!(rmw_line.matches("NaN").count(), 4);
        assert_eq!(ascii, table.to_string());
    }

    #[test]
    fn test_large_values_keep_columns_aligned() {
        let mut fits = sample_regressions();
        fits.ff5.results.coefficients[1].t_stat = 121_628_573_321.938_75;
        fits.capm.results.coefficients[1].t_stat = -2.5e9;
        let ascii = ResultTable::from_regressions(&fits).to_ascii_table();

        let widths: Vec<usize> = ascii.lines().map(str::len).collect();
        assert!(widths.iter().all(|w| *w == widths[0]), "{ascii}");

        let mkt_line = ascii.lines().find(|l| l.starts_with("MKT")).unwrap();
        assert!(mkt_line.contains("1.2163e11"));
        assert!(mkt_line.contains("-2.5000e9"));
    }

    #[rstest::rstest]
    #[case(1.5, "1.500000")]
    #[case(-999.0, "-999.000000")]
    #[case(1e3, "1.0000e3")]
    #[case(-0.000_012_6, "-0.000013")]
    #[case(f64::NAN, "NaN")]
    fn test_format_cell(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_cell(value), expected);
    }

    #[test]
    fn test_markdown_table() {
        let markdown = ResultTable::from_regressions(&sample_regressions()).to_markdown();
        assert!(markdown.starts_with("| Term | CAPM_coeff |"));
        assert_eq!(markdown.lines().count(), 8);
    }
}
