//! Intermediate printout of a factor regression run.

use crate::report::ReportError;
use famafit_data::{Factor, RawFactorTable};
use famafit_regression::{FactorRegressions, ModelFit};
use std::fmt::Write as _;
use std::io;

/// Human readable diagnostics: the source table, fit quality and p-values.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    source_table: String,
    body: String,
}

impl Diagnostics {
    /// Build the diagnostics for one run.
    ///
    /// # Errors
    /// Returns [`ReportError::Data`] if the source table cannot be rendered.
    pub fn new(raw: &RawFactorTable, fits: &FactorRegressions) -> Result<Self, ReportError> {
        let source_table = raw.to_dataframe()?.to_string();

        let mut body = String::new();
        let line = |body: &mut String, label: &str, value: f64| {
            let _ = writeln!(body, "{label}: {value:.6}");
        };
        line(&mut body, "CAPM adj. R2", fits.capm.results.adj_r_squared);
        if let Some(beta) = fits.capm.loading(Factor::Market) {
            line(&mut body, "CAPM beta", beta);
        }
        line(&mut body, "FF3 adj. R2", fits.ff3.results.adj_r_squared);
        line(&mut body, "FF5 adj. R2", fits.ff5.results.adj_r_squared);

        for fit in fits.iter() {
            push_p_values(&mut body, fit);
        }

        Ok(Self { source_table, body })
    }

    /// Rendered source factor table.
    pub fn source_table(&self) -> &str {
        &self.source_table
    }

    /// Write everything to `out`.
    ///
    /// # Errors
    /// Propagates write failures.
    pub fn write_to<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Source data:")?;
        writeln!(out, "{}", self.source_table)?;
        write!(out, "{}", self.body)
    }

    /// Everything as one string.
    pub fn render(&self) -> String {
        format!("Source data:\n{}\n{}", self.source_table, self.body)
    }
}

fn push_p_values(body: &mut String, fit: &ModelFit) {
    let _ = writeln!(
        body,
        "{} p-values ({}, {} obs):",
        fit.model.name(),
        fit.results.covariance,
        fit.results.nobs
    );
    for coef in &fit.results.coefficients {
        let _ = writeln!(body, "  {:<12} {:.6e}", coef.name, coef.p_value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::sample_regressions;
    use chrono::NaiveDate;
    use famafit_data::FactorValues;

    fn raw() -> RawFactorTable {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        RawFactorTable::from_rows([(
            date,
            FactorValues {
                mkt: -0.71,
                smb: 0.63,
                hml: 1.12,
                rmw: 0.28,
                cma: 0.44,
                rf: 0.021,
            },
        )])
        .unwrap()
    }

    #[test]
    fn test_render_sections() {
        let diagnostics = Diagnostics::new(&raw(), &sample_regressions()).unwrap();
        let text = diagnostics.render();

        assert!(text.starts_with("Source data:"));
        assert!(text.contains("Mkt-RF"));
        assert!(text.contains("CAPM adj. R2: 0.450000"));
        assert!(text.contains("CAPM beta: 1.000000"));
        assert!(text.contains("FF3 p-values"));
        assert!(text.contains("FF5 p-values (nonrobust, 100 obs):"));
    }

    #[test]
    fn test_write_to_matches_render() {
        let diagnostics = Diagnostics::new(&raw(), &sample_regressions()).unwrap();
        let mut buffer = Vec::new();
        diagnostics.write_to(&mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), diagnostics.render());
    }
}
