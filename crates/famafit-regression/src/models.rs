//! CAPM and Fama-French factor model definitions.
//!
//! Each model regresses the asset's excess return on a nested set of factors:
//!
//! | Model | Regressors                  |
//! |-------|-----------------------------|
//! | CAPM  | MKT                         |
//! | FF3   | MKT, SMB, HML               |
//! | FF5   | MKT, SMB, HML, RMW, CMA     |

use crate::covariance::CovarianceType;
use crate::error::Result;
use crate::ols::{Ols, OlsResults};
use famafit_data::{Factor, MergedFrame};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// Name of the constant term in every fit.
pub const INTERCEPT: &str = "Intercept";

/// Below this many aligned days the estimates are reported but flagged.
const SHORT_SAMPLE_WARNING: usize = 30;

/// A factor model: the regressors it uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactorModel {
    /// Capital Asset Pricing Model
    Capm,
    /// Fama-French three-factor model
    FamaFrench3,
    /// Fama-French five-factor model
    FamaFrench5,
}

impl FactorModel {
    /// All models, smallest first.
    pub const ALL: [Self; 3] = [Self::Capm, Self::FamaFrench3, Self::FamaFrench5];

    /// Short name used as a column prefix in reports.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Capm => "CAPM",
            Self::FamaFrench3 => "FF3",
            Self::FamaFrench5 => "FF5",
        }
    }

    /// Regressors in design order.
    pub const fn regressors(&self) -> &'static [Factor] {
        match self {
            Self::Capm => &[Factor::Market],
            Self::FamaFrench3 => &[Factor::Market, Factor::Size, Factor::Value],
            Self::FamaFrench5 => &Factor::ALL,
        }
    }

    /// Formula in `response ~ terms` notation.
    pub fn formula(&self) -> String {
        let terms: Vec<&str> = self.regressors().iter().map(Factor::label).collect();
        format!("XsRet ~ {}", terms.join(" + "))
    }
}

impl fmt::Display for FactorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFit {
    /// Model that was fitted
    pub model: FactorModel,
    /// Regression output
    pub results: OlsResults,
}

impl ModelFit {
    /// Coefficient on `factor`, if the model includes it.
    pub fn loading(&self, factor: Factor) -> Option<f64> {
        self.results
            .coefficient(factor.label())
            .map(|c| c.estimate)
    }
}

/// CAPM, FF3 and FF5 fitted on the same frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorRegressions {
    /// One-factor fit
    pub capm: ModelFit,
    /// Three-factor fit
    pub ff3: ModelFit,
    /// Five-factor fit
    pub ff5: ModelFit,
}

impl FactorRegressions {
    /// The fit for `model`.
    pub const fn get(&self, model: FactorModel) -> &ModelFit {
        match model {
            FactorModel::Capm => &self.capm,
            FactorModel::FamaFrench3 => &self.ff3,
            FactorModel::FamaFrench5 => &self.ff5,
        }
    }

    /// Fits in CAPM, FF3, FF5 order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelFit> {
        [&self.capm, &self.ff3, &self.ff5].into_iter()
    }
}

/// Regress excess returns on the factors of `model`.
///
/// # Errors
/// Propagates [`crate::RegressionError`] from the OLS fit, including
/// `InsufficientData` for an empty or too-short frame.
pub fn fit_model(frame: &MergedFrame, model: FactorModel, ols: &Ols) -> Result<ModelFit> {
    let regressors = model.regressors();
    let names: Vec<&str> = regressors.iter().map(Factor::label).collect();
    let results = ols.fit(&frame.excess_returns(), &frame.design(regressors), &names)?;

    info!(
        model = model.name(),
        adj_r_squared = results.adj_r_squared,
        nobs = results.nobs,
        "fitted factor model"
    );
    Ok(ModelFit { model, results })
}

/// Fit all three models with the same covariance estimator.
///
/// # Errors
/// Fails on the first model that cannot be estimated.
pub fn fit_models(frame: &MergedFrame, covariance: CovarianceType) -> Result<FactorRegressions> {
    if frame.len() < SHORT_SAMPLE_WARNING {
        warn!(
            rows = frame.len(),
            "few overlapping dates between returns and factors"
        );
    }

    let ols = Ols::with_covariance(covariance);
    Ok(FactorRegressions {
        capm: fit_model(frame, FactorModel::Capm, &ols)?,
        ff3: fit_model(frame, FactorModel::FamaFrench3, &ols)?,
        ff5: fit_model(frame, FactorModel::FamaFrench5, &ols)?,
    })
}
