//! Ordinary least squares with classical and robust inference.
//!
//! The model is `y = b_0 + X b + e`; an intercept column is always prepended
//! to the regressors. Coefficients come from a Householder QR of the design
//! matrix, so the normal equations are never formed explicitly.

use crate::covariance::CovarianceType;
use crate::error::{RegressionError, Result};
use crate::models::INTERCEPT;
use crate::qr::{back_substitute, householder, numerical_rank, upper_triangular_inverse};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};
use tracing::debug;

/// Configuration for the OLS estimator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OlsConfig {
    /// Standard error estimator (default: non-robust)
    pub covariance: CovarianceType,
    /// Relative threshold on the diagonal of R below which a column counts as
    /// linearly dependent (default: 1e-10)
    pub rank_tolerance: f64,
}

impl Default for OlsConfig {
    fn default() -> Self {
        Self {
            covariance: CovarianceType::NonRobust,
            rank_tolerance: 1e-10,
        }
    }
}

/// Estimate and inference for one regression term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    /// Term name (`Intercept` or a regressor name)
    pub name: String,
    /// Point estimate
    pub estimate: f64,
    /// Standard error
    pub std_error: f64,
    /// `estimate / std_error`
    pub t_stat: f64,
    /// Two-sided p-value of `t_stat`
    pub p_value: f64,
}

/// Output of a single OLS fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OlsResults {
    /// Terms in design order, intercept first
    pub coefficients: Vec<Coefficient>,
    /// Coefficient of determination
    pub r_squared: f64,
    /// R² penalised for the number of regressors
    pub adj_r_squared: f64,
    /// Overall F-statistic against the intercept-only model
    pub f_statistic: f64,
    /// `sqrt(SSR / (n - k))`
    pub residual_std_error: f64,
    /// Number of observations
    pub nobs: usize,
    /// Residual degrees of freedom `n - k`
    pub df_resid: usize,
    /// Standard error estimator used
    pub covariance: CovarianceType,
    /// Residuals in observation order
    #[serde(skip)]
    pub residuals: Vec<f64>,
}

impl OlsResults {
    /// Look up a term by name.
    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.name == name)
    }

    /// Point estimates in design order.
    pub fn params(&self) -> Array1<f64> {
        self.coefficients.iter().map(|c| c.estimate).collect()
    }

    /// Two-sided p-values in design order.
    pub fn p_values(&self) -> Array1<f64> {
        self.coefficients.iter().map(|c| c.p_value).collect()
    }

    /// The intercept estimate.
    pub fn intercept(&self) -> f64 {
        self.coefficients[0].estimate
    }
}

/// OLS estimator.
#[derive(Debug, Clone, Default)]
pub struct Ols {
    config: OlsConfig,
}

impl Ols {
    /// Create an estimator with the given configuration.
    pub const fn new(config: OlsConfig) -> Self {
        Self { config }
    }

    /// Create an estimator with default settings and the given covariance type.
    pub fn with_covariance(covariance: CovarianceType) -> Self {
        Self::new(OlsConfig {
            covariance,
            ..Default::default()
        })
    }

    /// Estimator configuration.
    pub const fn config(&self) -> &OlsConfig {
        &self.config
    }

    /// Regress `y` on an intercept plus the columns of `regressors`.
    ///
    /// # Arguments
    /// * `y` - Response (n)
    /// * `regressors` - Regressor matrix without intercept (n x p)
    /// * `names` - One name per regressor column
    ///
    /// # Errors
    /// * [`RegressionError::DimensionMismatch`] if shapes disagree
    /// * [`RegressionError::InsufficientData`] if `n <= p + 1`
    /// * [`RegressionError::RankDeficient`] if the columns are collinear
    pub fn fit(
        &self,
        y: &Array1<f64>,
        regressors: &Array2<f64>,
        names: &[&str],
    ) -> Result<OlsResults> {
        let n = y.len();
        let (rows, p) = regressors.dim();
        if rows != n {
            return Err(RegressionError::DimensionMismatch {
                expected: n,
                actual: rows,
                context: "regressor rows".to_string(),
            });
        }
        if names.len() != p {
            return Err(RegressionError::DimensionMismatch {
                expected: p,
                actual: names.len(),
                context: "regressor names".to_string(),
            });
        }

        let k = p + 1;
        if n <= k {
            return Err(RegressionError::InsufficientData {
                required: k + 1,
                actual: n,
            });
        }

        let x = Array2::from_shape_fn((n, k), |(i, j)| {
            if j == 0 { 1.0 } else { regressors[[i, j - 1]] }
        });

        let qr = householder(&x, y);
        let rank = numerical_rank(&qr.r, self.config.rank_tolerance);
        if rank < k {
            return Err(RegressionError::RankDeficient { rank, columns: k });
        }

        let beta = back_substitute(&qr.r, &qr.qty);
        let residuals = y - &x.dot(&beta);

        let df_resid = n - k;
        let ssr = residuals.dot(&residuals);
        let mean = y.sum() / n as f64;
        let tss = y.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
        let sigma_sq = ssr / df_resid as f64;

        let r_squared = if tss > 0.0 { 1.0 - ssr / tss } else { f64::NAN };
        let adj_r_squared = 1.0 - (1.0 - r_squared) * (n - 1) as f64 / df_resid as f64;
        let f_statistic = ((tss - ssr) / p as f64) / sigma_sq;

        let r_inv = upper_triangular_inverse(&qr.r);
        let bread = r_inv.dot(&r_inv.t());
        let cov = self
            .config
            .covariance
            .parameter_covariance(&x, &residuals, &bread, sigma_sq);

        let reference = Reference::new(self.config.covariance, df_resid)?;
        let coefficients = std::iter::once(INTERCEPT)
            .chain(names.iter().copied())
            .enumerate()
            .map(|(j, name)| {
                let std_error = cov[[j, j]].max(0.0).sqrt();
                let t_stat = beta[j] / std_error;
                Coefficient {
                    name: name.to_string(),
                    estimate: beta[j],
                    std_error,
                    t_stat,
                    p_value: reference.two_sided_p(t_stat),
                }
            })
            .collect();

        debug!(
            nobs = n,
            params = k,
            r_squared,
            covariance = %self.config.covariance,
            "fitted OLS"
        );

        Ok(OlsResults {
            coefficients,
            r_squared,
            adj_r_squared,
            f_statistic,
            residual_std_error: sigma_sq.sqrt(),
            nobs: n,
            df_resid,
            covariance: self.config.covariance,
            residuals: residuals.to_vec(),
        })
    }
}

/// Reference distribution for t-statistics.
enum Reference {
    StudentT(StudentsT),
    Normal(Normal),
}

impl Reference {
    fn new(covariance: CovarianceType, df_resid: usize) -> Result<Self> {
        if covariance.uses_t_distribution() {
            StudentsT::new(0.0, 1.0, df_resid as f64)
                .map(Self::StudentT)
                .map_err(|e| RegressionError::Distribution(e.to_string()))
        } else {
            Normal::new(0.0, 1.0)
                .map(Self::Normal)
                .map_err(|e| RegressionError::Distribution(e.to_string()))
        }
    }

    fn two_sided_p(&self, t_stat: f64) -> f64 {
        if t_stat.is_nan() {
            return f64::NAN;
        }
        if t_stat.is_infinite() {
            return 0.0;
        }
        let tail = match self {
            Self::StudentT(dist) => dist.sf(t_stat.abs()),
            Self::Normal(dist) => dist.sf(t_stat.abs()),
        };
        (2.0 * tail).min(1.0)
    }
}
