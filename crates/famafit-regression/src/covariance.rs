//! Parameter covariance estimators for OLS.
//!
//! All estimators share the sandwich form `B M B` with bread `B = (X'X)^-1`:
//!
//! ```text
//! NonRobust: σ² (X'X)^-1,                    σ² = SSR / (n - k)
//! Hc1:       n/(n-k) · B (Σ_t u_t² x_t x_t') B
//! Hac:       B (Γ_0 + Σ_{l=1}^{L} w_l (Γ_l + Γ_l')) B
//!            Γ_l = Σ_{t=l}^{n-1} u_t u_{t-l} x_t x_{t-l}'
//!            w_l = 1 - l/(L+1)                (Bartlett kernel)
//! ```
//!
//! # References
//! - White, H. (1980). "A Heteroskedasticity-Consistent Covariance Matrix
//!   Estimator and a Direct Test for Heteroskedasticity." Econometrica, 48(4).
//! - Newey, W. K., & West, K. D. (1987). "A Simple, Positive Semi-Definite,
//!   Heteroskedasticity and Autocorrelation Consistent Covariance Matrix."
//!   Econometrica, 55(3), 703-708.

use ndarray::{Array1, Array2, Axis, s};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How standard errors are computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CovarianceType {
    /// Homoskedastic errors
    #[default]
    NonRobust,
    /// White heteroskedasticity-consistent, with the n/(n-k) correction
    Hc1,
    /// Newey-West heteroskedasticity and autocorrelation consistent
    Hac {
        /// Maximum lag (None = automatic selection)
        lags: Option<usize>,
    },
}

impl CovarianceType {
    /// Short identifier.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NonRobust => "nonrobust",
            Self::Hc1 => "HC1",
            Self::Hac { .. } => "HAC",
        }
    }

    /// Whether inference uses Student-t (`true`) or the standard normal.
    ///
    /// Only the classical estimator has an exact t reference distribution;
    /// the robust ones are asymptotic.
    pub const fn uses_t_distribution(&self) -> bool {
        matches!(self, Self::NonRobust)
    }

    /// Parameter covariance matrix (k x k).
    ///
    /// # Arguments
    /// * `x` - Design matrix including the intercept column (n x k)
    /// * `residuals` - OLS residuals (n)
    /// * `bread` - `(X'X)^-1`
    /// * `sigma_sq` - Residual variance `SSR / (n - k)`
    pub(crate) fn parameter_covariance(
        &self,
        x: &Array2<f64>,
        residuals: &Array1<f64>,
        bread: &Array2<f64>,
        sigma_sq: f64,
    ) -> Array2<f64> {
        let (n, k) = x.dim();
        match self {
            Self::NonRobust => bread * sigma_sq,
            Self::Hc1 => {
                let scores = scores(x, residuals);
                let correction = n as f64 / (n - k) as f64;
                sandwich(bread, &scores.t().dot(&scores)) * correction
            }
            Self::Hac { lags } => {
                let max_lag = lags.unwrap_or_else(|| newey_west_lags(n)).min(n.saturating_sub(1));
                let scores = scores(x, residuals);
                let mut meat = scores.t().dot(&scores);
                for lag in 1..=max_lag {
                    let weight = bartlett_weight(lag, max_lag);
                    let gamma = scores
                        .slice(s![lag.., ..])
                        .t()
                        .dot(&scores.slice(s![..n - lag, ..]));
                    meat = meat + (&gamma + &gamma.t()) * weight;
                }
                sandwich(bread, &meat)
            }
        }
    }
}

impl fmt::Display for CovarianceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hac { lags: Some(lags) } => write!(f, "HAC (maxlags={lags})"),
            other => f.write_str(other.name()),
        }
    }
}

/// Newey-West rule of thumb for the lag length.
///
/// Formula: L = ceil(4 * (T/100)^(2/9))
pub fn newey_west_lags(n_periods: usize) -> usize {
    let t = n_periods as f64;
    (4.0 * (t / 100.0).powf(2.0 / 9.0)).ceil() as usize
}

/// Bartlett kernel weight `1 - l/(L+1)`, zero beyond `max_lag`.
pub(crate) fn bartlett_weight(lag: usize, max_lag: usize) -> f64 {
    if lag == 0 {
        1.0
    } else if lag <= max_lag {
        1.0 - (lag as f64) / (max_lag as f64 + 1.0)
    } else {
        0.0
    }
}

/// Rows of `x` scaled by their residual: `u_t x_t`.
fn scores(x: &Array2<f64>, residuals: &Array1<f64>) -> Array2<f64> {
    x * &residuals.view().insert_axis(Axis(1))
}

fn sandwich(bread: &Array2<f64>, meat: &Array2<f64>) -> Array2<f64> {
    bread.dot(meat).dot(bread)
}
