#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/famafit/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod covariance;
pub mod error;
pub mod models;
pub mod ols;
mod qr;

pub use covariance::CovarianceType;
pub use error::{RegressionError, Result};
pub use models::{FactorModel, FactorRegressions, INTERCEPT, ModelFit, fit_model, fit_models};
pub use ols::{Coefficient, Ols, OlsConfig, OlsResults};
