#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/famafit/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod factors;
pub mod merge;
pub mod prices;

pub use error::{DataError, Result};
pub use factors::{
    Factor, FactorDataSource, FactorSeries, FactorValues, FrenchCsvSource, InMemoryFactorSource,
    RawFactorTable,
};
pub use merge::{MergedFrame, MergedRow, merge};
pub use prices::{PriceSeries, ReturnSeries};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
