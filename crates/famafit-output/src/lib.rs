#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/famafit/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod diagnostics;
pub mod export;
pub mod report;
pub mod table;

pub use diagnostics::Diagnostics;
pub use export::{ExportError, ExportFormat, Exporter};
pub use report::{Report, ReportBuilder, ReportError};
pub use table::{ResultTable, TableRow};
