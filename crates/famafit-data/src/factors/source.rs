//! The factor data source abstraction.

use super::RawFactorTable;
use crate::error::Result;

/// Anything that can supply a daily factor table in percentage points.
pub trait FactorDataSource {
    /// Human readable name used in logs and diagnostics.
    fn name(&self) -> &str;

    /// Retrieve the full factor table.
    ///
    /// # Errors
    /// Implementations report unreadable or malformed data as [`crate::DataError`].
    fn fetch(&self) -> Result<RawFactorTable>;
}
