//! In-memory factor source for fixtures and tests.

use super::{FactorDataSource, RawFactorTable};
use crate::error::Result;

/// Serves a pre-built table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFactorSource {
    name: String,
    table: RawFactorTable,
}

impl InMemoryFactorSource {
    /// Wrap a table under the given name.
    pub fn new(name: impl Into<String>, table: RawFactorTable) -> Self {
        Self {
            name: name.into(),
            table,
        }
    }
}

impl FactorDataSource for InMemoryFactorSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<RawFactorTable> {
        Ok(self.table.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::FactorValues;
    use chrono::NaiveDate;

    #[test]
    fn test_fetch_returns_table() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let row = FactorValues {
            mkt: 1.0,
            smb: 0.0,
            hml: 0.0,
            rmw: 0.0,
            cma: 0.0,
            rf: 0.02,
        };
        let table = RawFactorTable::from_rows([(date, row)]).unwrap();
        let source = InMemoryFactorSource::new("fixture", table.clone());

        assert_eq!(source.name(), "fixture");
        assert_eq!(source.fetch().unwrap(), table);
    }
}
