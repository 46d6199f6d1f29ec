pub use crate::config::*;

use log::debug;
use std::collections::HashSet;

/// A builder for wide tables.
///
/// The builder enforces the invariants of the wide table: indicator columns are unique,
/// every record carries one value per indicator and no (entity, survey, area) repeats.
///
/// ```
/// use indicator_table::builder::Builder;
/// use indicator_table::{IndicatorView, TableErrors};
///
/// let mut builder = Builder::new(&["IndicatorX".to_string()])?;
/// builder.add_record("StateA", "Round1", "Total", &[Some(45.6)])?;
/// let table = builder.build();
///
/// assert_eq!(table.point_value("StateA", "Round1", "Total", "IndicatorX")?, 45.6);
///
/// # Ok::<(), TableErrors>(())
/// ```
pub struct Builder {
    pub(crate) _indicators: Vec<String>,
    pub(crate) _records: Vec<WideRecord>,
    _seen: HashSet<RecordKey>,
}

impl Builder {
    pub fn new(indicators: &[String]) -> Result<Builder, TableErrors> {
        let mut names: HashSet<&String> = HashSet::new();
        for name in indicators {
            if !names.insert(name) {
                return Err(TableErrors::DuplicateIndicator(name.clone()));
            }
        }
        Ok(Builder {
            _indicators: indicators.to_vec(),
            _records: Vec::new(),
            _seen: HashSet::new(),
        })
    }

    /// Adds a record, with one value per indicator column (in column order).
    pub fn add_record(
        &mut self,
        entity: &str,
        survey: &str,
        area: &str,
        values: &[Option<f64>],
    ) -> Result<(), TableErrors> {
        self.add_record_2(WideRecord {
            key: RecordKey::new(entity, survey, area),
            values: values.to_vec(),
        })
    }

    pub fn add_record_2(&mut self, record: WideRecord) -> Result<(), TableErrors> {
        if record.values.len() != self._indicators.len() {
            return Err(TableErrors::ArityMismatch {
                key: record.key,
                expected: self._indicators.len(),
                found: record.values.len(),
            });
        }
        if self._seen.contains(&record.key) {
            return Err(TableErrors::DuplicateRecord(record.key));
        }
        self._seen.insert(record.key.clone());
        self._records.push(record);
        Ok(())
    }

    pub fn num_records(&self) -> usize {
        self._records.len()
    }

    pub fn build(self) -> WideTable {
        debug!(
            "build: {} records, {} indicators",
            self._records.len(),
            self._indicators.len()
        );
        WideTable {
            indicators: self._indicators,
            records: self._records,
        }
    }
}
