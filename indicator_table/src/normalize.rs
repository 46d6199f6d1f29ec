use log::debug;
use std::collections::{HashMap, HashSet};

use crate::builder::Builder;
use crate::config::*;

/// Reshapes a wide table into its long form.
///
/// One record is emitted per (row, indicator) with a value. Missing values are dropped.
/// The records come out row by row, in column order, but callers should not rely on it.
pub fn to_long(table: &WideTable) -> LongTable {
    let mut records: Vec<LongRecord> = Vec::new();
    for r in table.records.iter() {
        for (indicator, v) in table.indicators.iter().zip(r.values.iter()) {
            if let Some(value) = v {
                records.push(LongRecord {
                    entity: r.key.entity.clone(),
                    survey: r.key.survey.clone(),
                    area: r.key.area.clone(),
                    indicator: indicator.clone(),
                    value: *value,
                });
            }
        }
    }
    debug!(
        "to_long: {} records x {} indicators -> {} values",
        table.records.len(),
        table.indicators.len(),
        records.len()
    );
    LongTable { records }
}

/// Pivots long records back into a wide table.
///
/// Indicator columns and rows appear in the order in which they are first seen.
pub fn to_wide(long: &LongTable) -> WideTable {
    let mut indicators: Vec<String> = Vec::new();
    let mut indicator_pos: HashMap<&str, usize> = HashMap::new();
    let mut keys: Vec<RecordKey> = Vec::new();
    let mut key_pos: HashMap<RecordKey, usize> = HashMap::new();
    for lr in long.records.iter() {
        if !indicator_pos.contains_key(lr.indicator.as_str()) {
            indicator_pos.insert(lr.indicator.as_str(), indicators.len());
            indicators.push(lr.indicator.clone());
        }
        let key = RecordKey::new(&lr.entity, &lr.survey, &lr.area);
        if !key_pos.contains_key(&key) {
            key_pos.insert(key.clone(), keys.len());
            keys.push(key);
        }
    }

    let mut values: Vec<Vec<Option<f64>>> = vec![vec![None; indicators.len()]; keys.len()];
    for lr in long.records.iter() {
        let key = RecordKey::new(&lr.entity, &lr.survey, &lr.area);
        // Both positions were registered in the first pass.
        if let (Some(row), Some(col)) = (key_pos.get(&key), indicator_pos.get(lr.indicator.as_str()))
        {
            values[*row][*col] = Some(lr.value);
        }
    }

    let records: Vec<WideRecord> = keys
        .into_iter()
        .zip(values)
        .map(|(key, values)| WideRecord { key, values })
        .collect();
    WideTable {
        indicators,
        records,
    }
}

impl LongTable {
    /// Builds a long table out of arbitrary records, checking that no
    /// (entity, survey, area, indicator) appears twice.
    pub fn from_records(records: Vec<LongRecord>) -> Result<LongTable, TableErrors> {
        {
            let mut seen: HashSet<(RecordKey, &str)> = HashSet::new();
            for lr in records.iter() {
                let key = RecordKey::new(&lr.entity, &lr.survey, &lr.area);
                if seen.contains(&(key.clone(), lr.indicator.as_str())) {
                    return Err(TableErrors::DuplicateObservation(
                        key,
                        lr.indicator.clone(),
                    ));
                }
                seen.insert((key, lr.indicator.as_str()));
            }
        }
        Ok(LongTable { records })
    }
}

impl WideTable {
    /// Same as `to_long`.
    pub fn to_long(&self) -> LongTable {
        to_long(self)
    }

    /// Builds a wide table from long records, rejecting duplicates.
    pub fn from_long(records: Vec<LongRecord>) -> Result<WideTable, TableErrors> {
        let long = LongTable::from_records(records)?;
        let wide = to_wide(&long);
        // The pivot keeps the builder invariants, check them anyway.
        let mut builder = Builder::new(&wide.indicators)?;
        for r in wide.records {
            builder.add_record_2(r)?;
        }
        Ok(builder.build())
    }
}
