// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The identifier triple of a record: which state, which survey round, which area type.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd)]
pub struct RecordKey {
    /// The state or union territory.
    pub entity: String,
    /// The survey round label, for example `NFHS-4`.
    pub survey: String,
    /// Urban, rural or total.
    pub area: String,
}

impl RecordKey {
    pub fn new(entity: &str, survey: &str, area: &str) -> RecordKey {
        RecordKey {
            entity: entity.to_string(),
            survey: survey.to_string(),
            area: area.to_string(),
        }
    }
}

/// One row of the wide table.
///
/// The values are aligned with the indicator columns of the table that owns the record.
#[derive(PartialEq, Debug, Clone)]
pub struct WideRecord {
    pub key: RecordKey,
    pub values: Vec<Option<f64>>,
}

/// The wide form of the data: one record per (entity, survey, area), one column per indicator.
///
/// Invariants (guaranteed at construction through the builder):
/// - the key of every record is unique
/// - every record has exactly one value slot per indicator
#[derive(PartialEq, Debug, Clone, Default)]
pub struct WideTable {
    pub(crate) indicators: Vec<String>,
    pub(crate) records: Vec<WideRecord>,
}

impl WideTable {
    pub fn indicator_columns(&self) -> &[String] {
        &self.indicators
    }

    pub fn records(&self) -> &[WideRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The stored value for one cell, if any.
    pub fn cell(&self, key: &RecordKey, indicator: &str) -> Option<f64> {
        let col = self.indicators.iter().position(|i| i == indicator)?;
        self.records
            .iter()
            .find(|r| r.key == *key)
            .and_then(|r| r.values.get(col).cloned().flatten())
    }
}

/// One row of the long form.
#[derive(PartialEq, Debug, Clone)]
pub struct LongRecord {
    pub entity: String,
    pub survey: String,
    pub area: String,
    pub indicator: String,
    pub value: f64,
}

/// The long form of the data: one record per (entity, survey, area, indicator).
///
/// Missing values are never stored, and the four identifiers are unique.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct LongTable {
    pub(crate) records: Vec<LongRecord>,
}

impl LongTable {
    pub fn records(&self) -> &[LongRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ******** Query settings *********

/// How survey rounds are ordered in the trend view.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub enum SurveyOrder {
    /// Numeric-aware ordering of the labels: `NFHS-3` < `NFHS-4` < `NFHS-10`.
    #[default]
    Natural,
    /// The rounds in the given order. Rounds that are not listed come after, in
    /// natural order.
    Explicit(Vec<String>),
}

// ******** Errors *********

/// Errors reported by the table layer.
#[derive(PartialEq, Debug, Clone)]
pub enum TableErrors {
    /// A query matched no stored value.
    NoData,
    /// The same (entity, survey, area) appears more than once.
    DuplicateRecord(RecordKey),
    /// The same (entity, survey, area, indicator) appears more than once in long records.
    DuplicateObservation(RecordKey, String),
    /// An indicator column is declared twice.
    DuplicateIndicator(String),
    /// A record does not have one value per indicator column.
    ArityMismatch {
        key: RecordKey,
        expected: usize,
        found: usize,
    },
}

impl TableErrors {
    pub fn is_no_data(&self) -> bool {
        matches!(self, TableErrors::NoData)
    }
}

impl Error for TableErrors {}

impl Display for TableErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableErrors::NoData => write!(f, "No data available for selected filters."),
            TableErrors::DuplicateRecord(k) => write!(
                f,
                "duplicate record for {} / {} / {}",
                k.entity, k.survey, k.area
            ),
            TableErrors::DuplicateObservation(k, ind) => write!(
                f,
                "duplicate value for {} / {} / {} / {}",
                k.entity, k.survey, k.area, ind
            ),
            TableErrors::DuplicateIndicator(name) => {
                write!(f, "indicator column {:?} declared twice", name)
            }
            TableErrors::ArityMismatch {
                key,
                expected,
                found,
            } => write!(
                f,
                "record {} / {} / {}: expected {} values, found {}",
                key.entity, key.survey, key.area, expected, found
            ),
        }
    }
}
