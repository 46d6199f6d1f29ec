mod config;
mod normalize;
mod ordering;

pub mod builder;
pub mod manual;

use log::{debug, info};
use std::collections::{BTreeSet, HashSet};

pub use crate::config::*;
pub use crate::normalize::{to_long, to_wide};
pub use crate::ordering::natural_cmp;

/// A single stored value, borrowed from a table.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Observation<'a> {
    pub entity: &'a str,
    pub survey: &'a str,
    pub area: &'a str,
    pub indicator: &'a str,
    pub value: f64,
}

impl<'a> Observation<'a> {
    fn to_record(self) -> LongRecord {
        LongRecord {
            entity: self.entity.to_string(),
            survey: self.survey.to_string(),
            area: self.area.to_string(),
            indicator: self.indicator.to_string(),
            value: self.value,
        }
    }
}

/// Query access to indicator data.
///
/// Implementors only expose their present values. The queries are linear scans over them,
/// so that the wide and the long representations answer every query identically.
pub trait IndicatorView {
    /// All the stored values. Missing values are never returned.
    fn observations(&self) -> Box<dyn Iterator<Item = Observation<'_>> + '_>;

    /// The value of one indicator for one (entity, survey, area).
    ///
    /// Matching is exact and case-sensitive. Returns `TableErrors::NoData` if no value is stored,
    /// which callers are expected to show as an empty state.
    fn point_value(
        &self,
        entity: &str,
        survey: &str,
        area: &str,
        indicator: &str,
    ) -> Result<f64, TableErrors> {
        let res = self
            .observations()
            .find(|o| {
                o.entity == entity
                    && o.survey == survey
                    && o.area == area
                    && o.indicator == indicator
            })
            .map(|o| o.value);
        debug!(
            "point_value: {:?} {:?} {:?} {:?} -> {:?}",
            entity, survey, area, indicator, res
        );
        res.ok_or(TableErrors::NoData)
    }

    /// The ranking of all the entities for one indicator, in one survey and one area.
    ///
    /// Sorted by decreasing value, ties broken by entity name. Entities without a value are
    /// left out.
    fn compare_across_entities(
        &self,
        survey: &str,
        area: &str,
        indicator: &str,
    ) -> Vec<(String, f64)> {
        self.comparison_rows(survey, area, indicator)
            .into_iter()
            .map(|lr| (lr.entity, lr.value))
            .collect()
    }

    /// Same as `compare_across_entities`, with the full records.
    fn comparison_rows(&self, survey: &str, area: &str, indicator: &str) -> Vec<LongRecord> {
        let mut res: Vec<LongRecord> = self
            .observations()
            .filter(|o| o.survey == survey && o.area == area && o.indicator == indicator)
            .map(|o| o.to_record())
            .collect();
        res.sort_by(|a, b| {
            b.value
                .total_cmp(&a.value)
                .then_with(|| a.entity.cmp(&b.entity))
        });
        debug!(
            "comparison_rows: {:?} {:?} {:?} -> {} entities",
            survey,
            area,
            indicator,
            res.len()
        );
        res
    }

    /// The values of one indicator across the survey rounds, for one entity and one area.
    fn trend_across_surveys(
        &self,
        entity: &str,
        area: &str,
        indicator: &str,
        order: &SurveyOrder,
    ) -> Vec<(String, f64)> {
        self.trend_rows(entity, area, indicator, order)
            .into_iter()
            .map(|lr| (lr.survey, lr.value))
            .collect()
    }

    /// Same as `trend_across_surveys`, with the full records.
    fn trend_rows(
        &self,
        entity: &str,
        area: &str,
        indicator: &str,
        order: &SurveyOrder,
    ) -> Vec<LongRecord> {
        let mut res: Vec<LongRecord> = self
            .observations()
            .filter(|o| o.entity == entity && o.area == area && o.indicator == indicator)
            .map(|o| o.to_record())
            .collect();
        res.sort_by(|a, b| order.compare(&a.survey, &b.survey));
        debug!(
            "trend_rows: {:?} {:?} {:?} -> {} rounds",
            entity,
            area,
            indicator,
            res.len()
        );
        res
    }

    /// The entities with at least one value, sorted.
    fn entities(&self) -> Vec<String> {
        distinct(self.observations().map(|o| o.entity))
    }

    /// The survey rounds with at least one value, sorted.
    fn surveys(&self) -> Vec<String> {
        distinct(self.observations().map(|o| o.survey))
    }

    /// The area types with at least one value, sorted.
    fn areas(&self) -> Vec<String> {
        distinct(self.observations().map(|o| o.area))
    }

    /// The indicators with at least one value, sorted.
    fn indicators(&self) -> Vec<String> {
        distinct(self.observations().map(|o| o.indicator))
    }
}

fn distinct<'a>(it: impl Iterator<Item = &'a str>) -> Vec<String> {
    let s: BTreeSet<&str> = it.collect();
    s.into_iter().map(|x| x.to_string()).collect()
}

impl IndicatorView for WideTable {
    fn observations(&self) -> Box<dyn Iterator<Item = Observation<'_>> + '_> {
        Box::new(self.records.iter().flat_map(move |r| {
            self.indicators
                .iter()
                .zip(r.values.iter())
                .filter_map(move |(indicator, v)| {
                    v.map(|value| Observation {
                        entity: r.key.entity.as_str(),
                        survey: r.key.survey.as_str(),
                        area: r.key.area.as_str(),
                        indicator: indicator.as_str(),
                        value,
                    })
                })
        }))
    }
}

impl IndicatorView for LongTable {
    fn observations(&self) -> Box<dyn Iterator<Item = Observation<'_>> + '_> {
        Box::new(self.records.iter().map(|lr| Observation {
            entity: lr.entity.as_str(),
            survey: lr.survey.as_str(),
            area: lr.area.as_str(),
            indicator: lr.indicator.as_str(),
            value: lr.value,
        }))
    }
}

/// Statistics about a table, as logged after loading.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TableSummary {
    pub num_entities: usize,
    pub num_surveys: usize,
    pub num_areas: usize,
    pub num_indicators: usize,
    pub num_values: usize,
}

pub fn summarize(view: &dyn IndicatorView) -> TableSummary {
    let mut entities: HashSet<&str> = HashSet::new();
    let mut surveys: HashSet<&str> = HashSet::new();
    let mut areas: HashSet<&str> = HashSet::new();
    let mut indicators: HashSet<&str> = HashSet::new();
    let mut num_values = 0;
    for o in view.observations() {
        entities.insert(o.entity);
        surveys.insert(o.survey);
        areas.insert(o.area);
        indicators.insert(o.indicator);
        num_values += 1;
    }
    let res = TableSummary {
        num_entities: entities.len(),
        num_surveys: surveys.len(),
        num_areas: areas.len(),
        num_indicators: indicators.len(),
        num_values,
    };
    info!("summarize: {:?}", res);
    res
}
