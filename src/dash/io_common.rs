use log::{debug, warn};
use snafu::prelude::*;

use std::collections::HashMap;

use indicator_table::builder::Builder;

use crate::dash::*;

/// A row as read from a source, before the drop rules are applied.
#[derive(PartialEq, Debug, Clone)]
pub struct ParsedRow {
    /// The line in the source file, starting at 1 for the header.
    pub lineno: u64,
    pub entity: Option<String>,
    pub survey: Option<String>,
    pub area: Option<String>,
    /// One value per indicator of the sheet.
    pub values: Vec<Option<f64>>,
}

/// The content of one sheet (or one CSV file).
#[derive(PartialEq, Debug, Clone)]
pub struct ParsedSheet {
    pub name: String,
    pub indicators: Vec<String>,
    pub rows: Vec<ParsedRow>,
}

/// Where each column of interest lives in the header.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct HeaderLayout {
    pub entity_idx: usize,
    pub survey_idx: usize,
    pub area_idx: usize,
    /// (column index, indicator name), in header order.
    pub indicators: Vec<(usize, String)>,
}

/// Given the header of a file (names of each of the columns), finds the identifier columns
/// and the indicator columns. Note columns and unnamed columns are skipped, and may repeat.
pub fn get_header_layout(
    header: &[Option<String>],
    columns: &IdentifierColumns,
    path: &str,
) -> DashResult<HeaderLayout> {
    let is_note = |n: &str| {
        n.starts_with(columns.annotation_prefix.as_str())
            && n != columns.entity
            && n != columns.survey
            && n != columns.area
    };

    let mut col_names: HashMap<&str, usize> = HashMap::new();
    for (idx, name) in header.iter().enumerate() {
        match name {
            Some(n) if is_note(n.as_str()) => {
                debug!("get_header_layout: dropping note column {:?}", n);
            }
            Some(n) => {
                if col_names.insert(n.as_str(), idx).is_some() {
                    return DuplicateColumnSnafu {
                        column: n.clone(),
                        path,
                    }
                    .fail();
                }
            }
            None => {}
        }
    }
    debug!("get_header_layout: col_names: {:?}", col_names);

    let find = |cname: &str| -> DashResult<usize> {
        col_names
            .get(cname)
            .cloned()
            .context(MissingIdentifierColumnSnafu {
                column: cname,
                path,
            })
    };
    let entity_idx = find(&columns.entity)?;
    let survey_idx = find(&columns.survey)?;
    let area_idx = find(&columns.area)?;

    let mut indicators: Vec<(usize, String)> = col_names
        .iter()
        .filter(|(_, idx)| **idx != entity_idx && **idx != survey_idx && **idx != area_idx)
        .map(|(n, idx)| (*idx, n.to_string()))
        .collect();
    indicators.sort();

    Ok(HeaderLayout {
        entity_idx,
        survey_idx,
        area_idx,
        indicators,
    })
}

/// Header cells are trimmed; blank names count as no name.
pub fn clean_header_name(s: &str) -> Option<String> {
    // A CSV written by Excel may start with a byte order mark.
    let t = s.trim_start_matches('\u{feff}').trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

/// Identifier cells are trimmed; blank cells count as missing.
pub fn clean_identifier(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

/// Renders a numeric identifier cell (a year, for example) as text.
pub fn number_to_label(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

/// Markers of a missing value, compared without case. `*` and `-` are the suppression marks
/// of the fact sheets, the others are written by spreadsheet and data-frame tools.
const MISSING_MARKERS: [&str; 17] = [
    "", "*", "-", "na", "n/a", "#n/a", "#n/a n/a", "#na", "nan", "-nan", "null", "none", "<na>",
    "1.#ind", "-1.#ind", "1.#qnan", "-1.#qnan",
];

fn is_missing_marker(t: &str) -> bool {
    MISSING_MARKERS.iter().any(|m| m.eq_ignore_ascii_case(t))
}

/// Parses the text of an indicator cell.
///
/// Returns `None` if the text is not understood, `Some(None)` for a missing value and
/// `Some(Some(x))` for a value. Values in parentheses are estimates based on few cases and
/// are kept.
pub fn parse_value_text(s: &str) -> Option<Option<f64>> {
    let t = s.trim();
    if is_missing_marker(t) {
        return Some(None);
    }
    let inner = t
        .strip_prefix('(')
        .and_then(|x| x.strip_suffix(')'))
        .unwrap_or(t)
        .trim();
    inner.parse::<f64>().ok().filter(|x| x.is_finite()).map(Some)
}

/// Applies the drop rules and builds the wide table out of the parsed sheets.
///
/// The indicator columns are the union of the sheets' columns, in order of first appearance.
pub fn assemble_table(sheets: &[ParsedSheet], path: &str) -> DashResult<WideTable> {
    let mut indicators: Vec<String> = Vec::new();
    let mut indicator_pos: HashMap<&str, usize> = HashMap::new();
    for s in sheets.iter() {
        for ind in s.indicators.iter() {
            if !indicator_pos.contains_key(ind.as_str()) {
                indicator_pos.insert(ind.as_str(), indicators.len());
                indicators.push(ind.clone());
            }
        }
    }

    let mut builder = Builder::new(&indicators).context(TableSnafu { path })?;
    for s in sheets.iter() {
        let positions: Vec<usize> = s
            .indicators
            .iter()
            .filter_map(|ind| indicator_pos.get(ind.as_str()).cloned())
            .collect();
        for row in s.rows.iter() {
            if row.values.iter().all(|v| v.is_none()) {
                debug!(
                    "assemble_table: sheet {:?} line {}: no value, dropping row",
                    s.name, row.lineno
                );
                continue;
            }
            let (entity, survey, area) = match (&row.entity, &row.survey, &row.area) {
                (Some(e), Some(sv), Some(a)) => (e, sv, a),
                _ => {
                    warn!(
                        "assemble_table: sheet {:?} line {}: missing identifier in {:?}, skipping row",
                        s.name, row.lineno, row
                    );
                    continue;
                }
            };
            let mut values: Vec<Option<f64>> = vec![None; indicators.len()];
            for (pos, v) in positions.iter().zip(row.values.iter()) {
                values[*pos] = *v;
            }
            builder
                .add_record(entity, survey, area, &values)
                .context(TableSnafu { path })?;
        }
    }
    debug!(
        "assemble_table: {} sheets -> {} records",
        sheets.len(),
        builder.num_records()
    );
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(xs: &[&str]) -> Vec<Option<String>> {
        xs.iter().map(|s| clean_header_name(s)).collect()
    }

    #[test]
    fn layout_skips_notes_and_blanks() {
        let h = header(&[
            "India/States/UTs",
            "Survey",
            "Area",
            "Women who are literate (%)",
            "Note of : Women who are literate (%)",
            "",
            "Men who are literate (%)",
        ]);
        let layout = get_header_layout(&h, &IdentifierColumns::default(), "test").unwrap();
        assert_eq!(layout.entity_idx, 0);
        assert_eq!(layout.area_idx, 2);
        assert_eq!(
            layout.indicators,
            vec![
                (3, "Women who are literate (%)".to_string()),
                (6, "Men who are literate (%)".to_string())
            ]
        );
    }

    #[test]
    fn layout_with_identifiers_anywhere() {
        let h = header(&["X", "Area", "Survey", "Y", "India/States/UTs"]);
        let layout = get_header_layout(&h, &IdentifierColumns::default(), "test").unwrap();
        assert_eq!(layout.entity_idx, 4);
        assert_eq!(layout.survey_idx, 2);
        assert_eq!(
            layout.indicators,
            vec![(0, "X".to_string()), (3, "Y".to_string())]
        );
    }

    #[test]
    fn layout_missing_survey() {
        let h = header(&["India/States/UTs", "Area", "X"]);
        let res = get_header_layout(&h, &IdentifierColumns::default(), "test");
        assert!(
            matches!(res, Err(DashError::MissingIdentifierColumn { column, .. }) if column == "Survey")
        );
    }

    #[test]
    fn layout_allows_repeated_notes() {
        let h = header(&[
            "India/States/UTs",
            "Survey",
            "Area",
            "X",
            "Note of :",
            "Y",
            "Note of :",
        ]);
        let layout = get_header_layout(&h, &IdentifierColumns::default(), "test").unwrap();
        assert_eq!(
            layout.indicators,
            vec![(3, "X".to_string()), (5, "Y".to_string())]
        );
    }

    #[test]
    fn layout_duplicate_column() {
        let h = header(&["India/States/UTs", "Survey", "Area", "X", "X"]);
        let res = get_header_layout(&h, &IdentifierColumns::default(), "test");
        assert!(matches!(res, Err(DashError::DuplicateColumn { .. })));
    }

    #[test]
    fn value_text() {
        assert_eq!(parse_value_text("45.6"), Some(Some(45.6)));
        assert_eq!(parse_value_text(" (12.3) "), Some(Some(12.3)));
        assert_eq!(parse_value_text("*"), Some(None));
        assert_eq!(parse_value_text(""), Some(None));
        assert_eq!(parse_value_text("NA"), Some(None));
        assert_eq!(parse_value_text("lots"), None);
        assert_eq!(parse_value_text("inf"), None);
    }

    #[test]
    fn missing_markers_ignore_case() {
        for m in [
            "NaN", "nan", "-NaN", "n/a", "N/A", "NULL", "null", "None", "#N/A", "<NA>", " na ",
        ] {
            assert_eq!(parse_value_text(m), Some(None), "{:?}", m);
        }
        assert_eq!(parse_value_text("nans"), None);
    }

    #[test]
    fn labels() {
        assert_eq!(number_to_label(2015.0), "2015");
        assert_eq!(number_to_label(4.5), "4.5");
        assert_eq!(clean_header_name("\u{feff}India/States/UTs "), Some("India/States/UTs".to_string()));
        assert_eq!(clean_identifier("   "), None);
    }

    fn row(lineno: u64, ids: (&str, &str, &str), values: &[Option<f64>]) -> ParsedRow {
        ParsedRow {
            lineno,
            entity: clean_identifier(ids.0),
            survey: clean_identifier(ids.1),
            area: clean_identifier(ids.2),
            values: values.to_vec(),
        }
    }

    #[test]
    fn assemble_drops_empty_rows_and_merges_sheets() {
        let s1 = ParsedSheet {
            name: "NFHS-4".to_string(),
            indicators: vec!["X".to_string(), "Y".to_string()],
            rows: vec![
                row(2, ("Kerala", "NFHS-4", "Total"), &[Some(1.0), None]),
                row(3, ("Assam", "NFHS-4", "Total"), &[None, None]),
                row(4, ("", "", ""), &[None, None]),
                row(5, ("", "NFHS-4", "Total"), &[Some(9.0), None]),
            ],
        };
        let s2 = ParsedSheet {
            name: "NFHS-5".to_string(),
            indicators: vec!["Z".to_string(), "X".to_string()],
            rows: vec![row(2, ("Kerala", "NFHS-5", "Total"), &[Some(3.0), Some(2.0)])],
        };
        let t = assemble_table(&[s1, s2], "test").unwrap();
        assert_eq!(t.indicator_columns(), &["X", "Y", "Z"]);
        assert_eq!(t.records().len(), 2);
        assert_eq!(
            t.cell(&RecordKey::new("Kerala", "NFHS-5", "Total"), "X"),
            Some(2.0)
        );
        assert_eq!(
            t.cell(&RecordKey::new("Kerala", "NFHS-5", "Total"), "Z"),
            Some(3.0)
        );
        assert_eq!(
            t.cell(&RecordKey::new("Kerala", "NFHS-4", "Total"), "Z"),
            None
        );
    }
}
