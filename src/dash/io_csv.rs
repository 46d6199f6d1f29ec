// Primitives for reading CSV files.

use log::debug;
use snafu::prelude::*;

use crate::dash::io_common::*;
use crate::dash::*;

pub fn read_csv_file(path: &str, columns: &IdentifierColumns) -> DashResult<ParsedSheet> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();

    let header_record = match records.next() {
        Some(r) => r.context(CsvLineParseSnafu { path, lineno: 1u64 })?,
        None => return EmptyExcelSnafu { path }.fail(),
    };
    let header: Vec<Option<String>> = header_record.iter().map(clean_header_name).collect();
    debug!("read_csv_file: header: {:?}", header);
    let layout = get_header_layout(&header, columns, path)?;

    let mut rows: Vec<ParsedRow> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let lineno = (idx + 2) as u64;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        debug!("read_csv_file: {:?} {:?}", lineno, line);

        let mut values: Vec<Option<f64>> = Vec::new();
        for (col_idx, cname) in layout.indicators.iter() {
            // Short lines are padded with missing values.
            let s = line.get(*col_idx).unwrap_or("");
            let v = parse_value_text(s).context(CsvWrongCellTypeSnafu {
                path,
                lineno,
                column: cname.as_str(),
                content: s,
            })?;
            values.push(v);
        }
        rows.push(ParsedRow {
            lineno,
            entity: line.get(layout.entity_idx).and_then(clean_identifier),
            survey: line.get(layout.survey_idx).and_then(clean_identifier),
            area: line.get(layout.area_idx).and_then(clean_identifier),
            values,
        });
    }
    debug!("read_csv_file: {} rows", rows.len());
    Ok(ParsedSheet {
        name: simplify_file_name(path),
        indicators: layout.indicators.into_iter().map(|p| p.1).collect(),
        rows,
    })
}

fn simplify_file_name(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}
