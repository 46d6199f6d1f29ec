// Writing query results as CSV.

use log::{info, warn};
use snafu::prelude::*;
use std::fs;
use text_diff::print_diff;

use crate::dash::*;

/// The header of the export: the identifier columns as named in the source, then the
/// indicator and its value.
pub fn export_header(columns: &IdentifierColumns) -> Vec<String> {
    vec![
        columns.entity.clone(),
        columns.survey.clone(),
        columns.area.clone(),
        "Indicator".to_string(),
        "Value".to_string(),
    ]
}

pub fn write_records<W: std::io::Write>(
    w: W,
    columns: &IdentifierColumns,
    records: &[LongRecord],
) -> DashResult<()> {
    let mut wtr = csv::Writer::from_writer(w);
    wtr.write_record(export_header(columns))
        .context(CsvWriteSnafu {})?;
    for lr in records.iter() {
        let value = lr.value.to_string();
        wtr.write_record([
            lr.entity.as_str(),
            lr.survey.as_str(),
            lr.area.as_str(),
            lr.indicator.as_str(),
            value.as_str(),
        ])
        .context(CsvWriteSnafu {})?;
    }
    wtr.flush().context(CsvFlushSnafu {})?;
    Ok(())
}

/// The records as CSV text (UTF-8, comma separated, with a header line).
pub fn records_to_csv(columns: &IdentifierColumns, records: &[LongRecord]) -> DashResult<String> {
    let mut buf: Vec<u8> = Vec::new();
    write_records(&mut buf, columns, records)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Writes the text to the given file, or to the standard output for `stdout`.
pub fn write_output(out: &str, text: &str) -> DashResult<()> {
    if out == "stdout" {
        print!("{}", text);
    } else {
        info!("Writing export to {:?}", out);
        fs::write(out, text).context(WriteOutputSnafu { path: out })?;
    }
    Ok(())
}

/// Compares an export with a reference file, and fails if they differ.
pub fn check_reference(reference_path: &str, produced: &str) -> DashResult<()> {
    let expected =
        fs::read_to_string(reference_path).context(ReadReferenceSnafu { path: reference_path })?;
    // Line endings may have been changed by a spreadsheet tool.
    let expected_n = expected.replace("\r\n", "\n");
    let produced_n = produced.replace("\r\n", "\n");
    if expected_n.trim_end() != produced_n.trim_end() {
        warn!("Found differences with the reference file {:?}", reference_path);
        print_diff(expected_n.as_str(), produced_n.as_str(), "\n");
        whatever!("Difference detected between the export and the reference file")
    }
    info!("Export matches the reference file {:?}", reference_path);
    Ok(())
}
