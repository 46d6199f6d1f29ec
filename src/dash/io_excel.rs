// Primitives for reading Excel files.

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};
use log::{debug, warn};
use snafu::prelude::*;

use crate::dash::io_common::*;
use crate::dash::*;

/// Reads the worksheets of an Excel file.
///
/// If a worksheet name is given, only this worksheet is read. Otherwise all the non-empty
/// worksheets are read, and the ones without the identifier columns (notes, metadata) are
/// skipped. The load fails if no worksheet has them.
pub fn read_excel_file(
    path: &str,
    worksheet_name: Option<&str>,
    columns: &IdentifierColumns,
) -> DashResult<Vec<ParsedSheet>> {
    let mut res: Vec<ParsedSheet> = Vec::new();
    let mut skipped: Option<DashError> = None;
    for (name, wrange) in get_ranges(path, worksheet_name)? {
        if wrange.is_empty() {
            debug!("read_excel_file: skipping empty worksheet {:?}", name);
            continue;
        }
        match read_range(path, &name, &wrange, columns) {
            Ok(sheet) => res.push(sheet),
            Err(e @ DashError::MissingIdentifierColumn { .. }) if worksheet_name.is_none() => {
                warn!("read_excel_file: skipping worksheet {:?}: {}", name, e);
                skipped.get_or_insert(e);
            }
            Err(e) => return Err(e),
        }
    }
    if res.is_empty() {
        return match skipped {
            Some(e) => Err(e),
            None => EmptyExcelSnafu { path }.fail(),
        };
    }
    Ok(res)
}

fn read_range(
    path: &str,
    name: &str,
    wrange: &Range<DataType>,
    columns: &IdentifierColumns,
) -> DashResult<ParsedSheet> {
    let mut iter = wrange.rows();
    let header_cells = iter.next().context(EmptyExcelSnafu { path })?;
    let header: Vec<Option<String>> = header_cells.iter().map(read_header_cell).collect();
    debug!("read_excel_file: worksheet: {:?} header: {:?}", name, header);
    let layout = get_header_layout(&header, columns, path)?;

    let mut rows: Vec<ParsedRow> = Vec::new();
    for (idx, row) in iter.enumerate() {
        // The header is on line 1.
        let lineno = (idx + 2) as u64;
        let mut values: Vec<Option<f64>> = Vec::new();
        for (col_idx, cname) in layout.indicators.iter() {
            let v = match row.get(*col_idx) {
                Some(cell) => read_value_calamine(cell, path, lineno, cname)?,
                None => None,
            };
            values.push(v);
        }
        let pr = ParsedRow {
            lineno,
            entity: row.get(layout.entity_idx).and_then(read_identifier_cell),
            survey: row.get(layout.survey_idx).and_then(read_identifier_cell),
            area: row.get(layout.area_idx).and_then(read_identifier_cell),
            values,
        };
        rows.push(pr);
    }
    debug!(
        "read_excel_file: worksheet: {:?}: {} rows",
        name,
        rows.len()
    );
    Ok(ParsedSheet {
        name: name.to_string(),
        indicators: layout.indicators.into_iter().map(|p| p.1).collect(),
        rows,
    })
}

fn read_header_cell(cell: &DataType) -> Option<String> {
    match cell {
        DataType::String(s) => clean_header_name(s),
        DataType::Float(f) => Some(number_to_label(*f)),
        DataType::Int(i) => Some(i.to_string()),
        _ => None,
    }
}

fn read_identifier_cell(cell: &DataType) -> Option<String> {
    match cell {
        DataType::String(s) => clean_identifier(s),
        DataType::Float(f) => Some(number_to_label(*f)),
        DataType::Int(i) => Some(i.to_string()),
        _ => None,
    }
}

fn read_value_calamine(
    cell: &DataType,
    path: &str,
    lineno: u64,
    column: &str,
) -> DashResult<Option<f64>> {
    match cell {
        DataType::Float(f) => Ok(Some(*f)),
        DataType::Int(i) => Ok(Some(*i as f64)),
        DataType::Empty => Ok(None),
        DataType::String(s) => match parse_value_text(s) {
            Some(v) => Ok(v),
            None => ExcelWrongCellTypeSnafu {
                path,
                lineno,
                column,
                content: s.clone(),
            }
            .fail(),
        },
        // Formula errors such as #N/A or #DIV/0!.
        DataType::Error(e) => {
            warn!(
                "read_value_calamine: {} line {} column {:?}: cell error {:?}, treated as missing",
                path, lineno, column, e
            );
            Ok(None)
        }
        _ => ExcelWrongCellTypeSnafu {
            path,
            lineno,
            column,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

fn get_ranges(
    path: &str,
    worksheet_name_o: Option<&str>,
) -> DashResult<Vec<(String, Range<DataType>)>> {
    debug!(
        "read_excel_file: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                worksheet: worksheet_name,
                path,
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(vec![(worksheet_name.to_string(), wrange)])
    } else {
        Ok(workbook.worksheets())
    }
}
