use log::{debug, info, warn};

use indicator_table::*;
use snafu::{prelude::*, Snafu};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod config_reader;
pub mod export;
mod io_common;
mod io_csv;
mod io_excel;

use crate::dash::config_reader::*;
use crate::dash::export::*;

#[derive(Debug, Snafu)]
pub enum DashError {
    #[snafu(display("Source file {path} does not exist"))]
    SourceNotFound { path: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Worksheet {worksheet} not found in {path}"))]
    MissingWorksheet { worksheet: String, path: String },
    #[snafu(display("File {path} has no header row"))]
    EmptyExcel { path: String },
    #[snafu(display("Column {column} is missing from the header of {path}"))]
    MissingIdentifierColumn { column: String, path: String },
    #[snafu(display("Column {column} appears twice in the header of {path}"))]
    DuplicateColumn { column: String, path: String },
    #[snafu(display("Wrong cell type in {path}, line {lineno}, column {column}: {content}"))]
    ExcelWrongCellType {
        path: String,
        lineno: u64,
        column: String,
        content: String,
    },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing CSV file {path}, line {lineno}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: u64,
    },
    #[snafu(display("Wrong value in {path}, line {lineno}, column {column}: {content:?}"))]
    CsvWrongCellType {
        path: String,
        lineno: u64,
        column: String,
        content: String,
    },
    #[snafu(display("Invalid table in {path}"))]
    Table { source: TableErrors, path: String },
    #[snafu(display("Error reading {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Unknown input type {provider:?} (expected xlsx or csv)"))]
    UnknownProvider { provider: String },
    #[snafu(display("Error writing CSV"))]
    CsvWrite { source: csv::Error },
    #[snafu(display("Error flushing CSV output"))]
    CsvFlush { source: std::io::Error },
    #[snafu(display("Error reading reference file {path}"))]
    ReadReference {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing {path}"))]
    WriteOutput {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

impl DashError {
    /// True for the errors that come from a malformed source rather than a missing one.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            DashError::MissingIdentifierColumn { .. }
                | DashError::DuplicateColumn { .. }
                | DashError::Table { .. }
        )
    }
}

pub type DashResult<T> = Result<T, DashError>;

/// Which form of the data answers the queries.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Representation {
    Wide,
    Long,
}

impl Representation {
    pub fn parse(s: &str) -> DashResult<Representation> {
        match s {
            "wide" => Ok(Representation::Wide),
            "long" => Ok(Representation::Long),
            x => whatever!("Unknown representation {:?} (expected wide or long)", x),
        }
    }
}

/// Which query result gets exported.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ExportKind {
    Comparison,
    Trend,
    Long,
}

impl ExportKind {
    pub fn parse(s: &str) -> DashResult<ExportKind> {
        match s {
            "comparison" => Ok(ExportKind::Comparison),
            "trend" => Ok(ExportKind::Trend),
            "long" => Ok(ExportKind::Long),
            x => whatever!(
                "Unknown export {:?} (expected comparison, trend or long)",
                x
            ),
        }
    }
}

/// The filter values picked by the user. Missing values default to the first option.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Selection {
    pub state: Option<String>,
    pub survey: Option<String>,
    pub area: Option<String>,
    pub indicator: Option<String>,
}

/// Everything needed for one run, after merging the configuration file and the command line.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DashSettings {
    pub source: FileSource,
    /// The directory the file path is relative to.
    pub root: Option<PathBuf>,
    pub selection: Selection,
    pub survey_order: SurveyOrder,
    pub representation: Representation,
    pub export: Option<ExportKind>,
    pub out: Option<String>,
    pub reference: Option<String>,
    pub list_options: bool,
}

/// Loads a wide table from a source.
pub fn load(source: &FileSource, root: Option<&Path>) -> DashResult<WideTable> {
    let p = source.resolved_path(root);
    let path = p.as_path().display().to_string();
    ensure!(p.exists(), SourceNotFoundSnafu { path: path.clone() });
    let provider = source.provider()?;
    let columns = source.columns();
    info!("Attempting to read {:?} file {:?}", provider, path);
    let sheets = match provider {
        Provider::Xlsx => {
            io_excel::read_excel_file(&path, source.excel_worksheet_name.as_deref(), &columns)?
        }
        Provider::Csv => vec![io_csv::read_csv_file(&path, &columns)?],
    };
    let table = io_common::assemble_table(&sheets, &path)?;
    info!(
        "Loaded {} records and {} indicator columns from {:?}",
        table.records().len(),
        table.indicator_columns().len(),
        path
    );
    Ok(table)
}

/// Keeps the tables that were already loaded, one per source file.
///
/// The cache is owned by the caller. Tables are never mutated after loading, and handing out
/// `Arc`s keeps the handles valid after a reload.
#[derive(Debug, Default)]
pub struct SourceCache {
    tables: HashMap<PathBuf, Arc<WideTable>>,
}

impl SourceCache {
    pub fn new() -> SourceCache {
        SourceCache::default()
    }

    fn cache_key(source: &FileSource, root: Option<&Path>) -> PathBuf {
        let p = source.resolved_path(root);
        p.canonicalize().unwrap_or(p)
    }

    /// Returns the table for this source, loading it the first time.
    pub fn get_or_load(
        &mut self,
        source: &FileSource,
        root: Option<&Path>,
    ) -> DashResult<Arc<WideTable>> {
        let key = SourceCache::cache_key(source, root);
        if let Some(t) = self.tables.get(&key) {
            debug!("get_or_load: cache hit for {:?}", key);
            return Ok(t.clone());
        }
        self.reload(source, root)
    }

    /// Loads the source again and replaces the cached table.
    pub fn reload(&mut self, source: &FileSource, root: Option<&Path>) -> DashResult<Arc<WideTable>> {
        let table = Arc::new(load(source, root)?);
        let key = SourceCache::cache_key(source, root);
        self.tables.insert(key, table.clone());
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

fn pick(name: &str, chosen: &Option<String>, options: &[String]) -> DashResult<String> {
    match chosen {
        Some(x) => {
            if !options.contains(x) {
                warn!("{} {:?} does not appear in the data", name, x);
            }
            Ok(x.clone())
        }
        None => match options.first() {
            Some(x) => {
                info!("No {} selected, using {:?}", name, x);
                Ok(x.clone())
            }
            None => whatever!("No {} available in the data", name),
        },
    }
}

fn print_options(view: &dyn IndicatorView) {
    for (name, options) in [
        ("States/UTs", view.entities()),
        ("Surveys", view.surveys()),
        ("Areas", view.areas()),
        ("Indicators", view.indicators()),
    ] {
        println!("{}:", name);
        for o in options {
            println!("  {}", o);
        }
    }
}

/// Loads the data, answers the three queries for the selection and writes the export.
pub fn run_dashboard(settings: &DashSettings) -> DashResult<()> {
    info!("settings: {:?}", settings);
    let mut cache = SourceCache::new();
    let wide = cache.get_or_load(&settings.source, settings.root.as_deref())?;
    let long: Option<LongTable> = match settings.representation {
        Representation::Long => Some(to_long(&wide)),
        Representation::Wide => None,
    };
    let view: &dyn IndicatorView = match &long {
        Some(l) => l,
        None => &*wide,
    };
    summarize(view);

    if settings.list_options {
        print_options(view);
        return Ok(());
    }

    let sel = &settings.selection;
    let state = pick("state", &sel.state, &view.entities())?;
    let survey = pick("survey", &sel.survey, &view.surveys())?;
    let area = pick("area", &sel.area, &view.areas())?;
    let indicator = pick("indicator", &sel.indicator, &view.indicators())?;

    println!("Selected indicator value");
    match view.point_value(&state, &survey, &area, &indicator) {
        Ok(v) => println!("  {}: {:.2}", indicator, v),
        Err(e) if e.is_no_data() => {
            warn!("point_value: no data for {:?}", (&state, &survey, &area, &indicator));
            println!("  {}", e);
        }
        Err(e) => {
            return Err(e).context(TableSnafu {
                path: settings.source.file_path.clone(),
            })
        }
    }

    let comparison = view.comparison_rows(&survey, &area, &indicator);
    println!("State-wise comparison: {} ({} - {})", indicator, survey, area);
    for lr in comparison.iter() {
        println!("  {:<40} {:>8.2}", lr.entity, lr.value);
    }

    let trend = view.trend_rows(&state, &area, &indicator, &settings.survey_order);
    println!("Trend across surveys: {} ({} - {})", indicator, state, area);
    for lr in trend.iter() {
        println!("  {:<40} {:>8.2}", lr.survey, lr.value);
    }

    let export = match (settings.export, &settings.out) {
        (Some(k), _) => Some(k),
        (None, Some(_)) => Some(ExportKind::Comparison),
        (None, None) => None,
    };
    if let Some(kind) = export {
        let records: Vec<LongRecord> = match kind {
            ExportKind::Comparison => comparison,
            ExportKind::Trend => trend,
            ExportKind::Long => match long {
                Some(l) => l.records().to_vec(),
                None => to_long(&wide).records().to_vec(),
            },
        };
        let csv_text = records_to_csv(&settings.source.columns(), &records)?;
        write_output(settings.out.as_deref().unwrap_or("stdout"), &csv_text)?;
        if let Some(reference) = &settings.reference {
            check_reference(reference, &csv_text)?;
        }
    } else if settings.reference.is_some() {
        whatever!("A reference file was provided, but nothing is exported");
    }

    Ok(())
}

#[cfg(test)]
pub fn test_data_path(name: &str) -> String {
    format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn sample_csv() -> FileSource {
        FileSource::from_path(&test_data_path("nfhs_sample.csv"))
    }

    fn sample_xlsx() -> FileSource {
        FileSource::from_path(&test_data_path("nfhs_sample.xlsx"))
    }

    #[test]
    fn missing_source() {
        init();
        let res = load(&FileSource::from_path(&test_data_path("nope.xlsx")), None);
        assert!(matches!(res, Err(DashError::SourceNotFound { .. })));
    }

    #[test]
    fn missing_identifier_column() {
        init();
        let res = load(&FileSource::from_path(&test_data_path("missing_area.csv")), None);
        match res {
            Err(e) => {
                assert!(e.is_schema_error());
                assert!(
                    matches!(e, DashError::MissingIdentifierColumn { ref column, .. } if column == "Area")
                );
            }
            Ok(_) => panic!("the load should fail"),
        }
    }

    #[test]
    fn duplicate_triples_fail_the_load() {
        init();
        let res = load(&FileSource::from_path(&test_data_path("duplicate.csv")), None);
        assert!(matches!(
            res,
            Err(DashError::Table {
                source: TableErrors::DuplicateRecord(_),
                ..
            })
        ));
    }

    #[test]
    fn missing_value_markers_load() {
        init();
        let t = load(&FileSource::from_path(&test_data_path("missing_markers.csv")), None).unwrap();
        // Bihar and Goa only have markers.
        assert_eq!(t.records().len(), 2);
        assert_eq!(
            t.cell(&RecordKey::new("Kerala", "NFHS-4", "Total"), "X"),
            Some(12.5)
        );
        assert_eq!(t.cell(&RecordKey::new("Kerala", "NFHS-4", "Total"), "Y"), None);
        assert_eq!(t.cell(&RecordKey::new("Assam", "NFHS-4", "Total"), "X"), None);
    }

    #[test]
    fn repeated_note_columns_load() {
        init();
        let t = load(&FileSource::from_path(&test_data_path("repeated_notes.csv")), None).unwrap();
        assert_eq!(t.indicator_columns(), &["X", "Y"]);
        assert_eq!(
            t.cell(&RecordKey::new("Assam", "NFHS-4", "Total"), "Y"),
            Some(4.0)
        );
    }

    #[test]
    fn load_is_idempotent() {
        init();
        let a = load(&sample_csv(), None).unwrap();
        let b = load(&sample_csv(), None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn csv_and_excel_give_the_same_table() {
        init();
        let a = load(&sample_csv(), None).unwrap();
        let b = load(&sample_xlsx(), None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn cache_loads_once() {
        init();
        let mut cache = SourceCache::new();
        let a = cache.get_or_load(&sample_csv(), None).unwrap();
        let b = cache.get_or_load(&sample_csv(), None).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
        let c = cache.reload(&sample_csv(), None).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(*a, *c);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn queries_on_the_sample() {
        init();
        let wide = load(&sample_xlsx(), None).unwrap();
        let long = to_long(&wide);
        for v in [&wide as &dyn IndicatorView, &long as &dyn IndicatorView] {
            assert_eq!(
                v.compare_across_entities(
                    "NFHS-4",
                    "Total",
                    "Women age 20-24 years married before age 18 years (%)"
                ),
                vec![
                    ("Bihar".to_string(), 42.5),
                    ("Assam".to_string(), 30.8),
                    ("Kerala".to_string(), 7.6),
                ]
            );
            assert_eq!(
                v.trend_across_surveys(
                    "Kerala",
                    "Total",
                    "Women who are literate (%)",
                    &SurveyOrder::Natural
                ),
                vec![("NFHS-3".to_string(), 93.0), ("NFHS-4".to_string(), 97.9)]
            );
            // Suppressed in the source.
            assert_eq!(
                v.point_value("Assam", "NFHS-4", "Urban", "Women who are literate (%)"),
                Err(TableErrors::NoData)
            );
        }
    }

    #[test]
    fn run_with_export_and_reference() {
        init();
        let out = std::env::temp_dir().join(format!("nfhs-export-{}.csv", std::process::id()));
        let settings = DashSettings {
            source: sample_csv(),
            root: None,
            selection: Selection {
                state: Some("Kerala".to_string()),
                survey: Some("NFHS-4".to_string()),
                area: Some("Total".to_string()),
                indicator: Some(
                    "Women age 20-24 years married before age 18 years (%)".to_string(),
                ),
            },
            survey_order: SurveyOrder::Natural,
            representation: Representation::Long,
            export: Some(ExportKind::Comparison),
            out: Some(out.display().to_string()),
            reference: Some(test_data_path("expected_comparison.csv")),
            list_options: false,
        };
        run_dashboard(&settings).unwrap();
        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.starts_with("India/States/UTs,Survey,Area,Indicator,Value"));
        let _ = std::fs::remove_file(&out);
    }

    #[test]
    fn reference_mismatch_fails() {
        init();
        let settings = DashSettings {
            source: sample_csv(),
            root: None,
            selection: Selection {
                state: Some("Kerala".to_string()),
                survey: Some("NFHS-3".to_string()),
                area: Some("Total".to_string()),
                indicator: Some("Women who are literate (%)".to_string()),
            },
            survey_order: SurveyOrder::Natural,
            representation: Representation::Wide,
            export: Some(ExportKind::Comparison),
            out: Some("stdout".to_string()),
            reference: Some(test_data_path("expected_comparison.csv")),
            list_options: false,
        };
        assert!(run_dashboard(&settings).is_err());
    }

    #[test]
    fn empty_selection_uses_first_options() {
        init();
        let settings = DashSettings {
            source: sample_csv(),
            root: None,
            selection: Selection::default(),
            survey_order: SurveyOrder::Natural,
            representation: Representation::Wide,
            export: None,
            out: None,
            reference: None,
            list_options: false,
        };
        run_dashboard(&settings).unwrap();
    }
}
