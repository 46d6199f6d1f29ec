use clap::Parser;

/// Queries a table of household-survey indicators (one row per state, survey round and area).
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file describing the source and its columns.
    /// The file path of the source is relative to the directory of the configuration file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path or empty) The spreadsheet to read. Setting this option overrides the path that
    /// may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (xlsx or csv, default: from the file extension) The type of the input.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use. All the worksheets
    /// are read otherwise.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// The state or union territory. Defaults to the first one in alphabetical order.
    #[clap(long, value_parser)]
    pub state: Option<String>,

    /// The survey round. Defaults to the first one in alphabetical order.
    #[clap(long, value_parser)]
    pub survey: Option<String>,

    /// The area type (urban, rural, total). Defaults to the first one in alphabetical order.
    #[clap(long, value_parser)]
    pub area: Option<String>,

    /// The indicator. Defaults to the first one in alphabetical order.
    #[clap(long, value_parser)]
    pub indicator: Option<String>,

    /// (list of survey rounds or not specified) The chronological order of the survey rounds, used
    /// for the trend. If not specified, the rounds are sorted by label, numbers compared by value.
    #[clap(long, value_parser)]
    pub survey_order: Option<Vec<String>>,

    /// (wide or long, default wide) The form of the data that answers the queries.
    #[clap(long, value_parser)]
    pub representation: Option<String>,

    /// (comparison, trend or long) The result to export as CSV. Defaults to comparison when --out
    /// is given.
    #[clap(long, value_parser)]
    pub export: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the export is written in CSV format to the
    /// given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference CSV file. If provided, the export is checked against it.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// Lists the states, surveys, areas and indicators available, and exits.
    #[clap(long, takes_value = false)]
    pub list: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
