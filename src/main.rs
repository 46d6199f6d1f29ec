mod args;
mod dash;

use clap::Parser;
use log::{debug, info};
use snafu::{prelude::*, ErrorCompat};

use indicator_table::SurveyOrder;

use crate::args::Args;
use crate::dash::config_reader::*;
use crate::dash::*;

fn build_settings(args: &Args) -> DashResult<DashSettings> {
    let (config, root) = match &args.config {
        Some(config_path) => {
            info!("Reading configuration {:?}", config_path);
            let (c, root) = read_config(config_path)?;
            (Some(c), Some(root))
        }
        None => (None, None),
    };

    let mut source = match (&config, &args.input) {
        (Some(c), None) => c.source.clone(),
        // The type of the new input is deduced again from its extension.
        (Some(c), Some(input)) => FileSource {
            _provider: None,
            file_path: input.clone(),
            ..c.source.clone()
        },
        (None, Some(input)) => FileSource::from_path(input),
        (None, None) => whatever!("No input provided: use --input or --config"),
    };
    // The input given on the command line is not relative to the configuration.
    let root = match &args.input {
        Some(_) => None,
        None => root,
    };
    if let Some(t) = &args.input_type {
        source._provider = Some(t.clone());
    }
    if let Some(w) = &args.excel_worksheet_name {
        source.excel_worksheet_name = Some(w.clone());
    }

    let survey_order = match (&args.survey_order, &config) {
        (Some(order), _) => SurveyOrder::from_labels(order),
        (None, Some(c)) => c.survey_order(),
        (None, None) => SurveyOrder::Natural,
    };
    let representation = match (&args.representation, &config) {
        (Some(r), _) => Representation::parse(r)?,
        (None, Some(c)) => c.representation()?,
        (None, None) => Representation::Wide,
    };
    let export = match &args.export {
        Some(e) => Some(ExportKind::parse(e)?),
        None => None,
    };

    Ok(DashSettings {
        source,
        root,
        selection: Selection {
            state: args.state.clone(),
            survey: args.survey.clone(),
            area: args.area.clone(),
            indicator: args.indicator.clone(),
        },
        survey_order,
        representation,
        export,
        out: args.out.clone(),
        reference: args.reference.clone(),
        list_options: args.list,
    })
}

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }
    debug!("args: {:?}", args);

    let res = build_settings(&args).and_then(|settings| run_dashboard(&settings));

    if let Err(e) = res {
        eprintln!("An error occured {}", e);
        let mut cause = std::error::Error::source(&e);
        while let Some(c) = cause {
            eprintln!("  caused by: {}", c);
            cause = std::error::Error::source(c);
        }
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xs: &[&str]) -> Args {
        let mut v = vec!["nfhs"];
        v.extend_from_slice(xs);
        Args::parse_from(v)
    }

    #[test]
    fn input_overrides_config() {
        let config = dash::test_data_path("sample_config.json");
        let args = parse(&["--config", &config, "--input", "other.csv"]);
        let s = build_settings(&args).unwrap();
        assert_eq!(s.source.file_path, "other.csv");
        assert_eq!(s.root, None);
        assert_eq!(s.source.provider().unwrap(), Provider::Csv);
        // Still from the configuration.
        assert_eq!(s.representation, Representation::Long);
    }

    #[test]
    fn config_only() {
        let config = dash::test_data_path("sample_config.json");
        let args = parse(&["--config", &config, "--survey-order", "NFHS-4"]);
        let s = build_settings(&args).unwrap();
        assert_eq!(s.source.file_path, "nfhs_sample.xlsx");
        assert!(s.root.is_some());
        assert_eq!(
            s.survey_order,
            SurveyOrder::Explicit(vec!["NFHS-4".to_string()])
        );
    }

    #[test]
    fn no_input() {
        assert!(build_settings(&parse(&[])).is_err());
    }

    #[test]
    fn filters_and_export() {
        let args = parse(&[
            "-i",
            "data.xlsx",
            "--state",
            "Kerala",
            "--area",
            "Total",
            "--export",
            "trend",
            "--representation",
            "long",
        ]);
        let s = build_settings(&args).unwrap();
        assert_eq!(s.selection.state, Some("Kerala".to_string()));
        assert_eq!(s.selection.survey, None);
        assert_eq!(s.export, Some(ExportKind::Trend));
        assert_eq!(s.representation, Representation::Long);
        assert_eq!(s.survey_order, SurveyOrder::Natural);
    }

    #[test]
    fn bad_export_kind() {
        let args = parse(&["-i", "data.xlsx", "--export", "chart"]);
        assert!(build_settings(&args).is_err());
    }
}
