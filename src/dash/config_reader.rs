use log::debug;
use snafu::prelude::*;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::dash::*;

pub const DEFAULT_ENTITY_COLUMN: &str = "India/States/UTs";
pub const DEFAULT_SURVEY_COLUMN: &str = "Survey";
pub const DEFAULT_AREA_COLUMN: &str = "Area";
pub const DEFAULT_ANNOTATION_PREFIX: &str = "Note of";

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Provider {
    Xlsx,
    Csv,
}

/// The names of the identifier columns in the header, and the prefix of the note columns.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct IdentifierColumns {
    pub entity: String,
    pub survey: String,
    pub area: String,
    pub annotation_prefix: String,
}

impl Default for IdentifierColumns {
    fn default() -> Self {
        IdentifierColumns {
            entity: DEFAULT_ENTITY_COLUMN.to_string(),
            survey: DEFAULT_SURVEY_COLUMN.to_string(),
            area: DEFAULT_AREA_COLUMN.to_string(),
            annotation_prefix: DEFAULT_ANNOTATION_PREFIX.to_string(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    #[serde(rename = "provider")]
    pub _provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "entityColumn")]
    pub entity_column: Option<String>,
    #[serde(rename = "surveyColumn")]
    pub survey_column: Option<String>,
    #[serde(rename = "areaColumn")]
    pub area_column: Option<String>,
    #[serde(rename = "annotationPrefix")]
    pub annotation_prefix: Option<String>,
}

impl FileSource {
    /// A source with all the defaults.
    pub fn from_path(path: &str) -> FileSource {
        FileSource {
            _provider: None,
            file_path: path.to_string(),
            excel_worksheet_name: None,
            entity_column: None,
            survey_column: None,
            area_column: None,
            annotation_prefix: None,
        }
    }

    /// The provider, either given explicitly or deduced from the file extension.
    pub fn provider(&self) -> DashResult<Provider> {
        let p = match &self._provider {
            Some(p) => p.to_lowercase(),
            None => Path::new(&self.file_path)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_lowercase(),
        };
        match p.as_str() {
            "xlsx" | "excel" => Ok(Provider::Xlsx),
            "csv" => Ok(Provider::Csv),
            _ => UnknownProviderSnafu { provider: p }.fail(),
        }
    }

    pub fn columns(&self) -> IdentifierColumns {
        let d = IdentifierColumns::default();
        IdentifierColumns {
            entity: self.entity_column.clone().unwrap_or(d.entity),
            survey: self.survey_column.clone().unwrap_or(d.survey),
            area: self.area_column.clone().unwrap_or(d.area),
            annotation_prefix: self.annotation_prefix.clone().unwrap_or(d.annotation_prefix),
        }
    }

    /// The file path, relative to the given root if it is not absolute.
    pub fn resolved_path(&self, root: Option<&Path>) -> PathBuf {
        let p = Path::new(&self.file_path);
        match root {
            Some(r) if p.is_relative() => r.join(p),
            _ => p.to_path_buf(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DashConfig {
    pub source: FileSource,
    #[serde(rename = "surveyOrder")]
    pub survey_order: Option<Vec<String>>,
    pub representation: Option<String>,
}

impl DashConfig {
    pub fn survey_order(&self) -> SurveyOrder {
        SurveyOrder::from_labels(self.survey_order.as_deref().unwrap_or(&[]))
    }

    pub fn representation(&self) -> DashResult<Representation> {
        match &self.representation {
            Some(s) => Representation::parse(s),
            None => Ok(Representation::Wide),
        }
    }
}

/// Reads a configuration file. Returns the configuration and the directory that the
/// paths in it are relative to.
pub fn read_config(path: &str) -> DashResult<(DashConfig, PathBuf)> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: DashConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    let root = Path::new(path)
        .parent()
        .context(MissingParentDirSnafu {})?
        .to_path_buf();
    Ok((config, root))
}
