use polars::error::PolarsError;
use std::error::Error;
use std::fmt::Display;
use std::path::PathBuf;

#[derive(Debug)]
pub enum AnalysisError {
    File(std::io::Error),
    Config(serde_yaml::Error),
    MissingParameter(&'static str),
    InvalidParameter(String),
    TriggerPattern(regex::Error),
    UnknownCutSet(String),
    DuplicateHistogram(String),
    EventRecord {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
    EventIndex(usize),
    Json(serde_json::Error),
    DataFrame(PolarsError),
    SinkClosed,
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl From<std::io::Error> for AnalysisError {
    fn from(err: std::io::Error) -> AnalysisError {
        AnalysisError::File(err)
    }
}

impl From<serde_yaml::Error> for AnalysisError {
    fn from(err: serde_yaml::Error) -> AnalysisError {
        AnalysisError::Config(err)
    }
}

impl From<regex::Error> for AnalysisError {
    fn from(err: regex::Error) -> AnalysisError {
        AnalysisError::TriggerPattern(err)
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> AnalysisError {
        AnalysisError::Json(err)
    }
}

impl From<PolarsError> for AnalysisError {
    fn from(err: PolarsError) -> AnalysisError {
        AnalysisError::DataFrame(err)
    }
}

impl From<rayon::ThreadPoolBuildError> for AnalysisError {
    fn from(err: rayon::ThreadPoolBuildError) -> AnalysisError {
        AnalysisError::ThreadPool(err)
    }
}

impl Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisError::File(x) => write!(f, "Analysis had a file I/O error: {x}"),
            AnalysisError::Config(x) => {
                write!(f, "Analysis could not parse the configuration file: {x}")
            }
            AnalysisError::MissingParameter(name) => write!(
                f,
                "Configuration is missing the required parameter '{name}'"
            ),
            AnalysisError::InvalidParameter(x) => {
                write!(f, "Configuration has an invalid parameter: {x}")
            }
            AnalysisError::TriggerPattern(x) => {
                write!(f, "Trigger menu has an invalid path pattern: {x}")
            }
            AnalysisError::UnknownCutSet(label) => {
                write!(f, "No photon identification cut set named '{label}'")
            }
            AnalysisError::DuplicateHistogram(name) => {
                write!(f, "Histogram '{name}' is already booked")
            }
            AnalysisError::EventRecord { path, line, source } => write!(
                f,
                "Malformed event record at {}:{line}: {source}",
                path.display()
            ),
            AnalysisError::EventIndex(index) => {
                write!(f, "Event index {index} is outside the event source")
            }
            AnalysisError::Json(x) => write!(f, "Analysis had a JSON error: {x}"),
            AnalysisError::DataFrame(x) => write!(f, "Analysis had an error using polars: {x}"),
            AnalysisError::SinkClosed => write!(f, "Output sink was already closed"),
            AnalysisError::ThreadPool(x) => {
                write!(f, "Analysis could not start the worker pool: {x}")
            }
        }
    }
}

impl Error for AnalysisError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AnalysisError::File(x) => Some(x),
            AnalysisError::Config(x) => Some(x),
            AnalysisError::TriggerPattern(x) => Some(x),
            AnalysisError::EventRecord { source, .. } | AnalysisError::Json(source) => Some(source),
            AnalysisError::DataFrame(x) => Some(x),
            AnalysisError::ThreadPool(x) => Some(x),
            _ => None,
        }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
