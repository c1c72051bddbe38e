use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors surfaced while reading samples or writing reports.
///
/// Missing inputs are not errors; stages log and skip them instead.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed value {value:?} in column {column} of {path}")]
    MalformedValue {
        path: PathBuf,
        column: String,
        value: String,
    },
    #[error("column {column} missing from {path}")]
    MissingColumn { path: PathBuf, column: String },
}

impl ReportError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}
