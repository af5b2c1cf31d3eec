use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet read failed: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported source file type: {0}")]
    UnsupportedFile(String),

    #[error("Workbook has no worksheets: {0}")]
    EmptyWorkbook(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ImportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ImportError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
