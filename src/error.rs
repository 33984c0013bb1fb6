// Error taxonomy for loading, querying and reporting.
//
// Malformed numeric fields never show up here: they are absorbed at load
// time as missing values and only counted in the `LoadReport`.
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while loading the dataset or reference tables.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source file could not be opened.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The CSV stream itself is unreadable (bad UTF-8, I/O failure mid-read).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// One or more required columns are absent from the header row.
    #[error("dataset is missing required columns: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    /// A reference-table override file is not valid JSON for the expected shape.
    #[error("invalid reference tables: {0}")]
    Json(#[from] serde_json::Error),
}

/// Recoverable errors surfaced by the query pipeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// No record matches the requested district.
    #[error("No data available for {location}")]
    NotFound { location: String },

    /// The district exists but has no usable values in a required column.
    #[error("Not enough valid {column} values for {district}")]
    InsufficientData { district: String, column: String },
}

/// Errors raised while composing a report bundle on disk.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    /// True when the underlying cause is an unknown district.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Pipeline(PipelineError::NotFound { .. }))
    }
}
