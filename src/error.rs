use std::path::PathBuf;

use chrono::NaiveDate;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data unavailable ({}): {reason}", path.display())]
    DataUnavailable { path: PathBuf, reason: String },

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("No data for the selected range")]
    EmptyAggregation,

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Column '{column}' is not {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl DashboardError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
