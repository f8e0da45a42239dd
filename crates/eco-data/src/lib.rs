//! Dataset loading for the environmental dashboard
//!
//! CSV measurement tables are parsed into arrow batches with detected
//! column types; the world boundary document is parsed into named,
//! projected country outlines. Category normalization and filtering live
//! here too, shared by every chart view.

pub mod aliases;
pub mod columns;
pub mod filter;
pub mod sources;

use arrow::error::ArrowError;
use thiserror::Error;

// Re-exports
pub use aliases::CountryAliases;
pub use columns::{numeric_column, string_column};
pub use sources::{CsvSource, MemorySource, WorldFeature, WorldMap};

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(ArrowError),

    #[error("CSV parsing error: {0}")]
    Csv(String),

    #[error("GeoJSON parsing error: {0}")]
    Geo(String),

    #[error("Column '{0}' not found")]
    MissingColumn(String),

    #[error("Column '{0}' has an unexpected type")]
    ColumnType(String),

    #[error("Join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => {
                DataError::Io(std::io::Error::new(io_err.kind(), error.to_string()))
            }
            _ => DataError::Csv(error.to_string()),
        }
    }
}

impl From<ArrowError> for DataError {
    fn from(error: ArrowError) -> Self {
        DataError::Arrow(error)
    }
}
