//! Sheetload Library
//!
//! A Rust library for downloading a single Google Sheets worksheet, validating
//! and coercing every cell against a compact per-column type definition, and
//! producing typed rows suitable for bulk-loading into a relational table.
//!
//! This library provides tools for:
//! - Parsing the column-definition mini-language (`csd(in_fmt=%d.%m.%Y)ib(...)fs`)
//! - Validating raw worksheet cells into typed values with precise failure reports
//! - Injecting a synthetic auto-incrementing counter column
//! - Retrying transient fetch failures with bounded backoff
//! - Emitting validated rows as delimited text for `COPY`-style bulk loads

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod column_spec;
        pub mod downloader;
        pub mod row_engine;
        pub mod sheet_fetcher;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{CellValue, TypedRow};
pub use app::services::column_spec::{ColumnKind, ColumnSpec, ColumnSpecList};
pub use app::services::downloader::SheetDownloader;
pub use app::services::sheet_fetcher::{FetchError, WorksheetFetcher};
pub use config::Config;

/// Result type alias for sheetload operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for worksheet download and validation operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Column definition string could not be parsed
    #[error("column definition error at position {position}: {message}")]
    ColumnSpecParse { position: usize, message: String },

    /// A single cell failed validation; aborts the whole download
    #[error(
        "validation failed at worksheet row {row}, output column {column}: '{value}' {reason}"
    )]
    Validation {
        row: usize,
        column: usize,
        value: String,
        reason: String,
    },

    /// No data rows remained after skipping header rows
    #[error("no data rows received after skipping {skip_rows} header rows")]
    EmptyResult { skip_rows: usize },

    /// Worksheet fetch failed with a permanent error
    #[error("worksheet fetch failed: {0}")]
    Fetch(#[from] app::services::sheet_fetcher::FetchError),

    /// Transient fetch failures exhausted the retry budget
    #[error("worksheet fetch gave up after {attempts} attempts: {source}")]
    RetryExhausted {
        attempts: usize,
        #[source]
        source: app::services::sheet_fetcher::FetchError,
    },

    /// Configuration error
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing delimited output failed
    #[error("output error: {message}")]
    Output {
        message: String,
        #[source]
        source: csv::Error,
    },
}

impl Error {
    /// Create a column definition parse error with the offending position
    pub fn column_spec_parse(position: usize, message: impl Into<String>) -> Self {
        Self::ColumnSpecParse {
            position,
            message: message.into(),
        }
    }

    /// Create a cell validation error
    ///
    /// `row` is the absolute 1-based worksheet row number (header rows
    /// included); `column` is the zero-based output position of the failing
    /// column definition.
    pub fn validation(
        row: usize,
        column: usize,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation {
            row,
            column,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an empty-result error
    pub fn empty_result(skip_rows: usize) -> Self {
        Self::EmptyResult { skip_rows }
    }

    /// Create a retry-budget-exhausted error carrying the last transient cause
    pub fn retry_exhausted(
        attempts: usize,
        source: app::services::sheet_fetcher::FetchError,
    ) -> Self {
        Self::RetryExhausted { attempts, source }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create an output error with context
    pub fn output(message: impl Into<String>, source: csv::Error) -> Self {
        Self::Output {
            message: message.into(),
            source,
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::Output {
            message: "writing delimited output failed".to_string(),
            source: error,
        }
    }
}
