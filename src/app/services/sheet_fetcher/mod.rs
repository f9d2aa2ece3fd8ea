//! Worksheet fetching with retry for transient failures
//!
//! The boundary to the spreadsheet service. A [`WorksheetFetcher`] produces
//! the raw 2-D cell grid for one worksheet; [`FetchError`] classifies its
//! failures into transient ones (worth retrying) and permanent ones (fail
//! immediately); the [`retry::FetchRetrier`] wraps any fetcher with a
//! bounded backoff policy.
//!
//! ## Architecture
//!
//! - [`retry`] - bounded wait-with-backoff retry around a fetcher
//! - [`sheets_api`] - fetcher implementation over the Google Sheets v4
//!   values API

pub mod retry;
pub mod sheets_api;

#[cfg(test)]
pub mod tests;

pub use retry::{FetchRetrier, RetryPolicy};
pub use sheets_api::{Credentials, GoogleSheetsFetcher};

/// Result type for fetch boundary calls
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Failure kinds of the worksheet fetch boundary
///
/// Transient kinds are expected to self-resolve and are retried; permanent
/// kinds will not self-heal and propagate immediately.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// Spreadsheet or worksheet does not exist (permanent)
    #[error("spreadsheet or worksheet not found: {resource}")]
    NotFound { resource: String },

    /// The credentials are valid but lack access (permanent)
    #[error("permission denied for {resource}")]
    PermissionDenied { resource: String },

    /// The service response could not be decoded (permanent)
    #[error("malformed response from the sheets API: {message}")]
    MalformedResponse { message: String },

    /// Request quota exceeded (transient)
    #[error("rate limited by the sheets API: {message}")]
    RateLimited { message: String },

    /// Authentication failed or the session expired (transient)
    #[error("authentication failed or session expired: {message}")]
    AuthExpired { message: String },

    /// Connection, timeout or other transport failure (transient)
    #[error("network error: {message}")]
    Network { message: String },
}

impl FetchError {
    /// Whether a retry with backoff can reasonably succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::RateLimited { .. }
                | FetchError::AuthExpired { .. }
                | FetchError::Network { .. }
        )
    }
}

/// Boundary trait for retrieving the raw cell grid of one worksheet
///
/// Implementations perform authentication and the network call; the core
/// only sees the resulting grid of raw cell strings.
pub trait WorksheetFetcher {
    /// Fetch all cell values of `worksheet_name` within the spreadsheet
    /// identified by `spreadsheet_key`, as rows of raw strings
    fn fetch(
        &self,
        spreadsheet_key: &str,
        worksheet_name: &str,
    ) -> impl Future<Output = FetchResult<Vec<Vec<String>>>> + Send;
}
