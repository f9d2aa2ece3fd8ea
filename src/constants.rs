//! Crate-wide constants and defaults.

/// Base URL of the Google Sheets v4 values API
pub const SHEETS_API_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Environment variable holding a Google API key
pub const ENV_API_KEY: &str = "SHEETLOAD_API_KEY";

/// Environment variable holding an OAuth access token
pub const ENV_ACCESS_TOKEN: &str = "SHEETLOAD_ACCESS_TOKEN";

/// Default number of leading worksheet rows to skip (the header row)
pub const DEFAULT_SKIP_ROWS: usize = 1;

/// Default output field delimiter, suitable for `COPY FROM STDIN`
pub const DEFAULT_DELIMITER: char = '\t';

/// Default total fetch attempts (one initial try plus retries)
pub const DEFAULT_MAX_ATTEMPTS: usize = 4;

/// Default backoff before the first retry, in seconds
pub const DEFAULT_INITIAL_BACKOFF_SECS: u64 = 20;

/// Default backoff ceiling, in seconds
///
/// The Sheets API measures quota in 100 second windows, so waiting
/// substantially longer than that per attempt buys nothing.
pub const DEFAULT_MAX_BACKOFF_SECS: u64 = 120;

/// HTTP request timeout for a single fetch attempt, in seconds
pub const HTTP_TIMEOUT_SECS: u64 = 60;
