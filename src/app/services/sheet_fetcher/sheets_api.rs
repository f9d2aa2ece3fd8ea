//! Worksheet fetcher backed by the Google Sheets v4 values API
//!
//! One GET against `spreadsheets/{key}/values/{worksheet}` returns every
//! cell of the worksheet as a JSON grid. HTTP status codes are mapped onto
//! the [`FetchError`] taxonomy so the retry layer can tell transient from
//! permanent failures.

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use super::{FetchError, FetchResult, WorksheetFetcher};
use crate::constants::{HTTP_TIMEOUT_SECS, SHEETS_API_BASE_URL};
use crate::{Error, Result};

/// How requests against the sheets API authenticate
#[derive(Debug, Clone)]
pub enum Credentials {
    /// API key, sent as the `key` query parameter (read access to sheets
    /// shared with "anyone with the link")
    ApiKey(String),
    /// OAuth access token, sent as a bearer header
    AccessToken(String),
}

/// Fetches worksheet grids over the Google Sheets v4 REST API
#[derive(Debug)]
pub struct GoogleSheetsFetcher {
    client: Client,
    credentials: Credentials,
    base_url: Url,
}

/// Response body of the `values` endpoint; `values` is absent for
/// worksheets without any content
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl GoogleSheetsFetcher {
    /// Create a fetcher against the public sheets API endpoint
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_base_url(credentials, SHEETS_API_BASE_URL)
    }

    /// Create a fetcher against a different endpoint (used by tests)
    pub fn with_base_url(credentials: Credentials, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::configuration(format!("invalid sheets API base URL: {e}")))?;
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            credentials,
            base_url,
        })
    }

    fn values_url(&self, spreadsheet_key: &str, worksheet_name: &str) -> FetchResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::MalformedResponse {
                message: "sheets API base URL cannot carry path segments".to_string(),
            })?
            .push(spreadsheet_key)
            .push("values")
            // worksheet names may contain spaces and umlauts; Url encodes
            // the segment for us
            .push(worksheet_name);
        Ok(url)
    }
}

impl WorksheetFetcher for GoogleSheetsFetcher {
    async fn fetch(
        &self,
        spreadsheet_key: &str,
        worksheet_name: &str,
    ) -> FetchResult<Vec<Vec<String>>> {
        let url = self.values_url(spreadsheet_key, worksheet_name)?;
        debug!(%spreadsheet_key, %worksheet_name, "requesting worksheet values");

        let request = match &self.credentials {
            Credentials::ApiKey(key) => self.client.get(url).query(&[("key", key.as_str())]),
            Credentials::AccessToken(token) => self.client.get(url).bearer_auth(token),
        };

        let response = request.send().await.map_err(|e| FetchError::Network {
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(
                status,
                spreadsheet_key,
                worksheet_name,
                &body,
            ));
        }

        let range: ValueRange =
            response
                .json()
                .await
                .map_err(|e| FetchError::MalformedResponse {
                    message: e.to_string(),
                })?;

        let grid = range
            .values
            .into_iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();
        Ok(grid)
    }
}

/// Map an unsuccessful HTTP status onto the fetch error taxonomy
fn status_error(
    status: StatusCode,
    spreadsheet_key: &str,
    worksheet_name: &str,
    body: &str,
) -> FetchError {
    let resource = format!("{spreadsheet_key}/{worksheet_name}");
    let message = api_error_message(body).unwrap_or_else(|| status.to_string());
    match status {
        StatusCode::NOT_FOUND => FetchError::NotFound { resource },
        StatusCode::FORBIDDEN => FetchError::PermissionDenied { resource },
        StatusCode::UNAUTHORIZED => FetchError::AuthExpired { message },
        StatusCode::TOO_MANY_REQUESTS => FetchError::RateLimited { message },
        status if status.is_server_error() => FetchError::Network { message },
        _ => FetchError::MalformedResponse {
            message: format!("unexpected status {status}: {message}"),
        },
    }
}

/// Pull the human-readable message out of a sheets API error body
fn api_error_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.error.message)
}

/// Render one JSON cell as the raw string the validation engine consumes
fn cell_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
