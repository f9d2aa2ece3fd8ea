//! End-to-end download pipeline tests against a scripted fetcher

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use sheetload::app::services::sheet_fetcher::{FetchResult, RetryPolicy};
use sheetload::{CellValue, Error, FetchError, SheetDownloader, WorksheetFetcher};

/// Fetcher that replays a scripted sequence of outcomes
struct ScriptedFetcher {
    responses: Mutex<VecDeque<FetchResult<Vec<Vec<String>>>>>,
}

impl ScriptedFetcher {
    fn new(responses: Vec<FetchResult<Vec<Vec<String>>>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

impl WorksheetFetcher for ScriptedFetcher {
    async fn fetch(
        &self,
        _spreadsheet_key: &str,
        _worksheet_name: &str,
    ) -> FetchResult<Vec<Vec<String>>> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(FetchError::Network {
                    message: "scripted fetcher ran out of responses".to_string(),
                })
            })
    }
}

fn policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(2),
    }
}

fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

/// A realistic worksheet: header row, a blank row in the middle, rows of
/// mixed cell types
fn city_sheet() -> Vec<Vec<String>> {
    grid(&[
        &["City", "Founded", "Districts", "Capital", "Area"],
        &["Berlin", "01.01.2020", "12", "ja", "891.7"],
        &["", "", "", "", ""],
        &["Hamburg", "15.06.2021", "7", "nein", "755.2"],
    ])
}

#[tokio::test]
async fn test_full_pipeline_with_reference_definition() {
    let fetcher = ScriptedFetcher::new(vec![Ok(city_sheet())]);
    let downloader = SheetDownloader::new(
        fetcher,
        policy(),
        "csd(in_fmt=%d.%m.%Y)ib(true=ja,false=nein)f&(value=web)"
            .parse()
            .unwrap(),
        1,
    );

    let rows = downloader
        .download_collected("key", "Cities")
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    // blank worksheet row 3 was skipped without consuming a counter value
    assert_eq!(rows[0].source_row, 2);
    assert_eq!(rows[1].source_row, 4);
    assert_eq!(rows[0].values[0], CellValue::Integer(1));
    assert_eq!(rows[1].values[0], CellValue::Integer(2));
    assert_eq!(rows[1].values[1], CellValue::Text("Hamburg".to_string()));
    assert_eq!(rows[1].values[4], CellValue::Boolean(false));
    assert_eq!(rows[1].values[6], CellValue::Text("web".to_string()));
}

#[tokio::test]
async fn test_transient_failures_are_retried_before_validation() {
    let fetcher = ScriptedFetcher::new(vec![
        Err(FetchError::RateLimited {
            message: "Quota exceeded".to_string(),
        }),
        Err(FetchError::Network {
            message: "connection reset".to_string(),
        }),
        Ok(city_sheet()),
    ]);
    let downloader =
        SheetDownloader::new(fetcher, policy(), "cs".parse().unwrap(), 1);

    let rows = downloader
        .download_collected("key", "Cities")
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn test_missing_worksheet_fails_without_retry() {
    let fetcher = ScriptedFetcher::new(vec![
        Err(FetchError::NotFound {
            resource: "key/Nope".to_string(),
        }),
        Ok(city_sheet()),
    ]);
    let downloader =
        SheetDownloader::new(fetcher, policy(), "cs".parse().unwrap(), 1);

    let result = downloader.download_collected("key", "Nope").await;
    assert!(matches!(
        result,
        Err(Error::Fetch(FetchError::NotFound { .. }))
    ));
}

#[tokio::test]
async fn test_exhausted_retries_surface_the_last_cause() {
    let rate_limited = || {
        Err(FetchError::RateLimited {
            message: "Quota exceeded".to_string(),
        })
    };
    let fetcher = ScriptedFetcher::new(vec![rate_limited(), rate_limited(), rate_limited()]);
    let downloader =
        SheetDownloader::new(fetcher, policy(), "cs".parse().unwrap(), 1);

    match downloader.download_collected("key", "Cities").await {
        Err(Error::RetryExhausted { attempts, source }) => {
            assert_eq!(attempts, 3);
            assert!(matches!(source, FetchError::RateLimited { .. }));
        }
        other => panic!("expected RetryExhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_one_bad_cell_fails_the_download_with_its_location() {
    let mut sheet = city_sheet();
    sheet[3][2] = "seven".to_string();
    let fetcher = ScriptedFetcher::new(vec![Ok(sheet)]);
    let downloader = SheetDownloader::new(
        fetcher,
        policy(),
        "csd(in_fmt=%d.%m.%Y)ib(true=ja,false=nein)f".parse().unwrap(),
        1,
    );

    match downloader.download_collected("key", "Cities").await {
        Err(Error::Validation {
            row,
            column,
            value,
            ..
        }) => {
            assert_eq!(row, 4);
            assert_eq!(column, 3);
            assert_eq!(value, "seven");
        }
        other => panic!("expected Validation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_worksheet_is_an_error() {
    let fetcher = ScriptedFetcher::new(vec![Ok(Vec::new())]);
    let downloader =
        SheetDownloader::new(fetcher, policy(), "cs".parse().unwrap(), 1);

    let result = downloader.download_collected("key", "Cities").await;
    assert!(matches!(result, Err(Error::EmptyResult { skip_rows: 1 })));
}

#[tokio::test]
async fn test_lazy_stream_yields_rows_in_worksheet_order() {
    let fetcher = ScriptedFetcher::new(vec![Ok(city_sheet())]);
    let downloader =
        SheetDownloader::new(fetcher, policy(), "cs".parse().unwrap(), 1);

    let mut stream = downloader.download("key", "Cities").await.unwrap();

    let first = stream.next().unwrap().unwrap();
    assert_eq!(first.values[1], CellValue::Text("Berlin".to_string()));
    let second = stream.next().unwrap().unwrap();
    assert_eq!(second.values[1], CellValue::Text("Hamburg".to_string()));
    assert!(stream.next().is_none());
}
