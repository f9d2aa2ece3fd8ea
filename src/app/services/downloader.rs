//! Download orchestration
//!
//! [`SheetDownloader`] wires the retrying fetcher and the row validation
//! engine into the one operation the CLI runs: fetch a worksheet grid,
//! then stream its data rows through validation.

use tracing::info;

use super::row_engine::{RowStream, RowValidationEngine};
use super::sheet_fetcher::{FetchRetrier, RetryPolicy, WorksheetFetcher};
use crate::app::models::TypedRow;
use crate::app::services::column_spec::ColumnSpecList;
use crate::Result;

/// Downloads one worksheet and validates it into typed rows
#[derive(Debug)]
pub struct SheetDownloader<F> {
    retrier: FetchRetrier<F>,
    engine: RowValidationEngine,
    skip_rows: usize,
}

impl<F: WorksheetFetcher> SheetDownloader<F> {
    /// Create a downloader for one column definition
    pub fn new(fetcher: F, policy: RetryPolicy, specs: ColumnSpecList, skip_rows: usize) -> Self {
        Self {
            retrier: FetchRetrier::new(fetcher, policy),
            engine: RowValidationEngine::new(specs),
            skip_rows,
        }
    }

    /// Fetch the worksheet and return the lazy stream of validated rows
    ///
    /// The stream owns a fresh counter, so repeated downloads through the
    /// same downloader start counting at 1 again.
    pub async fn download(&self, spreadsheet_key: &str, worksheet_name: &str) -> Result<RowStream> {
        info!(%spreadsheet_key, %worksheet_name, "downloading worksheet");
        let grid = self
            .retrier
            .fetch_with_retry(spreadsheet_key, worksheet_name)
            .await?;
        info!(rows = grid.len(), "worksheet received");
        Ok(self.engine.validate_rows(grid, self.skip_rows))
    }

    /// Download and drain into a vector, failing on the first bad cell and
    /// on empty results
    pub async fn download_collected(
        &self,
        spreadsheet_key: &str,
        worksheet_name: &str,
    ) -> Result<Vec<TypedRow>> {
        self.download(spreadsheet_key, worksheet_name)
            .await?
            .collect_rows()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::app::models::CellValue;
    use crate::app::services::sheet_fetcher::tests::ScriptedFetcher;
    use crate::app::services::sheet_fetcher::FetchError;
    use crate::Error;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
        }
    }

    fn specs(definition: &str) -> ColumnSpecList {
        definition.parse().unwrap()
    }

    fn sheet() -> Vec<Vec<String>> {
        vec![
            vec!["city".to_string(), "population".to_string()],
            vec!["Berlin".to_string(), "3645000".to_string()],
            vec!["Hamburg".to_string(), "1841000".to_string()],
        ]
    }

    #[tokio::test]
    async fn test_download_validates_after_fetch() {
        let fetcher = ScriptedFetcher::new(vec![Ok(sheet())]);
        let downloader = SheetDownloader::new(fetcher, policy(), specs("csi"), 1);

        let rows = downloader
            .download_collected("key", "Sheet1")
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].values,
            vec![
                CellValue::Integer(1),
                CellValue::Text("Berlin".to_string()),
                CellValue::Integer(3_645_000),
            ]
        );
        assert_eq!(rows[1].values[0], CellValue::Integer(2));
    }

    #[tokio::test]
    async fn test_download_retries_then_validates() {
        let fetcher = ScriptedFetcher::new(vec![
            Err(FetchError::RateLimited {
                message: "Quota exceeded".to_string(),
            }),
            Ok(sheet()),
        ]);
        let downloader = SheetDownloader::new(fetcher, policy(), specs("si"), 1);

        let rows = downloader
            .download_collected("key", "Sheet1")
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_repeated_downloads_restart_the_counter() {
        let fetcher = ScriptedFetcher::new(vec![Ok(sheet()), Ok(sheet())]);
        let downloader = SheetDownloader::new(fetcher, policy(), specs("cs"), 1);

        let first = downloader
            .download_collected("key", "Sheet1")
            .await
            .unwrap();
        let second = downloader
            .download_collected("key", "Sheet1")
            .await
            .unwrap();
        assert_eq!(first[0].values[0], CellValue::Integer(1));
        assert_eq!(second[0].values[0], CellValue::Integer(1));
    }

    #[tokio::test]
    async fn test_permanent_fetch_error_propagates() {
        let fetcher = ScriptedFetcher::new(vec![Err(FetchError::NotFound {
            resource: "key/Nope".to_string(),
        })]);
        let downloader = SheetDownloader::new(fetcher, policy(), specs("s"), 1);

        let result = downloader.download_collected("key", "Nope").await;
        assert!(matches!(
            result,
            Err(Error::Fetch(FetchError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_header_only_sheet_is_an_empty_result() {
        let fetcher = ScriptedFetcher::new(vec![Ok(vec![vec![
            "city".to_string(),
            "population".to_string(),
        ]])]);
        let downloader = SheetDownloader::new(fetcher, policy(), specs("si"), 1);

        let result = downloader.download_collected("key", "Sheet1").await;
        assert!(matches!(result, Err(Error::EmptyResult { skip_rows: 1 })));
    }
}
