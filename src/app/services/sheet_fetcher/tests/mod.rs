//! Tests for the fetch retry loop

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{FetchError, FetchResult, WorksheetFetcher};


/// Fetcher that replays a scripted sequence of outcomes and counts calls
pub struct ScriptedFetcher {
    responses: Mutex<VecDeque<FetchResult<Vec<Vec<String>>>>>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new(responses: Vec<FetchResult<Vec<Vec<String>>>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl WorksheetFetcher for ScriptedFetcher {
    async fn fetch(
        &self,
        _spreadsheet_key: &str,
        _worksheet_name: &str,
    ) -> FetchResult<Vec<Vec<String>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
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

/// One-cell grid used where the content does not matter
pub fn tiny_grid() -> Vec<Vec<String>> {
    vec![vec!["cell".to_string()]]
}
