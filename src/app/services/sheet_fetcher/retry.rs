//! Bounded retry with exponential backoff around a worksheet fetcher
//!
//! Transient fetch failures (rate limits, expired sessions, network
//! hiccups) are retried with a doubling, capped backoff. Permanent failures
//! propagate after a single attempt.

use std::time::Duration;

use tracing::warn;

use super::{FetchError, WorksheetFetcher};
use crate::constants::{
    DEFAULT_INITIAL_BACKOFF_SECS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_BACKOFF_SECS,
};
use crate::{Error, Result};

/// Tuning knobs for the fetch retry loop
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts, the first one included
    pub max_attempts: usize,
    /// Wait before the first retry; doubles on every further retry
    pub initial_backoff: Duration,
    /// Upper bound for the doubling backoff
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: Duration::from_secs(DEFAULT_INITIAL_BACKOFF_SECS),
            max_backoff: Duration::from_secs(DEFAULT_MAX_BACKOFF_SECS),
        }
    }
}

/// Wraps a [`WorksheetFetcher`] with the retry policy
#[derive(Debug)]
pub struct FetchRetrier<F> {
    fetcher: F,
    policy: RetryPolicy,
}

impl<F: WorksheetFetcher> FetchRetrier<F> {
    pub fn new(fetcher: F, policy: RetryPolicy) -> Self {
        Self { fetcher, policy }
    }

    /// The wrapped fetcher
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetch a worksheet grid, retrying transient failures
    ///
    /// Permanent failures are returned immediately. When all attempts are
    /// spent the last transient failure is surfaced as the cause of
    /// [`Error::RetryExhausted`].
    pub async fn fetch_with_retry(
        &self,
        spreadsheet_key: &str,
        worksheet_name: &str,
    ) -> Result<Vec<Vec<String>>> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut backoff = self.policy.initial_backoff;

        for attempt in 1..=max_attempts {
            let error = match self.fetcher.fetch(spreadsheet_key, worksheet_name).await {
                Ok(grid) => return Ok(grid),
                Err(error) => error,
            };

            if !error.is_transient() || attempt == max_attempts {
                return Err(self.give_up(attempt, error));
            }

            warn!(
                attempt,
                max_attempts,
                backoff_secs = backoff.as_secs_f64(),
                error = %error,
                "worksheet fetch failed, retrying"
            );
            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(self.policy.max_backoff);
        }

        unreachable!("retry loop always returns within max_attempts")
    }

    fn give_up(&self, attempts: usize, error: FetchError) -> Error {
        if error.is_transient() {
            Error::retry_exhausted(attempts, error)
        } else {
            Error::Fetch(error)
        }
    }
}
